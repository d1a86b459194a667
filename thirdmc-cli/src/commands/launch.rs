//! `launch` - prepare and start an instance or package.

use console::style;
use thirdmc::scheduler::JobSpec;

use super::common::find_launch_target;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the launch command.
pub fn run(runner: &CliRunner, query: &str) -> Result<(), CliError> {
    let store = runner.store()?;
    let target = find_launch_target(&store, query)?;
    drop(store);

    if !runner.layout().version_json(&target.version).is_file() {
        return Err(CliError::Config(format!(
            "version {} of '{}' is not installed",
            target.version, target.name
        )));
    }

    println!(
        "Launching {} ({})",
        style(&target.name).cyan().bold(),
        target.version
    );
    runner.run_jobs(vec![JobSpec::Prelaunch {
        version: target.version,
        game_dir: target.game_dir,
    }])?;
    Ok(())
}
