//! Starts the game as a child process.

use std::fs;
use std::process::{Command, Stdio};

use tracing::{info, warn};

use thirdmc::config::LauncherVisibility;
use thirdmc::launch::{LaunchPlan, Launcher};
use thirdmc::manager::{InstallError, InstallResult};

/// Launches `java` with the plan's arguments in the game directory.
#[derive(Debug, Clone, Copy)]
pub struct ProcessLauncher {
    visibility: LauncherVisibility,
}

impl ProcessLauncher {
    pub fn new(visibility: LauncherVisibility) -> Self {
        Self { visibility }
    }

    fn command(plan: &LaunchPlan) -> Command {
        let mut command = Command::new(&plan.java);
        command
            .args(plan.arguments())
            .current_dir(&plan.working_dir)
            .stdin(Stdio::null());
        command
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&mut self, plan: &LaunchPlan) -> InstallResult<()> {
        let mut child = Self::command(plan).spawn().map_err(|e| {
            InstallError::Launch(format!("failed to start {}: {}", plan.java.display(), e))
        })?;
        info!(pid = child.id(), main_class = %plan.main_class, "Game started");

        if self.visibility == LauncherVisibility::Detach {
            return Ok(());
        }

        let status = child
            .wait()
            .map_err(|e| InstallError::Launch(format!("failed to wait for the game: {}", e)))?;
        info!(status = %status, "Game exited");

        if let Err(e) = fs::remove_dir_all(&plan.natives_dir) {
            warn!(path = %plan.natives_dir.display(), error = %e, "Failed to remove natives");
        }

        if status.success() {
            Ok(())
        } else {
            Err(InstallError::Launch(format!("game exited with {}", status)))
        }
    }
}
