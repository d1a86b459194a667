//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use console::style;
use dialoguer::Confirm;
use thirdmc::profile::ProfileStore;
use thirdmc::scheduler::RunSummary;

use crate::error::CliError;

/// Shortest id prefix accepted in place of a full id.
const MIN_ID_PREFIX: usize = 4;

/// Whether `query` names `id`, either in full or as a prefix.
pub fn id_matches(id: &str, query: &str) -> bool {
    id == query || (query.len() >= MIN_ID_PREFIX && id.starts_with(query))
}

/// The profile whose id is `query`, or the only one `query` is a prefix of.
///
/// A prefix shared by several profiles is an error rather than a guess.
pub fn find_by_id<'p, T>(
    profiles: &'p [T],
    id_of: impl Fn(&T) -> &str,
    query: &str,
) -> Result<Option<&'p T>, CliError> {
    if let Some(exact) = profiles.iter().find(|p| id_of(*p) == query) {
        return Ok(Some(exact));
    }
    let matches: Vec<&T> = profiles
        .iter()
        .filter(|p| id_matches(id_of(*p), query))
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        _ => Err(CliError::AmbiguousId {
            query: query.to_string(),
            count: matches.len(),
        }),
    }
}

/// First block of an id, for listings.
pub fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// What `launch` runs: a version in a game directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub name: String,
    pub version: String,
    pub game_dir: PathBuf,
}

/// Find an instance or package by id.
pub fn find_launch_target(store: &dyn ProfileStore, query: &str) -> Result<LaunchTarget, CliError> {
    let instance = find_by_id(store.list_instances(), |p| p.id.as_str(), query)?;
    let package = find_by_id(store.list_packages(), |p| p.id.as_str(), query)?;

    match (instance, package) {
        (Some(p), None) => Ok(LaunchTarget {
            name: p.name.clone(),
            version: p.version.clone(),
            game_dir: p.game.clone(),
        }),
        (None, Some(p)) => Ok(LaunchTarget {
            name: p.name.clone(),
            version: p.version.clone(),
            game_dir: p.game.clone(),
        }),
        (Some(_), Some(_)) => Err(CliError::AmbiguousId {
            query: query.to_string(),
            count: 2,
        }),
        (None, None) => Err(CliError::UnknownProfile(query.to_string())),
    }
}

/// Ask before a destructive step unless `assume_yes`.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<(), CliError> {
    if assume_yes {
        return Ok(());
    }
    let accepted = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    if accepted {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// Print what a run did.
pub fn print_summary(summary: &RunSummary) {
    println!(
        "{} {} job(s) completed",
        style("Done:").green().bold(),
        summary.completed.len()
    );
    if summary.skipped > 0 {
        println!(
            "{} {} pack file(s) were skipped; the pack may be incomplete",
            style("Note:").yellow().bold(),
            summary.skipped
        );
    }
}
