//! CLI subcommands.

pub mod common;
pub mod config;
pub mod instances;
pub mod launch;
pub mod packs;
pub mod versions;
