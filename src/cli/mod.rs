//! CLI module for eduquest
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod browser;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod learner;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

pub use commands::{Cli, Commands};

use crate::core::catalog::Confirmation;
use crate::core::clock::Clock;
use crate::core::config::Config;
use crate::core::elevation::ElevationGate;
use crate::core::portal::Portal;
use crate::core::store::{FileStore, PortalStore};
use crate::error::{EduQuestError, Result};

/// Open the portal backed by the data directory.
///
/// Learner commands pass `ElevationGate::default()`; only teacher commands
/// read the password from the credential store.
pub fn open_portal(data_dir: Option<PathBuf>, gate: ElevationGate) -> Result<Portal<FileStore>> {
    let config = Config::load()?;
    let dir = config.data_dir(data_dir)?;
    tracing::debug!(dir = %dir.display(), "opening data directory");
    let store = FileStore::open(dir)?;
    Ok(Portal::load(PortalStore::new(store), gate, Clock::System))
}

/// Ask a yes/no question on stdout; anything but `y`/`yes` declines
pub fn confirm(question: &str) -> Result<Confirmation> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(parse_confirmation(&input))
}

fn parse_confirmation(input: &str) -> Confirmation {
    let answer = input.trim().to_lowercase();
    Confirmation::from_bool(answer == "y" || answer == "yes")
}

/// Read a value from stdin after printing a prompt on stderr
pub fn prompt_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let value = input.trim().to_string();
    if value.is_empty() {
        return Err(EduQuestError::Cancelled);
    }
    Ok(value)
}
