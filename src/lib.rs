//! eduquest - A gamified study tracker for the terminal
//!
//! This library provides both CLI and TUI interfaces over a small catalog of
//! study links grouped by subject. Learners earn points for completed
//! exercises and chase a daily goal; teachers curate the catalog behind a
//! shared password.

pub mod ai;
pub mod cli;
pub mod core;
pub mod error;
pub mod tui;

pub use error::{EduQuestError, Result};
