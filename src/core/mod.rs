//! Core functionality for eduquest
//!
//! This module contains the business logic shared by the CLI and the TUI:
//! - Catalog of subjects and exercises
//! - Learner progress and the daily challenge
//! - Persistence through a key-value store
//! - Teacher mode access control
//! - Application configuration and credentials

pub mod catalog;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod defaults;
pub mod elevation;
pub mod model;
pub mod portal;
pub mod progress;
pub mod store;

pub use catalog::{Catalog, Confirmation};
pub use clock::Clock;
pub use config::Config;
pub use credentials::{CredentialStore, Secret};
pub use elevation::ElevationGate;
pub use model::{Difficulty, Exercise, ExerciseDraft, ExerciseId, Subject, SubjectDraft, UserProgress};
pub use portal::Portal;
pub use progress::{Completion, ProgressState};
pub use store::{FileStore, KeyValueStore, MemoryStore, PortalStore};
