//! CLI command definitions using clap
//!
//! Defines the command structure for the `eduquest` CLI tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::model::{Difficulty, DEFAULT_EXERCISE_POINTS, DEFAULT_SUBJECT_ICON};

/// eduquest - A gamified study tracker
///
/// Collect points for study exercises and reach your daily goal.
/// Run without arguments to launch the TUI mode.
#[derive(Parser, Debug)]
#[command(name = "eduquest", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding progress and catalog files
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register the learner on this machine
    Register {
        /// Your name (at least 2 characters)
        name: String,
    },

    /// Show points and today's challenge
    Status,

    /// List subjects
    Subjects,

    /// List the exercises of a subject
    Exercises {
        /// Subject name
        subject: String,
    },

    /// Mark an exercise as completed
    Complete {
        /// Exercise id
        id: String,
    },

    /// Open an exercise link in the browser
    Open {
        /// Exercise id
        id: String,
    },

    /// Get a motivational study tip
    Tip {
        /// Subject name
        subject: String,
    },

    /// Manage subjects (teacher mode)
    Subject(SubjectArgs),

    /// Manage exercises (teacher mode)
    Exercise(ExerciseArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Teacher password, prompted for when not given
#[derive(Args, Debug, Clone)]
pub struct TeacherAuth {
    /// Teacher password
    #[arg(long, env = "EDUQUEST_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Subject Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Subject commands
#[derive(Parser, Debug)]
pub struct SubjectArgs {
    #[command(subcommand)]
    pub command: SubjectCommand,
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommand {
    /// Add a subject
    Add {
        /// Subject name
        name: String,

        /// Icon shown next to the name
        #[arg(long, default_value = DEFAULT_SUBJECT_ICON)]
        icon: String,

        /// Color: blue, rose, emerald, amber, indigo (or a full color token)
        #[arg(long, default_value = "blue")]
        color: String,

        #[command(flatten)]
        auth: TeacherAuth,
    },

    /// Remove a subject and all of its exercises
    Remove {
        /// Subject name
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,

        #[command(flatten)]
        auth: TeacherAuth,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Exercise Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Exercise commands
#[derive(Parser, Debug)]
pub struct ExerciseArgs {
    #[command(subcommand)]
    pub command: ExerciseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExerciseCommand {
    /// Add an exercise link
    Add {
        /// Exercise title
        #[arg(long, short)]
        title: String,

        /// Link to the exercise
        #[arg(long, short)]
        url: String,

        /// Subject the exercise belongs to
        #[arg(long, short)]
        subject: String,

        /// Short description
        #[arg(long, short, default_value = "")]
        description: String,

        /// Difficulty: easy, medium or hard
        #[arg(long, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,

        /// Points awarded on completion
        #[arg(long, short, default_value_t = DEFAULT_EXERCISE_POINTS)]
        points: u32,

        #[command(flatten)]
        auth: TeacherAuth,
    },

    /// Remove an exercise
    Remove {
        /// Exercise id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,

        #[command(flatten)]
        auth: TeacherAuth,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,

        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Remove a configuration value
    Remove {
        /// Configuration key
        key: ConfigKey,
    },
}

/// Available configuration keys
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigKey {
    /// Gemini API key
    #[value(name = "gemini-key")]
    GeminiKey,

    /// Gemini model selection
    #[value(name = "gemini-model")]
    GeminiModel,

    /// Teacher mode password
    #[value(name = "admin-password")]
    AdminPassword,

    /// Character budget for study tips
    #[value(name = "tip-length")]
    TipLength,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_exercise_add() {
        let cli = Cli::try_parse_from([
            "eduquest",
            "exercise",
            "add",
            "--title",
            "Memory Game",
            "--url",
            "https://example.com",
            "--subject",
            "Art",
            "--difficulty",
            "hard",
            "--password",
            "teach",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Exercise(ExerciseArgs {
                command:
                    ExerciseCommand::Add {
                        difficulty, points, auth, ..
                    },
            })) => {
                assert_eq!(difficulty, Difficulty::Hard);
                assert_eq!(points, DEFAULT_EXERCISE_POINTS);
                assert_eq!(auth.password.as_deref(), Some("teach"));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_data_dir_is_global() {
        let cli = Cli::try_parse_from(["eduquest", "status", "--data-dir", "/tmp/edq"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/edq")));
    }
}
