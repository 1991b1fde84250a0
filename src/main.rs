//! eduquest - Gamified study tracker
//!
//! A terminal application for collecting points on study exercises.
//! Run without arguments to launch the TUI, or use subcommands for CLI mode.
//!
//! Available as the `eduquest` and `edq` commands.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use eduquest::cli::commands::{Cli, Commands};
use eduquest::cli::{catalog, config, learner};
use eduquest::core::config::Config;
use eduquest::error::Result;
use eduquest::tui::App;

/// Log file written while the TUI owns the terminal
const TUI_LOG_FILE: &str = "eduquest.log";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize logging. The TUI logs to a file in the data directory so log
/// lines never land on the alternate screen.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if cli.command.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    match tui_log_path(cli.data_dir.clone()).and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(Into::into)
    }) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

fn tui_log_path(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = Config::load()?.data_dir(data_dir)?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(TUI_LOG_FILE))
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir;

    match cli.command {
        // No subcommand - launch TUI mode
        None => {
            let mut app = App::open(data_dir)?;
            app.run().await
        }

        Some(Commands::Register { name }) => learner::handle_register(data_dir, name),
        Some(Commands::Status) => learner::handle_status(data_dir),
        Some(Commands::Subjects) => learner::handle_subjects(data_dir),
        Some(Commands::Exercises { subject }) => learner::handle_exercises(data_dir, subject),
        Some(Commands::Complete { id }) => learner::handle_complete(data_dir, id),
        Some(Commands::Open { id }) => learner::handle_open(data_dir, id),
        Some(Commands::Tip { subject }) => learner::handle_tip(data_dir, subject).await,

        Some(Commands::Subject(args)) => catalog::handle_subject(data_dir, args.command),
        Some(Commands::Exercise(args)) => catalog::handle_exercise(data_dir, args.command),
        Some(Commands::Config(args)) => config::handle_config(args.command),
    }
}
