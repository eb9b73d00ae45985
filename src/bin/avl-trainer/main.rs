//! Interactive AVL tree trainer.
//!
//! Starts a prompt that reads chained commands, or runs the commands given as arguments
//! and exits.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use avl_trainer::config::Settings;
use avl_trainer::session::{Mode, Session};
use avl_trainer::Policy;

mod render;
mod repl;

#[derive(Parser)]
#[command(name = "avl-trainer")]
#[command(about = "Practice AVL tree insertions, deletions and rotations", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start in automatic or practice mode
    #[arg(long)]
    mode: Option<Mode>,

    /// Duplicate handling: strict or lenient
    #[arg(long)]
    policy: Option<Policy>,

    /// Do not show the tree after every command
    #[arg(long)]
    no_autoshow: bool,

    /// Do not show individual rebalancing rotations
    #[arg(long)]
    no_steps: bool,

    /// Commands to run instead of the prompt, e.g. `a 10 a 20 a 30 tree`
    commands: Vec<String>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(policy) = self.policy {
            settings.policy = policy;
        }
        if self.no_autoshow {
            settings.auto_show = false;
        }
        if self.no_steps {
            settings.show_steps = false;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, the tree to stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let settings = cli.settings()?;
    tracing::debug!(?settings, "starting");
    let mut session = Session::<i64>::new(settings);

    if cli.commands.is_empty() {
        repl::run(&mut session)?;
    } else {
        let mut stdout = io::stdout().lock();
        repl::execute_line(&mut session, &cli.commands.join(" "), &mut stdout)?;
    }
    Ok(())
}
