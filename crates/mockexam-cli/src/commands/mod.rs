pub mod generate;
pub mod history;
pub mod init;
pub mod reset;
pub mod stats;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mockexam_core::parser::LatexDirectoryLoader;
use mockexam_core::progress::JsonProgressStore;
use mockexam_core::session::SessionController;
use mockexam_core::time::Clock;
use mockexam_core::traits::QuestionLoader;

use crate::config::{load_config_from, MockexamConfig};

/// Where the question bank and its progress live.
#[derive(Debug, Clone, Args)]
pub struct BankArgs {
    /// Directory of .tex question files
    #[arg(long)]
    pub problems: Option<PathBuf>,

    /// Progress file
    #[arg(long)]
    pub progress: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl BankArgs {
    /// Load the config file and apply the command-line overrides on top.
    pub fn resolve(&self) -> Result<MockexamConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(problems) = &self.problems {
            config.problems_dir = problems.clone();
        }
        if let Some(progress) = &self.progress {
            config.progress_file = progress.clone();
        }
        Ok(config)
    }
}

/// Load the bank and open a session over the persisted progress.
pub fn open_session(config: &MockexamConfig) -> Result<SessionController<JsonProgressStore>> {
    let loader = LatexDirectoryLoader::new(&config.problems_dir);
    let records = loader
        .load()
        .with_context(|| format!("failed to load {}", loader.describe()))?;
    let session = SessionController::open(
        records,
        JsonProgressStore::new(&config.progress_file),
        config.session_config(),
        Clock::System,
    )?;
    Ok(session)
}
