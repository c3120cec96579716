//! The `mockexam reset` command.

use anyhow::Result;

use mockexam_core::progress::HistoryPolicy;

use super::{open_session, BankArgs};

pub fn execute(clear_history: bool, delete: bool, bank: BankArgs) -> Result<()> {
    let config = bank.resolve()?;
    let session = open_session(&config)?;

    if delete {
        let stats = session.discard_progress()?;
        println!(
            "Deleted {}: {} questions unsolved, history cleared.",
            config.progress_file.display(),
            stats.unsolved
        );
        return Ok(());
    }

    let policy = if clear_history {
        HistoryPolicy::Clear
    } else {
        HistoryPolicy::Preserve
    };
    let stats = session.reset_progress(policy)?;

    println!("Progress reset: {} questions unsolved.", stats.unsolved);
    if clear_history {
        println!("Session history cleared.");
    }
    Ok(())
}
