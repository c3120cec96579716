//! The `mockexam stats` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{open_session, BankArgs};

pub fn execute(bank: BankArgs) -> Result<()> {
    let config = bank.resolve()?;
    let session = open_session(&config)?;

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Total", "Solved", "Unsolved"]);
    for topic in session.topic_stats()? {
        table.add_row(vec![
            Cell::new(&topic.topic),
            Cell::new(topic.total),
            Cell::new(topic.total - topic.unsolved),
            Cell::new(topic.unsolved),
        ]);
    }
    println!("{table}");

    let stats = session.stats()?;
    println!(
        "Total: {} questions, {} solved, {} unsolved ({:.1}% solved)",
        stats.total,
        stats.solved,
        stats.unsolved,
        stats.solved_ratio() * 100.0
    );
    if stats.is_exhausted() {
        println!("Every question has been solved; the next exam starts a new round.");
    }

    Ok(())
}
