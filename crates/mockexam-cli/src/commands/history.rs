//! The `mockexam history` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{open_session, BankArgs};

pub fn execute(limit: usize, bank: BankArgs) -> Result<()> {
    let config = bank.resolve()?;
    let session = open_session(&config)?;
    let history = session.history()?;

    if history.is_empty() {
        println!("No exams generated yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Generated", "Session", "Questions", "Reset"]);
    for entry in history.iter().rev().take(limit) {
        let ids: Vec<&str> = entry.question_ids.iter().map(|id| id.as_str()).collect();
        table.add_row(vec![
            Cell::new(entry.generated_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(entry.id),
            Cell::new(ids.join(", ")),
            Cell::new(if entry.reset_performed { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
    println!("{} session(s) recorded.", history.len());

    Ok(())
}
