//! The `mockexam validate` command.

use std::collections::BTreeMap;

use anyhow::Result;

use mockexam_core::parser::{validate_records, LatexDirectoryLoader};
use mockexam_core::traits::QuestionLoader;

use super::BankArgs;

pub fn execute(bank: BankArgs) -> Result<()> {
    let config = bank.resolve()?;
    let loader = LatexDirectoryLoader::new(&config.problems_dir);
    let records = loader.load()?;

    let mut per_topic: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *per_topic.entry(record.topic.as_str()).or_default() += 1;
    }

    println!(
        "Question bank: {} ({} questions, {} topics)",
        loader.dir().display(),
        records.len(),
        per_topic.len()
    );
    for (topic, count) in &per_topic {
        println!("  {topic}: {count}");
    }

    let warnings = validate_records(&records);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
