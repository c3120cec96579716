//! The `mockexam generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mockexam_core::model::ExamRequest;
use mockexam_core::paper::ExamPaper;

use super::{open_session, BankArgs};

pub fn execute(
    count: Option<usize>,
    one_per_topic: bool,
    seed: Option<u64>,
    shuffle: bool,
    output: Option<PathBuf>,
    format: String,
    bank: BankArgs,
) -> Result<()> {
    let config = bank.resolve()?;

    let count = count.unwrap_or(config.default_questions);
    config.check_count(count)?;
    if !matches!(format.as_str(), "text" | "json") {
        anyhow::bail!("unknown format '{format}', expected text or json");
    }

    let mut rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let request = ExamRequest::new(count).one_per_topic(one_per_topic || config.one_per_topic);

    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory: {}", output_dir.display())
    })?;

    let session = open_session(&config)?;
    let mut paper = match session.request_exam(&request, &mut rng) {
        Ok(paper) => paper,
        Err(e) if e.is_user_facing() => anyhow::bail!("{e}; try a smaller --count"),
        Err(e) => return Err(e.into()),
    };
    if shuffle {
        paper = paper.shuffled(&mut rng);
    }

    let path = output_dir.join(format!(
        "exam-{}.json",
        paper.generated_at.format("%Y%m%d-%H%M%S-%3f")
    ));
    if let Err(e) = paper.save_json(&path) {
        // Already committed: hand the paper over on stdout.
        let json = serde_json::to_string_pretty(&paper).context("failed to serialize exam paper")?;
        println!("{json}");
        return Err(e.context(format!(
            "exam {} was recorded but could not be written to {}; the paper was printed to stdout",
            paper.id,
            path.display()
        )));
    }

    if format == "json" {
        let json = serde_json::to_string_pretty(&paper).context("failed to serialize exam paper")?;
        println!("{json}");
    } else {
        print_summary(&paper);
        let stats = session.stats()?;
        println!(
            "Pool: {} solved, {} unsolved of {} questions",
            stats.solved, stats.unsolved, stats.total
        );
        println!("Exam written to {}", path.display());
    }

    Ok(())
}

fn print_summary(paper: &ExamPaper) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Topic", "Problem"]);

    for (i, question) in paper.questions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&question.id),
            Cell::new(&question.topic),
            Cell::new(preview(&question.content, 60)),
        ]);
    }

    if paper.reset_performed {
        println!("All questions had been solved; progress was reset.");
    }
    println!("{table}");
}

/// First line of `text`, cut to `max` characters.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
