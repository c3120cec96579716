//! LaTeX question bank loader.
//!
//! Each `.tex` file in a bank directory is one topic, named after the file
//! stem. Every `\begin{problem} ... \end{problem}` block is one question; a
//! `\begin{solution} ... \end{solution}` block that follows it (before the next
//! problem) is attached as its solution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{QuestionId, QuestionRecord};
use crate::traits::QuestionLoader;

const PROBLEM_BEGIN: &str = r"\begin{problem}";
const PROBLEM_END: &str = r"\end{problem}";
const SOLUTION_BEGIN: &str = r"\begin{solution}";
const SOLUTION_END: &str = r"\end{solution}";

/// Extract the questions of one LaTeX source.
///
/// Ids are `<topic>_<n>` with `n` the 1-based position of the problem block.
pub fn parse_latex_questions(text: &str, topic: &str) -> Vec<QuestionRecord> {
    let mut records = Vec::new();
    let mut cursor = 0;

    while let Some(start) = text[cursor..].find(PROBLEM_BEGIN) {
        let body_start = cursor + start + PROBLEM_BEGIN.len();
        let Some(body_len) = text[body_start..].find(PROBLEM_END) else {
            tracing::warn!("unterminated problem block in topic '{topic}', ignoring the rest");
            break;
        };
        let body_end = body_start + body_len;
        let problem = text[body_start..body_end].trim();
        cursor = body_end + PROBLEM_END.len();

        let next_problem = text[cursor..]
            .find(PROBLEM_BEGIN)
            .map_or(text.len(), |offset| cursor + offset);
        let solution = extract_block(&text[cursor..next_problem], SOLUTION_BEGIN, SOLUTION_END)
            .unwrap_or_default();

        records.push(
            QuestionRecord::new(
                QuestionId::from_source(topic, records.len() + 1),
                topic,
                problem,
            )
            .with_solution(solution),
        );
    }

    records
}

fn extract_block<'a>(text: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    let start = text.find(begin)? + begin.len();
    let len = text[start..].find(end)?;
    Some(text[start..start + len].trim())
}

/// Parse a single `.tex` file; the topic is the file stem.
pub fn parse_latex_file(path: &Path) -> Result<Vec<QuestionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read LaTeX file: {}", path.display()))?;
    let topic = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("file name is not valid UTF-8: {}", path.display()))?;
    Ok(parse_latex_questions(&content, topic))
}

/// Loads every `.tex` file directly inside a directory.
#[derive(Debug, Clone)]
pub struct LatexDirectoryLoader {
    dir: PathBuf,
}

impl LatexDirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn tex_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            anyhow::bail!("not a directory: {}", self.dir.display());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read directory: {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "tex") {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            anyhow::bail!("no .tex files found in {}", self.dir.display());
        }
        Ok(files)
    }
}

impl QuestionLoader for LatexDirectoryLoader {
    fn describe(&self) -> String {
        format!("LaTeX bank at {}", self.dir.display())
    }

    fn load(&self) -> Result<Vec<QuestionRecord>> {
        let files = self.tex_files()?;
        let mut records = Vec::new();

        for path in &files {
            match parse_latex_file(path) {
                Ok(found) => {
                    if found.is_empty() {
                        tracing::warn!("no problem blocks in {}", path.display());
                    }
                    records.extend(found);
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }

        tracing::info!(
            "loaded {} questions from {} LaTeX files",
            records.len(),
            files.len()
        );
        Ok(records)
    }
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

/// Check loaded records for problems that would make the pool reject them or
/// produce useless exams.
pub fn validate_records(records: &[QuestionRecord]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if records.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question bank is empty".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for record in records {
        if !seen_ids.insert(&record.id) {
            warnings.push(ValidationWarning {
                question_id: Some(record.id.clone()),
                message: format!("duplicate question ID: {}", record.id),
            });
        }
    }

    for record in records {
        if record.topic.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(record.id.clone()),
                message: "topic is empty".into(),
            });
        }
    }

    for record in records {
        if record.content.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(record.id.clone()),
                message: "problem text is empty".into(),
            });
        }
    }

    warnings
}
