//! Trait seams to the collaborators around the core.

use anyhow::Result;

use crate::model::QuestionRecord;

// ---------------------------------------------------------------------------
// Question loader trait
// ---------------------------------------------------------------------------

/// Source of question records: LaTeX files, a database, an extraction step.
///
/// The core does not care where records come from, only that ids are stable
/// across loads of the same bank.
pub trait QuestionLoader {
    /// Short description of the source, used in log messages.
    fn describe(&self) -> String;

    /// Produce every question record of the bank.
    fn load(&self) -> Result<Vec<QuestionRecord>>;
}

/// Any closure returning records is a loader.
impl<F> QuestionLoader for F
where
    F: Fn() -> Result<Vec<QuestionRecord>>,
{
    fn describe(&self) -> String {
        "in-memory loader".to_string()
    }

    fn load(&self) -> Result<Vec<QuestionRecord>> {
        self()
    }
}
