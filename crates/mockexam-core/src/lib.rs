//! mockexam-core: question pool, exam selection, and progress persistence.
//!
//! This crate holds the question store, the topic-aware selector, the session
//! controller that ties a generation cycle together, and the progress store it
//! persists through. Rendering the selected questions is left to callers.

pub mod error;
pub mod model;
pub mod paper;
pub mod parser;
pub mod progress;
pub mod selector;
pub mod session;
pub mod store;
pub mod time;
pub mod traits;

pub use error::{ProgressError, SelectError, SessionError, StoreError};
pub use model::{ExamRequest, ExamSelection, PoolStats, Question, QuestionId, QuestionRecord};
pub use paper::ExamPaper;
pub use progress::{HistoryPolicy, JsonProgressStore, MemoryProgressStore, ProgressStore};
pub use session::{SessionConfig, SessionController};
pub use store::QuestionStore;
