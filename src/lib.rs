//! Browse legislative bills from a CSV dataset, read their summaries, and
//! generate missing ones through a chat-completion API.
//!
//! Access is gated by a username/password check against a secrets file.
//! Generated summaries are written back into the dataset file.

pub mod app;
pub mod auth;
pub mod config;
pub mod dataset;
pub mod error;
pub mod secrets;
pub mod summarize;
pub mod ui;
pub mod workflow;

pub use app::{App, BillListing, Frontend, LoginForm};
pub use auth::{LoginOutcome, Session, SessionGate};
pub use config::{Config, ConfigBuilder};
pub use dataset::{BillRecord, BillStore, CsvRepository, Dataset, DatasetRepository, NOT_YET_SUMMARIZED};
pub use error::{Error, Result};
pub use secrets::{ApiKey, CredentialStore, Secrets};
pub use summarize::{OpenAiSummarizer, SummarizeError, Summarizer};
pub use ui::TerminalFrontend;
pub use workflow::{BillView, SummaryOutcome, Workflow};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::app::{App, Frontend};
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::dataset::{BillRecord, BillStore, CsvRepository, DatasetRepository};
    pub use crate::error::{Error, Result};
    pub use crate::secrets::Secrets;
    pub use crate::summarize::{OpenAiSummarizer, Summarizer};
    pub use crate::ui::TerminalFrontend;
}
