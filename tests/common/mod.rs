#![allow(dead_code)]

use billsum::app::{BillListing, Frontend, LoginForm};
use billsum::dataset::{CsvRepository, Dataset, DatasetRepository};
use billsum::secrets::CredentialStore;
use billsum::summarize::{SummarizeError, Summarizer};
use std::cell::Cell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use tempfile::TempDir;

pub const DATASET: &str = "Bill ID,Bill Text,Summary\n\
HB 1001,AN ACT relating to school funding,Not yet summarized\n\
HB 1002,AN ACT relating to highways,Already summarized text\n";

/// Scratch directory holding a bill dataset
pub struct TestEnv {
    _tmp: TempDir,
    pub data: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_dataset(DATASET)
    }

    pub fn with_dataset(contents: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let data = tmp.path().join("house_df.csv");
        fs::write(&data, contents).expect("write dataset");
        Self { _tmp: tmp, data }
    }

    pub fn repo(&self) -> CsvRepository {
        CsvRepository::new(&self.data)
    }

    /// Summary as stored on disk right now
    pub fn stored_summary(&self, bill_id: &str) -> String {
        self.repo()
            .load()
            .expect("reload dataset")
            .find(bill_id)
            .expect("bill present")
            .summary
            .clone()
    }
}

pub fn credentials() -> CredentialStore {
    CredentialStore::from_pairs([("alice", "wonderland")])
}

/// Summarizer returning a canned result and counting calls
pub struct StubSummarizer {
    result: Result<String, SummarizeError>,
    pub calls: Cell<usize>,
}

impl StubSummarizer {
    pub fn ok(summary: &str) -> Self {
        Self {
            result: Ok(summary.to_string()),
            calls: Cell::new(0),
        }
    }

    pub fn failing(error: SummarizeError) -> Self {
        Self {
            result: Err(error),
            calls: Cell::new(0),
        }
    }
}

impl Summarizer for StubSummarizer {
    fn summarize(&self, _bill_text: &str) -> Result<String, SummarizeError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}

/// CSV repository whose writes always fail
pub struct ReadOnlyRepository(pub CsvRepository);

impl DatasetRepository for ReadOnlyRepository {
    fn load(&self) -> billsum::Result<Dataset> {
        self.0.load()
    }

    fn save(&self, _dataset: &Dataset) -> billsum::Result<()> {
        Err(billsum::Error::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "dataset is read-only",
        )))
    }
}

/// Frontend fed from queues of canned answers, recording what it was shown
#[derive(Default)]
pub struct ScriptedFrontend {
    logins: VecDeque<(String, String)>,
    selections: VecDeque<String>,
    confirms: VecDeque<bool>,
    pub events: Vec<String>,
}

impl ScriptedFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_as(mut self, username: &str, password: &str) -> Self {
        self.logins
            .push_back((username.to_string(), password.to_string()));
        self
    }

    pub fn select(mut self, bill_id: &str) -> Self {
        self.selections.push_back(bill_id.to_string());
        self
    }

    pub fn confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn transcript(&self) -> String {
        self.events.join("\n")
    }

    pub fn saw(&self, prefix: &str) -> bool {
        self.events.iter().any(|e| e.starts_with(prefix))
    }
}

impl Frontend for ScriptedFrontend {
    fn login(&mut self) -> billsum::Result<Option<LoginForm>> {
        self.events.push("login form".to_string());
        Ok(self
            .logins
            .pop_front()
            .map(|(username, password)| LoginForm { username, password }))
    }

    fn title(&mut self, title: &str) {
        self.events.push(format!("title: {}", title));
    }

    fn select_bill(
        &mut self,
        prompt: &str,
        _bill_ids: &[String],
    ) -> billsum::Result<Option<String>> {
        let choice = self.selections.pop_front();
        self.events.push(format!(
            "select: {} -> {}",
            prompt,
            choice.as_deref().unwrap_or("(cancel)")
        ));
        Ok(choice)
    }

    fn header(&mut self, bill_id: &str) {
        self.events.push(format!("header: {}", bill_id));
    }

    fn confirm_summarize(&mut self, label: &str) -> billsum::Result<bool> {
        let answer = self.confirms.pop_front().unwrap_or(false);
        self.events.push(format!(
            "confirm: {} -> {}",
            label,
            if answer { "yes" } else { "no" }
        ));
        Ok(answer)
    }

    fn progress(&mut self, message: &str) {
        self.events.push(format!("progress: {}", message));
    }

    fn show_summary(&mut self, text: &str) {
        self.events.push(format!("summary: {}", text));
    }

    fn list_bills(&mut self, bills: &[BillListing]) {
        for bill in bills {
            self.events
                .push(format!("bill: {} summarized={}", bill.bill_id, bill.summarized));
        }
    }

    fn notice(&mut self, message: &str) {
        self.events.push(format!("notice: {}", message));
    }

    fn error(&mut self, message: &str) {
        self.events.push(format!("error: {}", message));
    }
}
