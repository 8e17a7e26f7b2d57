//! Presentation flow: login gate, bill selector, summarize trigger.
//!
//! The flow is written against the [`Frontend`] trait so the same sequence
//! drives the terminal UI and scripted sessions in tests.

use crate::auth::{Session, SessionGate};
use crate::dataset::{BillStore, DatasetRepository};
use crate::error::{Error, Result};
use crate::secrets::CredentialStore;
use crate::summarize::Summarizer;
use crate::workflow::{BillView, SummaryOutcome, Workflow};
use log::debug;

pub const TITLE: &str = "Bill Summaries";
pub const SELECT_PROMPT: &str = "Select a House bill from 2023-24";
pub const SUMMARIZE_LABEL: &str = "Summarize this bill";
pub const SUMMARIZING_MESSAGE: &str = "Summarizing...";
pub const SAVED_MESSAGE: &str = "Saved data";
pub const LOGIN_FAILED_MESSAGE: &str = "😕 User not known or password incorrect";

/// Values entered on the login form
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// One row of the bill listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillListing {
    pub bill_id: String,
    pub summarized: bool,
}

/// The user-facing surface. Methods returning `Option` yield `None` when the
/// user cancels.
pub trait Frontend {
    fn login(&mut self) -> Result<Option<LoginForm>>;
    fn title(&mut self, title: &str);
    fn select_bill(&mut self, prompt: &str, bill_ids: &[String]) -> Result<Option<String>>;
    fn header(&mut self, bill_id: &str);
    fn confirm_summarize(&mut self, label: &str) -> Result<bool>;
    fn progress(&mut self, message: &str);
    fn show_summary(&mut self, text: &str);
    fn list_bills(&mut self, bills: &[BillListing]);
    fn notice(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

pub struct App<'a, F> {
    credentials: &'a CredentialStore,
    frontend: F,
}

impl<'a, F: Frontend> App<'a, F> {
    pub fn new(credentials: &'a CredentialStore, frontend: F) -> Self {
        Self {
            credentials,
            frontend,
        }
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn into_frontend(self) -> F {
        self.frontend
    }

    /// Show the login form until the gate passes. Returns false if the user
    /// gives up.
    pub fn login(&mut self, session: &mut Session) -> Result<bool> {
        let gate = SessionGate::new(self.credentials);
        while !session.is_authenticated() {
            if session.last_attempt_failed() {
                self.frontend.error(LOGIN_FAILED_MESSAGE);
            }
            let Some(form) = self.frontend.login()? else {
                debug!("login cancelled");
                return Ok(false);
            };
            session.submit(form.username, form.password);
            gate.check_pending(session);
        }
        Ok(true)
    }

    /// Interactive session: login, then select and summarize bills until
    /// the user leaves the selector.
    pub fn browse<R, S>(&mut self, repo: R, summarizer: S) -> Result<()>
    where
        R: DatasetRepository,
        S: Summarizer,
    {
        self.with_session(|app| {
            let mut store = BillStore::load(repo)?;
            let mut workflow = Workflow::new(&mut store, summarizer);
            app.frontend.title(TITLE);

            let bill_ids = workflow.bill_ids();
            if bill_ids.is_empty() {
                app.frontend.notice("The dataset has no bills");
                return Ok(());
            }

            while let Some(bill_id) = app.frontend.select_bill(SELECT_PROMPT, &bill_ids)? {
                app.frontend.header(&bill_id);
                match workflow.view(&bill_id)? {
                    BillView::Summarized { summary, .. } => app.frontend.show_summary(&summary),
                    BillView::Unsummarized { .. } => {
                        if !app.frontend.confirm_summarize(SUMMARIZE_LABEL)? {
                            continue;
                        }
                        match app.run_summary(&mut workflow, &bill_id) {
                            Ok(_) => {}
                            Err(Error::Summarize(e)) => {
                                app.frontend.error(&format!("Summarization failed: {}", e));
                            }
                            Err(e) => return Err(e),
                        }
                    }
                }
            }
            Ok(())
        })
    }

    /// Print every bill id with its summary status
    pub fn list<R: DatasetRepository>(&mut self, repo: R) -> Result<()> {
        self.with_session(|app| {
            let store = BillStore::load(repo)?;
            let listing: Vec<BillListing> = store
                .dataset()
                .records()
                .iter()
                .map(|r| BillListing {
                    bill_id: r.bill_id.clone(),
                    summarized: r.is_summarized(),
                })
                .collect();
            app.frontend.list_bills(&listing);
            Ok(())
        })
    }

    /// Show one bill's stored summary
    pub fn show<R: DatasetRepository>(&mut self, repo: R, bill_id: &str) -> Result<()> {
        self.with_session(|app| {
            let store = BillStore::load(repo)?;
            let record = store
                .find(bill_id)
                .ok_or_else(|| Error::BillNotFound(bill_id.to_string()))?;
            app.frontend.header(&record.bill_id);
            if record.is_summarized() {
                app.frontend.show_summary(&record.summary);
            } else {
                app.frontend.notice(&format!(
                    "{} has not been summarized yet (run `billsum summarize \"{}\"`)",
                    record.bill_id, record.bill_id
                ));
            }
            Ok(())
        })
    }

    /// Summarize one bill without prompting. Bills that already have a
    /// summary are shown as stored.
    pub fn summarize<R, S>(&mut self, repo: R, summarizer: S, bill_id: &str) -> Result<()>
    where
        R: DatasetRepository,
        S: Summarizer,
    {
        self.with_session(|app| {
            let mut store = BillStore::load(repo)?;
            let mut workflow = Workflow::new(&mut store, summarizer);
            app.frontend.header(bill_id);
            match workflow.view(bill_id)? {
                BillView::Summarized { summary, .. } => app.frontend.show_summary(&summary),
                BillView::Unsummarized { .. } => {
                    let outcome = app.run_summary(&mut workflow, bill_id)?;
                    if let Some(reason) = outcome.save_error {
                        return Err(Error::NotSaved {
                            bill_id: outcome.bill_id,
                            reason,
                        });
                    }
                }
            }
            Ok(())
        })
    }

    /// Run `body` inside an authenticated session. Nothing in `body` runs
    /// unless the login gate passes.
    fn with_session(&mut self, body: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let mut session = Session::new();
        if !self.login(&mut session)? {
            session.end();
            return Ok(());
        }
        let result = body(self);
        session.end();
        result
    }

    fn run_summary<R, S>(
        &mut self,
        workflow: &mut Workflow<'_, R, S>,
        bill_id: &str,
    ) -> Result<SummaryOutcome>
    where
        R: DatasetRepository,
        S: Summarizer,
    {
        self.frontend.progress(SUMMARIZING_MESSAGE);
        let outcome = workflow.summarize(bill_id)?;
        match &outcome.save_error {
            None => self.frontend.notice(SAVED_MESSAGE),
            Some(err) => self
                .frontend
                .error(&format!("Summary could not be saved: {}", err)),
        }
        self.frontend.show_summary(&outcome.summary);
        Ok(outcome)
    }
}
