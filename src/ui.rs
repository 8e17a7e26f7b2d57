use crate::app::{BillListing, Frontend, LoginForm};
use crate::error::{Error, Result};
use crate::workflow::render_summary;
use inquire::error::InquireResult;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use terminal_size::{terminal_size, Width};

const DEFAULT_WIDTH: usize = 80;
const PAGE_SIZE: usize = 15;

/// Terminal frontend: prompts via inquire, output on stdout, status on stderr
#[derive(Debug, Default)]
pub struct TerminalFrontend {
    width: Option<usize>,
}

impl TerminalFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap summaries at a fixed width instead of the terminal's
    pub fn with_width(width: usize) -> Self {
        Self { width: Some(width) }
    }

    fn width(&self) -> usize {
        self.width.unwrap_or_else(|| {
            terminal_size()
                .map(|(Width(w), _)| w as usize)
                .unwrap_or(DEFAULT_WIDTH)
        })
    }
}

/// Cancel and interrupt become `None`; anything else is an error
fn cancellable<T>(result: InquireResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(Error::Prompt(e.to_string())),
    }
}

impl Frontend for TerminalFrontend {
    fn login(&mut self) -> Result<Option<LoginForm>> {
        let Some(username) = cancellable(Text::new("Username").prompt())? else {
            return Ok(None);
        };
        let password = Password::new("Password")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt();
        let Some(password) = cancellable(password)? else {
            return Ok(None);
        };
        Ok(Some(LoginForm { username, password }))
    }

    fn title(&mut self, title: &str) {
        println!("\n{}\n{}\n", title, "=".repeat(title.chars().count()));
    }

    fn select_bill(&mut self, prompt: &str, bill_ids: &[String]) -> Result<Option<String>> {
        cancellable(
            Select::new(prompt, bill_ids.to_vec())
                .with_page_size(PAGE_SIZE)
                .prompt(),
        )
    }

    fn header(&mut self, bill_id: &str) {
        println!("\n## {}\n", bill_id);
    }

    fn confirm_summarize(&mut self, label: &str) -> Result<bool> {
        let answer = Confirm::new(&format!("{}?", label))
            .with_default(true)
            .prompt();
        Ok(cancellable(answer)?.unwrap_or(false))
    }

    fn progress(&mut self, message: &str) {
        eprintln!("⏳ {}", message);
    }

    fn show_summary(&mut self, text: &str) {
        let width = self.width();
        let rule = "─".repeat(width.min(DEFAULT_WIDTH));
        println!("{}", rule);
        println!("{}", render_summary(text, width));
        println!("{}", rule);
    }

    fn list_bills(&mut self, bills: &[BillListing]) {
        let id_width = bills
            .iter()
            .map(|b| b.bill_id.chars().count())
            .max()
            .unwrap_or(0);
        for bill in bills {
            let status = if bill.summarized {
                "summarized"
            } else {
                "not yet summarized"
            };
            println!("{:<width$}  {}", bill.bill_id, status, width = id_width);
        }
    }

    fn notice(&mut self, message: &str) {
        eprintln!("✓ {}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("✗ {}", message);
    }
}
