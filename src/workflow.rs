use crate::dataset::{BillStore, DatasetRepository};
use crate::error::{Error, Result};
use crate::summarize::Summarizer;
use log::{info, warn};

/// What the user sees after selecting a bill
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillView {
    /// Stored summary, shown verbatim
    Summarized { bill_id: String, summary: String },
    /// No summary yet; the user may trigger one
    Unsummarized { bill_id: String },
}

impl BillView {
    pub fn bill_id(&self) -> &str {
        match self {
            BillView::Summarized { bill_id, .. } | BillView::Unsummarized { bill_id } => bill_id,
        }
    }
}

/// Result of a successful summarize action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub bill_id: String,
    pub summary: String,
    /// False when the summary was produced but the dataset rewrite failed
    pub persisted: bool,
    /// The rewrite error, if any
    pub save_error: Option<String>,
}

/// Ties the dataset to the summarizer for one session
pub struct Workflow<'s, R, S> {
    store: &'s mut BillStore<R>,
    summarizer: S,
}

impl<'s, R: DatasetRepository, S: Summarizer> Workflow<'s, R, S> {
    pub fn new(store: &'s mut BillStore<R>, summarizer: S) -> Self {
        Self { store, summarizer }
    }

    pub fn bill_ids(&self) -> Vec<String> {
        self.store.bill_ids().into_iter().map(str::to_string).collect()
    }

    pub fn store(&self) -> &BillStore<R> {
        &*self.store
    }

    /// Look up a bill for display. Never calls the summarizer.
    pub fn view(&self, bill_id: &str) -> Result<BillView> {
        let record = self
            .store
            .find(bill_id)
            .ok_or_else(|| Error::BillNotFound(bill_id.to_string()))?;

        if record.is_summarized() {
            Ok(BillView::Summarized {
                bill_id: record.bill_id.clone(),
                summary: record.summary.clone(),
            })
        } else {
            Ok(BillView::Unsummarized {
                bill_id: record.bill_id.clone(),
            })
        }
    }

    /// Summarize a bill and write the summary back to the dataset.
    ///
    /// A summarizer failure leaves the record unsummarized and is returned
    /// as an error. A write failure after a successful summary is reported
    /// in the outcome instead, so the caller can still show the text.
    pub fn summarize(&mut self, bill_id: &str) -> Result<SummaryOutcome> {
        let record = self
            .store
            .find(bill_id)
            .ok_or_else(|| Error::BillNotFound(bill_id.to_string()))?;
        let bill_text = record.bill_text.clone();

        let summary = self.summarizer.summarize(&bill_text).map_err(|e| {
            warn!("summarizing {} failed: {}", bill_id, e);
            Error::Summarize(e)
        })?;

        match self.store.update_summary(bill_id, summary.clone()) {
            Ok(()) => {
                info!("summarized {}", bill_id);
                Ok(SummaryOutcome {
                    bill_id: bill_id.to_string(),
                    summary,
                    persisted: true,
                    save_error: None,
                })
            }
            Err(e) => {
                warn!("summary for {} was not saved: {}", bill_id, e);
                Ok(SummaryOutcome {
                    bill_id: bill_id.to_string(),
                    summary,
                    persisted: false,
                    save_error: Some(e.to_string()),
                })
            }
        }
    }
}

/// Format text the way a pre-wrap block shows it: existing line breaks are
/// kept, and any line wider than `width` is broken at word boundaries.
/// Words longer than `width` are split.
pub fn render_summary(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = Vec::new();

    for line in text.lines() {
        if line.chars().count() <= width {
            out.push(line.trim_end().to_string());
            continue;
        }

        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        let indent = if indent.chars().count() >= width {
            String::new()
        } else {
            indent
        };
        let mut current = indent.clone();

        for word in line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let used = current.chars().count();
                let at_line_start = used == indent.chars().count();
                let needed = if at_line_start { word.len() } else { word.len() + 1 };

                if used + needed <= width {
                    if !at_line_start {
                        current.push(' ');
                    }
                    current.extend(word.iter());
                    break;
                }

                if at_line_start {
                    // Word alone is too wide: split it
                    let room = width - used;
                    let rest = word.split_off(room);
                    current.extend(word.iter());
                    out.push(std::mem::replace(&mut current, indent.clone()));
                    word = rest;
                } else {
                    out.push(std::mem::replace(&mut current, indent.clone()));
                }
            }
        }

        if current.chars().count() > indent.chars().count() {
            out.push(current);
        } else if line.trim().is_empty() {
            out.push(String::new());
        }
    }

    out.join("\n")
}
