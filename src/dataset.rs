use crate::error::{Error, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Summary cell value for a bill that has not been summarized yet
pub const NOT_YET_SUMMARIZED: &str = "Not yet summarized";

pub const BILL_ID_COLUMN: &str = "Bill ID";
pub const BILL_TEXT_COLUMN: &str = "Bill Text";
pub const SUMMARY_COLUMN: &str = "Summary";

/// One row of the bill dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRecord {
    pub bill_id: String,
    pub bill_text: String,
    pub summary: String,
    /// Values of any further columns, in file order
    pub extra: Vec<String>,
}

impl BillRecord {
    pub fn new(
        bill_id: impl Into<String>,
        bill_text: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            bill_id: bill_id.into(),
            bill_text: bill_text.into(),
            summary: summary.into(),
            extra: Vec::new(),
        }
    }

    /// A bill that still needs summarizing
    pub fn unsummarized(bill_id: impl Into<String>, bill_text: impl Into<String>) -> Self {
        Self::new(bill_id, bill_text, NOT_YET_SUMMARIZED)
    }

    /// False for the sentinel value and for a blank cell
    pub fn is_summarized(&self) -> bool {
        let summary = self.summary.trim();
        !summary.is_empty() && summary != NOT_YET_SUMMARIZED
    }
}

/// Positions of the required columns within the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    bill_id: usize,
    bill_text: usize,
    summary: usize,
}

impl ColumnLayout {
    fn standard() -> Self {
        Self {
            bill_id: 0,
            bill_text: 1,
            summary: 2,
        }
    }

    fn from_headers(headers: &[String]) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::Dataset(format!("missing required column '{}'", name)))
        };
        Ok(Self {
            bill_id: position(BILL_ID_COLUMN)?,
            bill_text: position(BILL_TEXT_COLUMN)?,
            summary: position(SUMMARY_COLUMN)?,
        })
    }

    fn is_known(&self, idx: usize) -> bool {
        idx == self.bill_id || idx == self.bill_text || idx == self.summary
    }
}

/// Ordered collection of bill records with unique ids
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    layout: ColumnLayout,
    records: Vec<BillRecord>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset with the standard three columns
    pub fn new(records: Vec<BillRecord>) -> Result<Self> {
        let headers = vec![
            BILL_ID_COLUMN.to_string(),
            BILL_TEXT_COLUMN.to_string(),
            SUMMARY_COLUMN.to_string(),
        ];
        Self::assemble(headers, ColumnLayout::standard(), records)
    }

    /// Build a dataset from a header row and raw rows
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let layout = ColumnLayout::from_headers(&headers)?;

        let mut records = Vec::with_capacity(rows.len());
        for (line, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(Error::Dataset(format!(
                    "row {} has {} fields, expected {}",
                    line + 1,
                    row.len(),
                    headers.len()
                )));
            }

            let mut bill_id = String::new();
            let mut bill_text = String::new();
            let mut summary = String::new();
            let mut extra = Vec::new();
            for (idx, value) in row.into_iter().enumerate() {
                if idx == layout.bill_id {
                    bill_id = value;
                } else if idx == layout.bill_text {
                    bill_text = value;
                } else if idx == layout.summary {
                    summary = value;
                } else {
                    extra.push(value);
                }
            }
            records.push(BillRecord {
                bill_id,
                bill_text,
                summary,
                extra,
            });
        }

        Self::assemble(headers, layout, records)
    }

    fn assemble(
        headers: Vec<String>,
        layout: ColumnLayout,
        records: Vec<BillRecord>,
    ) -> Result<Self> {
        let extra_columns = headers.len() - 3;
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if record.extra.len() != extra_columns {
                return Err(Error::Dataset(format!(
                    "bill {} has {} extra fields, expected {}",
                    record.bill_id,
                    record.extra.len(),
                    extra_columns
                )));
            }
            if index.insert(record.bill_id.clone(), pos).is_some() {
                return Err(Error::DuplicateBillId(record.bill_id.clone()));
            }
        }

        Ok(Self {
            headers,
            layout,
            records,
            index,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[BillRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bill ids in file order
    pub fn bill_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.bill_id.as_str()).collect()
    }

    /// Exact-match lookup by bill id
    pub fn find(&self, bill_id: &str) -> Option<&BillRecord> {
        self.index.get(bill_id).map(|&pos| &self.records[pos])
    }

    fn find_mut(&mut self, bill_id: &str) -> Option<&mut BillRecord> {
        match self.index.get(bill_id) {
            Some(&pos) => self.records.get_mut(pos),
            None => None,
        }
    }

    /// A record laid out as a row matching [`Dataset::headers`]
    fn to_row(&self, record: &BillRecord) -> Vec<String> {
        let mut extra = record.extra.iter();
        (0..self.headers.len())
            .map(|idx| {
                if idx == self.layout.bill_id {
                    record.bill_id.clone()
                } else if idx == self.layout.bill_text {
                    record.bill_text.clone()
                } else if idx == self.layout.summary {
                    record.summary.clone()
                } else {
                    debug_assert!(!self.layout.is_known(idx));
                    extra.next().cloned().unwrap_or_default()
                }
            })
            .collect()
    }

    /// All records as rows, in file order
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(|r| self.to_row(r)).collect()
    }
}

/// Backing storage for the bill dataset
pub trait DatasetRepository {
    /// Read every record. Missing or malformed storage is an error.
    fn load(&self) -> Result<Dataset>;

    /// Replace the stored dataset with `dataset`
    fn save(&self, dataset: &Dataset) -> Result<()>;
}

/// Dataset stored as a CSV file with `Bill ID, Bill Text, Summary` columns
#[derive(Debug, Clone)]
pub struct CsvRepository {
    path: PathBuf,
}

impl CsvRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetRepository for CsvRepository {
    fn load(&self) -> Result<Dataset> {
        if !self.path.is_file() {
            return Err(Error::Dataset(format!(
                "dataset file not found: {}",
                self.path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let dataset = Dataset::from_rows(headers, rows)?;
        info!(
            "loaded {} bills from {}",
            dataset.len(),
            self.path.display()
        );
        Ok(dataset)
    }

    /// Write to a temporary file beside the target, then rename it over the
    /// target, so a failed write leaves the previous file intact.
    fn save(&self, dataset: &Dataset) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir)?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            tmp.as_file().set_permissions(metadata.permissions())?;
        }

        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(dataset.headers())?;
            for row in dataset.rows() {
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!("wrote {} bills to {}", dataset.len(), self.path.display());
        Ok(())
    }
}

/// A loaded dataset together with the repository it came from
#[derive(Debug)]
pub struct BillStore<R> {
    repo: R,
    dataset: Dataset,
}

impl<R: DatasetRepository> BillStore<R> {
    /// Load every record from `repo`
    pub fn load(repo: R) -> Result<Self> {
        let dataset = repo.load()?;
        Ok(Self { repo, dataset })
    }

    pub fn find(&self, bill_id: &str) -> Option<&BillRecord> {
        self.dataset.find(bill_id)
    }

    pub fn bill_ids(&self) -> Vec<&str> {
        self.dataset.bill_ids()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Set one record's summary and rewrite the backing store.
    ///
    /// If the rewrite fails the in-memory record keeps its old summary.
    pub fn update_summary(&mut self, bill_id: &str, text: impl Into<String>) -> Result<()> {
        let previous = {
            let record = self
                .dataset
                .find_mut(bill_id)
                .ok_or_else(|| Error::BillNotFound(bill_id.to_string()))?;
            std::mem::replace(&mut record.summary, text.into())
        };

        if let Err(e) = self.repo.save(&self.dataset) {
            if let Some(record) = self.dataset.find_mut(bill_id) {
                record.summary = previous;
            }
            return Err(e);
        }

        info!("saved summary for {}", bill_id);
        Ok(())
    }
}
