use serde::Serialize;
use std::fmt;
use std::path::Path;
use tally_core::{Category, Money, NewTransaction, StoreError, TransactionStore};
use thiserror::Error;

use crate::csv::{CsvImporter, CsvIssue, ParsedRow, Severity};

/// Placeholder avatar attached to every imported transaction.
pub const DEFAULT_AVATAR: &str = "./assets/images/avatars/default.jpg";

/// Shown whenever the bulk create fails, whatever the cause.
pub const IMPORT_FAILED_NOTICE: &str = "Import failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStep {
    Upload,
    Preview,
    Done,
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStep::Upload => write!(f, "upload"),
            ImportStep::Preview => write!(f, "preview"),
            ImportStep::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Import is at the {actual} step, expected {expected}")]
    InvalidStep {
        expected: ImportStep,
        actual: ImportStep,
    },
    #[error("Only .csv files can be imported: {0}")]
    UnsupportedFile(String),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("No row {0} in the preview")]
    UnknownRow(usize),
    #[error("Row {0} was skipped and cannot be edited")]
    SkippedRow(usize),
    #[error("There are no rows to import")]
    NothingToImport,
    #[error("Import failed: {0}")]
    Submit(#[from] StoreError),
}

/// One import dialog: upload → preview → done.
///
/// The session owns the working rows. Every mutation goes through a
/// transition method, and `commit` borrows the session mutably for the whole
/// request, so edits and a second submission are impossible while one is in
/// flight.
pub struct ImportSession {
    importer: CsvImporter,
    avatar: String,
    step: ImportStep,
    rows: Vec<ParsedRow>,
    issues: Vec<CsvIssue>,
    imported_count: usize,
    failure_notice: Option<&'static str>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new(CsvImporter::default(), DEFAULT_AVATAR)
    }
}

impl ImportSession {
    pub fn new(importer: CsvImporter, avatar: impl Into<String>) -> Self {
        Self {
            importer,
            avatar: avatar.into(),
            step: ImportStep::Upload,
            rows: Vec::new(),
            issues: Vec::new(),
            imported_count: 0,
            failure_notice: None,
        }
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    pub fn rows(&self) -> &[ParsedRow] {
        &self.rows
    }

    pub fn issues(&self) -> &[CsvIssue] {
        &self.issues
    }

    pub fn imported_count(&self) -> usize {
        self.imported_count
    }

    /// Generic notice from the last failed submission, cleared on retry.
    pub fn failure_notice(&self) -> Option<&'static str> {
        self.failure_notice
    }

    pub fn total(&self) -> Money {
        self.rows.iter().map(|r| r.amount).sum()
    }

    /// Parses `text` and moves to the preview, even when every row failed.
    pub fn load_text(&mut self, text: &str) -> Result<(), WorkflowError> {
        self.expect_step(ImportStep::Upload)?;

        let result = self.importer.parse(text);
        if result.is_fatal() {
            tracing::warn!("csv rejected: {}", result.messages().join("; "));
        }
        tracing::info!(
            rows = result.data.len(),
            issues = result.errors.len(),
            "csv loaded for preview"
        );
        self.rows = result.data;
        self.issues = result.errors;
        self.step = ImportStep::Preview;
        Ok(())
    }

    pub async fn load_file(&mut self, path: &Path) -> Result<(), WorkflowError> {
        self.expect_step(ImportStep::Upload)?;

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(WorkflowError::UnsupportedFile(path.display().to_string()));
        }

        // Bank exports are often Latin-1; undecodable bytes become U+FFFD.
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| WorkflowError::Read {
                path: path.display().to_string(),
                source,
            })?;
        self.load_text(&String::from_utf8_lossy(&bytes))
    }

    /// Manual override. Always clears the suggestion flag, even when the
    /// chosen category equals the suggested one.
    pub fn set_category(
        &mut self,
        row_index: usize,
        category: Category,
    ) -> Result<(), WorkflowError> {
        self.expect_step(ImportStep::Preview)?;

        let Some(row) = self.rows.iter_mut().find(|r| r.row_index == row_index) else {
            let skipped = self
                .issues
                .iter()
                .any(|i| i.severity() == Severity::Skipped && i.row() == Some(row_index));
            return Err(if skipped {
                WorkflowError::SkippedRow(row_index)
            } else {
                WorkflowError::UnknownRow(row_index)
            });
        };
        row.category = category;
        row.suggested_category = false;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WorkflowError> {
        self.expect_step(ImportStep::Preview)?;
        self.reset();
        Ok(())
    }

    /// Sends every working row to `store` in one request. On failure the
    /// rows and edits stay in place so the user can retry.
    pub async fn commit<S: TransactionStore>(
        &mut self,
        store: &S,
    ) -> Result<usize, WorkflowError> {
        self.expect_step(ImportStep::Preview)?;
        if self.rows.is_empty() {
            return Err(WorkflowError::NothingToImport);
        }

        let payload: Vec<NewTransaction> = self
            .rows
            .iter()
            .map(|r| NewTransaction {
                name: r.name.clone(),
                category: r.category,
                date: r.date,
                amount: r.amount,
                recurring: r.recurring,
                avatar: self.avatar.clone(),
            })
            .collect();

        self.failure_notice = None;
        match store.create_many(payload).await {
            Ok(created) => {
                self.imported_count = created.len();
                self.step = ImportStep::Done;
                tracing::info!(imported = self.imported_count, "transactions imported");
                Ok(self.imported_count)
            }
            Err(e) => {
                tracing::warn!("bulk create failed: {e}");
                self.failure_notice = Some(IMPORT_FAILED_NOTICE);
                Err(e.into())
            }
        }
    }

    pub fn finish(&mut self) -> Result<(), WorkflowError> {
        self.expect_step(ImportStep::Done)?;
        self.reset();
        Ok(())
    }

    /// Dialog closed: discard everything, whatever the step.
    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.step = ImportStep::Upload;
        self.rows.clear();
        self.issues.clear();
        self.imported_count = 0;
        self.failure_notice = None;
    }

    fn expect_step(&self, expected: ImportStep) -> Result<(), WorkflowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidStep {
                expected,
                actual: self.step,
            })
        }
    }
}
