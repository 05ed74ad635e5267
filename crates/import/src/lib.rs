pub mod csv;
pub mod suggest;
pub mod workflow;

pub use crate::csv::{parse_transactions_csv, CsvImporter, CsvIssue, CsvParseResult, ParsedRow, Severity};
pub use suggest::{suggest_category, KeywordRule, SuggestionEngine, SuggestionError, DEFAULT_KEYWORDS};
pub use workflow::{ImportSession, ImportStep, WorkflowError, DEFAULT_AVATAR, IMPORT_FAILED_NOTICE};
