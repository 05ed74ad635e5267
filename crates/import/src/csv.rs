use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tally_core::{Category, Money};
use thiserror::Error;

use crate::suggest::SuggestionEngine;

const REQUIRED_COLUMNS: [&str; 3] = ["date", "name", "amount"];

/// One candidate transaction taken from a CSV line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRow {
    /// Physical line number in the source text; the header is line 1.
    pub row_index: usize,
    #[serde(serialize_with = "serialize_date_iso")]
    pub date: DateTime<Utc>,
    pub name: String,
    pub category: Category,
    pub amount: Money,
    pub recurring: bool,
    /// Set when the category was inferred or defaulted rather than supplied.
    pub suggested_category: bool,
}

impl ParsedRow {
    /// `2024-01-05T00:00:00.000Z`
    pub fn date_iso(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn serialize_date_iso<S: serde::Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing was imported.
    Fatal,
    /// The row was dropped.
    Skipped,
    /// The row was kept with a fallback value.
    Advisory,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvIssue {
    #[error("CSV must contain a header row and at least one data row")]
    TooFewLines,
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: Missing name")]
    MissingName { row: usize },
    #[error("Row {row}: Invalid date \"{raw}\"")]
    InvalidDate { row: usize, raw: String },
    #[error("Row {row}: Invalid amount \"{raw}\"")]
    InvalidAmount { row: usize, raw: String },
    #[error("Row {row}: Unknown category \"{raw}\", defaulting to suggestion or \"General\"")]
    UnknownCategory { row: usize, raw: String },
}

impl CsvIssue {
    pub fn severity(&self) -> Severity {
        match self {
            CsvIssue::TooFewLines | CsvIssue::MissingColumn(_) => Severity::Fatal,
            CsvIssue::MissingName { .. }
            | CsvIssue::InvalidDate { .. }
            | CsvIssue::InvalidAmount { .. } => Severity::Skipped,
            CsvIssue::UnknownCategory { .. } => Severity::Advisory,
        }
    }

    pub fn row(&self) -> Option<usize> {
        match self {
            CsvIssue::TooFewLines | CsvIssue::MissingColumn(_) => None,
            CsvIssue::MissingName { row }
            | CsvIssue::InvalidDate { row, .. }
            | CsvIssue::InvalidAmount { row, .. }
            | CsvIssue::UnknownCategory { row, .. } => Some(*row),
        }
    }
}

impl Serialize for CsvIssue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvParseResult {
    pub data: Vec<ParsedRow>,
    pub errors: Vec<CsvIssue>,
}

impl CsvParseResult {
    fn fatal(errors: Vec<CsvIssue>) -> Self {
        Self {
            data: Vec::new(),
            errors,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(|e| e.severity() == Severity::Fatal)
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    name: usize,
    amount: usize,
    category: Option<usize>,
    recurring: Option<usize>,
}

impl Columns {
    fn resolve(header: &[String]) -> Result<Self, Vec<CsvIssue>> {
        let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let missing: Vec<CsvIssue> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|&c| find(c).is_none())
            .map(|c| CsvIssue::MissingColumn(c.to_string()))
            .collect();

        match (find("date"), find("name"), find("amount")) {
            (Some(date), Some(name), Some(amount)) => Ok(Columns {
                date,
                name,
                amount,
                category: find("category"),
                recurring: find("recurring"),
            }),
            _ => Err(missing),
        }
    }
}

pub struct CsvImporter {
    engine: SuggestionEngine,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new(SuggestionEngine::default())
    }
}

impl CsvImporter {
    pub fn new(engine: SuggestionEngine) -> Self {
        Self { engine }
    }

    /// Never fails outright: structural problems come back as fatal issues
    /// with no data, row problems as per-row issues next to the good rows.
    pub fn parse(&self, raw: &str) -> CsvParseResult {
        let lines: Vec<(usize, &str)> = raw
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, line))
            .collect();

        if lines.len() < 2 {
            return CsvParseResult::fatal(vec![CsvIssue::TooFewLines]);
        }

        let columns = match Columns::resolve(&split_fields(lines[0].1)) {
            Ok(columns) => columns,
            Err(missing) => return CsvParseResult::fatal(missing),
        };

        let mut result = CsvParseResult::default();
        for &(row, line) in &lines[1..] {
            let fields = split_fields(line);
            if let Some(parsed) = self.parse_row(row, &fields, &columns, &mut result.errors) {
                result.data.push(parsed);
            }
        }

        tracing::debug!(
            accepted = result.data.len(),
            issues = result.errors.len(),
            "parsed transaction csv"
        );
        result
    }

    fn parse_row(
        &self,
        row: usize,
        fields: &[String],
        columns: &Columns,
        errors: &mut Vec<CsvIssue>,
    ) -> Option<ParsedRow> {
        let cell = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or_default();

        let name = cell(columns.name);
        if name.is_empty() {
            errors.push(CsvIssue::MissingName { row });
            return None;
        }

        let raw_date = cell(columns.date);
        let Some(date) = parse_date(raw_date) else {
            errors.push(CsvIssue::InvalidDate {
                row,
                raw: raw_date.to_string(),
            });
            return None;
        };

        let raw_amount = cell(columns.amount);
        let Some(amount) = parse_amount(raw_amount) else {
            errors.push(CsvIssue::InvalidAmount {
                row,
                raw: raw_amount.to_string(),
            });
            return None;
        };

        let supplied = match columns.category.map(cell).filter(|c| !c.is_empty()) {
            Some(raw) => {
                let known = Category::from_label(raw);
                if known.is_none() {
                    errors.push(CsvIssue::UnknownCategory {
                        row,
                        raw: raw.to_string(),
                    });
                }
                known
            }
            None => None,
        };

        let (category, suggested_category) = match supplied {
            Some(category) => (category, false),
            None => (
                self.engine.suggest(name).unwrap_or(Category::DEFAULT),
                true,
            ),
        };

        let recurring = columns
            .recurring
            .map(cell)
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "yes" | "true"));

        Some(ParsedRow {
            row_index: row,
            date,
            name: name.to_string(),
            category,
            amount,
            recurring,
            suggested_category,
        })
    }
}

/// Parse with the canonical keyword table.
pub fn parse_transactions_csv(raw: &str) -> CsvParseResult {
    CsvImporter::default().parse(raw)
}

/// Splits one line into trimmed cells, honouring double quotes and `""`.
fn split_fields(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Lowercase ASCII letters only: `"AMOUNT($)"` becomes `amount`.
fn normalize_header(cell: &str) -> String {
    cell.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in &[
        "%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d %b %Y", "%b %d, %Y", "%B %d, %Y",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

fn parse_amount(s: &str) -> Option<Money> {
    let s = s.replace(['$', ','], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // Values Decimal cannot hold exactly (beyond 28 fractional digits or
    // outside its range) are rejected rather than rounded.
    Decimal::from_str_exact(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
        .map(Money::from_decimal)
}
