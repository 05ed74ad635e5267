use anyhow::Context;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tally_core::{Category, Money};
use tally_import::{CsvImporter, ImportSession, ImportStep, ParsedRow, Severity};
use tally_storage::SqliteStore;

use crate::config::AppConfig;

pub struct ImportOptions {
    pub overrides: Vec<(usize, Category)>,
    pub dry_run: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewOutput<'a> {
    step: ImportStep,
    rows: &'a [ParsedRow],
    errors: Vec<String>,
    total: Money,
}

/// Parses `ROW=CATEGORY`, e.g. `3=Dining Out`.
pub fn parse_override(s: &str) -> Result<(usize, Category), String> {
    let (row, category) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=CATEGORY, got '{s}'"))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid row number '{}'", row.trim()))?;
    let category = category.trim().parse::<Category>()?;
    Ok((row, category))
}

pub async fn import(
    config: &AppConfig,
    db_path: &Path,
    file: &Path,
    options: ImportOptions,
) -> anyhow::Result<()> {
    let importer = CsvImporter::new(config.suggestion_engine()?);
    let mut session = ImportSession::new(importer, config.default_avatar.clone());
    session.load_file(file).await?;

    for (row, category) in options.overrides {
        session.set_category(row, category)?;
    }

    if options.json {
        let output = PreviewOutput {
            step: session.step(),
            rows: session.rows(),
            errors: session.issues().iter().map(ToString::to_string).collect(),
            total: session.total(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_preview(&session));
    }

    if session.rows().is_empty() {
        println!("Nothing to import.");
        session.close();
        return Ok(());
    }
    if options.dry_run {
        println!("Dry run: {} transactions not imported.", session.rows().len());
        session.close();
        return Ok(());
    }

    let pool = tally_storage::create_db(db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let store = SqliteStore::new(pool);

    match session.commit(&store).await {
        Ok(count) => {
            println!("Imported {count} transactions.");
            session.finish()?;
            Ok(())
        }
        Err(e) => {
            if let Some(notice) = session.failure_notice() {
                eprintln!("{notice}");
            }
            Err(e.into())
        }
    }
}

pub fn render_preview(session: &ImportSession) -> String {
    let mut out = String::new();

    if !session.issues().is_empty() {
        let _ = writeln!(out, "Issues ({}):", session.issues().len());
        for issue in session.issues() {
            let note = match issue.severity() {
                Severity::Fatal => "",
                Severity::Skipped => " (row skipped)",
                Severity::Advisory => " (row kept)",
            };
            let _ = writeln!(out, "  {issue}{note}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "{:>4}  {:<10}  {:<28}  {:<15}  {:>12}  {}",
        "Row", "Date", "Name", "Category", "Amount", "Recurring"
    );
    for row in session.rows() {
        let category = if row.suggested_category {
            format!("{}*", row.category)
        } else {
            row.category.to_string()
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<10}  {:<28}  {:<15}  {:>12}  {}",
            row.row_index,
            row.date.format("%Y-%m-%d"),
            truncate(&row.name, 28),
            category,
            row.amount.to_string(),
            if row.recurring { "yes" } else { "" }
        );
    }
    let _ = writeln!(
        out,
        "{} rows, total {}  (* suggested category)",
        session.rows().len(),
        session.total()
    );
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('…');
        t
    }
}

pub fn suggest(config: &AppConfig, name: &str) -> anyhow::Result<()> {
    let engine = config.suggestion_engine()?;
    match engine.suggest(name) {
        Some(category) => println!("{category}"),
        None => println!("(no suggestion)"),
    }
    Ok(())
}

pub fn categories() {
    for category in Category::ALL {
        if category == Category::DEFAULT {
            println!("{category} (default)");
        } else {
            println!("{category}");
        }
    }
}

pub async fn list(db_path: &Path) -> anyhow::Result<()> {
    let pool = tally_storage::create_db(db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let transactions = tally_storage::list_transactions(&pool).await?;

    if transactions.is_empty() {
        println!("No transactions.");
        return Ok(());
    }
    for tx in &transactions {
        println!(
            "{:>5}  {}  {:<28}  {:<15}  {:>12}{}",
            tx.id,
            tx.date.format("%Y-%m-%d"),
            truncate(&tx.name, 28),
            tx.category.to_string(),
            tx.amount.to_string(),
            if tx.recurring { "  (recurring)" } else { "" }
        );
    }
    Ok(())
}
