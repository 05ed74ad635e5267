use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tally_core::{Category, Money, NewTransaction, StoreError, Transaction, TransactionStore};

pub type DbPool = Pool<Sqlite>;

type TransactionRow = (i64, String, String, String, String, i64, String);

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            recurring INTEGER NOT NULL DEFAULT 0,
            avatar TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_transactions(pool: &DbPool) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, name, category, date, amount, recurring, avatar FROM transactions ORDER BY date DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(decode_row).collect()
}

fn decode_row(r: TransactionRow) -> Result<Transaction, sqlx::Error> {
    let category = Category::from_str(&r.2).map_err(|e| sqlx::Error::Decode(e.into()))?;
    let date = DateTime::parse_from_rfc3339(&r.3)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);
    let amount = Decimal::from_str(&r.4).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Transaction {
        id: r.0,
        name: r.1,
        category,
        date,
        amount: Money::from_decimal(amount),
        recurring: r.5 != 0,
        avatar: r.6,
    })
}

/// SQLite-backed bulk-create collaborator.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl TransactionStore for SqliteStore {
    /// Inserts the whole batch in one database transaction.
    async fn create_many(
        &self,
        transactions: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>, StoreError> {
        for tx in &transactions {
            tx.validate()?;
        }

        let mut db_tx = self.pool.begin().await.map_err(backend)?;
        let mut created = Vec::with_capacity(transactions.len());

        for tx in transactions {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO transactions (name, category, date, amount, recurring, avatar) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
            )
            .bind(&tx.name)
            .bind(tx.category.label())
            .bind(tx.date.to_rfc3339_opts(SecondsFormat::Millis, true))
            .bind(tx.amount.as_decimal().to_string())
            .bind(tx.recurring)
            .bind(&tx.avatar)
            .fetch_one(&mut *db_tx)
            .await
            .map_err(backend)?;

            created.push(Transaction::from_new(id, tx));
        }

        db_tx.commit().await.map_err(backend)?;
        tracing::debug!(count = created.len(), "inserted transaction batch");
        Ok(created)
    }
}
