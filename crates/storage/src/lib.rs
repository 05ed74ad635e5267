pub mod db;

pub use db::{create_db, list_transactions, DbPool, SqliteStore};
