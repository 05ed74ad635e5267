use std::future::Future;
use thiserror::Error;

use super::transaction::{NewTransaction, Transaction, TransactionError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid transaction: {0}")]
    Invalid(#[from] TransactionError),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Not authorized to create transactions")]
    Unauthorized,
}

/// Persistence collaborator that accepts a batch of new transactions.
///
/// Implementations create every record or none of them. Callers treat any
/// error the same way, so variants exist for diagnostics only.
pub trait TransactionStore: Send + Sync {
    fn create_many(
        &self,
        transactions: Vec<NewTransaction>,
    ) -> impl Future<Output = Result<Vec<Transaction>, StoreError>> + Send;
}
