use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::Category;
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransactionError {
    #[error("Transaction name must not be empty")]
    EmptyName,
    #[error("Transaction avatar must not be empty")]
    EmptyAvatar,
}

/// Input shape for the bulk-create collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub recurring: bool,
    pub avatar: String,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.name.trim().is_empty() {
            return Err(TransactionError::EmptyName);
        }
        if self.avatar.trim().is_empty() {
            return Err(TransactionError::EmptyAvatar);
        }
        Ok(())
    }
}

/// A transaction as stored by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub recurring: bool,
    pub avatar: String,
}

impl Transaction {
    pub fn from_new(id: i64, tx: NewTransaction) -> Self {
        Transaction {
            id,
            name: tx.name,
            category: tx.category,
            date: tx.date,
            amount: tx.amount,
            recurring: tx.recurring,
            avatar: tx.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn new_tx(name: &str) -> NewTransaction {
        NewTransaction {
            name: name.to_string(),
            category: Category::Groceries,
            date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            amount: Money::from_decimal(Decimal::new(-2599, 2)),
            recurring: false,
            avatar: "/avatars/default.jpg".to_string(),
        }
    }

    #[test]
    fn validate_accepts_complete_transaction() {
        assert!(new_tx("Whole Foods").validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert_eq!(new_tx("   ").validate(), Err(TransactionError::EmptyName));
    }

    #[test]
    fn validate_rejects_blank_avatar() {
        let tx = NewTransaction {
            avatar: String::new(),
            ..new_tx("Whole Foods")
        };
        assert_eq!(tx.validate(), Err(TransactionError::EmptyAvatar));
    }

    #[test]
    fn from_new_keeps_fields() {
        let tx = Transaction::from_new(7, new_tx("Whole Foods"));
        assert_eq!(tx.id, 7);
        assert_eq!(tx.name, "Whole Foods");
        assert_eq!(tx.category, Category::Groceries);
        assert!(tx.amount.is_negative());
    }
}
