pub mod category;
pub mod money;
pub mod store;
pub mod transaction;

pub use category::{Category, ALL_TRANSACTIONS};
pub use money::Money;
pub use store::{StoreError, TransactionStore};
pub use transaction::{NewTransaction, Transaction, TransactionError};
