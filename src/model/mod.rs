//! Types that represent the core data model, such as `Transaction` and `Period`.
mod amount;
mod kind;
mod period;
mod record;
mod summary;
mod transaction;

pub use amount::{Amount, AmountError};
pub use kind::Kind;
pub use period::{Month, Period, PeriodError};
pub use record::{PeriodField, RemoteRecord};
pub use summary::Summary;
pub use transaction::{Reference, Transaction, TransactionChanges};
