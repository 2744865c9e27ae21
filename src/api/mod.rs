//! Access to the remote income and expense collections.
//!
//! There are two layers. `Collection` is the raw HTTP surface of the spreadsheet service: named
//! sheets of flat JSON records. `Store` sits on top of it and speaks in `Transaction`s, knowing
//! which sheet and amount column belong to each `Kind`.

mod sheetdb;
mod store;
mod test_collection;

use crate::model::{Kind, RemoteRecord, Transaction};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};

pub use sheetdb::AddressStyle;
pub(crate) use test_collection::TestCollection;
#[cfg(test)]
pub(crate) use test_collection::TestCollectionState;

/// The environment variable that switches the program to the in-memory collection.
pub const TEST_MODE_ENV: &str = "FINANCE_IN_TEST_MODE";

/// Whether the program talks to the real service or to an in-memory stand-in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Live,
    Testing,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// `Mode::Testing` when `FINANCE_IN_TEST_MODE` is set to a non-empty value.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Live,
        }
    }
}

/// The raw remote collection: sheets addressed by name, holding flat records.
#[async_trait::async_trait]
pub(crate) trait Collection {
    /// Returns every record of the sheet.
    async fn get(&mut self, sheet: &str) -> Result<Vec<RemoteRecord>>;

    /// Appends one record.
    async fn append(&mut self, sheet: &str, record: &RemoteRecord) -> Result<()>;

    /// Removes the records whose `id` is `id`.
    async fn delete(&mut self, sheet: &str, id: &str) -> Result<()>;

    /// Replaces the fields of the records whose `id` is `id`.
    async fn replace(&mut self, sheet: &str, id: &str, record: &RemoteRecord) -> Result<()>;
}

/// A collection that failed to load and was treated as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub kind: Kind,
    pub message: String,
}

/// The outcome of loading both collections. A failed collection is empty and listed in
/// `failures`; the other one still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
    pub income: Vec<Transaction>,
    pub expense: Vec<Transaction>,
    pub failures: Vec<LoadFailure>,
}

/// Typed access to the income and expense collections.
#[async_trait::async_trait]
pub(crate) trait Store {
    /// Fetches both collections in full. Never fails as a whole, see `Loaded`.
    async fn load(&mut self) -> Loaded;

    /// Fetches one transaction by id from the collection of `kind`.
    async fn get(&mut self, kind: Kind, id: &str) -> Result<Option<Transaction>>;

    /// Appends `transaction` to the collection of its kind.
    async fn create(&mut self, transaction: &Transaction) -> Result<()>;

    /// Removes the transaction `id` from the collection of `kind`.
    async fn delete(&mut self, kind: Kind, id: &str) -> Result<()>;

    /// Writes the full `transaction` over the record with the same id. When the kind differs from
    /// `previous_kind` the record is moved to the other collection.
    async fn update(&mut self, previous_kind: Kind, transaction: &Transaction) -> Result<()>;
}

/// Creates the `Collection` for `mode`.
pub(crate) fn collection(config: &Config, mode: Mode) -> Result<Box<dyn Collection + Send>> {
    Ok(match mode {
        Mode::Live => Box::new(sheetdb::SheetDb::new(
            config.api_url().clone(),
            config.address_style(),
        )?),
        Mode::Testing => Box::new(TestCollection::new(config.api_url().as_str())),
    })
}

/// Creates the `Store` for `mode`, configured from `config`.
pub(crate) fn store(config: &Config, mode: Mode) -> Result<Box<dyn Store + Send>> {
    let collection = collection(config, mode)?;
    Ok(Box::new(store::StoreImpl::new(collection, config)))
}
