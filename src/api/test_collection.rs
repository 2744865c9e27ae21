//! Implements the `Collection` trait with in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole app can
//! run, top-to-bottom, without the network. State lives in a process-wide map keyed by the
//! configured API URL, so separate `TestCollection` values created for the same URL see each
//! other's writes, the same way two requests to the real service would.

use crate::api::Collection;
use crate::model::RemoteRecord;
use crate::Result;
use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, OnceLock};

const INCOME_SHEET: &str = "Receitas";
const EXPENSE_SHEET: &str = "Despesas";

/// The contents of one in-memory spreadsheet, plus switches that make requests fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TestCollectionState {
    /// Records by sheet name.
    pub(crate) sheets: HashMap<String, Vec<RemoteRecord>>,
    /// Sheets whose `get` fails.
    pub(crate) failing_reads: HashSet<String>,
    /// When set, every write fails and leaves the data untouched.
    pub(crate) failing_writes: bool,
    /// The number of `get` requests served, failed ones included.
    pub(crate) reads: usize,
}

impl TestCollectionState {
    /// Empty income and expense sheets with the default names.
    pub(crate) fn empty() -> Self {
        let mut sheets = HashMap::new();
        sheets.insert(INCOME_SHEET.to_string(), Vec::new());
        sheets.insert(EXPENSE_SHEET.to_string(), Vec::new());
        Self {
            sheets,
            ..Default::default()
        }
    }

    /// The seed data from this module.
    pub(crate) fn seeded() -> Result<Self> {
        let mut state = Self::empty();
        state
            .sheets
            .insert(INCOME_SHEET.to_string(), load_csv(INCOME_DATA)?);
        state
            .sheets
            .insert(EXPENSE_SHEET.to_string(), load_csv(EXPENSE_DATA)?);
        Ok(state)
    }

    #[cfg(test)]
    pub(crate) fn records(&self, sheet: &str) -> &[RemoteRecord] {
        self.sheets.get(sheet).map(Vec::as_slice).unwrap_or_default()
    }

    fn sheet_mut(&mut self, sheet: &str) -> Result<&mut Vec<RemoteRecord>> {
        self.sheets
            .get_mut(sheet)
            .with_context(|| format!("Sheet '{sheet}' not found"))
    }

    fn check_write(&self) -> Result<()> {
        if self.failing_writes {
            bail!("Request failed with status 500 Internal Server Error: write rejected");
        }
        Ok(())
    }
}

fn states() -> MutexGuard<'static, HashMap<String, TestCollectionState>> {
    static STATES: OnceLock<Mutex<HashMap<String, TestCollectionState>>> = OnceLock::new();
    STATES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An implementation of the `Collection` trait that does not use the network. The first
/// `TestCollection` created for a key is seeded with the data in this module.
pub(crate) struct TestCollection {
    key: String,
}

impl TestCollection {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let mut states = states();
        if !states.contains_key(&key) {
            let state = match TestCollectionState::seeded() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Unable to load the seed data: {e:#}");
                    TestCollectionState::empty()
                }
            };
            states.insert(key.clone(), state);
        }
        Self { key }
    }

    /// A copy of the current state.
    #[cfg(test)]
    pub(crate) fn get_state(&self) -> TestCollectionState {
        states().get(&self.key).cloned().unwrap_or_default()
    }

    /// Replaces the state.
    #[cfg(test)]
    pub(crate) fn set_state(&self, state: TestCollectionState) {
        states().insert(self.key.clone(), state);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TestCollectionState) -> Result<T>) -> Result<T> {
        let mut states = states();
        let state = states.entry(self.key.clone()).or_default();
        f(state)
    }
}

#[async_trait::async_trait]
impl Collection for TestCollection {
    async fn get(&mut self, sheet: &str) -> Result<Vec<RemoteRecord>> {
        self.with_state(|state| {
            state.reads += 1;
            if state.failing_reads.contains(sheet) {
                bail!("Request to fetch sheet '{sheet}' failed with status 503 Service Unavailable");
            }
            state
                .sheets
                .get(sheet)
                .with_context(|| format!("Sheet '{sheet}' not found"))
                .cloned()
        })
    }

    async fn append(&mut self, sheet: &str, record: &RemoteRecord) -> Result<()> {
        self.with_state(|state| {
            state.check_write()?;
            state.sheet_mut(sheet)?.push(record.clone());
            Ok(())
        })
    }

    async fn delete(&mut self, sheet: &str, id: &str) -> Result<()> {
        self.with_state(|state| {
            state.check_write()?;
            state
                .sheet_mut(sheet)?
                .retain(|r| r.id.as_deref() != Some(id));
            Ok(())
        })
    }

    async fn replace(&mut self, sheet: &str, id: &str, record: &RemoteRecord) -> Result<()> {
        self.with_state(|state| {
            state.check_write()?;
            for existing in state
                .sheet_mut(sheet)?
                .iter_mut()
                .filter(|r| r.id.as_deref() == Some(id))
            {
                *existing = record.clone();
            }
            Ok(())
        })
    }
}

/// Reads CSV rows into records. Empty cells are left out, as the service does for blank cells.
fn load_csv(csv_data: &str) -> Result<Vec<RemoteRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let object: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
            .collect();
        let record = serde_json::from_value(Value::Object(object))
            .context("Unable to read a seed record")?;
        records.push(record);
    }
    Ok(records)
}

/// Seed income data. Periods are written in the shapes the spreadsheet produces.
const INCOME_DATA: &str = r##"descricao,valorEntrada,mesReferencia,data,timestamp,id
Salário,"5.200,00",07/2025,,2025-07-05T09:12:44.120Z,seedinc01
Freelance,"1.350,50",7/2025,,2025-07-18T21:03:10.004Z,seedinc02
Salário,5200,45870,,2025-08-05T09:10:02.551Z,seedinc03
Reembolso,89.90,,2025-08-21,2025-08-21T13:45:00.000Z,seedinc04
Salário,5200,09/2025,,2025-09-05T09:08:37.990Z,seedinc05
"##;

/// Seed expense data. One amount is deliberately unreadable.
const EXPENSE_DATA: &str = r##"descricao,valorSaida,mesReferencia,data,timestamp,id
Aluguel,1800,07/2025,,2025-07-06T10:00:00.000Z,seedexp01
Mercado,"R$ 642,37",07/2025,,2025-07-12T17:22:15.310Z,seedexp02
Aluguel,1800,45870,,2025-08-06T10:00:00.000Z,seedexp03
Internet,"99,90",,2025-08-15,2025-08-15T08:30:00.000Z,seedexp04
Farmácia,abc,08/2025,,2025-08-27T19:14:51.002Z,seedexp05
Aluguel,1800,09/2025,,2025-09-06T10:00:00.000Z,seedexp06
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Kind, Transaction};
    use uuid::Uuid;

    fn unique_key() -> String {
        format!("https://sheetdb.test/api/v1/{}", Uuid::new_v4().simple())
    }

    #[test]
    fn test_seed_data_parses() {
        let state = TestCollectionState::seeded().unwrap();
        assert_eq!(state.records(INCOME_SHEET).len(), 5);
        assert_eq!(state.records(EXPENSE_SHEET).len(), 6);

        let expenses: Vec<Transaction> = state
            .records(EXPENSE_SHEET)
            .iter()
            .cloned()
            .map(|r| Transaction::from_remote(Kind::Expense, r))
            .collect();
        assert_eq!(expenses[2].period().to_string(), "08/2025");
        assert_eq!(expenses[3].period().to_string(), "08/2025");
        assert!(expenses[4].amount().is_none());
    }

    #[tokio::test]
    async fn test_state_is_shared_by_key() {
        let key = unique_key();
        let mut a = TestCollection::new(&key);
        a.set_state(TestCollectionState::empty());
        let record = RemoteRecord {
            id: Some("x".to_string()),
            ..Default::default()
        };
        a.append(INCOME_SHEET, &record).await.unwrap();

        let mut b = TestCollection::new(&key);
        assert_eq!(b.get(INCOME_SHEET).await.unwrap(), vec![record]);
        assert!(b.get(EXPENSE_SHEET).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let mut collection = TestCollection::new(unique_key());
        let mut record = RemoteRecord {
            id: Some("x".to_string()),
            description: Some("before".to_string()),
            ..Default::default()
        };
        collection.set_state(TestCollectionState::empty());
        collection.append(EXPENSE_SHEET, &record).await.unwrap();

        record.description = Some("after".to_string());
        collection
            .replace(EXPENSE_SHEET, "x", &record)
            .await
            .unwrap();
        assert_eq!(
            collection.get_state().records(EXPENSE_SHEET)[0]
                .description
                .as_deref(),
            Some("after")
        );

        collection.delete(EXPENSE_SHEET, "x").await.unwrap();
        assert!(collection.get_state().records(EXPENSE_SHEET).is_empty());
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let mut collection = TestCollection::new(unique_key());
        let mut state = TestCollectionState::empty();
        state.failing_reads.insert(INCOME_SHEET.to_string());
        state.failing_writes = true;
        collection.set_state(state);

        assert!(collection.get(INCOME_SHEET).await.is_err());
        assert!(collection.get(EXPENSE_SHEET).await.is_ok());
        assert_eq!(collection.get_state().reads, 2);
        let err = collection
            .append(EXPENSE_SHEET, &RemoteRecord::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("500"));
        assert!(collection.get_state().records(EXPENSE_SHEET).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_sheet() {
        let mut collection = TestCollection::new(unique_key());
        assert!(collection.get("Outros").await.is_err());
    }
}
