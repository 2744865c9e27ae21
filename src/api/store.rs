use crate::api::{Collection, LoadFailure, Loaded, Store};
use crate::model::{Kind, PeriodField, Transaction};
use crate::{Config, Result};
use anyhow::Context;
use tracing::{debug, info, warn};

/// The `Store` over any `Collection`: maps each `Kind` to its sheet and converts records.
pub(super) struct StoreImpl {
    collection: Box<dyn Collection + Send>,
    income_sheet: String,
    expense_sheet: String,
    period_field: PeriodField,
}

impl StoreImpl {
    pub(super) fn new(collection: Box<dyn Collection + Send>, config: &Config) -> Self {
        Self {
            collection,
            income_sheet: config.income_sheet().to_string(),
            expense_sheet: config.expense_sheet().to_string(),
            period_field: config.period_field(),
        }
    }

    fn sheet(&self, kind: Kind) -> &str {
        match kind {
            Kind::Income => &self.income_sheet,
            Kind::Expense => &self.expense_sheet,
        }
    }

    async fn fetch(&mut self, kind: Kind) -> Result<Vec<Transaction>> {
        let sheet = self.sheet(kind).to_string();
        let records = self.collection.get(&sheet).await?;
        debug!("Fetched {} records from sheet '{sheet}'", records.len());
        Ok(records
            .into_iter()
            .map(|record| Transaction::from_remote(kind, record))
            .collect())
    }
}

#[async_trait::async_trait]
impl Store for StoreImpl {
    async fn load(&mut self) -> Loaded {
        let mut loaded = Loaded::default();
        for kind in Kind::ALL {
            let transactions = match self.fetch(kind).await {
                Ok(transactions) => transactions,
                Err(e) => {
                    warn!("Unable to load the {kind} transactions: {e:#}");
                    loaded.failures.push(LoadFailure {
                        kind,
                        message: format!("{e:#}"),
                    });
                    Vec::new()
                }
            };
            match kind {
                Kind::Income => loaded.income = transactions,
                Kind::Expense => loaded.expense = transactions,
            }
        }
        loaded
    }

    async fn get(&mut self, kind: Kind, id: &str) -> Result<Option<Transaction>> {
        Ok(self
            .fetch(kind)
            .await?
            .into_iter()
            .find(|t| t.id() == id))
    }

    async fn create(&mut self, transaction: &Transaction) -> Result<()> {
        let sheet = self.sheet(transaction.kind()).to_string();
        let record = transaction.to_remote(self.period_field);
        self.collection
            .append(&sheet, &record)
            .await
            .with_context(|| format!("Unable to add transaction '{}'", transaction.id()))?;
        info!("Added transaction '{}' to '{sheet}'", transaction.id());
        Ok(())
    }

    async fn delete(&mut self, kind: Kind, id: &str) -> Result<()> {
        let sheet = self.sheet(kind).to_string();
        self.collection
            .delete(&sheet, id)
            .await
            .with_context(|| format!("Unable to delete transaction '{id}'"))?;
        info!("Deleted transaction '{id}' from '{sheet}'");
        Ok(())
    }

    async fn update(&mut self, previous_kind: Kind, transaction: &Transaction) -> Result<()> {
        let id = transaction.id();
        let record = transaction.to_remote(self.period_field);

        if previous_kind == transaction.kind() {
            let sheet = self.sheet(previous_kind).to_string();
            self.collection
                .replace(&sheet, id, &record)
                .await
                .with_context(|| format!("Unable to update transaction '{id}'"))?;
            info!("Updated transaction '{id}' in '{sheet}'");
            return Ok(());
        }

        // Insert before delete: a failure in between leaves a duplicate, never a lost record.
        let to = self.sheet(transaction.kind()).to_string();
        let from = self.sheet(previous_kind).to_string();
        self.collection
            .append(&to, &record)
            .await
            .with_context(|| format!("Unable to move transaction '{id}' to '{to}'"))?;
        self.collection
            .delete(&from, id)
            .await
            .with_context(|| {
                format!("Transaction '{id}' was added to '{to}' but not removed from '{from}'")
            })?;
        info!("Moved transaction '{id}' from '{from}' to '{to}'");
        Ok(())
    }
}
