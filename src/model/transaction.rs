use crate::model::period::parse_iso_date;
use crate::model::{Amount, Kind, Month, Period, PeriodField, RemoteRecord};
use crate::utils::{generate_transaction_id, timestamp_now};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use tracing::warn;

/// The calendar reference given when a transaction is entered: either a month or a specific day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Month(Month),
    Date(NaiveDate),
}

impl Reference {
    fn period_and_date(&self) -> (Period, Option<String>) {
        match self {
            Reference::Month(month) => (Period::Month(*month), None),
            Reference::Date(date) => {
                let period = Month::from_date(*date)
                    .map(Period::Month)
                    .unwrap_or_else(|| Period::Unparsed(date.to_string()));
                (period, Some(date.format("%Y-%m-%d").to_string()))
            }
        }
    }
}

/// A single income or expense. Immutable once constructed; edits produce a new value through
/// `Transaction::revise`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    id: String,
    description: String,
    /// `None` when the stored value could not be read as a number.
    amount: Option<Amount>,
    kind: Kind,
    period: Period,
    /// The ISO day, when the record was entered with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    created_at: String,
}

/// The fields that an update may change. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionChanges {
    pub description: Option<String>,
    pub amount: Option<Amount>,
    pub kind: Option<Kind>,
    pub reference: Option<Reference>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.reference.is_none()
    }
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Option<Amount>,
        kind: Kind,
        period: Period,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            kind,
            period,
            date: None,
            created_at: created_at.into(),
        }
    }

    /// Builds a brand-new transaction with a generated id and the current time as `created_at`.
    pub fn create(
        description: impl Into<String>,
        amount: Amount,
        kind: Kind,
        reference: Reference,
    ) -> Self {
        let (period, date) = reference.period_and_date();
        Self {
            id: generate_transaction_id(),
            description: description.into(),
            amount: Some(amount),
            kind,
            period,
            date,
            created_at: timestamp_now(),
        }
    }

    /// Normalizes a record fetched from the collection of `kind`.
    ///
    /// Nothing here fails. An amount that is missing or not a number is kept as `None`, a negative
    /// amount is stored as its magnitude, and a period that cannot be read is kept verbatim.
    /// `mesReferencia` takes precedence over `data` for the period.
    pub fn from_remote(kind: Kind, record: RemoteRecord) -> Self {
        let id = record.id.clone().unwrap_or_default();
        let amount = match record.amount(kind) {
            Some(raw) => match Amount::parse_signed(raw) {
                Ok(value) => Some(Amount::magnitude(value)),
                Err(e) => {
                    warn!("Transaction '{id}' has an unreadable {kind} amount: {e}");
                    None
                }
            },
            None => {
                warn!(
                    "Transaction '{id}' has no '{}' value",
                    kind.amount_field()
                );
                None
            }
        };

        let date = non_empty(record.date).filter(|d| parse_iso_date(d.trim()).is_some());
        let period = match (non_empty(record.month_reference), &date) {
            (Some(month_reference), _) => Period::normalize(&month_reference),
            (None, Some(date)) => Period::normalize(date),
            (None, None) => Period::default(),
        };

        Self {
            id,
            description: record.description.unwrap_or_default(),
            amount,
            kind,
            period,
            date,
            created_at: record.timestamp.unwrap_or_default(),
        }
    }

    /// The full record written to the collection of `self.kind()`. The period goes to the column
    /// chosen by `field`.
    pub fn to_remote(&self, field: PeriodField) -> RemoteRecord {
        let mut record = RemoteRecord {
            description: Some(self.description.clone()),
            timestamp: Some(self.created_at.clone()),
            id: Some(self.id.clone()),
            ..Default::default()
        };
        // The exact value, not the two-decimal display form.
        if let Some(amount) = self.amount {
            record.set_amount(self.kind, amount.value().normalize().to_string());
        }
        match field {
            PeriodField::MonthReference => {
                record.month_reference = Some(self.period.to_string());
            }
            PeriodField::Date => {
                record.date = self.date.clone().or_else(|| {
                    self.period
                        .month()
                        .and_then(|m| m.first_day())
                        .map(|d| d.format("%Y-%m-%d").to_string())
                });
            }
        }
        record
    }

    /// Returns a copy with `changes` applied. The id and `created_at` never change.
    pub fn revise(&self, changes: &TransactionChanges) -> Self {
        let mut revised = self.clone();
        if let Some(description) = &changes.description {
            revised.description = description.clone();
        }
        if let Some(amount) = changes.amount {
            revised.amount = Some(amount);
        }
        if let Some(kind) = changes.kind {
            revised.kind = kind;
        }
        if let Some(reference) = &changes.reference {
            let (period, date) = reference.period_and_date();
            revised.period = period;
            revised.date = date;
        }
        revised
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// The parsed `created_at`, or `None` if it is not an RFC 3339 timestamp.
    pub fn created_at_instant(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.created_at.trim()).ok()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(json: &str) -> RemoteRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_remote_income() {
        let t = Transaction::from_remote(
            Kind::Income,
            record(
                r#"{"descricao":"Salary","valorEntrada":"1000","mesReferencia":"6/2025",
                    "timestamp":"2025-06-05T10:00:00.000Z","id":"a1"}"#,
            ),
        );
        assert_eq!(t.id(), "a1");
        assert_eq!(t.description(), "Salary");
        assert_eq!(t.kind(), Kind::Income);
        assert_eq!(t.amount().unwrap().value(), Decimal::from(1000));
        assert_eq!(t.period().to_string(), "06/2025");
        assert!(t.created_at_instant().is_some());
    }

    #[test]
    fn test_from_remote_reads_kind_specific_column() {
        // An expense record only looks at valorSaida.
        let t = Transaction::from_remote(
            Kind::Expense,
            record(r#"{"valorEntrada":"10","valorSaida":"40","mesReferencia":"45808"}"#),
        );
        assert_eq!(t.amount().unwrap().value(), Decimal::from(40));
        assert_eq!(t.period().to_string(), "06/2025");
    }

    #[test]
    fn test_from_remote_keeps_invalid_amount() {
        let t = Transaction::from_remote(
            Kind::Expense,
            record(r#"{"valorSaida":"lots","id":"x"}"#),
        );
        assert_eq!(t.id(), "x");
        assert_eq!(t.amount(), None);
        assert_eq!(t.period(), &Period::default());
    }

    #[test]
    fn test_from_remote_negative_amount_becomes_magnitude() {
        let t = Transaction::from_remote(Kind::Expense, record(r#"{"valorSaida":"-12,50"}"#));
        assert_eq!(t.amount().unwrap().value(), Decimal::from_str("12.50").unwrap());
    }

    #[test]
    fn test_from_remote_date_schema() {
        let t = Transaction::from_remote(
            Kind::Income,
            record(r#"{"valorEntrada":"5","data":"2025-07-19"}"#),
        );
        assert_eq!(t.date(), Some("2025-07-19"));
        assert_eq!(t.period().to_string(), "07/2025");
    }

    #[test]
    fn test_from_remote_unparsed_period_passes_through() {
        let t = Transaction::from_remote(
            Kind::Income,
            record(r#"{"valorEntrada":"5","mesReferencia":"junho"}"#),
        );
        assert_eq!(t.period(), &Period::Unparsed("junho".to_string()));
    }

    #[test]
    fn test_create_and_to_remote() {
        let month = Month::new(2025, 6).unwrap();
        let t = Transaction::create(
            "Rent",
            Amount::from_str("400").unwrap(),
            Kind::Expense,
            Reference::Month(month),
        );
        assert_eq!(t.id().len(), 32);
        let r = t.to_remote(PeriodField::MonthReference);
        assert_eq!(r.description.as_deref(), Some("Rent"));
        assert_eq!(r.expense_amount.as_deref(), Some("400"));
        assert_eq!(r.income_amount, None);
        assert_eq!(r.month_reference.as_deref(), Some("06/2025"));
        assert_eq!(r.id.as_deref(), Some(t.id()));
        assert_eq!(r.timestamp.as_deref(), Some(t.created_at()));
    }

    #[test]
    fn test_to_remote_date_field_uses_first_of_month() {
        let month = Month::new(2025, 6).unwrap();
        let t = Transaction::create(
            "Rent",
            Amount::from_str("400").unwrap(),
            Kind::Expense,
            Reference::Month(month),
        );
        let r = t.to_remote(PeriodField::Date);
        assert_eq!(r.date.as_deref(), Some("2025-06-01"));
        assert_eq!(r.month_reference, None);
    }

    #[test]
    fn test_revise_keeps_identity() {
        let t = Transaction::create(
            "Rent",
            Amount::from_str("400").unwrap(),
            Kind::Expense,
            Reference::Date(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()),
        );
        let changes = TransactionChanges {
            kind: Some(Kind::Income),
            amount: Some(Amount::from_str("10").unwrap()),
            reference: Some(Reference::Month(Month::new(2025, 7).unwrap())),
            ..Default::default()
        };
        let revised = t.revise(&changes);
        assert_eq!(revised.id(), t.id());
        assert_eq!(revised.created_at(), t.created_at());
        assert_eq!(revised.description(), "Rent");
        assert_eq!(revised.kind(), Kind::Income);
        assert_eq!(revised.period().to_string(), "07/2025");
        assert_eq!(revised.date(), None);
    }
}
