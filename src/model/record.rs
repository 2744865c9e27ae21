//! The flat record shape that the remote collections store and return.

use crate::model::Kind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which column carries the period of a record when it is written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodField {
    /// `mesReferencia`, holding `MM/YYYY`.
    #[default]
    MonthReference,
    /// `data`, holding an ISO day `YYYY-MM-DD`.
    Date,
}

serde_plain::derive_display_from_serialize!(PeriodField);
serde_plain::derive_fromstr_from_deserialize!(PeriodField);

/// One row of the `Receitas` or `Despesas` sheet as JSON.
///
/// The spreadsheet returns cells as strings or numbers depending on how they were entered, so every
/// field is read as optional text.
///
/// Example:
/// ```json
/// {
///   "descricao": "Salary",
///   "valorEntrada": "1000",
///   "mesReferencia": "06/2025",
///   "timestamp": "2025-06-05T10:00:00.000Z",
///   "id": "0f8fad5bd9cb469fa16570867728950e"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(
        rename = "descricao",
        default,
        deserialize_with = "cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "cell", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, deserialize_with = "cell", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(
        rename = "valorEntrada",
        default,
        deserialize_with = "cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub income_amount: Option<String>,

    #[serde(
        rename = "valorSaida",
        default,
        deserialize_with = "cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub expense_amount: Option<String>,

    #[serde(
        rename = "mesReferencia",
        default,
        deserialize_with = "cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub month_reference: Option<String>,

    #[serde(
        rename = "data",
        default,
        deserialize_with = "cell",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
}

impl RemoteRecord {
    /// The raw amount from the column that belongs to `kind`.
    pub fn amount(&self, kind: Kind) -> Option<&str> {
        match kind {
            Kind::Income => self.income_amount.as_deref(),
            Kind::Expense => self.expense_amount.as_deref(),
        }
    }

    pub fn set_amount(&mut self, kind: Kind, value: impl Into<String>) {
        let value = Some(value.into());
        match kind {
            Kind::Income => self.income_amount = value,
            Kind::Expense => self.expense_amount = value,
        }
    }
}

/// Reads a cell that may be a string, a number or null.
fn cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
