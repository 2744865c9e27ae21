use crate::model::{Kind, Transaction};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Income, expense and balance totals over a sequence of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    #[serde(serialize_with = "decimal")]
    total_income: Decimal,
    #[serde(serialize_with = "decimal")]
    total_expense: Decimal,
    #[serde(serialize_with = "decimal")]
    balance: Decimal,
    /// Number of transactions looked at.
    count: usize,
    /// Number of transactions left out of the totals because their amount was unreadable.
    invalid: usize,
}

impl Summary {
    /// Computes the totals from scratch. The empty sequence gives all zeros.
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut summary = Summary::default();
        for transaction in transactions {
            summary.count += 1;
            let Some(amount) = transaction.amount() else {
                summary.invalid += 1;
                continue;
            };
            match transaction.kind() {
                Kind::Income => summary.total_income += amount.value(),
                Kind::Expense => summary.total_expense += amount.value(),
            }
        }
        summary.balance = summary.total_income - summary.total_expense;
        summary
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expense(&self) -> Decimal {
        self.total_expense
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn invalid(&self) -> usize {
        self.invalid
    }
}

fn decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}
