//! The transaction pipeline: aggregate and sort, filter by period, summarize.
//!
//! Everything here is pure. A `Ledger` is built from freshly loaded income and expense records
//! and is replaced wholesale on every reload; `Ledger::view` derives a new `View` for a selector
//! without touching the ledger.

use crate::model::{Month, Period, PeriodError, Summary, Transaction};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::warn;

/// How the merged transactions are ordered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest period first, then newest `created_at` first within a period.
    #[default]
    Period,
    /// Newest `created_at` first, ignoring the period.
    Recency,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// Chooses which transactions a view shows: all of them, or those of one period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    All,
    Period(Period),
}

impl Selector {
    /// Selects the period that `token` normalizes to. Unlike `FromStr`, this accepts any token,
    /// matching an unparsed period only when the raw text is identical.
    pub fn period(token: &str) -> Self {
        Selector::Period(Period::normalize(token))
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            Selector::All => true,
            Selector::Period(period) => transaction.period() == period,
        }
    }
}

impl From<Month> for Selector {
    fn from(month: Month) -> Self {
        Selector::Period(Period::Month(month))
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::All => f.write_str("all"),
            Selector::Period(period) => Display::fmt(period, f),
        }
    }
}

/// Parses `all` or a month token (`MM/YYYY`, `M/YYYY`, `YYYY-MM`).
impl FromStr for Selector {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Selector::All);
        }
        Month::from_str(s).map(Selector::from)
    }
}

impl Serialize for Selector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Concatenates income then expense and sorts the result.
pub fn aggregate(
    income: Vec<Transaction>,
    expense: Vec<Transaction>,
    order: SortOrder,
) -> Vec<Transaction> {
    let mut transactions = income;
    transactions.extend(expense);
    sort(&mut transactions, order);
    transactions
}

/// Sorts most relevant first. The `id` breaks any remaining tie, so the order is total and does
/// not depend on the input order. Unparsed periods and unparseable timestamps sort last.
pub fn sort(transactions: &mut [Transaction], order: SortOrder) {
    match order {
        SortOrder::Period => transactions.sort_by_cached_key(|t| {
            (
                Reverse(t.period().sort_key()),
                Reverse(t.created_at_instant()),
                t.id().to_string(),
            )
        }),
        SortOrder::Recency => transactions
            .sort_by_cached_key(|t| (Reverse(t.created_at_instant()), t.id().to_string())),
    }
}

/// The transactions matching `selector`, in their existing order.
pub fn filter(transactions: &[Transaction], selector: &Selector) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| selector.matches(t))
        .cloned()
        .collect()
}

/// The merged, ordered transactions of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(income: Vec<Transaction>, expense: Vec<Transaction>, order: SortOrder) -> Self {
        let transactions = aggregate(income, expense, order);
        let mut seen = HashSet::new();
        for t in &transactions {
            if !seen.insert(t.id()) {
                warn!("The id '{}' is used by more than one transaction", t.id());
            }
        }
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    /// Totals over every transaction.
    pub fn summary(&self) -> Summary {
        Summary::of(&self.transactions)
    }

    /// Filters and re-summarizes. An empty selection is a valid view with zero totals.
    pub fn view(&self, selector: Selector) -> View {
        let transactions = filter(&self.transactions, &selector);
        let summary = Summary::of(&transactions);
        View {
            selector,
            transactions,
            summary,
        }
    }

    /// `today`'s month if any transaction belongs to it, otherwise `Selector::All`.
    pub fn default_selector(&self, today: Month) -> Selector {
        let current = Period::Month(today);
        if self.transactions.iter().any(|t| t.period() == &current) {
            Selector::Period(current)
        } else {
            Selector::All
        }
    }

    /// The distinct periods, newest first, each with its own totals.
    pub fn periods(&self) -> Vec<PeriodTotals> {
        let mut periods: Vec<&Period> = Vec::new();
        for t in &self.transactions {
            if !periods.contains(&t.period()) {
                periods.push(t.period());
            }
        }
        periods.sort_by_key(|p| Reverse(p.sort_key()));
        periods
            .into_iter()
            .map(|period| PeriodTotals {
                period: period.clone(),
                summary: Summary::of(self.transactions.iter().filter(|t| t.period() == period)),
            })
            .collect()
    }
}

/// The transactions and totals shown for one selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    selector: Selector,
    transactions: Vec<Transaction>,
    summary: Summary,
}

impl View {
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    period: Period,
    summary: Summary,
}

impl PeriodTotals {
    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}
