//! Text presentation of views and totals. Nothing in here feeds back into the pipeline.

use crate::ledger::{PeriodTotals, View};
use crate::model::{Summary, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

/// How currency values are written, e.g. `R$ 1.234,56` or `$ 1,234.56`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyStyle {
    symbol: String,
    decimal_comma: bool,
}

impl CurrencyStyle {
    pub fn new(symbol: impl Into<String>, decimal_comma: bool) -> Self {
        Self {
            symbol: symbol.into(),
            decimal_comma,
        }
    }

    /// Formats `value` with two decimals and digit grouping. A negative value keeps its minus sign
    /// right before the digits: `R$ -40,00`.
    pub fn format(&self, value: Decimal) -> String {
        let rounded = value.round_dp(2);
        let grouped = format_num::format_num!(",.2f", rounded.abs().to_f64().unwrap_or_default());
        let localized = if self.decimal_comma {
            grouped
                .chars()
                .map(|c| match c {
                    ',' => '.',
                    '.' => ',',
                    c => c,
                })
                .collect()
        } else {
            grouped
        };
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        if self.symbol.is_empty() {
            format!("{sign}{localized}")
        } else {
            format!("{} {sign}{localized}", self.symbol)
        }
    }
}

impl Default for CurrencyStyle {
    fn default() -> Self {
        Self::new("R$", true)
    }
}

/// One line per transaction.
pub fn transaction_line(transaction: &Transaction, style: &CurrencyStyle) -> String {
    let amount = match transaction.amount() {
        Some(amount) => style.format(amount.value()),
        None => String::from("(invalid amount)"),
    };
    format!(
        "{} ({})  {} {}  [{}] {}",
        transaction.description(),
        transaction.period(),
        transaction.kind().sign(),
        amount,
        transaction.kind(),
        transaction.id()
    )
}

pub fn summary(summary: &Summary, style: &CurrencyStyle) -> String {
    let mut out = format!(
        "Income: {}  Expense: {}  Balance: {}",
        style.format(summary.total_income()),
        style.format(summary.total_expense()),
        style.format(summary.balance())
    );
    if summary.invalid() > 0 {
        let _ = write!(
            out,
            "  ({} transaction{} with an unreadable amount left out)",
            summary.invalid(),
            if summary.invalid() == 1 { "" } else { "s" }
        );
    }
    out
}

/// The rows of a view followed by its totals.
pub fn view(view: &View, style: &CurrencyStyle) -> String {
    let mut out = String::new();
    let count = view.transactions().len();
    let _ = writeln!(
        out,
        "{} transaction{} for {}",
        count,
        if count == 1 { "" } else { "s" },
        view.selector()
    );
    for transaction in view.transactions() {
        let _ = writeln!(out, "  {}", transaction_line(transaction, style));
    }
    out.push_str(&summary(view.summary(), style));
    out
}

pub fn periods(periods: &[PeriodTotals], style: &CurrencyStyle) -> String {
    if periods.is_empty() {
        return String::from("No transactions found");
    }
    periods
        .iter()
        .map(|p| format!("{}  {}", p.period(), summary(p.summary(), style)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, Selector, SortOrder};
    use crate::model::{Amount, Kind, Period};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_decimal_comma() {
        let style = CurrencyStyle::default();
        assert_eq!(style.format(dec("1234.5")), "R$ 1.234,50");
        assert_eq!(style.format(dec("0")), "R$ 0,00");
        assert_eq!(style.format(dec("-40")), "R$ -40,00");
    }

    #[test]
    fn test_format_decimal_point_without_symbol() {
        let style = CurrencyStyle::new("", false);
        assert_eq!(style.format(dec("1234567.891")), "1,234,567.89");
    }

    #[test]
    fn test_view_rendering() {
        let ledger = Ledger::new(
            vec![Transaction::new(
                "a",
                "Salary",
                Some(Amount::from_str("1000").unwrap()),
                Kind::Income,
                Period::normalize("06/2025"),
                "2025-06-01T00:00:00Z",
            )],
            vec![Transaction::new(
                "b",
                "Rent",
                None,
                Kind::Expense,
                Period::normalize("06/2025"),
                "2025-06-02T00:00:00Z",
            )],
            SortOrder::Period,
        );
        let text = view(&ledger.view(Selector::All), &CurrencyStyle::default());
        assert!(text.starts_with("2 transactions for all\n"));
        assert!(text.contains("Salary (06/2025)  + R$ 1.000,00  [income] a"));
        assert!(text.contains("Rent (06/2025)  - (invalid amount)  [expense] b"));
        assert!(text.ends_with(
            "Balance: R$ 1.000,00  (1 transaction with an unreadable amount left out)"
        ));
    }
}
