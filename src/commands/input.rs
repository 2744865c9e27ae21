//! Validation of user input. Everything here runs before any request is sent.

use crate::ledger::Selector;
use crate::model::{Amount, Month, Reference};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use std::str::FromStr;

pub(super) fn description(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("The description must not be empty");
    }
    Ok(trimmed.to_string())
}

pub(super) fn amount(raw: &str) -> Result<Amount> {
    Ok(Amount::from_str(raw)?)
}

/// At most one of `period` and `date` may be given.
pub(super) fn reference(period: Option<&str>, date: Option<&str>) -> Result<Option<Reference>> {
    match (period, date) {
        (Some(_), Some(_)) => bail!("Give either a period or a date, not both"),
        (Some(period), None) => Ok(Some(Reference::Month(Month::from_str(period)?))),
        (None, Some(date)) => {
            let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .with_context(|| format!("'{date}' is not a date, expected YYYY-MM-DD"))?;
            Ok(Some(Reference::Date(day)))
        }
        (None, None) => Ok(None),
    }
}

/// `all`, a month, or any other token, which then selects a period that was stored verbatim.
pub(super) fn selector(raw: &str) -> Result<Selector> {
    if raw.trim().is_empty() {
        bail!("The period must not be empty, use 'all' to show every period");
    }
    Ok(Selector::from_str(raw).unwrap_or_else(|_| Selector::period(raw)))
}
