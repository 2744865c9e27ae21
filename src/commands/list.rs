//! The read-only `list` and `summary` commands.

use crate::api::{self, Mode};
use crate::args::ViewArgs;
use crate::commands::{describe, input, load, notices, Out, Report};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{Ledger, Selector};
use crate::model::Month;
use crate::render;
use crate::{Config, Result};

/// Shows the transactions of the selected period, newest first, followed by their totals.
///
/// With no period in `args`, the current month is shown if it has transactions, otherwise all
/// of them. A collection that cannot be loaded is reported in the message and left out; it does
/// not fail the command.
pub async fn list(config: Config, mode: Mode, args: ViewArgs) -> Result<Out<Report>> {
    let report = report(&config, mode, &args).await?;
    let message = describe(report.view(), report.failures(), &config.currency_style());
    Ok(Out::new(message, report))
}

/// Like `list`, but the message only carries the totals.
pub async fn summary(config: Config, mode: Mode, args: ViewArgs) -> Result<Out<Report>> {
    let report = report(&config, mode, &args).await?;
    let mut message = notices(report.failures());
    message.push_str(&format!("Totals for {}\n", report.view().selector()));
    message.push_str(&render::summary(
        report.view().summary(),
        &config.currency_style(),
    ));
    Ok(Out::new(message, report))
}

async fn report(config: &Config, mode: Mode, args: &ViewArgs) -> Result<Report> {
    let requested = args
        .period()
        .map(input::selector)
        .transpose()
        .pub_result(ErrorType::Input)?;
    let mut store = api::store(config, mode).pub_result(ErrorType::Config)?;
    let (ledger, failures) = load(store.as_mut(), config).await;
    let selector = requested.unwrap_or_else(|| default_selector(&ledger));
    Ok(Report {
        id: None,
        view: ledger.view(selector),
        failures,
    })
}

fn default_selector(ledger: &Ledger) -> Selector {
    ledger.default_selector(Month::current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_list_period() {
        let env = TestEnv::new().await;
        env.insert_transaction("Salary", "1000", Kind::Income, "06/2025")
            .await;
        env.insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;
        env.insert_transaction("Bonus", "50", Kind::Income, "05/2025")
            .await;

        let out = list(
            env.config(),
            Mode::Testing,
            ViewArgs::new(Some("6/2025".to_string())),
        )
        .await
        .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.view().transactions().len(), 2);
        assert_eq!(report.view().summary().balance(), Decimal::from(600));
        assert!(report.failures().is_empty());
        assert!(out.message().starts_with("2 transactions for 06/2025"));
    }

    #[tokio::test]
    async fn test_list_all_is_ordered_newest_period_first() {
        let env = TestEnv::new().await;
        env.insert_transaction("Bonus", "50", Kind::Income, "05/2025")
            .await;
        env.insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;

        let out = list(
            env.config(),
            Mode::Testing,
            ViewArgs::new(Some("all".to_string())),
        )
        .await
        .unwrap();
        let descriptions: Vec<&str> = out
            .structure()
            .unwrap()
            .view()
            .transactions()
            .iter()
            .map(|t| t.description())
            .collect();
        assert_eq!(descriptions, vec!["Rent", "Bonus"]);
    }

    #[tokio::test]
    async fn test_list_without_period_falls_back_to_all() {
        // Nothing is in the current month, so the default selection is everything.
        let env = TestEnv::new().await;
        env.insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;

        let out = list(env.config(), Mode::Testing, ViewArgs::default())
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.view().selector(), &Selector::All);
        assert_eq!(report.view().transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_list_reports_failed_collection() {
        let env = TestEnv::new().await;
        env.insert_transaction("Salary", "1000", Kind::Income, "06/2025")
            .await;
        env.insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;
        let mut state = env.get_state();
        state.failing_reads.insert("Receitas".to_string());
        env.set_state(state);

        let out = list(
            env.config(),
            Mode::Testing,
            ViewArgs::new(Some("06/2025".to_string())),
        )
        .await
        .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].kind, Kind::Income);
        assert_eq!(report.view().transactions().len(), 1);
        assert_eq!(report.view().summary().balance(), Decimal::from(-400));
        assert!(out
            .message()
            .starts_with("Unable to load the income transactions"));
    }

    #[tokio::test]
    async fn test_summary_message() {
        let env = TestEnv::new().await;
        env.insert_transaction("Salary", "1000", Kind::Income, "06/2025")
            .await;
        env.insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;

        let out = summary(
            env.config(),
            Mode::Testing,
            ViewArgs::new(Some("07/2025".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(
            out.message(),
            "Totals for 07/2025\nIncome: R$ 0,00  Expense: R$ 0,00  Balance: R$ 0,00"
        );
        assert_eq!(out.structure().unwrap().view().summary().count(), 0);
    }

    #[tokio::test]
    async fn test_list_rejects_empty_period() {
        let env = TestEnv::new().await;
        let err = list(
            env.config(),
            Mode::Testing,
            ViewArgs::new(Some(" ".to_string())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Input));
    }
}
