use crate::api::{self, Mode};
use crate::commands::{load, notices, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::PeriodTotals;
use crate::render;
use crate::{Config, Result};

/// Lists every period that has transactions, newest first, with the totals of each. Unparsed
/// periods come last.
pub async fn periods(config: Config, mode: Mode) -> Result<Out<Vec<PeriodTotals>>> {
    let mut store = api::store(&config, mode).pub_result(ErrorType::Config)?;
    let (ledger, failures) = load(store.as_mut(), &config).await;
    let periods = ledger.periods();
    let mut message = notices(&failures);
    message.push_str(&render::periods(&periods, &config.currency_style()));
    Ok(Out::new(message, periods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_periods() {
        let env = TestEnv::new().await;
        env.insert_transaction("Bonus", "50", Kind::Income, "05/2025")
            .await;
        env.insert_transaction("Salary", "1000", Kind::Income, "06/2025")
            .await;
        env.insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;

        let out = periods(env.config(), Mode::Testing).await.unwrap();
        let periods = out.structure().unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].period().to_string(), "06/2025");
        assert_eq!(periods[0].summary().balance(), Decimal::from(600));
        assert_eq!(periods[1].period().to_string(), "05/2025");
        assert!(out.message().starts_with("06/2025  Income: R$ 1.000,00"));
    }

    #[tokio::test]
    async fn test_periods_empty() {
        let env = TestEnv::new().await;
        let out = periods(env.config(), Mode::Testing).await.unwrap();
        assert_eq!(out.message(), "No transactions found");
        assert!(out.structure().unwrap().is_empty());
    }
}
