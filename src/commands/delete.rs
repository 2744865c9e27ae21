//! Delete command handler.

use crate::api::{self, Mode};
use crate::args::DeleteArgs;
use crate::commands::{reload, Out, Report};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::anyhow;

/// Deletes the transaction `args.id()` from the collection of `args.kind()`, then reloads both
/// collections.
///
/// The record is looked up first, so an id that is not in that collection is a `NotFound` error
/// and nothing is deleted.
pub async fn delete(config: Config, mode: Mode, args: DeleteArgs) -> Result<Out<Report>> {
    let id = args.id().trim();
    if id.is_empty() {
        return Err(anyhow!("The id must not be empty")).pub_result(ErrorType::Input);
    }

    let mut store = api::store(&config, mode).pub_result(ErrorType::Config)?;
    let existing = store
        .get(args.kind(), id)
        .await
        .pub_result(ErrorType::Remote)?;
    let Some(existing) = existing else {
        return Err(anyhow!("There is no {} transaction '{id}'", args.kind()))
            .pub_result(ErrorType::NotFound);
    };

    store
        .delete(args.kind(), id)
        .await
        .pub_result(ErrorType::Remote)?;

    let headline = format!(
        "Deleted {} transaction '{}' ({})",
        existing.kind(),
        id,
        existing.description()
    );
    Ok(reload(store.as_mut(), &config, id, headline).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        let salary = env
            .insert_transaction("Salary", "1000", Kind::Income, "06/2025")
            .await;
        let rent = env
            .insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;

        let out = delete(env.config(), Mode::Testing, DeleteArgs::new(&rent, Kind::Expense))
            .await
            .unwrap();
        assert!(out.message().starts_with(&format!(
            "Deleted expense transaction '{rent}' (Rent)"
        )));
        let report = out.structure().unwrap();
        assert_eq!(report.id(), Some(rent.as_str()));
        assert_eq!(report.view().transactions().len(), 1);
        assert_eq!(report.view().transactions()[0].id(), salary);
        assert!(env.get_state().records("Despesas").is_empty());
    }

    #[tokio::test]
    async fn test_delete_wrong_kind_is_not_found() {
        let env = TestEnv::new().await;
        let rent = env
            .insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;

        let err = delete(env.config(), Mode::Testing, DeleteArgs::new(&rent, Kind::Income))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::NotFound));
        assert_eq!(env.get_state().records("Despesas").len(), 1);
    }

    #[tokio::test]
    async fn test_delete_write_failure() {
        let env = TestEnv::new().await;
        let rent = env
            .insert_transaction("Rent", "400", Kind::Expense, "06/2025")
            .await;
        let mut state = env.get_state();
        state.failing_writes = true;
        state.reads = 0;
        env.set_state(state);

        let err = delete(env.config(), Mode::Testing, DeleteArgs::new(&rent, Kind::Expense))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Remote));
        let state = env.get_state();
        assert_eq!(state.records("Despesas").len(), 1);
        // Only the lookup read the collection, there was no reload.
        assert_eq!(state.reads, 1);
    }
}
