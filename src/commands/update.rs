//! Update command handler.

use crate::api::{self, Mode};
use crate::args::UpdateArgs;
use crate::commands::{input, reload, Out, Report};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Transaction, TransactionChanges};
use crate::{Config, Result};
use anyhow::{anyhow, bail};
use tracing::debug;

/// Changes the transaction `args.id()` in the collection of `args.kind()`, then reloads both
/// collections.
///
/// The current record is read first and the changes are applied to it, so the full record is
/// always written and fields that were not given keep their values. The id and creation time
/// never change. When `args.new_kind()` differs from `args.kind()` the record is added to the
/// other collection and then removed from its current one.
///
/// # Errors
///
/// - An `Input` error if no change is given, a given value cannot be read, or the record would
///   move to the other collection without a readable amount.
/// - A `NotFound` error if the collection has no record with that id.
/// - A `Remote` error if the service fails. No reload happens in that case.
pub async fn update(config: Config, mode: Mode, args: UpdateArgs) -> Result<Out<Report>> {
    let changes = changes(&args).pub_result(ErrorType::Input)?;
    let id = args.id().trim();

    let mut store = api::store(&config, mode).pub_result(ErrorType::Config)?;
    let existing = store
        .get(args.kind(), id)
        .await
        .pub_result(ErrorType::Remote)?;
    let Some(existing) = existing else {
        return Err(anyhow!("There is no {} transaction '{id}'", args.kind()))
            .pub_result(ErrorType::NotFound);
    };

    // A moved record is written whole to the other sheet, so an unreadable amount would be lost.
    if moves_kind(&existing, &changes) && existing.amount().is_none() && changes.amount.is_none() {
        return Err(anyhow!(
            "Transaction '{id}' has an unreadable amount, give --amount to move it"
        ))
        .pub_result(ErrorType::Input);
    }

    let revised = existing.revise(&changes);
    debug!("Updating {existing:?} to {revised:?}");
    store
        .update(existing.kind(), &revised)
        .await
        .pub_result(ErrorType::Remote)?;

    let headline = if revised.kind() == existing.kind() {
        format!("Updated {} transaction '{id}'", revised.kind())
    } else {
        format!(
            "Moved transaction '{id}' from {} to {}",
            existing.kind(),
            revised.kind()
        )
    };
    Ok(reload(store.as_mut(), &config, id, headline).await)
}

fn moves_kind(existing: &Transaction, changes: &TransactionChanges) -> bool {
    changes.kind.is_some_and(|kind| kind != existing.kind())
}

fn changes(args: &UpdateArgs) -> Result<TransactionChanges> {
    if args.id().trim().is_empty() {
        bail!("The id must not be empty");
    }
    let changes = TransactionChanges {
        description: args.description().map(input::description).transpose()?,
        amount: args.amount().map(input::amount).transpose()?,
        kind: args.new_kind(),
        reference: input::reference(args.period(), args.date())?,
    };
    if changes.is_empty() {
        bail!("Nothing to update, give at least one of --description, --amount, --new-kind, --period or --date");
    }
    Ok(changes)
}
