use crate::api::{self, Mode};
use crate::args::InsertArgs;
use crate::commands::{input, reload, Out, Report};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Month, Reference, Transaction};
use crate::{Config, Result};
use tracing::debug;

/// Adds a transaction to the collection of its kind, then reloads both collections.
///
/// A new id and the current time are assigned. Without a period or date the transaction goes to
/// the current month.
///
/// # Returns
///
/// On success, returns an `Out` containing a message with the new id above the refreshed view,
/// and a `Report` carrying the id and that view.
///
/// # Errors
///
/// - An `Input` error if the description is empty, the amount is not a non-negative number or
///   the period or date cannot be read. Nothing is sent in that case.
/// - A `Remote` error if the service rejects the write. No reload happens in that case.
pub async fn insert(config: Config, mode: Mode, args: InsertArgs) -> Result<Out<Report>> {
    let (description, amount, reference) = validate(&args).pub_result(ErrorType::Input)?;
    let reference = reference.unwrap_or_else(|| Reference::Month(Month::current()));
    let transaction = Transaction::create(description, amount, args.kind(), reference);
    debug!("Inserting {transaction:?}");

    let mut store = api::store(&config, mode).pub_result(ErrorType::Config)?;
    store
        .create(&transaction)
        .await
        .pub_result(ErrorType::Remote)?;

    let headline = format!(
        "Added {} transaction '{}'",
        transaction.kind(),
        transaction.id()
    );
    Ok(reload(store.as_mut(), &config, transaction.id(), headline).await)
}

fn validate(args: &InsertArgs) -> Result<(String, Amount, Option<Reference>)> {
    Ok((
        input::description(args.description())?,
        input::amount(args.amount())?,
        input::reference(args.period(), args.date())?,
    ))
}
