use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` that points at `api_url`, along with
/// default settings.
///
/// # Arguments
/// - `finance_home` - The directory that will be the root of data directory, e.g. `$HOME/finance`
/// - `api_url` - The SheetDB API URL of the spreadsheet, e.g.
///   https://sheetdb.io/api/v1/ovo0p2ncfaknr
///
/// # Errors
/// - Returns an error if `api_url` is not a usable URL or if any file operations fail.
pub async fn init(finance_home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(finance_home, api_url)
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the finance directory and config at {}",
        config.config_path().display()
    )
    .into())
}
