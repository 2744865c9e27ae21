//! Configuration file handling.
//!
//! The configuration file is stored at `$FINANCE_HOME/config.json`. It names the SheetDB API URL,
//! the sheets that hold income and expenses, and how records are addressed, written and shown.

use crate::api::AddressStyle;
use crate::ledger::SortOrder;
use crate::model::PeriodField;
use crate::render::CurrencyStyle;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "finance";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const INCOME_SHEET: &str = "Receitas";
const EXPENSE_SHEET: &str = "Despesas";
const CURRENCY_SYMBOL: &str = "R$";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINANCE_HOME` and from there it loads `$FINANCE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and an initial `config.json` that points at `api_url`, with
    /// default settings for everything else.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/finance`
    /// - `api_url` - The SheetDB API URL, e.g. `https://sheetdb.io/api/v1/ovo0p2ncfaknr`
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not an absolute http(s) URL or if any file operation
    ///   fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finance home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile::new(api_url);
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// Validates that `finance_home` and its config file exist, then loads and validates the
    /// config file.
    pub async fn load(finance_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finance_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Finance home is missing, run 'finance init' first")?;
        let _ = utils::read_dir(&root)
            .await
            .context("Finance home is not a readable directory")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn api_url(&self) -> &Url {
        &self.config_file.api_url
    }

    pub fn income_sheet(&self) -> &str {
        &self.config_file.income_sheet
    }

    pub fn expense_sheet(&self) -> &str {
        &self.config_file.expense_sheet
    }

    pub fn address_style(&self) -> AddressStyle {
        self.config_file.address_style
    }

    pub fn period_field(&self) -> PeriodField {
        self.config_file.period_field
    }

    pub fn sort_order(&self) -> SortOrder {
        self.config_file.sort_order
    }

    pub fn currency_style(&self) -> CurrencyStyle {
        CurrencyStyle::new(
            self.config_file.currency_symbol.clone(),
            self.config_file.decimal_comma,
        )
    }
}

/// Represents the serialization and deserialization format of the configuration file. Only
/// `app_name`, `config_version` and `api_url` are required, everything else has a default.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finance",
///   "config_version": 1,
///   "api_url": "https://sheetdb.io/api/v1/ovo0p2ncfaknr",
///   "income_sheet": "Receitas",
///   "expense_sheet": "Despesas",
///   "address_style": "query",
///   "period_field": "month_reference",
///   "sort_order": "period",
///   "currency_symbol": "R$",
///   "decimal_comma": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finance"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The SheetDB API URL
    api_url: Url,

    /// The sheet that holds income records
    #[serde(default = "default_income_sheet")]
    income_sheet: String,

    /// The sheet that holds expense records
    #[serde(default = "default_expense_sheet")]
    expense_sheet: String,

    /// How a single record is addressed for deletes and updates
    #[serde(default)]
    address_style: AddressStyle,

    /// The column that new and updated records carry their period in
    #[serde(default)]
    period_field: PeriodField,

    /// The order of the aggregated transaction list
    #[serde(default)]
    sort_order: SortOrder,

    /// Printed before currency values
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,

    /// Whether currency values use a decimal comma and dot grouping, e.g. 1.234,56
    #[serde(default = "default_decimal_comma")]
    decimal_comma: bool,
}

fn default_income_sheet() -> String {
    INCOME_SHEET.to_string()
}

fn default_expense_sheet() -> String {
    EXPENSE_SHEET.to_string()
}

fn default_currency_symbol() -> String {
    CURRENCY_SYMBOL.to_string()
}

fn default_decimal_comma() -> bool {
    true
}

impl ConfigFile {
    fn new(api_url: Url) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url,
            income_sheet: default_income_sheet(),
            expense_sheet: default_expense_sheet(),
            address_style: AddressStyle::default(),
            period_field: PeriodField::default(),
            sort_order: SortOrder::default(),
            currency_symbol: default_currency_symbol(),
            decimal_comma: default_decimal_comma(),
        }
    }

    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its contents are invalid.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            !config.income_sheet.trim().is_empty() && !config.expense_sheet.trim().is_empty(),
            "The income_sheet and expense_sheet in the config file must not be empty"
        );
        anyhow::ensure!(
            config.income_sheet != config.expense_sheet,
            "The income_sheet and expense_sheet in the config file must differ, both are '{}'",
            config.income_sheet
        );
        check_api_url(&config.api_url)?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

fn parse_api_url(api_url: &str) -> Result<Url> {
    let url = Url::parse(api_url.trim())
        .with_context(|| format!("The API URL '{api_url}' is not a valid URL"))?;
    check_api_url(&url)?;
    Ok(url)
}

fn check_api_url(url: &Url) -> Result<()> {
    if !matches!(url.scheme(), "http" | "https") {
        bail!("The API URL '{url}' must use http or https");
    }
    if url.query().is_some() {
        bail!("The API URL '{url}' must not carry a query string");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const API_URL: &str = "https://sheetdb.io/api/v1/ovo0p2ncfaknr";

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("finance_home");

        let config = Config::create(&home_dir, API_URL).await.unwrap();

        assert_eq!(config.api_url().as_str(), API_URL);
        assert_eq!(config.income_sheet(), "Receitas");
        assert_eq!(config.expense_sheet(), "Despesas");
        assert_eq!(config.address_style(), AddressStyle::Query);
        assert_eq!(config.period_field(), PeriodField::MonthReference);
        assert_eq!(config.sort_order(), SortOrder::Period);
        assert_eq!(config.currency_style(), CurrencyStyle::default());
        assert!(config.config_path().is_file());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), API_URL).await.unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.config_file, loaded.config_file);
        assert_eq!(created.root(), loaded.root());
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        assert!(Config::create(dir.path(), "not a url").await.is_err());
        assert!(Config::create(dir.path(), "ftp://example.com/api")
            .await
            .is_err());
        assert!(
            Config::create(dir.path(), "https://sheetdb.io/api/v1/x?sheet=Receitas")
                .await
                .is_err()
        );
        assert!(!dir.path().join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_config_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_minimal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(
            &path,
            format!(r#"{{"app_name":"finance","config_version":1,"api_url":"{API_URL}"}}"#),
        )
        .await
        .unwrap();
        let loaded = ConfigFile::load(&path).await.unwrap();
        assert_eq!(loaded, ConfigFile::new(Url::parse(API_URL).unwrap()));
    }

    #[tokio::test]
    async fn test_config_file_custom_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = format!(
            r#"{{
                "app_name": "finance",
                "config_version": 1,
                "api_url": "{API_URL}",
                "income_sheet": "Income",
                "expense_sheet": "Expenses",
                "address_style": "path",
                "period_field": "date",
                "sort_order": "recency",
                "currency_symbol": "$",
                "decimal_comma": false
            }}"#
        );
        utils::write(&path, json).await.unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.income_sheet(), "Income");
        assert_eq!(config.address_style(), AddressStyle::Path);
        assert_eq!(config.period_field(), PeriodField::Date);
        assert_eq!(config.sort_order(), SortOrder::Recency);
        assert_eq!(config.currency_style(), CurrencyStyle::new("$", false));
    }

    #[tokio::test]
    async fn test_config_file_wrong_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(
            &path,
            format!(r#"{{"app_name":"budget","config_version":1,"api_url":"{API_URL}"}}"#),
        )
        .await
        .unwrap();
        let err = ConfigFile::load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_same_sheets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = format!(
            r#"{{"app_name":"finance","config_version":1,"api_url":"{API_URL}",
                "income_sheet":"Dados","expense_sheet":"Dados"}}"#
        );
        utils::write(&path, json).await.unwrap();
        assert!(ConfigFile::load(&path).await.is_err());
    }
}
