//! These structs provide the CLI interface for the finance CLI.

use crate::model::Kind;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finance: A command-line tool for recording income and expenses.
///
/// Transactions are stored in a spreadsheet served through the SheetDB API
/// (see https://sheetdb.io), with income in one sheet and expenses in another. This program merges
/// the two, orders them by month and shows totals and the balance for the month you pick.
///
/// Every change is written to the spreadsheet first and then everything is reloaded, so what you
/// see is always what the spreadsheet holds.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and its configuration file.
    ///
    /// This is the first command you should run. You need the API URL of your SheetDB
    /// spreadsheet, which looks like https://sheetdb.io/api/v1/ovo0p2ncfaknr. The data directory
    /// defaults to $HOME/finance, pass --finance-home to put it somewhere else.
    ///
    /// Sheet names, the record address style and the display currency can be changed afterwards
    /// in $FINANCE_HOME/config.json.
    Init(InitArgs),
    /// Show the transactions of a month, or of all months, with their totals.
    List(ViewArgs),
    /// Show only the totals and the balance of a month, or of all months.
    Summary(ViewArgs),
    /// List every month that has transactions, newest first, with its totals.
    Periods,
    /// Add a transaction.
    Insert(InsertArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// Change a transaction. Only the fields you pass are changed.
    Update(UpdateArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration is held. Defaults to ~/finance
    #[arg(long, env = "FINANCE_HOME", default_value_t = default_finance_home())]
    finance_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finance_home(&self) -> &DisplayPath {
        &self.finance_home
    }
}

/// (Not shown): Args for the `finance init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The SheetDB API URL of your spreadsheet, e.g. https://sheetdb.io/api/v1/ovo0p2ncfaknr
    #[arg(long)]
    api_url: String,
}

impl InitArgs {
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// (Not shown): Args for the `finance list` and `finance summary` commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct ViewArgs {
    /// The month to show, as MM/YYYY or YYYY-MM, or "all". Defaults to the current month when it
    /// has transactions, otherwise all.
    #[arg(long)]
    period: Option<String>,
}

impl ViewArgs {
    pub fn new(period: Option<String>) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }
}

/// (Not shown): Args for the `finance insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    /// What the money was for.
    #[arg(long)]
    description: String,

    /// A non-negative amount, e.g. 1234.56 or 1.234,56.
    #[arg(long)]
    amount: String,

    /// Whether this is income or an expense.
    #[arg(long, value_enum)]
    kind: Kind,

    /// The month the transaction belongs to, as MM/YYYY or YYYY-MM. Defaults to the current
    /// month.
    #[arg(long, conflicts_with = "date")]
    period: Option<String>,

    /// The day of the transaction, as YYYY-MM-DD. The month is taken from it.
    #[arg(long)]
    date: Option<String>,
}

impl InsertArgs {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: Kind,
        period: Option<String>,
        date: Option<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind,
            period,
            date,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// (Not shown): Args for the `finance delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction.
    #[arg(long)]
    id: String,

    /// The collection the transaction is in.
    #[arg(long, value_enum)]
    kind: Kind,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>, kind: Kind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// (Not shown): Args for the `finance update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the transaction.
    #[arg(long)]
    id: String,

    /// The collection the transaction is in now.
    #[arg(long, value_enum)]
    kind: Kind,

    /// A new description.
    #[arg(long)]
    description: Option<String>,

    /// A new non-negative amount.
    #[arg(long)]
    amount: Option<String>,

    /// Move the transaction to the other collection.
    #[arg(long, value_enum)]
    new_kind: Option<Kind>,

    /// A new month, as MM/YYYY or YYYY-MM.
    #[arg(long, conflicts_with = "date")]
    period: Option<String>,

    /// A new day, as YYYY-MM-DD.
    #[arg(long)]
    date: Option<String>,
}

impl UpdateArgs {
    pub fn new(id: impl Into<String>, kind: Kind) -> Self {
        Self {
            id: id.into(),
            kind,
            description: None,
            amount: None,
            new_kind: None,
            period: None,
            date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_new_kind(mut self, kind: Kind) -> Self {
        self.new_kind = Some(kind);
        self
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn new_kind(&self) -> Option<Kind> {
        self.new_kind
    }

    pub fn period(&self) -> Option<&str> {
        self.period.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

fn default_finance_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finance"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finance-home or FINANCE_HOME instead of relying on the \
                default finance home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("finance")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
