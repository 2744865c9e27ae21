//! Command handlers for the finance CLI.
//!
//! This module contains implementations for all CLI subcommands. Reading commands load both
//! collections and derive a view. Writing commands send one change and, only when it succeeds,
//! reload everything and derive a fresh view from what the service now holds.

mod delete;
mod init;
mod input;
mod insert;
mod list;
mod periods;
mod update;

use crate::api::{LoadFailure, Store};
use crate::ledger::{Ledger, View};
use crate::model::Month;
use crate::render::{self, CurrencyStyle};
use crate::Config;
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Write;
use tracing::{debug, info};

pub use delete::delete;
pub use init::init;
pub use insert::insert;
pub use list::{list, summary};
pub use periods::periods;
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The structured output of a command that shows a view: the view itself, the collections that
/// could not be loaded and, for a write, the id of the transaction written.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    view: View,
    failures: Vec<LoadFailure>,
}

impl Report {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }
}

/// Loads both collections into a new `Ledger`. Collections that fail are empty and returned as
/// failures.
async fn load(store: &mut (dyn Store + Send), config: &Config) -> (Ledger, Vec<LoadFailure>) {
    let loaded = store.load().await;
    let ledger = Ledger::new(loaded.income, loaded.expense, config.sort_order());
    debug!("Loaded {} transactions", ledger.len());
    (ledger, loaded.failures)
}

/// Reloads after a successful write and reports `headline` above the fresh default view.
async fn reload(
    store: &mut (dyn Store + Send),
    config: &Config,
    id: &str,
    headline: String,
) -> Out<Report> {
    let (ledger, failures) = load(store, config).await;
    let view = ledger.view(ledger.default_selector(Month::current()));
    let style = config.currency_style();
    let message = format!("{headline}\n{}", describe(&view, &failures, &style));
    Out::new(
        message,
        Report {
            id: Some(id.to_string()),
            view,
            failures,
        },
    )
}

/// The rendered view, preceded by a notice for each collection that could not be loaded.
fn describe(view: &View, failures: &[LoadFailure], style: &CurrencyStyle) -> String {
    let mut out = notices(failures);
    out.push_str(&render::view(view, style));
    out
}

fn notices(failures: &[LoadFailure]) -> String {
    let mut out = String::new();
    for failure in failures {
        let _ = writeln!(
            out,
            "Unable to load the {} transactions, they are left out: {}",
            failure.kind, failure.message
        );
    }
    out
}
