mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod render;
mod utils;

pub use api::{AddressStyle, LoadFailure, Mode};
pub use config::Config;
pub use error::{Error, ErrorType, Result};
