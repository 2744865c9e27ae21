//! The crate error type and the classification applied to errors leaving a command handler.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The class of a failure that is reported to the user. It is attached to the error as context,
/// so it shows up as the outermost message and can be recovered with
/// `error.downcast_ref::<ErrorType>()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or its config file is missing or invalid.
    Config,
    /// The remote collection service failed or returned a non-success status.
    Remote,
    /// User input was rejected before anything was sent.
    Input,
    /// The addressed record does not exist.
    NotFound,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = serde_plain::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{} error", name.replace('_', " "))
    }
}

/// Classifies the error of a `Result` before it is returned from a public command.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}
