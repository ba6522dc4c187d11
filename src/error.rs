//! Error handling for the sales library and CLI.
//!
//! Internally everything is an `anyhow::Error` with context attached at each fallible step. At
//! the command surface, errors are tagged with an `ErrorType` so that the message the user sees
//! names the area that failed before the detailed context chain.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad area in which a command failed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or its `config.json` is missing or invalid.
    Config,
    /// The transactions file could not be read or parsed.
    Data,
    /// A command line value, such as a period bound, is invalid.
    Input,
    /// Results could not be rendered into the requested output format.
    Render,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

impl ErrorType {
    fn headline(&self) -> &'static str {
        match self {
            ErrorType::Config => "There is a problem with the sales configuration",
            ErrorType::Data => "There is a problem with the transactions data",
            ErrorType::Input => "Invalid input",
            ErrorType::Render => "Unable to render the results",
        }
    }
}

/// Converts an internal result into one suitable for returning from a command, tagging the error
/// with the `ErrorType` headline.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            e.context(error_type.headline())
        })
    }
}
