//! Interception layer errors.

use displaydoc::Display;
use thiserror::Error;

/// Setup-time errors.
///
/// These are fatal: they abort the installation or override step that caused
/// them rather than being folded into a mocked response. Errors that *are*
/// folded into responses (simulated operation errors, execution errors) never
/// take this form; see [`crate::RootValue`].
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum SetupError {
    /// base mocks were already set for this process
    BaseMocksAlreadySet,

    /// base configuration was already set for this process
    BaseConfigurationAlreadySet,

    /// a schema is required: none was provided and no base configuration supplies one
    SchemaRequired,

    /// schema is invalid: {message}
    InvalidSchema {
        /// The compiler's validation output.
        message: String,
    },

    /// introspection result could not be converted to a schema: {message}
    InvalidIntrospection {
        /// The reason the conversion failed.
        message: String,
    },

    /// no mock session is registered under '{name}'
    UnknownSession {
        /// The session key that was looked up.
        name: String,
    },
}
