//! Error types for the `weathervane-client` crate.

use weathervane_types::UnknownWeather;

/// Errors that can occur on the client side.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv {
        /// Name of the variable.
        name: &'static str,
        /// The raw value.
        value: String,
    },

    /// A weather name was not recognized.
    #[error("unknown weather: {source}")]
    Weather {
        /// The underlying parse error.
        #[from]
        source: UnknownWeather,
    },

    /// A server frame could not be decoded.
    #[error("malformed server message: {source}")]
    Decode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The link to the server is closed.
    #[error("server link closed")]
    LinkClosed,
}
