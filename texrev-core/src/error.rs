//! Error type for the assistant and provider layers.
//!
//! The diff engine and suggestion session are total and never return errors.
//! Database functions keep returning `tokio_rusqlite::Error` directly; this
//! type wraps it only where a caller mixes storage with provider calls.

use thiserror::Error;

use crate::provider::ProviderKind;

/// Boxed error produced by an injected transport.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// No provider in the settings has the credentials or endpoint it needs.
    #[error("no AI provider is configured")]
    NoProvider,

    #[error("{0} is not configured")]
    NotConfigured(ProviderKind),

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: BoxedError,
    },

    /// The vendor answered with an error payload.
    #[error("{provider} API error: {message}")]
    Api { provider: ProviderKind, message: String },

    #[error("malformed {provider} response: {message}")]
    MalformedResponse { provider: ProviderKind, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] tokio_rusqlite::Error),
}
