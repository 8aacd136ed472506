use thiserror::Error;

/// The public error surface of the crate (§6.6).
///
/// No other variants are exposed from the core: transport failures map
/// here before a decoder is ever consulted, and decoder/config failures
/// are folded into `BadBody`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("bad url: {0}")]
    BadUrl(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("bad status: {0}")]
    BadStatus(u16),

    #[error("bad body: {0}")]
    BadBody(String),
}
