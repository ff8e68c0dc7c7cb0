// src/error.rs

use std::net::SocketAddr;

/// Every failure the service can name.
///
/// `ParseFailed` and `SerializeFailed` never leave their modules through the
/// default entry points (`extract::extract`, `publish::publish`); they exist so
/// the fallible variants can be tested and logged. `FetchFailed`,
/// `LifecycleFailed`, `BindFailed` and `Signal` reach the operator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fetch {url} failed: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("parse failed: {0}")]
    ParseFailed(String),

    #[error("serialize failed: {0}")]
    SerializeFailed(#[from] serde_json::Error),

    #[error("{action} failed: {reason}")]
    LifecycleFailed { action: &'static str, reason: String },

    #[error("cannot listen on {addr}: {reason}")]
    BindFailed { addr: SocketAddr, reason: String },

    #[error("installing signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn lifecycle(action: &'static str, reason: impl ToString) -> Self {
        Self::LifecycleFailed {
            action,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
