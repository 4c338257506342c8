//! Error types for the broker client and the translation layer.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::ConId;

/// Errors raised by the broker web client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never produced a response (connection, TLS, timeout).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Broker answered with a non-success status.
    #[error("{endpoint} request failed: {status} - {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    /// Response body did not match the expected shape.
    #[error("failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// A field was missing or held a value that could not be interpreted.
    #[error("invalid {field} in {endpoint} response: {value:?}")]
    InvalidField {
        endpoint: String,
        field: &'static str,
        value: String,
    },

    /// Order submission returned no order id, usually a confirmation prompt.
    #[error("order not acknowledged: {}", .messages.join("; "))]
    OrderNotAcknowledged { messages: Vec<String> },
}

/// Errors surfaced by the adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A retried call failed on every attempt.
    #[error("max retries for {operation} exceeded after {attempts} attempts: {source}")]
    MaxRetriesExceeded {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    /// A paged listing was still returning full pages at the page ceiling.
    #[error("{operation} still returning full pages after {pages} pages")]
    PageLimitExceeded { operation: &'static str, pages: u32 },

    /// Broker returned a snapshot for a contract that was not requested.
    #[error("snapshot returned for conid {0} that is not in the symbol lookup")]
    UnknownContractId(ConId),

    /// Symbol has no contract id in the lookup.
    #[error("no conid known for symbol {0}")]
    UnknownSymbol(String),

    /// Two symbols were mapped to the same contract id.
    #[error("conid {con_id} is mapped to both {existing} and {duplicate}")]
    DuplicateContractId {
        con_id: ConId,
        existing: String,
        duplicate: String,
    },

    /// Order amount cannot be expressed as the broker's numeric quantity.
    #[error("order quantity {0} cannot be sent to the broker")]
    InvalidQuantity(Decimal),

    /// Upstream error passed through unchanged.
    #[error(transparent)]
    Broker(#[from] ApiError),
}

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

impl AdapterError {
    /// The broker error underneath, whether passed through or wrapped by a retry.
    pub fn broker_error(&self) -> Option<&ApiError> {
        match self {
            AdapterError::Broker(e) | AdapterError::MaxRetriesExceeded { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
