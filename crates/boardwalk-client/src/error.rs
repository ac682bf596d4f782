use std::io;
use std::time::Duration;

use boardwalk_proto::Response;
use thiserror::Error;

/// Failures surfaced by the pairing and session workflows.
///
/// Variants keep the failing phase identifiable: transport failures are
/// split by phase, the three deadline failures stay distinct, and protocol
/// rejections keep the server's status line. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("error connecting to bridge: {0}")]
    Connect(#[source] io::Error),
    #[error("tls error: {0}")]
    Tls(#[source] native_tls::Error),
    #[error("error writing to conn: {0}")]
    Write(#[source] io::Error),
    #[error("error reading from conn: {0}")]
    Read(#[source] io::Error),
    #[error("error encoding request json: {0}")]
    Encode(String),
    #[error("error decoding response json: {0}")]
    Decode(String),
    #[error("timed out writing request to {url}")]
    WriteTimeout { url: String },
    #[error("no response for {url} within {timeout:?}")]
    RequestTimeout {
        url: String,
        timeout: Duration,
        /// Status line of the most recent frame that matched no request,
        /// kept as a diagnostic hint.
        last_status: Option<String>,
    },
    #[error("physical confirmation not received within {0:?}")]
    ConfirmationTimeout(Duration),
    #[error("server returned {status}")]
    Protocol {
        status: String,
        message: Option<String>,
    },
    #[error("unusable trust material: {0}")]
    TrustMaterial(String),
    #[error("error generating signing request: {0}")]
    Keygen(String),
    #[error("connection closed by server")]
    ConnectionClosed,
}

impl ClientError {
    /// A well-formed response that semantically failed: non-success status,
    /// an exception body, or a missing result.
    pub(crate) fn rejection(response: &Response) -> Self {
        ClientError::Protocol {
            status: response
                .header
                .status_code
                .clone()
                .unwrap_or_else(|| "(no status)".to_string()),
            message: response.exception_message().map(str::to_string),
        }
    }
}
