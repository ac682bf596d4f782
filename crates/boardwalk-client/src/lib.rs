//! Client for pairing with and controlling a home-automation bridge.
//!
//! The bridge speaks CRLF-terminated JSON frames over TLS, on two
//! connection profiles:
//! - the pairing profile, reached with pre-provisioned bootstrap trust,
//!   which turns a physical button press on the bridge into issued
//!   credentials;
//! - the session profile, authenticated with those credentials, for
//!   ordinary read/execute requests.
//!
//! Every request flows through a per-connection dispatcher that correlates
//! responses by client tag, so concurrent callers never consume each
//! other's frames. Wire shapes live in `boardwalk-proto`.

pub mod config;
pub mod conn;
mod csr;
pub mod error;
pub mod pairing;
pub mod session;
mod tls;
mod trace;
pub mod trust;

pub use config::ClientConfig;
pub use conn::Connection;
pub use error::ClientError;
pub use pairing::PairingClient;
pub use session::SessionClient;
pub use trust::{BootstrapTrust, TrustBundle};
