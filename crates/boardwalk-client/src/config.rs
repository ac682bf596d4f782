use std::env;
use std::time::Duration;

/// Configuration shared by the pairing and session profiles. Passed
/// explicitly at construction; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Port of the pairing (bootstrap trust) profile.
    pub pairing_port: u16,
    /// Port of the authenticated session profile.
    pub session_port: u16,
    /// Deadline applied independently to request writes and response waits.
    pub request_timeout: Duration,
    /// Overall deadline for the physical-confirmation phase of pairing.
    pub confirmation_timeout: Duration,
    /// When set, every wire frame is also logged as indented JSON.
    pub trace_wire: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pairing_port: 8083,
            session_port: 8081,
            request_timeout: Duration::from_secs(10),
            confirmation_timeout: Duration::from_secs(180),
            trace_wire: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `BOARDWALK_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pairing_port: env_u16("BOARDWALK_PAIRING_PORT", defaults.pairing_port),
            session_port: env_u16("BOARDWALK_SESSION_PORT", defaults.session_port),
            request_timeout: env_secs("BOARDWALK_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            confirmation_timeout: env_secs(
                "BOARDWALK_CONFIRMATION_TIMEOUT_SECS",
                defaults.confirmation_timeout,
            ),
            trace_wire: env::var("BOARDWALK_TRACE_WIRE")
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.trace_wire),
        }
    }
}

fn env_u16(key: &str, fallback: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

fn env_secs(key: &str, fallback: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}
