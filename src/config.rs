//! Client and gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Loading goes through a lookup
//! function so tests can supply variables without touching the process
//! environment.

use std::time::Duration;

use crate::error::ClientError;

/// Customer name stamped on response envelopes when none is configured.
pub const DEFAULT_CUSTOMER_NAME: &str = "Maersk";

/// Realtime session client configuration.
///
/// Loaded once at startup via [`SessionConfig::from_env`].
#[derive(Clone)]
pub struct SessionConfig {
    /// Backend hostname shared by both channels.
    pub hostname: String,

    /// Login user name.
    pub username: String,

    /// Login password. Never logged.
    pub password: String,

    /// JSON protocol version placed in every request.
    pub protocol_version: u32,

    /// Port of the authentication WebSocket.
    pub auth_port: u16,

    /// Port of the realtime situation WebSocket.
    pub realtime_situation_port: u16,

    /// Use `wss://` instead of `ws://`.
    pub use_tls: bool,

    /// Upper bound on the whole session run.
    pub session_timeout: Duration,

    /// Capacity of the per-channel outbound queue and the event queue.
    pub channel_buffer: usize,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("protocol_version", &self.protocol_version)
            .field("auth_port", &self.auth_port)
            .field("realtime_situation_port", &self.realtime_situation_port)
            .field("use_tls", &self.use_tls)
            .field("session_timeout", &self.session_timeout)
            .field("channel_buffer", &self.channel_buffer)
            .finish()
    }
}

impl SessionConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `WNT_HOSTNAME`, `WNT_USERNAME` or
    /// `WNT_PASSWORD` is missing.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if a required variable is missing
    /// or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hostname = required(&lookup, "WNT_HOSTNAME")?;
        let username = required(&lookup, "WNT_USERNAME")?;
        let password = required(&lookup, "WNT_PASSWORD")?;

        Ok(Self {
            hostname,
            username,
            password,
            protocol_version: parse_var(&lookup, "WNT_PROTOCOL_VERSION", 2),
            auth_port: parse_var(&lookup, "WNT_AUTH_PORT", 8813),
            realtime_situation_port: parse_var(&lookup, "WNT_REALTIME_SITUATION_PORT", 8814),
            use_tls: parse_var_bool(&lookup, "WNT_USE_TLS", true),
            session_timeout: Duration::from_secs(parse_var(
                &lookup,
                "WNT_SESSION_TIMEOUT_SECS",
                5 * 60,
            )),
            channel_buffer: parse_var(&lookup, "WNT_CHANNEL_BUFFER", 64).max(1),
        })
    }

    /// URL of the authentication channel.
    #[must_use]
    pub fn authentication_url(&self) -> String {
        self.url(self.auth_port)
    }

    /// URL of the realtime situation channel.
    #[must_use]
    pub fn realtime_situation_url(&self) -> String {
        self.url(self.realtime_situation_port)
    }

    fn url(&self, port: u16) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{scheme}://{}:{port}", self.hostname)
    }
}

/// Log filter used when `RUST_LOG` is unset: `LOG_LEVEL`, else `info`.
///
/// Read on its own so logging can start before [`SessionConfig`] is
/// validated.
#[must_use]
pub fn log_level() -> String {
    dotenvy::dotenv().ok();
    log_level_from_lookup(|key| std::env::var(key).ok())
}

fn log_level_from_lookup<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LOG_LEVEL")
        .filter(|level| !level.is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Identity the gateway reports in its responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayIdentity {
    /// Customer name stamped on every envelope.
    pub customer_name: String,
    /// Unique gateway identifier.
    pub gw_id: String,
    /// Application firmware version.
    pub app_software: String,
    /// Mesh stack version.
    pub mesh_software: String,
    /// Device identifier of the cellular modem.
    pub imsi: String,
}

impl GatewayIdentity {
    /// Loads the gateway identity from environment variables.
    ///
    /// Every key is optional; see [`GatewayIdentity::from_lookup`].
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the identity from an arbitrary variable lookup, falling back
    /// to [`DEFAULT_CUSTOMER_NAME`] and a `gateway` id.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            customer_name: lookup("GATEWAY_CUSTOMER_NAME")
                .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
            gw_id: lookup("GATEWAY_ID").unwrap_or_else(|| "gateway".to_string()),
            app_software: lookup("GATEWAY_APP_SOFTWARE").unwrap_or_default(),
            mesh_software: lookup("GATEWAY_MESH_SOFTWARE").unwrap_or_default(),
            imsi: lookup("GATEWAY_IMSI").unwrap_or_default(),
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ClientError::Config(format!("{key} is not set"))),
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Parses a variable as a boolean. Accepts `"true"`, `"1"`, `"false"`,
/// `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_var_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
