//! Connection settings for the NSX-T Manager.

use std::fmt;

use serde::{Deserialize, Serialize};

/// NSX-T Manager connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Base URL of the manager, e.g. `https://nsx.example.com`.
    #[serde(default)]
    pub url: String,

    /// API user.
    #[serde(default)]
    pub username: String,

    /// API password.
    #[serde(default)]
    pub password: String,

    /// Skip TLS certificate verification (self-signed manager certificates).
    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            insecure: false,
            timeout_secs: default_timeout(),
        }
    }
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
