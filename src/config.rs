// src/config.rs

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use url::Url;

/// Name the service is registered under with the host service manager.
pub const SERVICE_NAME: &str = "lianke";
/// Human readable description used in unit files and status lines.
pub const SERVICE_DESCRIPTION: &str = "lianke market trade data";

pub const DEFAULT_PORT: u16 = 12345;
pub const DEFAULT_SOURCE_URL: &str = "http://wkbcom.com/wkbcom.php";
pub const DEFAULT_SOURCE_BODY: &str = "name=cjb";
pub const DEFAULT_SOURCE_COOKIE: &str = "name=anny";

/// Runtime configuration derived from environment variables.
///
/// Every variable is optional; unset, blank or unparsable values fall back to
/// the built-in defaults, which are the values the service has always used.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,

    // ── Remote page ────────────────────────────────────────────────
    pub source_url: Url,
    pub source_body: String,
    pub source_cookie: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            bind: get("LIANKE_BIND")
                .and_then(|s| s.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: get("LIANKE_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            source_url: get("LIANKE_SOURCE_URL")
                .and_then(|s| Url::parse(&s).ok())
                .unwrap_or_else(default_source_url),
            source_body: get("LIANKE_SOURCE_BODY")
                .unwrap_or_else(|| DEFAULT_SOURCE_BODY.to_string()),
            source_cookie: get("LIANKE_SOURCE_COOKIE")
                .unwrap_or_else(|| DEFAULT_SOURCE_COOKIE.to_string()),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_source_url() -> Url {
    Url::parse(DEFAULT_SOURCE_URL).expect("default source URL should be valid")
}
