//! Runtime settings read from the environment (a `.env` file is loaded first by the binary).

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Store secrets are optional here: their absence is reported per request by the config guard.
#[derive(Clone, Debug)]
pub struct Settings {
    pub store_url: Option<String>,
    pub store_anon_key: Option<String>,
    pub store_service_key: Option<String>,
    pub store_max_connections: u32,
    pub store_bootstrap: bool,
    pub storage_bucket: String,
    pub storage_endpoint: Option<String>,
    pub storage_region: String,
    /// Base for public object URLs. Derived from endpoint and bucket when unset.
    pub storage_public_url: Option<String>,
    pub export_utc_offset_hours: i32,
    pub bind_addr: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store_url: None,
            store_anon_key: None,
            store_service_key: None,
            store_max_connections: 5,
            store_bootstrap: false,
            storage_bucket: "catalog".into(),
            storage_endpoint: None,
            storage_region: "us-east-1".into(),
            storage_public_url: None,
            export_utc_offset_hours: 0,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        fn parse<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, SettingsError> {
            match raw {
                None => Ok(default),
                Some(v) => v.parse().map_err(|_| SettingsError::Invalid { key, value: v }),
            }
        }

        let store_bootstrap = match get("STORE_BOOTSTRAP").as_deref() {
            None => defaults.store_bootstrap,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => {
                return Err(SettingsError::Invalid {
                    key: "STORE_BOOTSTRAP",
                    value: other.to_string(),
                })
            }
        };

        Ok(Settings {
            store_url: get("STORE_URL"),
            store_anon_key: get("STORE_ANON_KEY"),
            store_service_key: get("STORE_SERVICE_ROLE_KEY"),
            store_max_connections: parse(
                "STORE_MAX_CONNECTIONS",
                get("STORE_MAX_CONNECTIONS"),
                defaults.store_max_connections,
            )?,
            store_bootstrap,
            storage_bucket: get("STORAGE_BUCKET").unwrap_or(defaults.storage_bucket),
            storage_endpoint: get("STORAGE_ENDPOINT"),
            storage_region: get("STORAGE_REGION").unwrap_or(defaults.storage_region),
            storage_public_url: get("STORAGE_PUBLIC_URL"),
            export_utc_offset_hours: parse(
                "EXPORT_UTC_OFFSET_HOURS",
                get("EXPORT_UTC_OFFSET_HOURS"),
                defaults.export_utc_offset_hours,
            )?,
            bind_addr: parse("BIND_ADDR", get("BIND_ADDR"), defaults.bind_addr)?,
        })
    }
}
