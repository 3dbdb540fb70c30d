use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

const DEFAULT_SERVER_URL: &str = "https://platform.ringcentral.com";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PLATFORM_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub platform_timeout: Duration,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Config {
    /// Load a [`Config`] from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the file can't be read, [`Error::InvalidJSON`] if it isn't a
    /// valid config, and [`Error::InvalidConfig`] if the app credentials are empty.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.has_app_credentials()?;
        Ok(conf)
    }

    /// Load a [`Config`] from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a [`Config`] from variables resolved by `lookup`. Empty values count as unset.
    ///
    /// `PORT` falls back to 8080 when it doesn't parse; the other numeric settings are strict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `RINGCENTRAL_CLIENT_ID` or
    /// `RINGCENTRAL_CLIENT_SECRET` is missing, or a numeric setting is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = var("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let api_bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid listen address {host}:{port}")))?;

        let conf = Config {
            server_url: var("RINGCENTRAL_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            client_id: var("RINGCENTRAL_CLIENT_ID").unwrap_or_default(),
            client_secret: var("RINGCENTRAL_CLIENT_SECRET").unwrap_or_default(),
            api_bind_addr,
            api_timeout: Duration::from_secs(parse_or(
                var("API_TIMEOUT_SECS"),
                "API_TIMEOUT_SECS",
                DEFAULT_API_TIMEOUT_SECS,
            )?),
            platform_timeout: Duration::from_secs(parse_or(
                var("PLATFORM_TIMEOUT_SECS"),
                "PLATFORM_TIMEOUT_SECS",
                DEFAULT_PLATFORM_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_or(
                var("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        };
        conf.has_app_credentials()?;
        Ok(conf)
    }

    fn has_app_credentials(&self) -> Result<(), Error> {
        if self.client_id.is_empty() {
            return Err(Error::InvalidConfig("RINGCENTRAL_CLIENT_ID is not set".into()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::InvalidConfig(
                "RINGCENTRAL_CLIENT_SECRET is not set".into(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, Error> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("{key} is not a valid number: \"{raw}\""))),
    }
}
