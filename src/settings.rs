//! Account settings for the command line.
//!
//! Sources, lowest to highest priority:
//!
//! 1. built-in defaults (public endpoint, 10 second timeout)
//! 2. an optional YAML file passed with `--config`
//! 3. `CHALLONGE_*` environment variables
//!
//! ```yaml
//! username: "organizer"
//! api_key: "your-api-key"
//! base_url: "https://api.challonge.com/v1"
//! timeout_secs: 10
//! ```
use anyhow::{Context, bail};
use challonge_api::ClientConfig;
use challonge_api::client::DEFAULT_BASE_URL;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;

pub const ENV_PREFIX: &str = "CHALLONGE_";

#[derive(Deserialize)]
pub struct Settings {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    pub fn load(config: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = config {
            if !path.is_file() {
                bail!("config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<Settings>()
            .context("failed to read settings")
    }

    /// Credentials are required before anything is sent.
    pub fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let Some(username) = self.username.filter(|u| !u.is_empty()) else {
            bail!("no username configured, set {ENV_PREFIX}USERNAME or `username` in the config file");
        };
        let Some(api_key) = self.api_key.filter(|k| !k.is_empty()) else {
            bail!("no API key configured, set {ENV_PREFIX}API_KEY or `api_key` in the config file");
        };

        let mut config = ClientConfig::new(username, api_key)
            .with_base_url(self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()));
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        Ok(config)
    }
}

// Environment values that look numeric (an all-digit key) arrive as numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Int(int) => int.to_string(),
        Raw::Unsigned(int) => int.to_string(),
        Raw::Float(float) => float.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "challonge.yaml",
                "username: organizer\napi_key: from-file\ntimeout_secs: 30\n",
            )?;
            jail.set_env("CHALLONGE_API_KEY", "from-env");

            let settings = Settings::load(Some(Path::new("challonge.yaml"))).unwrap();
            assert_eq!(settings.username.as_deref(), Some("organizer"));
            assert_eq!(settings.api_key.as_deref(), Some("from-env"));

            let config = settings.into_client_config().unwrap();
            assert_eq!(config.timeout_secs, 30);
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn numeric_api_key_stays_text() {
        Jail::expect_with(|jail| {
            jail.set_env("CHALLONGE_USERNAME", "organizer");
            jail.set_env("CHALLONGE_API_KEY", "123456");
            jail.set_env("CHALLONGE_BASE_URL", "http://localhost:3000/v1");

            let config = Settings::load(None).unwrap().into_client_config().unwrap();
            assert_eq!(config.api_key, "123456");
            assert_eq!(config.base_url, "http://localhost:3000/v1");
            Ok(())
        });
    }

    #[test]
    fn missing_credentials_are_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("CHALLONGE_USERNAME", "organizer");

            let err = Settings::load(None)
                .unwrap()
                .into_client_config()
                .unwrap_err();
            assert!(err.to_string().contains("CHALLONGE_API_KEY"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn missing_config_file_is_an_error() {
        Jail::expect_with(|_| {
            assert!(Settings::load(Some(Path::new("nope.yaml"))).is_err());
            Ok(())
        });
    }
}
