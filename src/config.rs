use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_HOST: &str = "https://api.berbix.com/";

const SECRET_ENV: &str = "BERBIX_API_SECRET";
const HOST_ENV: &str = "BERBIX_API_HOST";

/// Client configuration, suitable for embedding in an application's own
/// configuration file.
#[derive(Deserialize, Clone)]
pub struct Config {
    /// API secret from the dashboard. Sent as the Basic auth username.
    pub secret: String,
    /// API host, defaults to [DEFAULT_HOST].
    #[serde(default)]
    pub host: Option<BaseUrl>,
}

impl Config {
    /// Read `BERBIX_API_SECRET` and, optionally, `BERBIX_API_HOST`.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var(SECRET_ENV).with_context(|| format!("{SECRET_ENV} is not set"))?;
        let host = match std::env::var(HOST_ENV) {
            Ok(host) if !host.is_empty() => Some(
                BaseUrl::try_from(host).with_context(|| format!("{HOST_ENV} is not a valid url"))?,
            ),
            _ => None,
        };
        Ok(Self { secret, host })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

/// A url that is always a base (can be safely join()'ed with further path elements without
/// mangling).
#[derive(Deserialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Resolve an endpoint path relative to this base.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.0.join(path.trim_start_matches('/'))
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_HOST).expect("default host is a valid url"))
    }
}

impl std::ops::Deref for BaseUrl {
    type Target = Url;

    fn deref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = url::ParseError;

    fn try_from(mut url: String) -> Result<Self, Self::Error> {
        // Make URL a base.
        if !url.ends_with('/') {
            url += "/"
        }
        url.parse().map(Self)
    }
}

impl TryFrom<&str> for BaseUrl {
    type Error = url::ParseError;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        Self::try_from(url.to_owned())
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn base_url_joins_without_mangling() {
        let base = BaseUrl::try_from("https://sandbox.example.com/api").unwrap();
        assert_eq!(
            base.endpoint("/v0/transactions").unwrap().as_str(),
            "https://sandbox.example.com/api/v0/transactions"
        );
        assert_eq!(
            BaseUrl::default().endpoint("v0/tokens").unwrap().as_str(),
            "https://api.berbix.com/v0/tokens"
        );
    }

    #[test]
    fn deserialize_config() {
        let config: Config = serde_json::from_value(json!({
            "secret": "secret_live_abc",
            "host": "http://localhost:8080"
        }))
        .unwrap();
        assert_eq!(config.host.unwrap().as_str(), "http://localhost:8080/");

        let config: Config = serde_json::from_value(json!({ "secret": "s" })).unwrap();
        assert!(config.host.is_none());
        assert!(!format!("{config:?}").contains("\"s\""));
    }

    #[test]
    fn invalid_host_is_rejected() {
        assert!(serde_json::from_value::<Config>(json!({"secret": "s", "host": "not a url"})).is_err());
    }
}
