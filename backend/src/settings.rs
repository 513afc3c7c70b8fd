//! Runtime settings loaded via OrthoConfig.
//!
//! Every value can be set through a `PLACY_`-prefixed environment variable
//! or a configuration file. The server and the `import-pois` binary share
//! this struct.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::{Deserialize, Deserializer};

use crate::outbound::entur::{DEFAULT_ENTUR_CLIENT_NAME, DEFAULT_ENTUR_ENDPOINT};
use crate::outbound::google_places::DEFAULT_GOOGLE_PLACES_ENDPOINT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// GBFS `station_information` feeds for the Norwegian city-bike schemes.
pub const DEFAULT_BYSYKKEL_FEEDS: [&str; 3] = [
    "https://gbfs.urbansharing.com/oslobysykkel.no/station_information.json",
    "https://gbfs.urbansharing.com/bergenbysykkel.no/station_information.json",
    "https://gbfs.urbansharing.com/trondheimbysykkel.no/station_information.json",
];

/// Invalid setting value.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting did not parse.
    #[error("{setting} is not a valid URL: {source}")]
    Url {
        /// Setting name.
        setting: &'static str,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The bind address did not parse.
    #[error("bind_addr is not a socket address: {0}")]
    BindAddr(#[from] std::net::AddrParseError),
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PLACY")]
pub struct PlacySettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Accept requests on admin endpoints.
    #[ortho_config(default = false)]
    pub admin_enabled: bool,
    /// PostgreSQL URL. Without one, POIs are kept in memory.
    pub database_url: Option<String>,
    /// Apply pending migrations at startup. Read through
    /// [`PlacySettings::run_migrations`].
    pub run_migrations: Option<bool>,
    /// Google Places API key. Imports fail with 503 without it.
    pub google_places_api_key: Option<String>,
    /// Override for the Nearby Search endpoint.
    pub google_places_endpoint: Option<String>,
    /// Override for the Entur geocoder reverse endpoint.
    pub entur_endpoint: Option<String>,
    /// `ET-Client-Name` sent to Entur.
    pub entur_client_name: Option<String>,
    /// GBFS `station_information.json` URLs. The environment form is a
    /// comma-separated list or a single URL.
    #[serde(default, deserialize_with = "feed_list")]
    pub bysykkel_feeds: Option<Vec<String>>,
    /// Timeout applied to each provider request.
    pub provider_timeout_secs: Option<u64>,
}

impl PlacySettings {
    /// Listening address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] for an unparsable address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        Ok(self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()?)
    }

    /// Whether startup applies pending migrations; on unless disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Google Places API key, ignoring blank values.
    pub fn google_places_api_key(&self) -> Option<&str> {
        non_blank(self.google_places_api_key.as_deref())
    }

    /// Per-request provider timeout, 10 seconds by default.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(
            self.provider_timeout_secs
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
        )
    }

    /// Nearby Search endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] for an unparsable override.
    pub fn google_places_endpoint(&self) -> Result<Url, SettingsError> {
        parse_url(
            "google_places_endpoint",
            self.google_places_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_GOOGLE_PLACES_ENDPOINT),
        )
    }

    /// Entur reverse-geocoder endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] for an unparsable override.
    pub fn entur_endpoint(&self) -> Result<Url, SettingsError> {
        parse_url(
            "entur_endpoint",
            self.entur_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_ENTUR_ENDPOINT),
        )
    }

    /// Client name reported to Entur.
    pub fn entur_client_name(&self) -> &str {
        non_blank(self.entur_client_name.as_deref()).unwrap_or(DEFAULT_ENTUR_CLIENT_NAME)
    }

    /// GBFS feeds to read; the three Norwegian schemes unless overridden.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] when any listed feed fails to parse.
    pub fn bysykkel_feeds(&self) -> Result<Vec<Url>, SettingsError> {
        let listed: Vec<&str> = self
            .bysykkel_feeds
            .iter()
            .flatten()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|feed| !feed.is_empty())
            .collect();
        let feeds: &[&str] = if listed.is_empty() {
            &DEFAULT_BYSYKKEL_FEEDS
        } else {
            &listed
        };
        feeds
            .iter()
            .map(|feed| parse_url("bysykkel_feeds", feed))
            .collect()
    }
}

// The environment layer turns `a,b` into a list but leaves a lone URL as a
// string.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedList {
    One(String),
    Many(Vec<String>),
}

fn feed_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<FeedList>::deserialize(deserializer)?.map(|list| match list {
            FeedList::One(feed) => vec![feed],
            FeedList::Many(feeds) => feeds,
        }),
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_url(setting: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::Url { setting, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "PLACY_BIND_ADDR",
        "PLACY_ADMIN_ENABLED",
        "PLACY_DATABASE_URL",
        "PLACY_RUN_MIGRATIONS",
        "PLACY_GOOGLE_PLACES_API_KEY",
        "PLACY_GOOGLE_PLACES_ENDPOINT",
        "PLACY_ENTUR_ENDPOINT",
        "PLACY_ENTUR_CLIENT_NAME",
        "PLACY_BYSYKKEL_FEEDS",
        "PLACY_PROVIDER_TIMEOUT_SECS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> PlacySettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        PlacySettings::load_from_iter([OsString::from("placy")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_without_environment() {
        let settings = load_with(&[]);

        assert!(!settings.admin_enabled);
        assert!(settings.run_migrations());
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.google_places_api_key(), None);
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.provider_timeout(), Duration::from_secs(10));
        assert_eq!(settings.entur_client_name(), DEFAULT_ENTUR_CLIENT_NAME);
        assert_eq!(settings.bysykkel_feeds().expect("default feeds").len(), 3);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("PLACY_ADMIN_ENABLED", "true"),
            ("PLACY_DATABASE_URL", "postgres://placy@localhost/placy"),
            ("PLACY_GOOGLE_PLACES_API_KEY", "test-key"),
            ("PLACY_PROVIDER_TIMEOUT_SECS", "3"),
            (
                "PLACY_BYSYKKEL_FEEDS",
                "https://gbfs.example/a.json, https://gbfs.example/b.json",
            ),
        ]);

        assert!(settings.admin_enabled);
        assert_eq!(settings.database_url(), Some("postgres://placy@localhost/placy"));
        assert_eq!(settings.google_places_api_key(), Some("test-key"));
        assert_eq!(settings.provider_timeout(), Duration::from_secs(3));
        let feeds = settings.bysykkel_feeds().expect("feeds parse");
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[1].as_str(), "https://gbfs.example/b.json");
    }

    #[rstest]
    fn a_single_feed_is_accepted() {
        let settings = load_with(&[("PLACY_BYSYKKEL_FEEDS", "https://gbfs.example/a.json")]);

        let feeds = settings.bysykkel_feeds().expect("feed parses");
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].as_str(), "https://gbfs.example/a.json");
    }

    #[rstest]
    #[case("false", false)]
    #[case("true", true)]
    fn migrations_can_be_switched_off(#[case] raw: &str, #[case] expected: bool) {
        let settings = load_with(&[("PLACY_RUN_MIGRATIONS", raw)]);
        assert_eq!(settings.run_migrations(), expected);
    }

    #[rstest]
    fn blank_secrets_count_as_missing() {
        let settings = load_with(&[("PLACY_GOOGLE_PLACES_API_KEY", "   ")]);

        assert_eq!(settings.google_places_api_key(), None);
    }

    #[rstest]
    fn malformed_endpoint_is_reported() {
        let settings = load_with(&[("PLACY_ENTUR_ENDPOINT", "not a url")]);

        let error = settings.entur_endpoint().expect_err("bad url");
        assert!(error.to_string().starts_with("entur_endpoint is not a valid URL"));
    }
}
