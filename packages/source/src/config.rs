//! Upstream endpoint configuration.
//!
//! Defaults are baked into the binary from `config/upstream.toml`. A
//! deployment can replace them with its own TOML file and then override
//! individual values through environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SourceError;

/// Default configuration, embedded at compile time.
const EMBEDDED_CONFIG: &str = include_str!("../config/upstream.toml");

/// Overrides [`UpstreamConfig::localities_url`].
pub const LOCALITIES_URL_ENV: &str = "EPI_MAP_LOCALITIES_URL";
/// Overrides [`UpstreamConfig::meshes_url`].
pub const MESHES_URL_ENV: &str = "EPI_MAP_MESHES_URL";
/// Overrides [`UpstreamConfig::infodengue_url`].
pub const INFODENGUE_URL_ENV: &str = "EPI_MAP_INFODENGUE_URL";
/// Overrides [`UpstreamConfig::timeout_secs`].
pub const TIMEOUT_SECS_ENV: &str = "EPI_MAP_TIMEOUT_SECS";

/// Where and how to reach the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// IBGE locality directory base URL.
    pub localities_url: String,
    /// IBGE mesh base URL.
    pub meshes_url: String,
    /// `InfoDengue` API base URL.
    pub infodengue_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout_secs: u64,
    /// Connection timeout.
    pub connect_timeout_secs: u64,
    /// Transport-level retries for transient failures.
    pub max_retries: u32,
    /// Per-geocode requests in flight during bulk fetches.
    pub bulk_concurrency: usize,
    /// Weeks covered by "latest alert" queries.
    pub alert_window_weeks: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

impl UpstreamConfig {
    /// The configuration shipped with the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a build-time bug).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(EMBEDDED_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded upstream.toml: {e}"))
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read, or
    /// [`SourceError::Config`] if it is not a valid configuration.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::de::from_str(&content)?)
    }

    /// Applies `EPI_MAP_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `EPI_MAP_*` names.
    ///
    /// Empty values are ignored, as is a timeout that is not a positive
    /// integer.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(LOCALITIES_URL_ENV) {
            self.localities_url = url;
        }
        if let Some(url) = non_empty(MESHES_URL_ENV) {
            self.meshes_url = url;
        }
        if let Some(url) = non_empty(INFODENGUE_URL_ENV) {
            self.infodengue_url = url;
        }
        if let Some(raw) = non_empty(TIMEOUT_SECS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => log::warn!("Ignoring {TIMEOUT_SECS_ENV}={raw:?}: expected positive seconds"),
            }
        }

        self
    }

    /// [`Self::timeout_secs`] as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// [`Self::connect_timeout_secs`] as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn embedded_config_points_at_public_services() {
        let config = UpstreamConfig::embedded();
        assert!(config.localities_url.contains("servicodados.ibge.gov.br"));
        assert!(config.meshes_url.ends_with("/api/v3/malhas"));
        assert!(config.infodengue_url.contains("info.dengue.mat.br"));
        assert_eq!(config.max_retries, 2);
        assert!(config.alert_window_weeks > 0);
        assert!(config.bulk_concurrency > 0);
    }

    #[test]
    fn overrides_replace_only_what_is_set() {
        let env: BTreeMap<&str, &str> = [
            (INFODENGUE_URL_ENV, "http://localhost:9000/api"),
            (TIMEOUT_SECS_ENV, "5"),
            (MESHES_URL_ENV, "  "),
        ]
        .into_iter()
        .collect();

        let base = UpstreamConfig::embedded();
        let config = base
            .clone()
            .with_overrides(|name| env.get(name).map(ToString::to_string));

        assert_eq!(config.infodengue_url, "http://localhost:9000/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.meshes_url, base.meshes_url);
        assert_eq!(config.localities_url, base.localities_url);
    }

    #[test]
    fn invalid_timeout_override_is_ignored() {
        let base = UpstreamConfig::embedded();
        for raw in ["0", "-3", "soon"] {
            let config = base.clone().with_overrides(|name| {
                (name == TIMEOUT_SECS_ENV).then(|| raw.to_string())
            });
            assert_eq!(config.timeout_secs, base.timeout_secs, "override {raw:?}");
        }
    }

    #[test]
    fn config_file_round_trips_through_toml() {
        let dir = std::env::temp_dir().join(format!("epi-map-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("upstream.toml");

        let mut custom = UpstreamConfig::embedded();
        custom.max_retries = 0;
        std::fs::write(&path, toml::to_string(&custom).unwrap()).unwrap();

        assert_eq!(UpstreamConfig::from_file(&path).unwrap(), custom);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = UpstreamConfig::from_file(Path::new("/nonexistent/epi-map.toml")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
