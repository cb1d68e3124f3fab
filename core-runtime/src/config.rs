//! # Configuration Module
//!
//! Provides configuration management for the listening-to core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `ListeningConfig` holding the Last.fm credentials, the ordered provider
//! selection, the cache TTL and the injected bridges. Validation is
//! fail-fast: missing credentials are reported by [`ListeningConfigBuilder::build`]
//! before any HTTP client is constructed or any request is made.
//!
//! ## Provider Order
//!
//! The provider list is ordered. When two direct providers resolve the same
//! platform, the one listed later wins. The default order
//! `[musicbrainz, openwhyd, odesli]` therefore lets Openwhyd's pattern
//! matches override ListenBrainz lookups, and Odesli (queried last with a
//! reference link) overrides both.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ListeningConfig, ProviderKind};
//!
//! let config = ListeningConfig::builder()
//!     .lastfm_user("someone")
//!     .lastfm_api_key("0123456789abcdef")
//!     .providers([ProviderKind::Openwhyd, ProviderKind::Odesli])
//!     .cache_ttl_ms(60_000)
//!     .build()?;
//! ```
//!
//! When the `desktop-shims` feature is enabled a `reqwest`-backed
//! `HttpClient` is injected automatically if none is provided.

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, SystemClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default cache TTL: 5 minutes
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

const MISSING_CREDENTIALS: &str = "API key and user ID must be specified";

/// Streaming link providers that can be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// ListenBrainz labs metadata lookups (Spotify and Apple Music ids)
    MusicBrainz,
    /// Openwhyd search, matched against known embed id patterns
    Openwhyd,
    /// Odesli / song.link cross-reference from one known link
    Odesli,
}

impl ProviderKind {
    /// Default provider selection, in precedence order.
    pub const DEFAULT_ORDER: [ProviderKind; 3] = [
        ProviderKind::MusicBrainz,
        ProviderKind::Openwhyd,
        ProviderKind::Odesli,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MusicBrainz => "musicbrainz",
            Self::Openwhyd => "openwhyd",
            Self::Odesli => "odesli",
        }
    }

    /// Whether the provider takes a reference link instead of title/artist.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Odesli)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "musicbrainz" => Ok(Self::MusicBrainz),
            "openwhyd" => Ok(Self::Openwhyd),
            "odesli" => Ok(Self::Odesli),
            other => Err(Error::Config(format!("Unknown provider: '{}'", other))),
        }
    }
}

/// Host-facing options document.
///
/// Mirrors the options a build integration passes in, e.g.
/// `{"userId": "someone", "apiKey": "...", "providers": ["openwhyd"], "cacheTTL": 60000}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningOptions {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub providers: Option<Vec<ProviderKind>>,
    #[serde(default, rename = "cacheTTL")]
    pub cache_ttl: Option<u64>,
}

/// Validated configuration for a listening session.
#[derive(Clone)]
pub struct ListeningConfig {
    /// Last.fm user whose recent tracks are read
    pub lastfm_user: String,

    /// Last.fm API key
    pub lastfm_api_key: String,

    /// Enabled link providers, in precedence order (later wins)
    pub providers: Vec<ProviderKind>,

    /// Cache time-to-live in milliseconds
    pub cache_ttl_ms: u64,

    /// HTTP client used by every outbound call
    pub http_client: Arc<dyn HttpClient>,

    /// Time source for cache expiry
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for ListeningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListeningConfig")
            .field("lastfm_user", &self.lastfm_user)
            .field("lastfm_api_key", &"[REDACTED]")
            .field("providers", &self.providers)
            .field("cache_ttl_ms", &self.cache_ttl_ms)
            .field("http_client", &"HttpClient { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl ListeningConfig {
    /// Creates a new builder for constructing a `ListeningConfig`.
    pub fn builder() -> ListeningConfigBuilder {
        ListeningConfigBuilder::default()
    }

    /// Builds a configuration from a host options document.
    pub fn from_options(options: ListeningOptions) -> Result<Self> {
        Self::builder().options(options).build()
    }

    /// Builds a configuration from `LASTFM_*` and `LISTENING_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Last.fm user and API key are present and not blank
    /// - No provider is listed twice
    pub fn validate(&self) -> Result<()> {
        validate_credentials(&self.lastfm_user, &self.lastfm_api_key)?;
        validate_providers(&self.providers)
    }
}

fn validate_credentials(user: &str, api_key: &str) -> Result<()> {
    if user.trim().is_empty() || api_key.trim().is_empty() {
        return Err(Error::Config(MISSING_CREDENTIALS.to_string()));
    }
    Ok(())
}

fn validate_providers(providers: &[ProviderKind]) -> Result<()> {
    for (index, provider) in providers.iter().enumerate() {
        if providers[..index].contains(provider) {
            return Err(Error::Config(format!(
                "Provider '{}' is listed more than once",
                provider
            )));
        }
    }
    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Otherwise inject one with .http_client()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::new().map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: format!("Failed to create desktop HTTP client: {}", e),
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for [`ListeningConfig`].
#[derive(Default)]
pub struct ListeningConfigBuilder {
    lastfm_user: Option<String>,
    lastfm_api_key: Option<String>,
    providers: Option<Vec<ProviderKind>>,
    cache_ttl_ms: Option<u64>,
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ListeningConfigBuilder {
    /// Seeds the builder from a host options document.
    pub fn options(mut self, options: ListeningOptions) -> Self {
        self.lastfm_user = Some(options.user_id);
        self.lastfm_api_key = Some(options.api_key);
        if let Some(providers) = options.providers {
            self.providers = Some(providers);
        }
        if let Some(ttl) = options.cache_ttl {
            self.cache_ttl_ms = Some(ttl);
        }
        self
    }

    /// Seeds the builder from environment variables.
    ///
    /// - `LASTFM_USER`, `LASTFM_API_KEY` - credentials
    /// - `LISTENING_PROVIDERS` - comma-separated provider names (optional)
    /// - `LISTENING_CACHE_TTL_MS` - cache TTL in milliseconds (optional)
    pub fn with_env(self) -> Result<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(user) = lookup("LASTFM_USER") {
            self.lastfm_user = Some(user);
        }
        if let Some(key) = lookup("LASTFM_API_KEY") {
            self.lastfm_api_key = Some(key);
        }
        if let Some(list) = lookup("LISTENING_PROVIDERS") {
            let providers = list
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(ProviderKind::from_str)
                .collect::<Result<Vec<_>>>()?;
            self.providers = Some(providers);
        }
        if let Some(ttl) = lookup("LISTENING_CACHE_TTL_MS") {
            let ttl = ttl.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid LISTENING_CACHE_TTL_MS '{}': {}", ttl, e))
            })?;
            self.cache_ttl_ms = Some(ttl);
        }
        Ok(self)
    }

    pub fn lastfm_user(mut self, user: impl Into<String>) -> Self {
        self.lastfm_user = Some(user.into());
        self
    }

    pub fn lastfm_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.lastfm_api_key = Some(api_key.into());
        self
    }

    /// Sets the enabled providers in precedence order.
    ///
    /// Default: `[musicbrainz, openwhyd, odesli]`
    pub fn providers(mut self, providers: impl IntoIterator<Item = ProviderKind>) -> Self {
        self.providers = Some(providers.into_iter().collect());
        self
    }

    /// Sets the cache TTL in milliseconds.
    ///
    /// Default: 300 000 (5 minutes)
    pub fn cache_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.cache_ttl_ms = Some(ttl_ms);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the final `ListeningConfig` instance.
    ///
    /// Credentials and provider selection are validated first, so a
    /// configuration fault is reported before any bridge is created.
    pub fn build(self) -> Result<ListeningConfig> {
        let lastfm_user = self.lastfm_user.unwrap_or_default();
        let lastfm_api_key = self.lastfm_api_key.unwrap_or_default();
        validate_credentials(&lastfm_user, &lastfm_api_key)?;

        let providers = self
            .providers
            .unwrap_or_else(|| ProviderKind::DEFAULT_ORDER.to_vec());
        validate_providers(&providers)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = ListeningConfig {
            lastfm_user,
            lastfm_api_key,
            providers,
            cache_ttl_ms: self.cache_ttl_ms.unwrap_or(DEFAULT_CACHE_TTL_MS),
            http_client,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use std::collections::HashMap;

    struct UnusedHttpClient;

    #[async_trait]
    impl HttpClient for UnusedHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("no network in tests".to_string()))
        }
    }

    fn base_builder() -> ListeningConfigBuilder {
        ListeningConfig::builder()
            .lastfm_user("testuser")
            .lastfm_api_key("testkey")
            .http_client(Arc::new(UnusedHttpClient))
    }

    #[test]
    fn test_builder_applies_defaults() {
        let config = base_builder().build().unwrap();

        assert_eq!(config.lastfm_user, "testuser");
        assert_eq!(config.cache_ttl_ms, DEFAULT_CACHE_TTL_MS);
        assert_eq!(config.cache_ttl_ms, 300_000);
        assert_eq!(config.providers, ProviderKind::DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn test_builder_requires_api_key() {
        let err = ListeningConfig::builder()
            .lastfm_user("testuser")
            .lastfm_api_key("")
            .http_client(Arc::new(UnusedHttpClient))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(MISSING_CREDENTIALS));
    }

    #[test]
    fn test_builder_requires_user() {
        let err = ListeningConfig::builder()
            .lastfm_api_key("testkey")
            .http_client(Arc::new(UnusedHttpClient))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains(MISSING_CREDENTIALS));
    }

    #[test]
    fn test_blank_credentials_are_rejected() {
        let err = ListeningConfig::builder()
            .lastfm_user("   ")
            .lastfm_api_key("testkey")
            .http_client(Arc::new(UnusedHttpClient))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains(MISSING_CREDENTIALS));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_credentials_checked_before_http_client() {
        let err = ListeningConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ListeningConfig::builder()
            .lastfm_user("testuser")
            .lastfm_api_key("testkey")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { .. }));
    }

    #[test]
    fn test_custom_ttl_and_providers() {
        let config = base_builder()
            .cache_ttl_ms(10_000)
            .providers([ProviderKind::Odesli, ProviderKind::Openwhyd])
            .build()
            .unwrap();

        assert_eq!(config.cache_ttl_ms, 10_000);
        assert_eq!(
            config.providers,
            vec![ProviderKind::Odesli, ProviderKind::Openwhyd]
        );
    }

    #[test]
    fn test_empty_provider_list_is_allowed() {
        let config = base_builder().providers([]).build().unwrap();
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_duplicate_providers_are_rejected() {
        let err = base_builder()
            .providers([
                ProviderKind::Openwhyd,
                ProviderKind::MusicBrainz,
                ProviderKind::Openwhyd,
            ])
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("'openwhyd' is listed more than once"));
    }

    #[test]
    fn test_options_document() {
        let options: ListeningOptions = serde_json::from_str(
            r#"{"userId": "u", "apiKey": "k", "providers": ["odesli", "musicbrainz"], "cacheTTL": 1234}"#,
        )
        .unwrap();

        let config = ListeningConfig::builder()
            .options(options)
            .http_client(Arc::new(UnusedHttpClient))
            .build()
            .unwrap();

        assert_eq!(config.lastfm_user, "u");
        assert_eq!(config.lastfm_api_key, "k");
        assert_eq!(config.cache_ttl_ms, 1234);
        assert_eq!(
            config.providers,
            vec![ProviderKind::Odesli, ProviderKind::MusicBrainz]
        );
    }

    #[test]
    fn test_from_options_requires_credentials() {
        let options: ListeningOptions =
            serde_json::from_str(r#"{"userId": "", "apiKey": "k"}"#).unwrap();

        let err = ListeningConfig::from_options(options).unwrap_err();
        assert!(err.to_string().contains(MISSING_CREDENTIALS));
    }

    #[test]
    fn test_options_document_rejects_unknown_provider() {
        let result = serde_json::from_str::<ListeningOptions>(
            r#"{"userId": "u", "apiKey": "k", "providers": ["napster"]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_env_lookup() {
        let env: HashMap<&str, &str> = [
            ("LASTFM_USER", "envuser"),
            ("LASTFM_API_KEY", "envkey"),
            ("LISTENING_PROVIDERS", "openwhyd, ODESLI"),
            ("LISTENING_CACHE_TTL_MS", "60000"),
        ]
        .into_iter()
        .collect();

        let config = ListeningConfig::builder()
            .with_lookup(|key| env.get(key).map(|v| v.to_string()))
            .unwrap()
            .http_client(Arc::new(UnusedHttpClient))
            .build()
            .unwrap();

        assert_eq!(config.lastfm_user, "envuser");
        assert_eq!(config.cache_ttl_ms, 60_000);
        assert_eq!(
            config.providers,
            vec![ProviderKind::Openwhyd, ProviderKind::Odesli]
        );
    }

    #[test]
    fn test_later_builder_calls_override_env() {
        let config = ListeningConfig::builder()
            .with_lookup(|key| match key {
                "LASTFM_USER" => Some("envuser".to_string()),
                "LISTENING_CACHE_TTL_MS" => Some("60000".to_string()),
                _ => None,
            })
            .unwrap()
            .lastfm_user("explicit")
            .lastfm_api_key("key")
            .cache_ttl_ms(1_000)
            .http_client(Arc::new(UnusedHttpClient))
            .build()
            .unwrap();

        assert_eq!(config.lastfm_user, "explicit");
        assert_eq!(config.cache_ttl_ms, 1_000);
    }

    #[test]
    fn test_env_lookup_rejects_bad_values() {
        let result = ListeningConfig::builder().with_lookup(|key| match key {
            "LISTENING_PROVIDERS" => Some("openwhyd,napster".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(Error::Config(_))));

        let result = ListeningConfig::builder().with_lookup(|key| match key {
            "LISTENING_CACHE_TTL_MS" => Some("five minutes".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_kind_names() {
        assert_eq!("MusicBrainz".parse::<ProviderKind>().unwrap(), ProviderKind::MusicBrainz);
        assert_eq!(ProviderKind::Odesli.to_string(), "odesli");
        assert!(ProviderKind::Odesli.is_reference());
        assert!(!ProviderKind::Openwhyd.is_reference());
        assert_eq!(
            serde_json::to_string(&ProviderKind::MusicBrainz).unwrap(),
            "\"musicbrainz\""
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = base_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("testkey"));
        assert!(debug.contains("[REDACTED]"));
    }
}
