//! Odesli (song.link) cross-reference provider
//!
//! Given one link to a track, returns links to the same track on every
//! platform Odesli knows about.
//!
//! ## API Endpoints
//!
//! - **Links**: `https://api.song.link/v1-alpha.1/links?url={reference}`

use super::{record_link, ReferenceLookup};
use crate::fetch::fetch_validated;
use crate::models::{LinkSet, Platform};
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Odesli API endpoint
const ODESLI_LINKS: &str = "https://api.song.link/v1-alpha.1/links";

const PROVIDER_NAME: &str = "odesli";

#[derive(Debug, Deserialize)]
struct PlatformLink {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinksResponse {
    #[serde(default)]
    links_by_platform: Option<BTreeMap<String, PlatformLink>>,
}

/// Reference provider backed by the Odesli API
pub struct OdesliProvider {
    http_client: Arc<dyn HttpClient>,
}

impl OdesliProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    fn links_url(reference_url: &Url) -> String {
        format!(
            "{}?url={}",
            ODESLI_LINKS,
            urlencoding::encode(reference_url.as_str())
        )
    }

    /// Maps an Odesli `linksByPlatform` key; unknown keys are ignored.
    fn platform_for_key(key: &str) -> Option<Platform> {
        match key {
            "spotify" => Some(Platform::Spotify),
            "appleMusic" => Some(Platform::Apple),
            "deezer" => Some(Platform::Deezer),
            "youtube" => Some(Platform::Youtube),
            "tidal" => Some(Platform::Tidal),
            "soundcloud" => Some(Platform::Soundcloud),
            "bandcamp" => Some(Platform::Bandcamp),
            _ => None,
        }
    }
}

#[async_trait]
impl ReferenceLookup for OdesliProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, reference_url: &Url) -> LinkSet {
        let url = Self::links_url(reference_url);
        let mut links = LinkSet::new();

        let Some(links_by_platform) =
            fetch_validated::<LinksResponse>(self.http_client.as_ref(), &url)
                .await
                .and_then(|response| response.links_by_platform)
        else {
            return links;
        };

        for (key, link) in &links_by_platform {
            if let Some(platform) = Self::platform_for_key(key) {
                record_link(&mut links, PROVIDER_NAME, platform, &link.url);
            }
        }

        debug!(
            reference = %reference_url,
            found = links.len(),
            "Odesli lookup finished"
        );
        links
    }
}
