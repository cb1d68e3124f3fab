//! Streaming link providers
//!
//! Two lookup shapes exist: direct providers search by title and artist, the
//! reference provider cross-references one known link. Both are best-effort
//! and return a possibly empty [`LinkSet`] instead of an error.

pub mod musicbrainz;
pub mod odesli;
pub mod openwhyd;

pub use musicbrainz::MusicBrainzProvider;
pub use odesli::OdesliProvider;
pub use openwhyd::OpenwhydProvider;

use crate::models::{LinkSet, Platform};
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use core_runtime::config::ProviderKind;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// Looks up links from a track's title and artist.
#[async_trait]
pub trait DirectLookup: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, title: &str, artist: &str) -> LinkSet;
}

/// Looks up links from one already known link to the same track.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, reference_url: &Url) -> LinkSet;
}

/// A configured provider, tagged by the input it needs.
#[derive(Clone)]
pub enum LinkProvider {
    Direct(Arc<dyn DirectLookup>),
    Reference(Arc<dyn ReferenceLookup>),
}

impl LinkProvider {
    pub fn name(&self) -> &'static str {
        match self {
            LinkProvider::Direct(provider) => provider.name(),
            LinkProvider::Reference(provider) => provider.name(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, LinkProvider::Reference(_))
    }
}

impl fmt::Debug for LinkProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkProvider::Direct(provider) => f.debug_tuple("Direct").field(&provider.name()).finish(),
            LinkProvider::Reference(provider) => {
                f.debug_tuple("Reference").field(&provider.name()).finish()
            }
        }
    }
}

pub fn build_provider(kind: ProviderKind, http_client: Arc<dyn HttpClient>) -> LinkProvider {
    match kind {
        ProviderKind::MusicBrainz => {
            LinkProvider::Direct(Arc::new(MusicBrainzProvider::new(http_client)))
        }
        ProviderKind::Openwhyd => LinkProvider::Direct(Arc::new(OpenwhydProvider::new(http_client))),
        ProviderKind::Odesli => LinkProvider::Reference(Arc::new(OdesliProvider::new(http_client))),
    }
}

/// Builds providers for `kinds`, keeping their order.
pub fn build_providers(kinds: &[ProviderKind], http_client: Arc<dyn HttpClient>) -> Vec<LinkProvider> {
    kinds
        .iter()
        .map(|kind| build_provider(*kind, Arc::clone(&http_client)))
        .collect()
}

/// Adds a provider-built link, dropping it with a warning if it is not a valid URL.
pub(crate) fn record_link(links: &mut LinkSet, provider: &str, platform: Platform, candidate: &str) {
    if let Err(e) = links.insert_str(platform, candidate) {
        warn!(provider, platform = %platform, error = %e, "Dropping invalid link");
    }
}
