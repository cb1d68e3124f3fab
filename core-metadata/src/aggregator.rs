//! # Link Aggregator
//!
//! Resolves a track's streaming links across the configured providers.
//!
//! 1. All direct providers run concurrently and are all awaited.
//! 2. Their results merge in configured order; later providers win per platform.
//! 3. If a reference provider is configured and the merge holds a spotify,
//!    apple or youtube link (in that priority), the reference provider is
//!    queried once with it and its result merges over everything else.
//!
//! Provider failures surface only as missing links. Nothing here retries.

use crate::models::LinkSet;
use crate::providers::{DirectLookup, LinkProvider, ReferenceLookup};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves links for `title`/`artist` using `providers` in precedence order.
///
/// Only the first reference provider in the list is used.
pub async fn resolve_links(title: &str, artist: &str, providers: &[LinkProvider]) -> LinkSet {
    let mut direct: Vec<&Arc<dyn DirectLookup>> = Vec::new();
    let mut reference: Option<&Arc<dyn ReferenceLookup>> = None;

    for provider in providers {
        match provider {
            LinkProvider::Direct(lookup) => direct.push(lookup),
            LinkProvider::Reference(lookup) => {
                if reference.is_none() {
                    reference = Some(lookup);
                }
            }
        }
    }

    let results = join_all(direct.iter().map(|lookup| lookup.lookup(title, artist))).await;

    let mut merged = LinkSet::new();
    for (lookup, links) in direct.iter().zip(results) {
        debug!(provider = lookup.name(), found = links.len(), "Direct lookup done");
        merged.merge(links);
    }

    if let Some(reference) = reference {
        escalate(&mut merged, reference.as_ref()).await;
    }

    info!(title, artist, links = merged.len(), "Resolved streaming links");
    merged
}

async fn escalate(merged: &mut LinkSet, reference: &dyn ReferenceLookup) {
    let Some(reference_url) = merged.reference_url().cloned() else {
        debug!(
            provider = reference.name(),
            "No reference link available, skipping cross-reference"
        );
        return;
    };

    let escalated = reference.lookup(&reference_url).await;
    debug!(
        provider = reference.name(),
        reference = %reference_url,
        found = escalated.len(),
        "Cross-reference lookup done"
    );
    merged.merge(escalated);
}

/// Owns an ordered provider list and resolves links with it.
#[derive(Debug, Clone, Default)]
pub struct LinkAggregator {
    providers: Vec<LinkProvider>,
}

impl LinkAggregator {
    pub fn new(providers: Vec<LinkProvider>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[LinkProvider] {
        &self.providers
    }

    pub async fn resolve(&self, title: &str, artist: &str) -> LinkSet {
        resolve_links(title, artist, &self.providers).await
    }
}
