//! # Metadata & Streaming Links Module
//!
//! Turns "what is playing right now" into a [`ResolvedTrack`]: track metadata,
//! deep links to the same track on several streaming platforms, and an inline
//! cover thumbnail.
//!
//! ## Overview
//!
//! This module handles:
//! - The track and link data model
//! - Fetching the most recent track from Last.fm
//! - Link lookups against MusicBrainz (ListenBrainz labs), Openwhyd and Odesli
//! - Merging provider results and escalating to the cross-reference provider
//! - Cover art thumbnailing into `data:` URIs

pub mod aggregator;
pub mod artwork;
pub mod error;
pub mod fetch;
pub mod models;
pub mod now_playing;
pub mod providers;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{resolve_links, LinkAggregator};
pub use artwork::{CoverThumbnailer, ThumbnailService};
pub use error::{MetadataError, Result};
pub use models::{LinkSet, Platform, ResolvedTrack, Track};
pub use now_playing::{LastFmNowPlaying, NowPlayingSource};
pub use providers::{build_providers, DirectLookup, LinkProvider, ReferenceLookup};
