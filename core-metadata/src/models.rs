//! Track and streaming-link data model.

use crate::error::{MetadataError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Streaming platforms a track can be linked on.
///
/// Variant order is the order links serialise in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Spotify,
    Apple,
    Deezer,
    Youtube,
    Tidal,
    Soundcloud,
    Bandcamp,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Spotify,
        Platform::Apple,
        Platform::Deezer,
        Platform::Youtube,
        Platform::Tidal,
        Platform::Soundcloud,
        Platform::Bandcamp,
    ];

    /// Platforms tried, in order, when picking a cross-reference URL.
    pub const REFERENCE_PRIORITY: [Platform; 3] =
        [Platform::Spotify, Platform::Apple, Platform::Youtube];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Spotify => "spotify",
            Platform::Apple => "apple",
            Platform::Deezer => "deezer",
            Platform::Youtube => "youtube",
            Platform::Tidal => "tidal",
            Platform::Soundcloud => "soundcloud",
            Platform::Bandcamp => "bandcamp",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial mapping from platform to a track URL on that platform.
///
/// An absent platform means "unknown". Every stored URL is absolute and uses
/// `http` or `https`; [`LinkSet::insert`] rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkSet {
    links: BTreeMap<Platform, Url>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `url` for `platform`, replacing any previous link.
    pub fn insert(&mut self, platform: Platform, url: Url) -> Result<()> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MetadataError::InvalidUrl(format!(
                "{} link must use http or https: {}",
                platform, url
            )));
        }
        self.links.insert(platform, url);
        Ok(())
    }

    /// Parses `raw` and stores it for `platform`.
    pub fn insert_str(&mut self, platform: Platform, raw: &str) -> Result<()> {
        let url = Url::parse(raw)
            .map_err(|e| MetadataError::InvalidUrl(format!("{} link '{}': {}", platform, raw, e)))?;
        self.insert(platform, url)
    }

    pub fn get(&self, platform: Platform) -> Option<&Url> {
        self.links.get(&platform)
    }

    pub fn contains(&self, platform: Platform) -> bool {
        self.links.contains_key(&platform)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &Url)> {
        self.links.iter().map(|(platform, url)| (*platform, url))
    }

    /// Merges `other` into `self`. Links from `other` win on overlapping platforms.
    pub fn merge(&mut self, other: LinkSet) {
        self.links.extend(other.links);
    }

    /// The first link present among spotify, apple and youtube.
    pub fn reference_url(&self) -> Option<&Url> {
        Platform::REFERENCE_PRIORITY
            .iter()
            .find_map(|platform| self.links.get(platform))
    }
}

impl<'de> Deserialize<'de> for LinkSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<Platform, String>::deserialize(deserializer)?;
        let mut links = LinkSet::new();
        for (platform, url) in raw {
            links
                .insert_str(platform, &url)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(links)
    }
}

/// The most recently played track as reported by the now-playing source.
///
/// Empty strings mean "unknown"; [`Track::empty`] is the no-history sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Catalog id from the source. Diagnostics only.
    pub source_id: String,
    pub cover_url: Option<String>,
}

impl Track {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.artist.is_empty()
            && self.album.is_empty()
            && self.source_id.is_empty()
            && self.cover_url.is_none()
    }
}

/// Track with its streaming links and inline cover thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_cover: Option<String>,
    pub services: LinkSet,
}

impl ResolvedTrack {
    pub fn new(track: &Track, services: LinkSet, album_cover: Option<String>) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            album_cover,
            services,
        }
    }
}
