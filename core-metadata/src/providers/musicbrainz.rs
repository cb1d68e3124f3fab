//! MusicBrainz link provider
//!
//! Uses the ListenBrainz labs metadata lookups, which map a title/artist pair
//! to MusicBrainz-linked Spotify and Apple Music catalog ids.
//!
//! ## API Endpoints
//!
//! - **Spotify ids**: `https://labs.api.listenbrainz.org/spotify-id-from-metadata/json?title={title}&artist={artist}`
//! - **Apple Music ids**: `https://labs.api.listenbrainz.org/apple-music-id-from-metadata/json?title={title}&artist={artist}`
//!
//! The two lookups run concurrently and fail independently: a failed Spotify
//! lookup still yields the Apple Music link and vice versa.

use super::{record_link, DirectLookup};
use crate::fetch::fetch_validated;
use crate::models::{LinkSet, Platform};
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// ListenBrainz labs API base URL
const LISTENBRAINZ_LABS_BASE: &str = "https://labs.api.listenbrainz.org";

const SPOTIFY_TRACK_BASE: &str = "https://open.spotify.com/track/";

const APPLE_MUSIC_SONG_BASE: &str = "https://music.apple.com/us/song/";

const PROVIDER_NAME: &str = "musicbrainz";

#[derive(Debug, Deserialize)]
struct SpotifyMatch {
    #[serde(default)]
    spotify_track_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AppleMusicMatch {
    #[serde(default)]
    apple_music_track_ids: Vec<String>,
}

/// Direct provider backed by ListenBrainz labs
pub struct MusicBrainzProvider {
    http_client: Arc<dyn HttpClient>,
}

impl MusicBrainzProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    fn lookup_url(endpoint: &str, title: &str, artist: &str) -> String {
        format!(
            "{}/{}/json?title={}&artist={}",
            LISTENBRAINZ_LABS_BASE,
            endpoint,
            urlencoding::encode(title),
            urlencoding::encode(artist)
        )
    }

    /// First id of the first match, ignoring blanks
    fn first_id(ids: Option<Vec<String>>) -> Option<String> {
        ids?.into_iter().next().filter(|id| !id.is_empty())
    }
}

#[async_trait]
impl DirectLookup for MusicBrainzProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, title: &str, artist: &str) -> LinkSet {
        let spotify_url = Self::lookup_url("spotify-id-from-metadata", title, artist);
        let apple_url = Self::lookup_url("apple-music-id-from-metadata", title, artist);

        let (spotify, apple) = futures::join!(
            fetch_validated::<Vec<SpotifyMatch>>(self.http_client.as_ref(), &spotify_url),
            fetch_validated::<Vec<AppleMusicMatch>>(self.http_client.as_ref(), &apple_url),
        );

        let spotify_id = Self::first_id(
            spotify.and_then(|matches| matches.into_iter().next().map(|m| m.spotify_track_ids)),
        );
        let apple_id = Self::first_id(
            apple.and_then(|matches| matches.into_iter().next().map(|m| m.apple_music_track_ids)),
        );

        let mut links = LinkSet::new();
        if let Some(id) = spotify_id {
            record_link(
                &mut links,
                PROVIDER_NAME,
                Platform::Spotify,
                &format!("{}{}", SPOTIFY_TRACK_BASE, id),
            );
        }
        if let Some(id) = apple_id {
            record_link(
                &mut links,
                PROVIDER_NAME,
                Platform::Apple,
                &format!("{}{}", APPLE_MUSIC_SONG_BASE, id),
            );
        }

        debug!(found = links.len(), "MusicBrainz lookup finished");
        links
    }
}
