//! Last.fm "now playing" source
//!
//! Reads the most recent scrobble for a user.
//!
//! ## API Endpoints
//!
//! - **Recent Tracks**: `https://ws.audioscrobbler.com/2.0/?method=user.getrecenttracks&user={user}&api_key={key}&format=json`
//!
//! ## API Key Requirement
//!
//! Last.fm requires an API key for all requests.
//! Obtain one at: https://www.last.fm/api/account/create

use crate::error::Result;
use crate::fetch::fetch_validated;
use crate::models::Track;
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Last.fm API base URL
const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Image Last.fm returns for tracks without cover art
pub const LASTFM_PLACEHOLDER_COVER: &str =
    "https://lastfm.freetls.fastly.net/i/u/34s/2a96cbd8b46e442fc41c2b86b821562f.png";

/// Source of the most recently played track.
///
/// Implementations return [`Track::empty`] when there is no history. An `Err`
/// is reserved for faults the caller must see; it is never cached.
#[async_trait]
pub trait NowPlayingSource: Send + Sync {
    async fn now_playing(&self) -> Result<Track>;
}

#[derive(Debug, Deserialize)]
struct TextField {
    #[serde(rename = "#text")]
    text: String,
}

/// Images are listed smallest first
#[derive(Debug, Deserialize)]
struct LastFmImage {
    #[serde(rename = "#text")]
    url: String,
}

#[derive(Debug, Deserialize)]
struct LastFmTrack {
    #[serde(default)]
    mbid: String,
    name: String,
    artist: TextField,
    album: TextField,
    #[serde(default)]
    image: Vec<LastFmImage>,
}

/// Last.fm collapses a one-element `track` list into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrackList {
    Many(Vec<LastFmTrack>),
    One(Box<LastFmTrack>),
}

impl Default for TrackList {
    fn default() -> Self {
        TrackList::Many(Vec::new())
    }
}

impl TrackList {
    fn into_first(self) -> Option<LastFmTrack> {
        match self {
            TrackList::Many(tracks) => tracks.into_iter().next(),
            TrackList::One(track) => Some(*track),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecentTracks {
    #[serde(default)]
    track: TrackList,
}

#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    recenttracks: RecentTracks,
}

/// Last.fm recent-tracks client
pub struct LastFmNowPlaying {
    http_client: Arc<dyn HttpClient>,
    user: String,
    api_key: String,
}

impl LastFmNowPlaying {
    pub fn new(http_client: Arc<dyn HttpClient>, user: String, api_key: String) -> Self {
        Self {
            http_client,
            user,
            api_key,
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}?method=user.getrecenttracks&user={}&api_key={}&format=json",
            LASTFM_API_BASE,
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.api_key)
        )
    }

    fn convert_track(track: LastFmTrack) -> Track {
        let cover_url = track
            .image
            .into_iter()
            .next()
            .map(|image| image.url)
            .filter(|url| !url.is_empty() && url != LASTFM_PLACEHOLDER_COVER);

        Track {
            title: track.name,
            artist: track.artist.text,
            album: track.album.text,
            source_id: track.mbid,
            cover_url,
        }
    }
}

#[async_trait]
impl NowPlayingSource for LastFmNowPlaying {
    async fn now_playing(&self) -> Result<Track> {
        let url = self.request_url();

        let Some(response) =
            fetch_validated::<RecentTracksResponse>(self.http_client.as_ref(), &url).await
        else {
            return Ok(Track::empty());
        };

        match response.recenttracks.track.into_first() {
            Some(track) => {
                let track = Self::convert_track(track);
                info!(
                    title = %track.title,
                    artist = %track.artist,
                    source_id = %track.source_id,
                    "Fetched most recent Last.fm track"
                );
                Ok(track)
            }
            None => {
                debug!(user = %self.user, "Last.fm user has no listening history");
                Ok(Track::empty())
            }
        }
    }
}
