//! Openwhyd link provider
//!
//! Searches Openwhyd posts and recognises the platform from each post's
//! embed id (`eId`). The first post matching a platform wins.
//!
//! ## API Endpoints
//!
//! - **Search**: `https://openwhyd.org/search?q={artist} {title}&format=json`
//!
//! ## Embed id patterns
//!
//! | Prefix            | Platform   | Link                                  |
//! |-------------------|------------|---------------------------------------|
//! | `spotify:track:`  | spotify    | `https://open.spotify.com/track/<id>` |
//! | `/yt/`            | youtube    | `https://www.youtube.com/watch?v=<id>`|
//! | `/dz/`            | deezer     | `https://www.deezer.com/track/<id>`   |
//! | `/sc/`            | soundcloud | `https://soundcloud.com/<path>`       |
//! | `/bc/`            | bandcamp   | `https://bandcamp.com/<path>`         |

use super::{record_link, DirectLookup};
use crate::fetch::fetch_validated;
use crate::models::{LinkSet, Platform};
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Openwhyd search endpoint
const OPENWHYD_SEARCH: &str = "https://openwhyd.org/search";

const PROVIDER_NAME: &str = "openwhyd";

/// (embed id prefix, platform, link prefix)
const EMBED_PATTERNS: [(&str, Platform, &str); 5] = [
    ("spotify:track:", Platform::Spotify, "https://open.spotify.com/track/"),
    ("/yt/", Platform::Youtube, "https://www.youtube.com/watch?v="),
    ("/dz/", Platform::Deezer, "https://www.deezer.com/track/"),
    ("/sc/", Platform::Soundcloud, "https://soundcloud.com/"),
    ("/bc/", Platform::Bandcamp, "https://bandcamp.com/"),
];

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(rename = "eId")]
    e_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

/// Direct provider backed by Openwhyd search
pub struct OpenwhydProvider {
    http_client: Arc<dyn HttpClient>,
}

impl OpenwhydProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    fn search_url(title: &str, artist: &str) -> String {
        let query = format!("{} {}", artist, title);
        format!(
            "{}?q={}&format=json",
            OPENWHYD_SEARCH,
            urlencoding::encode(&query)
        )
    }

    /// Platform and link for an embed id, if it matches a known pattern
    fn link_for_embed(e_id: &str) -> Option<(Platform, String)> {
        EMBED_PATTERNS.iter().find_map(|(prefix, platform, base)| {
            let id = e_id.strip_prefix(prefix)?;
            if id.is_empty() {
                return None;
            }
            Some((*platform, format!("{}{}", base, id)))
        })
    }
}

#[async_trait]
impl DirectLookup for OpenwhydProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, title: &str, artist: &str) -> LinkSet {
        let url = Self::search_url(title, artist);
        let mut links = LinkSet::new();

        let Some(response) = fetch_validated::<SearchResponse>(self.http_client.as_ref(), &url).await
        else {
            return links;
        };

        for post in &response.results.posts {
            let Some((platform, link)) = Self::link_for_embed(&post.e_id) else {
                continue;
            };
            if links.contains(platform) {
                continue;
            }
            record_link(&mut links, PROVIDER_NAME, platform, &link);
        }

        debug!(
            posts = response.results.posts.len(),
            found = links.len(),
            "Openwhyd lookup finished"
        );
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{json_response, status_response, MockHttpClient};
    use url::Url;

    fn provider(mock_http: MockHttpClient) -> OpenwhydProvider {
        OpenwhydProvider::new(Arc::new(mock_http))
    }

    #[test]
    fn test_search_url_puts_artist_first() {
        assert_eq!(
            OpenwhydProvider::search_url("Song", "Artist"),
            "https://openwhyd.org/search?q=Artist%20Song&format=json"
        );
    }

    #[test]
    fn test_link_for_embed_patterns() {
        assert_eq!(
            OpenwhydProvider::link_for_embed("spotify:track:abc"),
            Some((Platform::Spotify, "https://open.spotify.com/track/abc".to_string()))
        );
        assert_eq!(
            OpenwhydProvider::link_for_embed("/yt/dQw4w9WgXcQ"),
            Some((Platform::Youtube, "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()))
        );
        assert_eq!(
            OpenwhydProvider::link_for_embed("/dz/12345"),
            Some((Platform::Deezer, "https://www.deezer.com/track/12345".to_string()))
        );
        assert_eq!(
            OpenwhydProvider::link_for_embed("/sc/artist/song"),
            Some((Platform::Soundcloud, "https://soundcloud.com/artist/song".to_string()))
        );
        assert_eq!(
            OpenwhydProvider::link_for_embed("/bc/artist/song"),
            Some((Platform::Bandcamp, "https://bandcamp.com/artist/song".to_string()))
        );
        assert_eq!(OpenwhydProvider::link_for_embed("/vi/12345"), None);
        assert_eq!(OpenwhydProvider::link_for_embed("/yt/"), None);
    }

    #[tokio::test]
    async fn test_first_match_per_platform_wins() {
        let body = r#"{
            "results": {
                "posts": [
                    {"id": "1", "name": "Artist - Song", "eId": "/yt/first"},
                    {"id": "2", "name": "Artist - Song", "eId": "/yt/second"},
                    {"id": "3", "name": "Artist - Song", "eId": "/dz/42"},
                    {"id": "4", "name": "Artist - Song", "eId": "/vi/999"},
                    {"id": "5", "name": "Artist - Song", "eId": "spotify:track:sp"}
                ]
            }
        }"#;
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url.starts_with(OPENWHYD_SEARCH))
            .times(1)
            .returning(move |_| Ok(json_response(body)));

        let links = provider(mock_http).lookup("Song", "Artist").await;

        assert_eq!(links.len(), 3);
        assert_eq!(
            links.get(Platform::Youtube).map(Url::as_str),
            Some("https://www.youtube.com/watch?v=first")
        );
        assert_eq!(
            links.get(Platform::Deezer).map(Url::as_str),
            Some("https://www.deezer.com/track/42")
        );
        assert_eq!(
            links.get(Platform::Spotify).map(Url::as_str),
            Some("https://open.spotify.com/track/sp")
        );
    }

    #[tokio::test]
    async fn test_no_posts_is_empty() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(r#"{"results":{"posts":[]}}"#)));

        let links = provider(mock_http).lookup("Song", "Artist").await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_empty() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(r#"{"results":{"posts":[{"id":"1"}]}}"#)));

        let links = provider(mock_http).lookup("Song", "Artist").await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_is_empty() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(status_response(502)));

        let links = provider(mock_http).lookup("Song", "Artist").await;
        assert!(links.is_empty());
    }
}
