//! Mock Last.fm server for testing track fetching
//!
//! Provides a [`MockLastfmServer`] that simulates the Last.fm web API
//! (listing endpoints, error payloads, transport failures) for testing the
//! pagination pipeline without a real upstream.

use serde_json::json;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Last.fm server for testing listing and lookup calls
///
/// This struct wraps a [`wiremock::MockServer`] and provides convenience
/// methods for mounting per-page listing responses, upstream error payloads
/// and failure scenarios. Page mounts carry an exactly-once expectation, so
/// a plan that repeats or skips a page fails verification.
///
/// # Example
///
/// ```rust,ignore
/// use encore_test_utils::{MockLastfmServer, RecentTrackFixture};
///
/// #[tokio::test]
/// async fn test_fetch() {
///     let server = MockLastfmServer::start().await;
///     let tracks = RecentTrackFixture::batch(0, 50);
///     server.mock_recent_tracks_page(1, 50, 600, &tracks).await;
///
///     // Point your client's base URL at server.url()
/// }
/// ```
pub struct MockLastfmServer {
    server: MockServer,
    api_key: String,
    username: String,
}

impl MockLastfmServer {
    /// Start a new mock Last.fm server with default credentials
    pub async fn start() -> Self {
        Self::start_with_user("test-api-key", "testuser").await
    }

    /// Start a new mock Last.fm server with custom credentials
    pub async fn start_with_user(api_key: &str, username: &str) -> Self {
        let server = MockServer::start().await;
        Self {
            server,
            api_key: api_key.to_string(),
            username: username.to_string(),
        }
    }

    /// Get the server URL (use as the client's base URL)
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Assert all mounted expectations, pinpointing the offending mock
    pub async fn verify(&self) {
        self.server.verify().await;
    }

    /// Mount one page of a listing method, expected to be fetched exactly once
    pub async fn mock_page(&self, api_method: &str, page: u64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("method", api_method))
            .and(query_param("api_key", self.api_key.as_str()))
            .and(query_param("user", self.username.as_str()))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mount one page without a call-count expectation
    ///
    /// For failure-path tests: siblings of a failed concurrent fetch may be
    /// cancelled before their request is sent, so an exactly-once
    /// expectation would be flaky there.
    pub async fn mock_page_lenient(&self, api_method: &str, page: u64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("method", api_method))
            .and(query_param("api_key", self.api_key.as_str()))
            .and(query_param("user", self.username.as_str()))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount one page of `user.getRecentTracks`
    pub async fn mock_recent_tracks_page(
        &self,
        page: u64,
        per_page: u64,
        total: u64,
        tracks: &[RecentTrackFixture],
    ) {
        let body = recent_tracks_body(&self.username, page, per_page, total, tracks);
        self.mock_page("user.getRecentTracks", page, body).await;
    }

    /// Mount one page of `user.getLovedTracks`
    pub async fn mock_loved_tracks_page(
        &self,
        page: u64,
        per_page: u64,
        total: u64,
        tracks: &[LovedTrackFixture],
    ) {
        let body = loved_tracks_body(&self.username, page, per_page, total, tracks);
        self.mock_page("user.getLovedTracks", page, body).await;
    }

    /// Mount one page of `user.getTopTracks`
    pub async fn mock_top_tracks_page(
        &self,
        page: u64,
        per_page: u64,
        total: u64,
        tracks: &[TopTrackFixture],
    ) {
        let body = top_tracks_body(&self.username, page, per_page, total, tracks);
        self.mock_page("user.getTopTracks", page, body).await;
    }

    /// Mount a `track.getInfo` response
    pub async fn mock_track_info(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("method", "track.getInfo"))
            .and(query_param("api_key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a well-formed upstream error payload for one method
    pub async fn mock_api_error(&self, api_method: &str, code: i32, message: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("method", api_method))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": code,
                "message": message
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a bare server failure for one page of one method
    pub async fn mock_page_failure(&self, api_method: &str, page: u64, status: u16) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("method", api_method))
            .and(query_param("page", page.to_string().as_str()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount a rate-limit response for one method
    pub async fn mock_rate_limit(&self, api_method: &str) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("method", api_method))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "60")
                    .set_body_json(json!({
                        "error": 29,
                        "message": "Rate limit exceeded"
                    })),
            )
            .mount(&self.server)
            .await;
    }

    /// Assert that no request of any kind reaches the server
    pub async fn expect_no_requests(&self) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

fn page_attr(username: &str, page: u64, per_page: u64, total: u64) -> serde_json::Value {
    let total_pages = if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };
    json!({
        "user": username,
        "page": page.to_string(),
        "perPage": per_page.to_string(),
        "totalPages": total_pages.to_string(),
        "total": total.to_string(),
    })
}

/// Build a full `user.getRecentTracks` response body
pub fn recent_tracks_body(
    username: &str,
    page: u64,
    per_page: u64,
    total: u64,
    tracks: &[RecentTrackFixture],
) -> serde_json::Value {
    json!({
        "recenttracks": {
            "track": tracks.iter().map(|t| t.to_json()).collect::<Vec<_>>(),
            "@attr": page_attr(username, page, per_page, total),
        }
    })
}

/// Build a full `user.getLovedTracks` response body
pub fn loved_tracks_body(
    username: &str,
    page: u64,
    per_page: u64,
    total: u64,
    tracks: &[LovedTrackFixture],
) -> serde_json::Value {
    json!({
        "lovedtracks": {
            "track": tracks.iter().map(|t| t.to_json()).collect::<Vec<_>>(),
            "@attr": page_attr(username, page, per_page, total),
        }
    })
}

/// Build a full `user.getTopTracks` response body
pub fn top_tracks_body(
    username: &str,
    page: u64,
    per_page: u64,
    total: u64,
    tracks: &[TopTrackFixture],
) -> serde_json::Value {
    json!({
        "toptracks": {
            "track": tracks.iter().map(|t| t.to_json()).collect::<Vec<_>>(),
            "@attr": page_attr(username, page, per_page, total),
        }
    })
}

/// Base timestamp fixtures count down from (newest scrobble first)
const FIXTURE_BASE_UTS: u64 = 1_700_000_000;

/// Fixture for creating recent-track entries
#[derive(Debug, Clone)]
pub struct RecentTrackFixture {
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub uts: Option<u64>,
    pub now_playing: bool,
    pub mbid: String,
}

impl RecentTrackFixture {
    /// Create a scrobbled track fixture
    pub fn played(name: &str, artist: &str, uts: u64) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            album: Some(format!("{} (Album)", artist)),
            uts: Some(uts),
            now_playing: false,
            mbid: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create a currently-playing track fixture (no scrobble date)
    pub fn now_playing(name: &str, artist: &str) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            album: None,
            uts: None,
            now_playing: true,
            mbid: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create `count` deterministic fixtures starting at a global index
    ///
    /// Names encode the index (`track-00042`) so ordering assertions can
    /// span page boundaries; timestamps strictly decrease with the index.
    pub fn batch(start_index: u64, count: u64) -> Vec<Self> {
        (start_index..start_index + count)
            .map(|index| {
                Self::played(
                    &format!("track-{:05}", index),
                    &format!("artist-{}", index % 7),
                    FIXTURE_BASE_UTS - index,
                )
            })
            .collect()
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = json!({
            "artist": {"mbid": "", "#text": self.artist},
            "name": self.name,
            "mbid": self.mbid,
            "url": format!(
                "https://www.last.fm/music/{}/_/{}",
                self.artist.replace(' ', "+"),
                self.name.replace(' ', "+")
            ),
        });

        if let Some(album) = &self.album {
            value["album"] = json!({"mbid": "", "#text": album});
        }
        if let Some(uts) = self.uts {
            value["date"] = json!({"uts": uts.to_string(), "#text": "fixture"});
        }
        if self.now_playing {
            value["@attr"] = json!({"nowplaying": "true"});
        }

        value
    }
}

/// Fixture for creating loved-track entries
#[derive(Debug, Clone)]
pub struct LovedTrackFixture {
    pub name: String,
    pub artist: String,
    pub uts: u64,
    pub mbid: String,
}

impl LovedTrackFixture {
    /// Create a loved track fixture
    pub fn new(name: &str, artist: &str, uts: u64) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            uts,
            mbid: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Create `count` deterministic fixtures starting at a global index
    pub fn batch(start_index: u64, count: u64) -> Vec<Self> {
        (start_index..start_index + count)
            .map(|index| {
                Self::new(
                    &format!("track-{:05}", index),
                    &format!("artist-{}", index % 7),
                    FIXTURE_BASE_UTS - index,
                )
            })
            .collect()
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "artist": {
                "name": self.artist,
                "mbid": "",
                "url": format!("https://www.last.fm/music/{}", self.artist.replace(' ', "+")),
            },
            "name": self.name,
            "mbid": self.mbid,
            "url": format!(
                "https://www.last.fm/music/{}/_/{}",
                self.artist.replace(' ', "+"),
                self.name.replace(' ', "+")
            ),
            "date": {"uts": self.uts.to_string(), "#text": "fixture"},
        })
    }
}

/// Fixture for creating top-track ranking entries
#[derive(Debug, Clone)]
pub struct TopTrackFixture {
    pub name: String,
    pub artist: String,
    pub rank: u64,
    pub playcount: u64,
    pub duration_secs: u64,
}

impl TopTrackFixture {
    /// Create a ranked track fixture
    pub fn ranked(rank: u64, name: &str, artist: &str, playcount: u64) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            rank,
            playcount,
            duration_secs: 240,
        }
    }

    /// Create `count` deterministic fixtures with ranks starting at `start_rank`
    pub fn batch(start_rank: u64, count: u64) -> Vec<Self> {
        (start_rank..start_rank + count)
            .map(|rank| {
                Self::ranked(
                    rank,
                    &format!("track-{:05}", rank),
                    &format!("artist-{}", rank % 7),
                    1000_u64.saturating_sub(rank),
                )
            })
            .collect()
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "artist": {
                "name": self.artist,
                "mbid": "",
                "url": format!("https://www.last.fm/music/{}", self.artist.replace(' ', "+")),
            },
            "name": self.name,
            "mbid": uuid::Uuid::new_v4().to_string(),
            "url": format!(
                "https://www.last.fm/music/{}/_/{}",
                self.artist.replace(' ', "+"),
                self.name.replace(' ', "+")
            ),
            "@attr": {"rank": self.rank.to_string()},
            "playcount": self.playcount.to_string(),
            "duration": self.duration_secs.to_string(),
        })
    }
}
