//! Last.fm API client implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_util::future::try_join_all;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use encore_shared_config::{ConfigError, LastfmConfig};

use crate::error::{LastfmError, LastfmResult};
use crate::models::{
    ErrorResponse, LovedTrack, LovedTracksOptions, LovedTracksResponse, Page, RecentTrack,
    RecentTracksOptions, RecentTracksResponse, TopTrack, TopTracksOptions, TopTracksResponse,
    TrackInfo, TrackInfoResponse,
};
use crate::plan::{FetchPlan, PageRequest};

/// User agent sent with every request
const USER_AGENT: &str = "Encore/1.0";

/// Maximum artist/track name length accepted for lookups
const MAX_NAME_LENGTH: usize = 256;

/// Upstream error code for an invalid API key
const ERROR_CODE_INVALID_API_KEY: i32 = 10;

/// Upstream error code for a missing track
const ERROR_CODE_NOT_FOUND: i32 = 6;

/// Upstream API methods this client calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `user.getRecentTracks`
    RecentTracks,
    /// `user.getLovedTracks`
    LovedTracks,
    /// `user.getTopTracks`
    TopTracks,
    /// `track.getInfo`
    TrackInfo,
}

impl Method {
    /// Wire value of this method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecentTracks => "user.getRecentTracks",
            Self::LovedTracks => "user.getLovedTracks",
            Self::TopTracks => "user.getTopTracks",
            Self::TrackInfo => "track.getInfo",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API key validation status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyStatus {
    /// API key is valid
    Valid,
    /// API key is invalid
    Invalid,
    /// Could not determine validity (network error, etc.)
    Unknown(String),
}

/// Last.fm API client bound to one configured user
///
/// Constructed from an explicit [`LastfmConfig`] and passed by reference to
/// callers; there is no process-global instance.
#[derive(Clone)]
pub struct LastfmClient {
    http_client: Client,
    config: LastfmConfig,
}

impl fmt::Debug for LastfmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LastfmClient")
            .field("base_url", &self.config.base_url)
            .field("username", &self.config.username)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl LastfmClient {
    /// Create a new Last.fm client from configuration
    ///
    /// Fails before any network call when the API key or username is
    /// missing, or when the pagination parameters violate the planner
    /// precondition (`chunk_size` must be a nonzero multiple of
    /// `per_request_cap`).
    pub fn new(config: LastfmConfig) -> LastfmResult<Self> {
        if config.api_key.is_empty() {
            return Err(LastfmError::MissingApiKey);
        }
        if config.username.trim().is_empty() {
            return Err(LastfmError::InvalidInput(
                "username cannot be empty".to_string(),
            ));
        }
        config
            .validate()
            .map_err(|e| LastfmError::Config(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.max_concurrent_calls() as usize)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a Last.fm client from environment variables
    ///
    /// Reads `LASTFM_API_KEY` and `LASTFM_USERNAME` (plus the optional
    /// overrides documented on [`LastfmConfig`]).
    pub fn from_env() -> LastfmResult<Self> {
        let config = LastfmConfig::from_env().map_err(|e| match e {
            ConfigError::MissingEnvVar(name) if name == "LASTFM_API_KEY" => {
                LastfmError::MissingApiKey
            }
            ConfigError::MissingEnvVar(name) => {
                LastfmError::InvalidInput(format!("{} is not set", name))
            }
            other => LastfmError::Config(other.to_string()),
        })?;
        Self::new(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &LastfmConfig {
        &self.config
    }

    /// Username this client fetches tracks for
    pub fn username(&self) -> &str {
        &self.config.username
    }

    /// Validate artist/track name input for lookups
    fn validate_name<'a>(value: &'a str, what: &str) -> LastfmResult<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LastfmError::InvalidInput(format!(
                "{} name cannot be empty",
                what
            )));
        }
        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(LastfmError::InvalidInput(format!(
                "{} name too long (max {} characters)",
                what, MAX_NAME_LENGTH
            )));
        }
        Ok(trimmed)
    }

    /// Make one API request and surface the common failure shapes
    ///
    /// A well-formed upstream error payload wins over the raw status code;
    /// a non-2xx response without one becomes a status error naming the
    /// method for diagnostics.
    async fn send_request(&self, method: Method, params: &[(&str, String)]) -> LastfmResult<String> {
        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(&[
                ("method", method.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("format", "json"),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LastfmError::Timeout
                } else {
                    LastfmError::Http(e)
                }
            })?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(method = %method, "Last.fm API rate limited");
            return Err(LastfmError::RateLimited);
        }

        let status = response.status();
        let text = response.text().await.map_err(LastfmError::Http)?;

        if let Ok(error) = serde_json::from_str::<ErrorResponse>(&text) {
            return Err(LastfmError::Api {
                code: error.error,
                message: error.message,
            });
        }

        if !status.is_success() {
            warn!(method = %method, status = status.as_u16(), "Last.fm returned an error status");
            return Err(LastfmError::Status {
                status: status.as_u16(),
                method: method.as_str().to_string(),
            });
        }

        Ok(text)
    }

    /// Parse a response body, naming the expected shape on failure
    fn parse_response<T: serde::de::DeserializeOwned>(
        text: &str,
        expected: &'static str,
    ) -> LastfmResult<T> {
        serde_json::from_str(text).map_err(|source| LastfmError::Parse { expected, source })
    }

    /// Fetch one page of the user's recent tracks
    async fn fetch_recent_page(
        &self,
        options: &RecentTracksOptions,
        request: PageRequest,
    ) -> LastfmResult<Page<RecentTrack>> {
        let mut params = vec![
            ("user", self.config.username.clone()),
            ("limit", request.limit.to_string()),
            ("page", request.page.to_string()),
        ];
        if options.extended {
            params.push(("extended", "1".to_string()));
        }
        if let Some(from) = options.from {
            params.push(("from", from.timestamp().to_string()));
        }
        if let Some(to) = options.to {
            params.push(("to", to.timestamp().to_string()));
        }

        let text = self.send_request(Method::RecentTracks, &params).await?;
        let response: RecentTracksResponse = Self::parse_response(&text, "recenttracks")?;
        Ok(response.into())
    }

    /// Fetch one page of the user's loved tracks
    async fn fetch_loved_page(&self, request: PageRequest) -> LastfmResult<Page<LovedTrack>> {
        let params = [
            ("user", self.config.username.clone()),
            ("limit", request.limit.to_string()),
            ("page", request.page.to_string()),
        ];

        let text = self.send_request(Method::LovedTracks, &params).await?;
        let response: LovedTracksResponse = Self::parse_response(&text, "lovedtracks")?;
        Ok(response.into())
    }

    /// Fetch one page of the user's top tracks
    async fn fetch_top_page(
        &self,
        options: &TopTracksOptions,
        request: PageRequest,
    ) -> LastfmResult<Page<TopTrack>> {
        let params = [
            ("user", self.config.username.clone()),
            ("period", options.period.as_str().to_string()),
            ("limit", request.limit.to_string()),
            ("page", request.page.to_string()),
        ];

        let text = self.send_request(Method::TopTracks, &params).await?;
        let response: TopTracksResponse = Self::parse_response(&text, "toptracks")?;
        Ok(response.into())
    }

    /// Assemble a full track listing from as many page fetches as needed
    ///
    /// The exploratory first call learns the true total, the plan turns the
    /// remaining need into chunks, and each chunk's pages are fetched
    /// concurrently while chunks themselves run strictly in sequence.
    /// `try_join_all` keeps results in issue order (pages ascending) and
    /// resolves with the first failure, dropping the in-flight siblings, so
    /// a failed page discards the whole listing rather than returning it
    /// short.
    async fn fetch_all_pages<T, F, Fut>(
        &self,
        method: Method,
        requested: Option<u64>,
        fetch_page: F,
    ) -> LastfmResult<Vec<T>>
    where
        F: Fn(PageRequest) -> Fut,
        Fut: Future<Output = LastfmResult<Page<T>>>,
    {
        if requested == Some(0) {
            debug!(method = %method, "Zero items requested, skipping fetch");
            return Ok(Vec::new());
        }

        let first = fetch_page(FetchPlan::first_page(requested, self.config.per_request_cap)).await?;

        let plan = FetchPlan::for_remaining(
            requested,
            first.total,
            self.config.per_request_cap,
            self.config.chunk_size,
        )?;

        debug!(
            method = %method,
            total = first.total,
            target = plan.effective_target,
            chunks = plan.chunks.len(),
            follow_up_calls = plan.follow_up_calls(),
            "Planned paginated fetch"
        );

        let mut tracks = first.tracks;
        for (index, chunk) in plan.chunks.iter().enumerate() {
            let pages = try_join_all(chunk.iter().copied().map(&fetch_page)).await?;

            debug!(
                method = %method,
                chunk = index,
                calls = chunk.len(),
                "Fetched chunk"
            );

            for page in pages {
                tracks.extend(page.tracks);
            }
        }

        tracks.truncate(plan.effective_target as usize);
        Ok(tracks)
    }

    /// Get the user's recent tracks
    ///
    /// Fetches up to `options.limit` scrobbles (everything available when
    /// absent), newest first, transparently spanning as many upstream pages
    /// as needed.
    ///
    /// # Errors
    /// - `LastfmError::Api` - If Last.fm returns an error payload
    /// - `LastfmError::Parse` - If a response does not match the expected shape
    /// - `LastfmError::Http` / `Timeout` / `Status` - If a request fails
    #[instrument(skip(self))]
    pub async fn get_recent_tracks(
        &self,
        options: RecentTracksOptions,
    ) -> LastfmResult<Vec<RecentTrack>> {
        let tracks = self
            .fetch_all_pages(Method::RecentTracks, options.limit, |request| {
                self.fetch_recent_page(&options, request)
            })
            .await?;

        debug!(count = tracks.len(), user = %self.config.username, "Fetched recent tracks");
        Ok(tracks)
    }

    /// Get the user's loved tracks
    #[instrument(skip(self))]
    pub async fn get_loved_tracks(
        &self,
        options: LovedTracksOptions,
    ) -> LastfmResult<Vec<LovedTrack>> {
        let tracks = self
            .fetch_all_pages(Method::LovedTracks, options.limit, |request| {
                self.fetch_loved_page(request)
            })
            .await?;

        debug!(count = tracks.len(), user = %self.config.username, "Fetched loved tracks");
        Ok(tracks)
    }

    /// Get the user's top tracks for a ranking period
    #[instrument(skip(self))]
    pub async fn get_top_tracks(&self, options: TopTracksOptions) -> LastfmResult<Vec<TopTrack>> {
        let tracks = self
            .fetch_all_pages(Method::TopTracks, options.limit, |request| {
                self.fetch_top_page(&options, request)
            })
            .await?;

        debug!(count = tracks.len(), user = %self.config.username, "Fetched top tracks");
        Ok(tracks)
    }

    /// Get the track the user is listening to right now
    ///
    /// A lightweight single-call probe (page 1, limit 1). Returns
    /// `Ok(None)` when nothing is currently playing; the error path is
    /// reserved for transport and validation failures.
    #[instrument(skip(self))]
    pub async fn get_now_playing(&self) -> LastfmResult<Option<RecentTrack>> {
        let page = self
            .fetch_recent_page(
                &RecentTracksOptions::default(),
                PageRequest { page: 1, limit: 1 },
            )
            .await?;

        Ok(page.tracks.into_iter().find(|track| track.now_playing))
    }

    /// Look up detailed information for one track
    ///
    /// Includes the configured user's play count and loved flag when
    /// upstream reports them.
    ///
    /// # Errors
    /// - `LastfmError::InvalidInput` - If the artist or track name is empty or too long
    /// - `LastfmError::TrackNotFound` - If the track is unknown upstream
    #[instrument(skip(self))]
    pub async fn get_track_info(&self, artist: &str, track: &str) -> LastfmResult<TrackInfo> {
        let artist = Self::validate_name(artist, "artist")?;
        let track = Self::validate_name(track, "track")?;

        let params = [
            ("artist", artist.to_string()),
            ("track", track.to_string()),
            ("username", self.config.username.clone()),
        ];

        let text = match self.send_request(Method::TrackInfo, &params).await {
            Err(LastfmError::Api {
                code: ERROR_CODE_NOT_FOUND,
                ..
            }) => {
                return Err(LastfmError::TrackNotFound {
                    artist: artist.to_string(),
                    track: track.to_string(),
                })
            }
            other => other?,
        };

        let response: TrackInfoResponse = Self::parse_response(&text, "track")?;
        Ok(response.track.into())
    }

    /// Check if the API key is valid by making a minimal request
    ///
    /// Returns `ApiKeyStatus` indicating whether the key is valid, invalid,
    /// or if the check could not be completed due to network issues.
    pub async fn validate_api_key(&self) -> ApiKeyStatus {
        let options = RecentTracksOptions {
            limit: Some(1),
            ..Default::default()
        };

        match self.get_recent_tracks(options).await {
            Ok(_) => ApiKeyStatus::Valid,
            Err(LastfmError::Api {
                code: ERROR_CODE_INVALID_API_KEY,
                ..
            }) => ApiKeyStatus::Invalid,
            Err(e) => ApiKeyStatus::Unknown(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LastfmConfig {
        LastfmConfig::new("test_api_key", "testuser")
    }

    #[test]
    fn test_client_requires_api_key() {
        let result = LastfmClient::new(LastfmConfig::new("", "testuser"));
        assert!(matches!(result, Err(LastfmError::MissingApiKey)));
    }

    #[test]
    fn test_client_requires_username() {
        let result = LastfmClient::new(LastfmConfig::new("key", "   "));
        assert!(matches!(result, Err(LastfmError::InvalidInput(_))));
    }

    #[test]
    fn test_client_accepts_valid_config() {
        assert!(LastfmClient::new(test_config()).is_ok());
    }

    #[test]
    fn test_client_rejects_non_multiple_chunk_size() {
        let config = test_config().with_pagination(1000, 4500);
        let result = LastfmClient::new(config);
        assert!(matches!(result, Err(LastfmError::Config(_))));
    }

    #[test]
    fn test_client_debug_redacts_api_key() {
        let client = LastfmClient::new(LastfmConfig::new("secret_key", "testuser")).unwrap();
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("secret_key"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("testuser"));
    }

    #[test]
    fn test_validate_name_empty() {
        let result = LastfmClient::validate_name("   ", "artist");
        assert!(matches!(result, Err(LastfmError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_name_too_long() {
        let long_name = "a".repeat(MAX_NAME_LENGTH + 1);
        let result = LastfmClient::validate_name(&long_name, "track");
        assert!(matches!(result, Err(LastfmError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_name_trims() {
        assert!(matches!(
            LastfmClient::validate_name("  Radiohead  ", "artist"),
            Ok("Radiohead")
        ));
    }

    #[test]
    fn test_method_wire_values() {
        assert_eq!(Method::RecentTracks.as_str(), "user.getRecentTracks");
        assert_eq!(Method::LovedTracks.as_str(), "user.getLovedTracks");
        assert_eq!(Method::TopTracks.as_str(), "user.getTopTracks");
        assert_eq!(Method::TrackInfo.as_str(), "track.getInfo");
    }

    #[tokio::test]
    async fn test_zero_limit_issues_no_network_call() {
        // Unroutable base URL: any attempted request would fail loudly.
        let config = test_config().with_base_url("http://127.0.0.1:1/2.0/");
        let client = LastfmClient::new(config).unwrap();

        let options = RecentTracksOptions {
            limit: Some(0),
            ..Default::default()
        };
        let tracks = client.get_recent_tracks(options).await.unwrap();
        assert!(tracks.is_empty());

        let tracks = client
            .get_loved_tracks(LovedTracksOptions { limit: Some(0) })
            .await
            .unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_api_key_status_equality() {
        assert_eq!(ApiKeyStatus::Valid, ApiKeyStatus::Valid);
        assert_ne!(ApiKeyStatus::Valid, ApiKeyStatus::Invalid);
    }
}
