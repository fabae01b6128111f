//! Last.fm API client for Encore
//!
//! This crate provides a client for the Last.fm scrobbling API, bound to
//! one configured user, enabling:
//! - Recent, loved and top track listings of any size (the upstream API
//!   caps a single response at 1000 items; listings beyond that are
//!   assembled from planned, partially parallel page fetches)
//! - A currently-playing probe
//! - Single-track lookups
//!
//! Page fetches within one chunk run concurrently; chunks run in sequence,
//! so peak fan-out stays at `chunk_size / per_request_cap` calls (5 in the
//! default configuration). A failed page fails the whole listing; callers
//! always get exactly `min(limit, total available)` tracks or an error,
//! never a silently short result.
//!
//! # Example
//!
//! ```rust,no_run
//! use encore_lastfm_client::{LastfmClient, RecentTracksOptions, TopTracksOptions, Period};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LastfmClient::from_env()?;
//!
//! // 2500 most recent scrobbles: three upstream calls, two of them parallel
//! let recent = client
//!     .get_recent_tracks(RecentTracksOptions {
//!         limit: Some(2500),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("fetched {} scrobbles", recent.len());
//!
//! // Full most-played ranking for the last year
//! let top = client
//!     .get_top_tracks(TopTracksOptions {
//!         limit: None,
//!         period: Period::TwelveMonth,
//!     })
//!     .await?;
//! for track in top.iter().take(10) {
//!     println!("#{} {} - {}", track.rank, track.artist.name, track.name);
//! }
//!
//! // What is playing right now?
//! if let Some(track) = client.get_now_playing().await? {
//!     println!("now playing: {}", track.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `LASTFM_API_KEY`: API key for Last.fm (required)
//! - `LASTFM_USERNAME`: user whose tracks are fetched (required)
//! - `LASTFM_API_URL`, `LASTFM_TIMEOUT`, `LASTFM_CONNECT_TIMEOUT`,
//!   `LASTFM_PER_REQUEST_CAP`, `LASTFM_CHUNK_SIZE`: optional overrides

mod client;
mod error;
mod models;
mod plan;

pub use client::{ApiKeyStatus, LastfmClient, Method};
pub use error::{LastfmError, LastfmResult};
pub use models::{
    AlbumRef, ArtistRef, LovedTrack, LovedTracksOptions, Page, Period, RecentTrack,
    RecentTracksOptions, TopTrack, TopTracksOptions, Track, TrackInfo,
};
pub use plan::{FetchPlan, PageRequest};

pub use encore_shared_config::LastfmConfig;
