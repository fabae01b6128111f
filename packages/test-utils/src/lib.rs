//! Shared test utilities for Encore workspace
//!
//! This crate provides a mock implementation of the Last.fm web API for
//! testing without network dependencies.
//!
//! # Mock Services
//!
//! - [`MockLastfmServer`] - Mock Last.fm server with per-page listing
//!   mounts, upstream error payloads and failure scenarios
//!
//! # Example
//!
//! ```rust,ignore
//! use encore_test_utils::{MockLastfmServer, RecentTrackFixture};
//!
//! #[tokio::test]
//! async fn test_with_mock() {
//!     let server = MockLastfmServer::start().await;
//!     let tracks = RecentTrackFixture::batch(0, 50);
//!     server.mock_recent_tracks_page(1, 50, 600, &tracks).await;
//!
//!     // Use server.url() as the client's base URL
//! }
//! ```

mod lastfm;

pub use lastfm::{
    loved_tracks_body, recent_tracks_body, top_tracks_body, LovedTrackFixture, MockLastfmServer,
    RecentTrackFixture, TopTrackFixture,
};
