//! Last.fm API request and response models
//!
//! Public types are the normalized records callers work with; the
//! crate-private `Raw*` types mirror the loosely-typed wire format and own
//! the coercions (numeric strings to integers, `"0"`/`"1"` flags to bools,
//! unix-second strings to timestamps, empty-string ids to `None`). A
//! response that fails these conversions surfaces as a parse error naming
//! the expected shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Request options
// =============================================================================

/// Options for fetching a user's recent tracks
#[derive(Debug, Clone, Default)]
pub struct RecentTracksOptions {
    /// Maximum number of tracks to return; `None` fetches everything
    pub limit: Option<u64>,
    /// Only include scrobbles at or after this time
    pub from: Option<DateTime<Utc>>,
    /// Only include scrobbles before this time
    pub to: Option<DateTime<Utc>>,
    /// Request richer artist data and the loved flag per track
    pub extended: bool,
}

/// Options for fetching a user's loved tracks
#[derive(Debug, Clone, Default)]
pub struct LovedTracksOptions {
    /// Maximum number of tracks to return; `None` fetches everything
    pub limit: Option<u64>,
}

/// Options for fetching a user's top tracks
#[derive(Debug, Clone, Default)]
pub struct TopTracksOptions {
    /// Maximum number of tracks to return; `None` fetches everything
    pub limit: Option<u64>,
    /// Ranking period
    pub period: Period,
}

/// Ranking period for top tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Overall,
    SevenDay,
    OneMonth,
    ThreeMonth,
    SixMonth,
    TwelveMonth,
}

impl Period {
    /// Wire value of this period
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::SevenDay => "7day",
            Self::OneMonth => "1month",
            Self::ThreeMonth => "3month",
            Self::SixMonth => "6month",
            Self::TwelveMonth => "12month",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "overall" => Self::Overall,
            "7day" => Self::SevenDay,
            "1month" => Self::OneMonth,
            "3month" => Self::ThreeMonth,
            "6month" => Self::SixMonth,
            "12month" => Self::TwelveMonth,
            other => return Err(format!("unknown period: {}", other)),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Public track records
// =============================================================================

/// Reference to the artist of a track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtistRef {
    /// Artist name
    pub name: String,
    /// MusicBrainz ID (if available)
    pub mbid: Option<String>,
    /// URL to the artist page (extended responses only)
    pub url: Option<String>,
}

/// Reference to the album of a track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlbumRef {
    /// Album title
    pub name: String,
    /// MusicBrainz ID (if available)
    pub mbid: Option<String>,
}

/// One entry of a user's listening history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTrack {
    /// Track name
    pub name: String,
    /// MusicBrainz ID (if available)
    pub mbid: Option<String>,
    /// URL to the track page
    pub url: String,
    /// Artist reference
    pub artist: ArtistRef,
    /// Album reference (if known)
    pub album: Option<AlbumRef>,
    /// When the scrobble happened; absent while the track is still playing
    pub played_at: Option<DateTime<Utc>>,
    /// Whether this entry is the currently playing track
    pub now_playing: bool,
    /// Whether the user loves this track (extended responses only)
    pub loved: Option<bool>,
}

/// One track the user marked as loved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LovedTrack {
    /// Track name
    pub name: String,
    /// MusicBrainz ID (if available)
    pub mbid: Option<String>,
    /// URL to the track page
    pub url: String,
    /// Artist reference
    pub artist: ArtistRef,
    /// When the track was loved
    pub loved_at: DateTime<Utc>,
}

/// One entry of a user's most-played ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTrack {
    /// Track name
    pub name: String,
    /// MusicBrainz ID (if available)
    pub mbid: Option<String>,
    /// URL to the track page
    pub url: String,
    /// Artist reference
    pub artist: ArtistRef,
    /// 1-based rank within the requested period
    pub rank: u32,
    /// Play count within the requested period
    pub playcount: u64,
    /// Track length in seconds; upstream reports unknown lengths as zero
    pub duration_secs: Option<u64>,
}

/// Detailed single-track lookup result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Track name
    pub name: String,
    /// MusicBrainz ID (if available)
    pub mbid: Option<String>,
    /// URL to the track page
    pub url: String,
    /// Artist reference
    pub artist: ArtistRef,
    /// Album reference (if known)
    pub album: Option<AlbumRef>,
    /// Track length in milliseconds; upstream reports unknown lengths as zero
    pub duration_ms: Option<u64>,
    /// Number of distinct listeners
    pub listeners: Option<u64>,
    /// Global play count
    pub playcount: Option<u64>,
    /// Configured user's play count (if upstream reports it)
    pub user_playcount: Option<u64>,
    /// Whether the configured user loves this track (if reported)
    pub user_loved: Option<bool>,
}

/// Any track record this client can return
///
/// Per-method operations return their concrete variant type; this union
/// exists for callers that aggregate heterogeneous listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Track {
    /// Listening-history entry
    Recent(RecentTrack),
    /// Loved track
    Loved(LovedTrack),
    /// Most-played ranking entry
    Top(TopTrack),
}

impl Track {
    /// Track name
    pub fn name(&self) -> &str {
        match self {
            Self::Recent(track) => &track.name,
            Self::Loved(track) => &track.name,
            Self::Top(track) => &track.name,
        }
    }

    /// Artist reference
    pub fn artist(&self) -> &ArtistRef {
        match self {
            Self::Recent(track) => &track.artist,
            Self::Loved(track) => &track.artist,
            Self::Top(track) => &track.artist,
        }
    }

    /// URL to the track page
    pub fn url(&self) -> &str {
        match self {
            Self::Recent(track) => &track.url,
            Self::Loved(track) => &track.url,
            Self::Top(track) => &track.url,
        }
    }

    /// MusicBrainz ID (if available)
    pub fn mbid(&self) -> Option<&str> {
        match self {
            Self::Recent(track) => track.mbid.as_deref(),
            Self::Loved(track) => track.mbid.as_deref(),
            Self::Top(track) => track.mbid.as_deref(),
        }
    }
}

impl From<RecentTrack> for Track {
    fn from(track: RecentTrack) -> Self {
        Self::Recent(track)
    }
}

impl From<LovedTrack> for Track {
    fn from(track: LovedTrack) -> Self {
        Self::Loved(track)
    }
}

impl From<TopTrack> for Track {
    fn from(track: TopTrack) -> Self {
        Self::Top(track)
    }
}

// =============================================================================
// Pages
// =============================================================================

/// One upstream-paginated slice of a track listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Tracks of this page, in upstream order
    pub tracks: Vec<T>,
    /// 1-based page number
    pub page: u64,
    /// Per-page limit this slice was fetched with
    pub per_page: u64,
    /// Total pages available at this limit
    pub total_pages: u64,
    /// Total items available
    pub total: u64,
}

impl<T> Page<T> {
    pub(crate) fn new(mut tracks: Vec<T>, attr: RawPageAttr) -> Self {
        // A now-playing entry rides on top of the requested limit; drop the
        // overflow so a page never exceeds its declared size.
        if tracks.len() as u64 > attr.per_page {
            tracks.truncate(attr.per_page as usize);
        }

        Self {
            tracks,
            page: attr.page,
            per_page: attr.per_page,
            total_pages: attr.total_pages,
            total: attr.total,
        }
    }
}

// =============================================================================
// Coercion helpers
// =============================================================================

/// Accept either a JSON number or its decimal-string spelling
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr<T> {
    Num(T),
    Str(String),
}

fn de_uint<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
    T::Err: fmt::Display,
{
    match NumOrStr::<T>::deserialize(deserializer)? {
        NumOrStr::Num(value) => Ok(value),
        NumOrStr::Str(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn de_opt_uint<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
    T::Err: fmt::Display,
{
    de_uint(deserializer).map(Some)
}

fn de_opt_bool_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    match text.as_str() {
        "1" | "true" => Ok(Some(true)),
        "0" | "false" => Ok(Some(false)),
        other => Err(serde::de::Error::custom(format!(
            "expected boolean flag, got {:?}",
            other
        ))),
    }
}

fn datetime_from_uts<E: serde::de::Error>(uts: u64) -> Result<DateTime<Utc>, E> {
    DateTime::from_timestamp(uts as i64, 0)
        .ok_or_else(|| E::custom(format!("unix timestamp out of range: {}", uts)))
}

fn de_datetime_uts<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let date = RawDate::deserialize(deserializer)?;
    datetime_from_uts(date.uts)
}

fn de_opt_datetime_uts<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    de_datetime_uts(deserializer).map(Some)
}

/// A listing with a single entry arrives as a bare object instead of a
/// one-element array
fn de_track_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(Box<T>),
    }

    match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::Many(items) => Ok(items),
        OneOrMany::One(item) => Ok(vec![*item]),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

// =============================================================================
// Raw wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawDate {
    #[serde(deserialize_with = "de_uint")]
    uts: u64,
}

/// Pagination metadata of a listing response (`@attr` block)
#[derive(Debug, Deserialize)]
pub(crate) struct RawPageAttr {
    #[serde(deserialize_with = "de_uint")]
    pub page: u64,
    #[serde(rename = "perPage", deserialize_with = "de_uint")]
    pub per_page: u64,
    #[serde(rename = "totalPages", deserialize_with = "de_uint")]
    pub total_pages: u64,
    #[serde(deserialize_with = "de_uint")]
    pub total: u64,
}

/// Artist object; extended responses carry a name, plain ones a `#text`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawArtist {
    Detailed {
        name: String,
        #[serde(default)]
        mbid: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
    Text {
        #[serde(rename = "#text")]
        text: String,
        #[serde(default)]
        mbid: Option<String>,
    },
}

impl From<RawArtist> for ArtistRef {
    fn from(raw: RawArtist) -> Self {
        match raw {
            RawArtist::Detailed { name, mbid, url } => Self {
                name,
                mbid: non_empty(mbid),
                url: non_empty(url),
            },
            RawArtist::Text { text, mbid } => Self {
                name: text,
                mbid: non_empty(mbid),
                url: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbum {
    #[serde(rename = "#text")]
    name: String,
    #[serde(default)]
    mbid: Option<String>,
}

impl RawAlbum {
    fn into_ref(self) -> Option<AlbumRef> {
        if self.name.is_empty() {
            return None;
        }
        Some(AlbumRef {
            name: self.name,
            mbid: non_empty(self.mbid),
        })
    }
}

/// Track-level `@attr` block carrying the now-playing marker
#[derive(Debug, Deserialize)]
pub(crate) struct RawTrackAttr {
    #[serde(default)]
    nowplaying: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRecentTrack {
    name: String,
    #[serde(default)]
    mbid: Option<String>,
    url: String,
    artist: RawArtist,
    #[serde(default)]
    album: Option<RawAlbum>,
    #[serde(default, deserialize_with = "de_opt_datetime_uts")]
    date: Option<DateTime<Utc>>,
    #[serde(rename = "@attr", default)]
    attr: Option<RawTrackAttr>,
    #[serde(default, deserialize_with = "de_opt_bool_flag")]
    loved: Option<bool>,
}

impl From<RawRecentTrack> for RecentTrack {
    fn from(raw: RawRecentTrack) -> Self {
        let now_playing = raw
            .attr
            .and_then(|attr| attr.nowplaying)
            .map(|flag| flag == "true")
            .unwrap_or(false);

        Self {
            name: raw.name,
            mbid: non_empty(raw.mbid),
            url: raw.url,
            artist: raw.artist.into(),
            album: raw.album.and_then(RawAlbum::into_ref),
            played_at: raw.date,
            now_playing,
            loved: raw.loved,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLovedTrack {
    name: String,
    #[serde(default)]
    mbid: Option<String>,
    url: String,
    artist: RawArtist,
    #[serde(deserialize_with = "de_datetime_uts")]
    date: DateTime<Utc>,
}

impl From<RawLovedTrack> for LovedTrack {
    fn from(raw: RawLovedTrack) -> Self {
        Self {
            name: raw.name,
            mbid: non_empty(raw.mbid),
            url: raw.url,
            artist: raw.artist.into(),
            loved_at: raw.date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRankAttr {
    #[serde(deserialize_with = "de_uint")]
    rank: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTopTrack {
    name: String,
    #[serde(default)]
    mbid: Option<String>,
    url: String,
    artist: RawArtist,
    #[serde(rename = "@attr")]
    attr: RawRankAttr,
    #[serde(deserialize_with = "de_uint")]
    playcount: u64,
    #[serde(default, deserialize_with = "de_opt_uint")]
    duration: Option<u64>,
}

impl From<RawTopTrack> for TopTrack {
    fn from(raw: RawTopTrack) -> Self {
        Self {
            name: raw.name,
            mbid: non_empty(raw.mbid),
            url: raw.url,
            artist: raw.artist.into(),
            rank: raw.attr.rank,
            playcount: raw.playcount,
            duration_secs: raw.duration.filter(|&secs| secs > 0),
        }
    }
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RecentTracksResponse {
    recenttracks: RecentTracksWrapper,
}

#[derive(Debug, Deserialize)]
struct RecentTracksWrapper {
    #[serde(default, deserialize_with = "de_track_list")]
    track: Vec<RawRecentTrack>,
    #[serde(rename = "@attr")]
    attr: RawPageAttr,
}

impl From<RecentTracksResponse> for Page<RecentTrack> {
    fn from(response: RecentTracksResponse) -> Self {
        let wrapper = response.recenttracks;
        let tracks = wrapper.track.into_iter().map(Into::into).collect();
        Page::new(tracks, wrapper.attr)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LovedTracksResponse {
    lovedtracks: LovedTracksWrapper,
}

#[derive(Debug, Deserialize)]
struct LovedTracksWrapper {
    #[serde(default, deserialize_with = "de_track_list")]
    track: Vec<RawLovedTrack>,
    #[serde(rename = "@attr")]
    attr: RawPageAttr,
}

impl From<LovedTracksResponse> for Page<LovedTrack> {
    fn from(response: LovedTracksResponse) -> Self {
        let wrapper = response.lovedtracks;
        let tracks = wrapper.track.into_iter().map(Into::into).collect();
        Page::new(tracks, wrapper.attr)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopTracksResponse {
    toptracks: TopTracksWrapper,
}

#[derive(Debug, Deserialize)]
struct TopTracksWrapper {
    #[serde(default, deserialize_with = "de_track_list")]
    track: Vec<RawTopTrack>,
    #[serde(rename = "@attr")]
    attr: RawPageAttr,
}

impl From<TopTracksResponse> for Page<TopTrack> {
    fn from(response: TopTracksResponse) -> Self {
        let wrapper = response.toptracks;
        let tracks = wrapper.track.into_iter().map(Into::into).collect();
        Page::new(tracks, wrapper.attr)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackInfoResponse {
    pub track: RawTrackInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrackInfoAlbum {
    title: String,
    #[serde(default)]
    mbid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrackInfo {
    name: String,
    #[serde(default)]
    mbid: Option<String>,
    url: String,
    artist: RawArtist,
    #[serde(default)]
    album: Option<RawTrackInfoAlbum>,
    #[serde(default, deserialize_with = "de_opt_uint")]
    duration: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_uint")]
    listeners: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_uint")]
    playcount: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_uint")]
    userplaycount: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_bool_flag")]
    userloved: Option<bool>,
}

impl From<RawTrackInfo> for TrackInfo {
    fn from(raw: RawTrackInfo) -> Self {
        Self {
            name: raw.name,
            mbid: non_empty(raw.mbid),
            url: raw.url,
            artist: raw.artist.into(),
            album: raw.album.filter(|album| !album.title.is_empty()).map(|album| AlbumRef {
                name: album.title,
                mbid: non_empty(album.mbid),
            }),
            duration_ms: raw.duration.filter(|&ms| ms > 0),
            listeners: raw.listeners,
            playcount: raw.playcount,
            user_playcount: raw.userplaycount,
            user_loved: raw.userloved,
        }
    }
}

/// Last.fm API error response
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: i32,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_attr(page: u64, per_page: u64, total: u64) -> serde_json::Value {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        json!({
            "user": "testuser",
            "page": page.to_string(),
            "perPage": per_page.to_string(),
            "totalPages": total_pages.to_string(),
            "total": total.to_string(),
        })
    }

    #[test]
    fn test_parse_recent_tracks_page() {
        let body = json!({
            "recenttracks": {
                "track": [
                    {
                        "artist": {"mbid": "", "#text": "Radiohead"},
                        "album": {"mbid": "a1", "#text": "OK Computer"},
                        "name": "Airbag",
                        "url": "https://www.last.fm/music/Radiohead/_/Airbag",
                        "mbid": "b2",
                        "date": {"uts": "1586866244", "#text": "14 Apr 2020, 12:10"}
                    }
                ],
                "@attr": page_attr(1, 50, 600)
            }
        });

        let page: Page<RecentTrack> =
            serde_json::from_value::<RecentTracksResponse>(body).unwrap().into();

        assert_eq!(page.total, 600);
        assert_eq!(page.total_pages, 12);
        assert_eq!(page.tracks.len(), 1);

        let track = &page.tracks[0];
        assert_eq!(track.name, "Airbag");
        assert_eq!(track.artist.name, "Radiohead");
        assert_eq!(track.artist.mbid, None, "empty mbid becomes None");
        assert_eq!(track.mbid.as_deref(), Some("b2"));
        assert_eq!(track.album.as_ref().unwrap().name, "OK Computer");
        assert!(!track.now_playing);
        assert_eq!(track.played_at.unwrap().timestamp(), 1_586_866_244);
    }

    #[test]
    fn test_parse_now_playing_marker() {
        let body = json!({
            "recenttracks": {
                "track": [
                    {
                        "artist": {"#text": "Boards of Canada"},
                        "name": "Roygbiv",
                        "url": "https://www.last.fm/music/x",
                        "@attr": {"nowplaying": "true"}
                    }
                ],
                "@attr": page_attr(1, 1, 432)
            }
        });

        let page: Page<RecentTrack> =
            serde_json::from_value::<RecentTracksResponse>(body).unwrap().into();

        let track = &page.tracks[0];
        assert!(track.now_playing);
        assert!(track.played_at.is_none());
        assert!(track.album.is_none());
    }

    #[test]
    fn test_parse_extended_artist_and_loved_flag() {
        let body = json!({
            "recenttracks": {
                "track": [
                    {
                        "artist": {
                            "name": "Autechre",
                            "mbid": "m1",
                            "url": "https://www.last.fm/music/Autechre"
                        },
                        "name": "Bike",
                        "url": "https://www.last.fm/music/Autechre/_/Bike",
                        "loved": "1",
                        "date": {"uts": 1586866244u64}
                    }
                ],
                "@attr": page_attr(1, 50, 10)
            }
        });

        let page: Page<RecentTrack> =
            serde_json::from_value::<RecentTracksResponse>(body).unwrap().into();

        let track = &page.tracks[0];
        assert_eq!(track.artist.url.as_deref(), Some("https://www.last.fm/music/Autechre"));
        assert_eq!(track.artist.mbid.as_deref(), Some("m1"));
        assert_eq!(track.loved, Some(true));
    }

    #[test]
    fn test_single_track_arrives_as_bare_object() {
        let body = json!({
            "lovedtracks": {
                "track": {
                    "artist": {"name": "Burial", "mbid": "", "url": "https://www.last.fm/music/Burial"},
                    "name": "Archangel",
                    "url": "https://www.last.fm/music/Burial/_/Archangel",
                    "date": {"uts": "1600000000"}
                },
                "@attr": page_attr(1, 50, 1)
            }
        });

        let page: Page<LovedTrack> =
            serde_json::from_value::<LovedTracksResponse>(body).unwrap().into();

        assert_eq!(page.tracks.len(), 1);
        assert_eq!(page.tracks[0].name, "Archangel");
        assert_eq!(page.tracks[0].loved_at.timestamp(), 1_600_000_000);
    }

    #[test]
    fn test_empty_listing_parses() {
        let body = json!({
            "lovedtracks": {
                "@attr": page_attr(1, 50, 0)
            }
        });

        let page: Page<LovedTrack> =
            serde_json::from_value::<LovedTracksResponse>(body).unwrap().into();
        assert!(page.tracks.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_parse_top_track_rank_and_counts() {
        let body = json!({
            "toptracks": {
                "track": [
                    {
                        "artist": {"name": "Queen", "mbid": "q1", "url": "https://www.last.fm/music/Queen"},
                        "name": "Bohemian Rhapsody",
                        "url": "https://www.last.fm/music/Queen/_/Bohemian+Rhapsody",
                        "@attr": {"rank": "1"},
                        "playcount": "138",
                        "duration": "354"
                    },
                    {
                        "artist": {"name": "Queen"},
                        "name": "Don't Stop Me Now",
                        "url": "https://www.last.fm/music/Queen/_/Don%27t+Stop+Me+Now",
                        "@attr": {"rank": "2"},
                        "playcount": "97",
                        "duration": "0"
                    }
                ],
                "@attr": page_attr(1, 50, 2)
            }
        });

        let page: Page<TopTrack> =
            serde_json::from_value::<TopTracksResponse>(body).unwrap().into();

        assert_eq!(page.tracks[0].rank, 1);
        assert_eq!(page.tracks[0].playcount, 138);
        assert_eq!(page.tracks[0].duration_secs, Some(354));
        assert_eq!(page.tracks[1].rank, 2);
        assert_eq!(
            page.tracks[1].duration_secs, None,
            "zero duration means unknown"
        );
    }

    #[test]
    fn test_non_numeric_total_is_a_parse_failure() {
        let body = json!({
            "lovedtracks": {
                "track": [],
                "@attr": {
                    "user": "testuser",
                    "page": "1",
                    "perPage": "50",
                    "totalPages": "1",
                    "total": "not-a-number"
                }
            }
        });

        assert!(serde_json::from_value::<LovedTracksResponse>(body).is_err());
    }

    #[test]
    fn test_invalid_loved_flag_is_a_parse_failure() {
        let body = json!({
            "recenttracks": {
                "track": [
                    {
                        "artist": {"#text": "X"},
                        "name": "Y",
                        "url": "https://www.last.fm/music/x",
                        "loved": "maybe"
                    }
                ],
                "@attr": page_attr(1, 50, 1)
            }
        });

        assert!(serde_json::from_value::<RecentTracksResponse>(body).is_err());
    }

    #[test]
    fn test_page_never_exceeds_declared_limit() {
        // now-playing entry on top of a full page
        let tracks: Vec<serde_json::Value> = (0..3)
            .map(|i| {
                json!({
                    "artist": {"#text": "A"},
                    "name": format!("track-{}", i),
                    "url": "https://www.last.fm/music/x",
                })
            })
            .collect();

        let body = json!({
            "recenttracks": {
                "track": tracks,
                "@attr": page_attr(1, 2, 100)
            }
        });

        let page: Page<RecentTrack> =
            serde_json::from_value::<RecentTracksResponse>(body).unwrap().into();

        assert_eq!(page.tracks.len(), 2);
        assert_eq!(page.tracks[0].name, "track-0");
    }

    #[test]
    fn test_parse_track_info_with_user_fields() {
        let body = json!({
            "track": {
                "name": "Paranoid Android",
                "mbid": "t1",
                "url": "https://www.last.fm/music/Radiohead/_/Paranoid+Android",
                "duration": "387000",
                "listeners": "1200000",
                "playcount": "9000000",
                "artist": {"name": "Radiohead", "mbid": "r1", "url": "https://www.last.fm/music/Radiohead"},
                "album": {"artist": "Radiohead", "title": "OK Computer", "mbid": "a1", "url": "https://www.last.fm/music/Radiohead/OK+Computer"},
                "userplaycount": "42",
                "userloved": "1"
            }
        });

        let info: TrackInfo = serde_json::from_value::<TrackInfoResponse>(body)
            .unwrap()
            .track
            .into();

        assert_eq!(info.name, "Paranoid Android");
        assert_eq!(info.duration_ms, Some(387_000));
        assert_eq!(info.album.unwrap().name, "OK Computer");
        assert_eq!(info.user_playcount, Some(42));
        assert_eq!(info.user_loved, Some(true));
    }

    #[test]
    fn test_track_union_accessors() {
        let loved = LovedTrack {
            name: "Archangel".to_string(),
            mbid: Some("m".to_string()),
            url: "https://www.last.fm/music/Burial/_/Archangel".to_string(),
            artist: ArtistRef {
                name: "Burial".to_string(),
                mbid: None,
                url: None,
            },
            loved_at: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
        };

        let track: Track = loved.into();
        assert_eq!(track.name(), "Archangel");
        assert_eq!(track.artist().name, "Burial");
        assert_eq!(track.mbid(), Some("m"));
    }

    #[test]
    fn test_period_round_trip() {
        assert_eq!(Period::SevenDay.as_str(), "7day");
        assert_eq!("7day".parse::<Period>().unwrap(), Period::SevenDay);
        assert_eq!("overall".parse::<Period>().unwrap(), Period::Overall);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn test_error_response_parses() {
        let body = json!({"error": 10, "message": "Invalid API key"});
        let error: ErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(error.error, 10);
        assert_eq!(error.message, "Invalid API key");
    }
}
