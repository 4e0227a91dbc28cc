//! Catalog records, creation inputs, partial updates and read projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Albums
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub name: String,
    pub year: i32,
}

/// Partial album update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct AlbumUpdate {
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl AlbumUpdate {
    pub fn apply(self, album: &mut Album) {
        if let Some(name) = self.name {
            album.name = name;
        }
        if let Some(year) = self.year {
            album.year = year;
        }
    }
}

/// Album joined with the songs that reference it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumWithSongs {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub songs: Vec<SongSummary>,
}

// ============================================================================
// Songs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    /// Weak reference; the album may not exist
    pub album_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

/// Partial song update
///
/// Nullable fields use `Option<Option<_>>`: the outer `None` keeps the stored
/// value, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub performer: Option<String>,
    pub duration: Option<Option<i32>>,
    pub album_id: Option<Option<String>>,
}

impl SongUpdate {
    pub fn apply(self, song: &mut Song) {
        if let Some(title) = self.title {
            song.title = title;
        }
        if let Some(year) = self.year {
            song.year = year;
        }
        if let Some(genre) = self.genre {
            song.genre = genre;
        }
        if let Some(performer) = self.performer {
            song.performer = performer;
        }
        if let Some(duration) = self.duration {
            song.duration = duration;
        }
        if let Some(album_id) = self.album_id {
            song.album_id = album_id;
        }
    }
}

/// Projection used by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub performer: String,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id.clone(),
            title: song.title.clone(),
            performer: song.performer.clone(),
        }
    }
}

/// Song search filter
///
/// Each present, non-empty field is a case-insensitive substring match;
/// fields combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongFilter {
    pub title: Option<String>,
    pub performer: Option<String>,
}

impl SongFilter {
    pub fn matches(&self, title: &str, performer: &str) -> bool {
        contains_ignore_case(title, self.title.as_deref())
            && contains_ignore_case(performer, self.performer.as_deref())
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) if !needle.is_empty() => {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        _ => true,
    }
}

// ============================================================================
// Playlists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    /// User id of the single owner
    pub owner: String,
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistUpdate {
    pub name: Option<String>,
}

impl PlaylistUpdate {
    pub fn apply(self, playlist: &mut Playlist) {
        if let Some(name) = self.name {
            playlist.name = name;
        }
    }
}

/// Playlist listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    /// Owner's username; `None` if the owner is not a registered user
    pub username: Option<String>,
}

/// Playlist metadata with its member songs in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistWithSongs {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub songs: Vec<SongSummary>,
}

// ============================================================================
// Collaborations and users
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: String,
    pub playlist_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub fullname: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub fullname: String,
}
