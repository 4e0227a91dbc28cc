//! In-memory stores
//!
//! Records live in `Vec`s (insertion order). Albums, songs, playlists,
//! membership and collaborations sit in one [`MemoryDatabase`] behind a single
//! tokio `RwLock`, so the cross-table rules SQLite enforces with foreign keys
//! hold here too. Users have their own lock. Every operation takes its lock
//! exactly once.

use async_trait::async_trait;
use chrono::Utc;
use openmusic_common::{ids, Error, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AlbumStore, CollaborationStore, PlaylistStore, SongCatalog, SongStore, UserStore};
use crate::models::{
    Album, AlbumUpdate, Collaboration, NewAlbum, NewPlaylist, NewSong, NewUser, Playlist,
    PlaylistUpdate, Song, SongFilter, SongSummary, SongUpdate, User,
};

#[derive(Default)]
struct Tables {
    albums: Vec<Album>,
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
    /// (playlist_id, song_id) in insertion order
    members: Vec<(String, String)>,
    collaborations: Vec<Collaboration>,
}

type SharedTables = Arc<RwLock<Tables>>;

/// Volatile database handing out stores over one shared lock
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: SharedTables,
}

impl MemoryDatabase {
    pub fn albums(&self) -> MemoryAlbumStore {
        MemoryAlbumStore {
            tables: self.tables.clone(),
        }
    }

    pub fn songs(&self) -> MemorySongStore {
        MemorySongStore {
            tables: self.tables.clone(),
        }
    }

    pub fn playlists(&self) -> MemoryPlaylistStore {
        MemoryPlaylistStore {
            tables: self.tables.clone(),
        }
    }

    pub fn collaborations(&self) -> MemoryCollaborationStore {
        MemoryCollaborationStore {
            tables: self.tables.clone(),
        }
    }
}

// ============================================================================
// Albums
// ============================================================================

pub struct MemoryAlbumStore {
    tables: SharedTables,
}

#[async_trait]
impl AlbumStore for MemoryAlbumStore {
    async fn add(&self, album: NewAlbum) -> Result<String> {
        let id = ids::generate(ids::ALBUM);
        let now = Utc::now();

        let mut tables = self.tables.write().await;
        tables.albums.push(Album {
            id: id.clone(),
            name: album.name,
            year: album.year,
            created_at: now,
            updated_at: now,
        });

        if !tables.albums.iter().any(|a| a.id == id) {
            return Err(Error::invariant("Failed to add album"));
        }

        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Album> {
        self.tables
            .read()
            .await
            .albums
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("Album not found"))
    }

    async fn edit(&self, id: &str, update: AlbumUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        let album = tables
            .albums
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::not_found("Failed to update album. Id not found"))?;

        update.apply(album);
        album.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .albums
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::not_found("Failed to delete album. Id not found"))?;

        if tables.songs.iter().any(|s| s.album_id.as_deref() == Some(id)) {
            return Err(Error::invariant("Failed to delete album. Album still has songs"));
        }

        tables.albums.remove(index);
        Ok(())
    }
}

// ============================================================================
// Songs
// ============================================================================

pub struct MemorySongStore {
    tables: SharedTables,
}

#[async_trait]
impl SongCatalog for MemorySongStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.tables.read().await.songs.iter().any(|s| s.id == id))
    }

    async fn songs_in_album(&self, album_id: &str) -> Result<Vec<SongSummary>> {
        Ok(self
            .tables
            .read()
            .await
            .songs
            .iter()
            .filter(|s| s.album_id.as_deref() == Some(album_id))
            .map(SongSummary::from)
            .collect())
    }

    async fn summaries(&self, ids: &[String]) -> Result<Vec<SongSummary>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.songs.iter().find(|s| &s.id == id))
            .map(SongSummary::from)
            .collect())
    }
}

#[async_trait]
impl SongStore for MemorySongStore {
    async fn add(&self, song: NewSong) -> Result<String> {
        let id = ids::generate(ids::SONG);
        let now = Utc::now();

        let mut tables = self.tables.write().await;
        tables.songs.push(Song {
            id: id.clone(),
            title: song.title,
            year: song.year,
            genre: song.genre,
            performer: song.performer,
            duration: song.duration,
            album_id: song.album_id,
            created_at: now,
            updated_at: now,
        });

        if !tables.songs.iter().any(|s| s.id == id) {
            return Err(Error::invariant("Failed to add song"));
        }

        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Song> {
        self.tables
            .read()
            .await
            .songs
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("Song not found"))
    }

    async fn list(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        Ok(self
            .tables
            .read()
            .await
            .songs
            .iter()
            .filter(|s| filter.matches(&s.title, &s.performer))
            .map(SongSummary::from)
            .collect())
    }

    async fn edit(&self, id: &str, update: SongUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        let song = tables
            .songs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::not_found("Failed to update song. Id not found"))?;

        update.apply(song);
        song.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .songs
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::not_found("Failed to delete song. Id not found"))?;

        tables.songs.remove(index);
        tables.members.retain(|(_, song_id)| song_id != id);
        Ok(())
    }
}

// ============================================================================
// Playlists
// ============================================================================

pub struct MemoryPlaylistStore {
    tables: SharedTables,
}

#[async_trait]
impl PlaylistStore for MemoryPlaylistStore {
    async fn add(&self, playlist: NewPlaylist) -> Result<String> {
        let id = ids::generate(ids::PLAYLIST);

        let mut tables = self.tables.write().await;
        tables.playlists.push(Playlist {
            id: id.clone(),
            name: playlist.name,
            owner: playlist.owner,
        });

        if !tables.playlists.iter().any(|p| p.id == id) {
            return Err(Error::invariant("Failed to add playlist"));
        }

        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Playlist> {
        self.tables
            .read()
            .await
            .playlists
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("Playlist not found"))
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Playlist>> {
        Ok(self
            .tables
            .read()
            .await
            .playlists
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn edit(&self, id: &str, update: PlaylistUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        let playlist = tables
            .playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found("Failed to update playlist. Id not found"))?;

        update.apply(playlist);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .playlists
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::not_found("Failed to delete playlist. Id not found"))?;

        tables.playlists.remove(index);
        tables.members.retain(|(playlist_id, _)| playlist_id != id);
        tables.collaborations.retain(|c| c.playlist_id != id);
        Ok(())
    }

    async fn add_member(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;

        if !tables.playlists.iter().any(|p| p.id == playlist_id)
            || !tables.songs.iter().any(|s| s.id == song_id)
        {
            return Err(Error::invariant("Failed to add song to playlist"));
        }
        if tables
            .members
            .iter()
            .any(|(p, s)| p == playlist_id && s == song_id)
        {
            return Err(Error::invariant("Song is already in the playlist"));
        }

        tables
            .members
            .push((playlist_id.to_string(), song_id.to_string()));
        Ok(())
    }

    async fn member_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .read()
            .await
            .members
            .iter()
            .filter(|(p, _)| p == playlist_id)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn remove_member(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .members
            .iter()
            .position(|(p, s)| p == playlist_id && s == song_id)
            .ok_or_else(|| Error::invariant("Failed to remove song from playlist"))?;

        tables.members.remove(index);
        Ok(())
    }
}

// ============================================================================
// Collaborations
// ============================================================================

pub struct MemoryCollaborationStore {
    tables: SharedTables,
}

#[async_trait]
impl CollaborationStore for MemoryCollaborationStore {
    async fn add(&self, playlist_id: &str, user_id: &str) -> Result<String> {
        let mut tables = self.tables.write().await;

        if tables
            .collaborations
            .iter()
            .any(|c| c.playlist_id == playlist_id && c.user_id == user_id)
        {
            return Err(Error::invariant("User is already a collaborator on this playlist"));
        }
        if !tables.playlists.iter().any(|p| p.id == playlist_id) {
            return Err(Error::invariant("Failed to add collaboration"));
        }

        let id = ids::generate(ids::COLLABORATION);
        tables.collaborations.push(Collaboration {
            id: id.clone(),
            playlist_id: playlist_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(id)
    }

    async fn find(&self, playlist_id: &str, user_id: &str) -> Result<Option<Collaboration>> {
        Ok(self
            .tables
            .read()
            .await
            .collaborations
            .iter()
            .find(|c| c.playlist_id == playlist_id && c.user_id == user_id)
            .cloned())
    }

    async fn remove(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let index = tables
            .collaborations
            .iter()
            .position(|c| c.playlist_id == playlist_id && c.user_id == user_id)
            .ok_or_else(|| Error::invariant("Failed to delete collaboration"))?;

        tables.collaborations.remove(index);
        Ok(())
    }

    async fn playlists_for(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .read()
            .await
            .collaborations
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.playlist_id.clone())
            .collect())
    }

    async fn purge_playlist(&self, playlist_id: &str) -> Result<()> {
        self.tables
            .write()
            .await
            .collaborations
            .retain(|c| c.playlist_id != playlist_id);
        Ok(())
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn add(&self, user: NewUser) -> Result<String> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Err(Error::invariant("Failed to add user. Username is already taken"));
        }

        let id = ids::generate(ids::USER);
        users.push(User {
            id: id.clone(),
            username: user.username,
            fullname: user.fullname,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("User not found"))
    }
}
