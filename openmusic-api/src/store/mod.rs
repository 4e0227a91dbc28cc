//! Entity stores
//!
//! One store per entity type, each the exclusive owner of its records. Two
//! backends implement every trait with the same contract:
//! - [`memory`]: volatile, one `RwLock` over every table but users
//! - [`sqlite`]: durable, one SQL statement per mutation
//!
//! Every mutating call is atomic with respect to every other call, so
//! read-modify-write sequences (`edit`, `delete`) never interleave. Rules that
//! span tables are part of the contract:
//! - an album is only deleted while no song references it
//! - membership and collaboration rows need their playlist to exist, and
//!   membership rows need their song
//! - deleting a song or playlist drops the rows that point at it

use async_trait::async_trait;
use openmusic_common::config::{ServerConfig, StorageBackend};
use openmusic_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::models::{
    Album, AlbumUpdate, Collaboration, NewAlbum, NewPlaylist, NewSong, NewUser, Playlist,
    PlaylistUpdate, Song, SongFilter, SongSummary, SongUpdate, User,
};

pub mod memory;
pub mod sqlite;

#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Insert with a fresh id and return it
    async fn add(&self, album: NewAlbum) -> Result<String>;

    /// `NotFound` if absent
    async fn get(&self, id: &str) -> Result<Album>;

    /// Merge `update` into the record; `NotFound` if absent
    async fn edit(&self, id: &str, update: AlbumUpdate) -> Result<()>;

    /// `NotFound` if absent; `Invariant` while any song references it
    ///
    /// The reference check and the removal are one step.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Read-only view of the song collection
///
/// Services that need to join against songs hold this port instead of the
/// song store or the song service.
#[async_trait]
pub trait SongCatalog: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Songs whose `album_id` equals `album_id`, in insertion order
    async fn songs_in_album(&self, album_id: &str) -> Result<Vec<SongSummary>>;

    /// Summaries for `ids` in the order given; ids with no song are skipped
    async fn summaries(&self, ids: &[String]) -> Result<Vec<SongSummary>>;
}

#[async_trait]
pub trait SongStore: SongCatalog {
    async fn add(&self, song: NewSong) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Song>;

    /// Projected songs matching `filter`, in insertion order
    async fn list(&self, filter: &SongFilter) -> Result<Vec<SongSummary>>;

    async fn edit(&self, id: &str, update: SongUpdate) -> Result<()>;

    /// Delete the song and its playlist membership rows
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Playlists and their song membership
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn add(&self, playlist: NewPlaylist) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Playlist>;

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Playlist>>;

    async fn edit(&self, id: &str, update: PlaylistUpdate) -> Result<()>;

    /// Delete the playlist with its membership and collaboration rows
    async fn delete(&self, id: &str) -> Result<()>;

    /// `Invariant` if the pair is already present or either side is missing
    async fn add_member(&self, playlist_id: &str, song_id: &str) -> Result<()>;

    /// Member song ids in insertion order
    async fn member_ids(&self, playlist_id: &str) -> Result<Vec<String>>;

    /// `Invariant` if no matching row existed
    async fn remove_member(&self, playlist_id: &str, song_id: &str) -> Result<()>;
}

#[async_trait]
pub trait CollaborationStore: Send + Sync {
    /// `Invariant` if the pair already exists or the playlist is missing
    async fn add(&self, playlist_id: &str, user_id: &str) -> Result<String>;

    async fn find(&self, playlist_id: &str, user_id: &str) -> Result<Option<Collaboration>>;

    /// `Invariant` if no matching row existed
    async fn remove(&self, playlist_id: &str, user_id: &str) -> Result<()>;

    /// Ids of playlists `user_id` collaborates on, in insertion order
    async fn playlists_for(&self, user_id: &str) -> Result<Vec<String>>;

    /// Remove every collaboration on `playlist_id`
    async fn purge_playlist(&self, playlist_id: &str) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// `Invariant` if the username is already taken
    async fn add(&self, user: NewUser) -> Result<String>;

    async fn get(&self, id: &str) -> Result<User>;
}

/// The full set of stores behind one backend
#[derive(Clone)]
pub struct Stores {
    pub backend: StorageBackend,
    pub albums: Arc<dyn AlbumStore>,
    pub songs: Arc<dyn SongStore>,
    pub catalog: Arc<dyn SongCatalog>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub collaborations: Arc<dyn CollaborationStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Volatile stores
    pub fn in_memory() -> Self {
        let db = memory::MemoryDatabase::default();
        let songs = Arc::new(db.songs());

        Self {
            backend: StorageBackend::Memory,
            albums: Arc::new(db.albums()),
            songs: songs.clone(),
            catalog: songs,
            playlists: Arc::new(db.playlists()),
            collaborations: Arc::new(db.collaborations()),
            users: Arc::new(memory::MemoryUserStore::default()),
        }
    }

    /// Stores sharing one SQLite pool; the schema must already exist
    pub fn sqlite(pool: SqlitePool) -> Self {
        let songs = Arc::new(sqlite::SqliteSongStore::new(pool.clone()));

        Self {
            backend: StorageBackend::Sqlite,
            albums: Arc::new(sqlite::SqliteAlbumStore::new(pool.clone())),
            songs: songs.clone(),
            catalog: songs,
            playlists: Arc::new(sqlite::SqlitePlaylistStore::new(pool.clone())),
            collaborations: Arc::new(sqlite::SqliteCollaborationStore::new(pool.clone())),
            users: Arc::new(sqlite::SqliteUserStore::new(pool)),
        }
    }

    /// Build the stores selected by `config`
    pub async fn open(config: &ServerConfig) -> Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                info!("Using in-memory storage (data is lost on shutdown)");
                Ok(Self::in_memory())
            }
            StorageBackend::Sqlite => {
                let pool = openmusic_common::db::init_database(&config.database_path).await?;
                info!("Using SQLite storage at {}", config.database_path.display());
                Ok(Self::sqlite(pool))
            }
        }
    }
}
