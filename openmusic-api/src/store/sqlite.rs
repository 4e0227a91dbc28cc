//! SQLite stores
//!
//! Every mutation is a single statement, so SQLite's own locking makes it
//! atomic. Partial updates merge with `COALESCE` (required columns) and
//! `CASE` (nullable columns) inside the `UPDATE` itself.

use async_trait::async_trait;
use chrono::Utc;
use openmusic_common::{ids, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;

use super::{AlbumStore, CollaborationStore, PlaylistStore, SongCatalog, SongStore, UserStore};
use crate::models::{
    Album, AlbumUpdate, Collaboration, NewAlbum, NewPlaylist, NewSong, NewUser, Playlist,
    PlaylistUpdate, Song, SongFilter, SongSummary, SongUpdate, User,
};

/// Translate constraint violations into invariant failures
fn constraint_error(err: sqlx::Error, unique_msg: &str, foreign_key_msg: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::invariant(unique_msg);
        }
        if db_err.is_foreign_key_violation() {
            return Error::invariant(foreign_key_msg);
        }
    }
    Error::Database(err)
}

fn summary_from_row(row: &SqliteRow) -> Result<SongSummary> {
    Ok(SongSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        performer: row.try_get("performer")?,
    })
}

// ============================================================================
// Albums
// ============================================================================

pub struct SqliteAlbumStore {
    pool: SqlitePool,
}

impl SqliteAlbumStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumStore for SqliteAlbumStore {
    async fn add(&self, album: NewAlbum) -> Result<String> {
        let now = Utc::now();

        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO albums (id, name, year, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(ids::generate(ids::ALBUM))
        .bind(&album.name)
        .bind(album.year)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| Error::invariant("Failed to add album"))
    }

    async fn get(&self, id: &str) -> Result<Album> {
        let row = sqlx::query(
            "SELECT id, name, year, created_at, updated_at FROM albums WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found("Album not found"))?;

        Ok(Album {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            year: row.try_get("year")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn edit(&self, id: &str, update: AlbumUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE albums
            SET name = COALESCE(?, name),
                year = COALESCE(?, year),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(update.year)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Failed to update album. Id not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM albums
            WHERE id = ?
              AND NOT EXISTS (SELECT 1 FROM songs WHERE album_id = ?)
            "#,
        )
        .bind(id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing removed: tell a missing album from a referenced one
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if remaining > 0 {
            Err(Error::invariant("Failed to delete album. Album still has songs"))
        } else {
            Err(Error::not_found("Failed to delete album. Id not found"))
        }
    }
}

// ============================================================================
// Songs
// ============================================================================

pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongCatalog for SqliteSongStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn songs_in_album(&self, album_id: &str) -> Result<Vec<SongSummary>> {
        let rows = sqlx::query(
            "SELECT id, title, performer FROM songs WHERE album_id = ? ORDER BY rowid",
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn summaries(&self, ids: &[String]) -> Result<Vec<SongSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, title, performer FROM songs WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut found: HashMap<String, SongSummary> = HashMap::with_capacity(rows.len());
        for row in &rows {
            let summary = summary_from_row(row)?;
            found.insert(summary.id.clone(), summary);
        }

        // Caller's order, not the query's
        Ok(ids.iter().filter_map(|id| found.get(id).cloned()).collect())
    }
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn add(&self, song: NewSong) -> Result<String> {
        let now = Utc::now();

        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO songs (
                id, title, year, genre, performer, duration, album_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(ids::generate(ids::SONG))
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.genre)
        .bind(&song.performer)
        .bind(song.duration)
        .bind(&song.album_id)
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| Error::invariant("Failed to add song"))
    }

    async fn get(&self, id: &str) -> Result<Song> {
        let row = sqlx::query(
            r#"
            SELECT id, title, year, genre, performer, duration, album_id,
                   created_at, updated_at
            FROM songs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found("Song not found"))?;

        Ok(Song {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            genre: row.try_get("genre")?,
            performer: row.try_get("performer")?,
            duration: row.try_get("duration")?,
            album_id: row.try_get("album_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn list(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        // Matching happens in Rust: SQLite's LIKE/lower() only fold ASCII
        let rows = sqlx::query("SELECT id, title, performer FROM songs ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        let mut songs = Vec::new();
        for row in &rows {
            let summary = summary_from_row(row)?;
            if filter.matches(&summary.title, &summary.performer) {
                songs.push(summary);
            }
        }
        Ok(songs)
    }

    async fn edit(&self, id: &str, update: SongUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET title = COALESCE(?, title),
                year = COALESCE(?, year),
                genre = COALESCE(?, genre),
                performer = COALESCE(?, performer),
                duration = CASE WHEN ? THEN ? ELSE duration END,
                album_id = CASE WHEN ? THEN ? ELSE album_id END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.year)
        .bind(update.genre)
        .bind(update.performer)
        .bind(update.duration.is_some())
        .bind(update.duration.flatten())
        .bind(update.album_id.is_some())
        .bind(update.album_id.flatten())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Failed to update song. Id not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Failed to delete song. Id not found"));
        }
        Ok(())
    }
}

// ============================================================================
// Playlists
// ============================================================================

pub struct SqlitePlaylistStore {
    pool: SqlitePool,
}

impl SqlitePlaylistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn playlist_from_row(row: &SqliteRow) -> Result<Playlist> {
    Ok(Playlist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner: row.try_get("owner")?,
    })
}

#[async_trait]
impl PlaylistStore for SqlitePlaylistStore {
    async fn add(&self, playlist: NewPlaylist) -> Result<String> {
        let inserted: Option<String> = sqlx::query_scalar(
            "INSERT INTO playlists (id, name, owner) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(ids::generate(ids::PLAYLIST))
        .bind(&playlist.name)
        .bind(&playlist.owner)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| Error::invariant("Failed to add playlist"))
    }

    async fn get(&self, id: &str) -> Result<Playlist> {
        let row = sqlx::query("SELECT id, name, owner FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("Playlist not found"))?;

        playlist_from_row(&row)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Playlist>> {
        let rows = sqlx::query("SELECT id, name, owner FROM playlists WHERE owner = ? ORDER BY rowid")
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(playlist_from_row).collect()
    }

    async fn edit(&self, id: &str, update: PlaylistUpdate) -> Result<()> {
        let result = sqlx::query("UPDATE playlists SET name = COALESCE(?, name) WHERE id = ?")
            .bind(update.name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Failed to update playlist. Id not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // Membership rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Failed to delete playlist. Id not found"));
        }
        Ok(())
    }

    async fn add_member(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO playlist_songs (playlist_id, song_id) VALUES (?, ?) RETURNING seq",
        )
        .bind(playlist_id)
        .bind(song_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "Song is already in the playlist",
                "Failed to add song to playlist",
            )
        })?;

        inserted
            .map(|_| ())
            .ok_or_else(|| Error::invariant("Failed to add song to playlist"))
    }

    async fn member_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT song_id FROM playlist_songs WHERE playlist_id = ? ORDER BY seq",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn remove_member(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::invariant("Failed to remove song from playlist"));
        }
        Ok(())
    }
}

// ============================================================================
// Collaborations
// ============================================================================

pub struct SqliteCollaborationStore {
    pool: SqlitePool,
}

impl SqliteCollaborationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollaborationStore for SqliteCollaborationStore {
    async fn add(&self, playlist_id: &str, user_id: &str) -> Result<String> {
        let inserted: Option<String> = sqlx::query_scalar(
            "INSERT INTO collaborations (id, playlist_id, user_id) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(ids::generate(ids::COLLABORATION))
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "User is already a collaborator on this playlist",
                "Failed to add collaboration",
            )
        })?;

        inserted.ok_or_else(|| Error::invariant("Failed to add collaboration"))
    }

    async fn find(&self, playlist_id: &str, user_id: &str) -> Result<Option<Collaboration>> {
        let row = sqlx::query(
            "SELECT id, playlist_id, user_id FROM collaborations WHERE playlist_id = ? AND user_id = ?",
        )
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Collaboration {
                id: row.try_get("id")?,
                playlist_id: row.try_get("playlist_id")?,
                user_id: row.try_get("user_id")?,
            })),
            None => Ok(None),
        }
    }

    async fn remove(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM collaborations WHERE playlist_id = ? AND user_id = ?")
            .bind(playlist_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::invariant("Failed to delete collaboration"));
        }
        Ok(())
    }

    async fn playlists_for(&self, user_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT playlist_id FROM collaborations WHERE user_id = ? ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn purge_playlist(&self, playlist_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM collaborations WHERE playlist_id = ?")
            .bind(playlist_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Users
// ============================================================================

pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn add(&self, user: NewUser) -> Result<String> {
        let inserted: Option<String> = sqlx::query_scalar(
            "INSERT INTO users (id, username, fullname, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(ids::generate(ids::USER))
        .bind(&user.username)
        .bind(&user.fullname)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            constraint_error(
                e,
                "Failed to add user. Username is already taken",
                "Failed to add user",
            )
        })?;

        inserted.ok_or_else(|| Error::invariant("Failed to add user"))
    }

    async fn get(&self, id: &str) -> Result<User> {
        let row = sqlx::query("SELECT id, username, fullname, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;

        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            fullname: row.try_get("fullname")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
