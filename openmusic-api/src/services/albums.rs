//! Album service
//!
//! Albums are joined with their songs through the read-only
//! [`SongCatalog`] port; nothing here writes song state.

use openmusic_common::Result;
use std::sync::Arc;
use tracing::info;

use crate::models::{AlbumUpdate, AlbumWithSongs, NewAlbum};
use crate::store::{AlbumStore, SongCatalog};

#[derive(Clone)]
pub struct AlbumService {
    albums: Arc<dyn AlbumStore>,
    catalog: Arc<dyn SongCatalog>,
}

impl AlbumService {
    pub fn new(albums: Arc<dyn AlbumStore>, catalog: Arc<dyn SongCatalog>) -> Self {
        Self { albums, catalog }
    }

    pub async fn add_album(&self, album: NewAlbum) -> Result<String> {
        let id = self.albums.add(album).await?;
        info!(album_id = %id, "Album added");
        Ok(id)
    }

    /// Album with every song that references it
    pub async fn get_album_by_id(&self, id: &str) -> Result<AlbumWithSongs> {
        let album = self.albums.get(id).await?;
        let songs = self.catalog.songs_in_album(&album.id).await?;

        Ok(AlbumWithSongs {
            id: album.id,
            name: album.name,
            year: album.year,
            songs,
        })
    }

    pub async fn edit_album(&self, id: &str, update: AlbumUpdate) -> Result<()> {
        self.albums.edit(id, update).await?;
        info!(album_id = id, "Album updated");
        Ok(())
    }

    /// Delete an album no song references
    ///
    /// The store refuses with `Invariant` while any song still points at it,
    /// so a delete never leaves a dangling `album_id` behind.
    pub async fn delete_album(&self, id: &str) -> Result<()> {
        self.albums.delete(id).await?;
        info!(album_id = id, "Album deleted");
        Ok(())
    }
}
