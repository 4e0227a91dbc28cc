//! Song catalog service

use openmusic_common::Result;
use std::sync::Arc;
use tracing::info;

use crate::models::{NewSong, Song, SongFilter, SongSummary, SongUpdate};
use crate::store::SongStore;

#[derive(Clone)]
pub struct SongService {
    songs: Arc<dyn SongStore>,
}

impl SongService {
    pub fn new(songs: Arc<dyn SongStore>) -> Self {
        Self { songs }
    }

    pub async fn add_song(&self, song: NewSong) -> Result<String> {
        let id = self.songs.add(song).await?;
        info!(song_id = %id, "Song added");
        Ok(id)
    }

    /// Projected songs matching `filter`
    pub async fn get_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        self.songs.list(filter).await
    }

    pub async fn get_song(&self, id: &str) -> Result<Song> {
        self.songs.get(id).await
    }

    pub async fn edit_song(&self, id: &str, update: SongUpdate) -> Result<()> {
        self.songs.edit(id, update).await?;
        info!(song_id = id, "Song updated");
        Ok(())
    }

    pub async fn delete_song(&self, id: &str) -> Result<()> {
        self.songs.delete(id).await?;
        info!(song_id = id, "Song deleted");
        Ok(())
    }
}
