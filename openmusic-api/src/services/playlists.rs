//! Playlists and their song membership
//!
//! Every operation here assumes the caller already passed
//! [`verify_playlist_access`](PlaylistService::verify_playlist_access) (or the
//! owner-only variant) for the playlist in question.

use openmusic_common::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::access::PlaylistAccess;
use crate::models::{NewPlaylist, Playlist, PlaylistSummary, PlaylistUpdate, PlaylistWithSongs};
use crate::store::{CollaborationStore, PlaylistStore, SongCatalog, UserStore};

#[derive(Clone)]
pub struct PlaylistService {
    playlists: Arc<dyn PlaylistStore>,
    catalog: Arc<dyn SongCatalog>,
    users: Arc<dyn UserStore>,
    collaborations: Arc<dyn CollaborationStore>,
    access: PlaylistAccess,
}

impl PlaylistService {
    pub fn new(
        playlists: Arc<dyn PlaylistStore>,
        catalog: Arc<dyn SongCatalog>,
        users: Arc<dyn UserStore>,
        collaborations: Arc<dyn CollaborationStore>,
        access: PlaylistAccess,
    ) -> Self {
        Self {
            playlists,
            catalog,
            users,
            collaborations,
            access,
        }
    }

    pub async fn verify_playlist_owner(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        self.access.verify_playlist_owner(playlist_id, user_id).await
    }

    pub async fn verify_playlist_access(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        self.access.verify_playlist_access(playlist_id, user_id).await
    }

    /// `NotFound` if the song does not exist
    pub async fn verify_song_id(&self, song_id: &str) -> Result<()> {
        if self.catalog.exists(song_id).await? {
            Ok(())
        } else {
            Err(Error::not_found("Song not found"))
        }
    }

    pub async fn add_playlist(&self, playlist: NewPlaylist) -> Result<String> {
        let owner = playlist.owner.clone();
        let id = self.playlists.add(playlist).await?;
        info!(playlist_id = %id, owner = %owner, "Playlist added");
        Ok(id)
    }

    /// Playlists owned by `user_id`, then those shared with them
    pub async fn get_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>> {
        let mut playlists = self.playlists.list_by_owner(user_id).await?;
        let mut seen: HashSet<String> = playlists.iter().map(|p| p.id.clone()).collect();

        for playlist_id in self.collaborations.playlists_for(user_id).await? {
            if !seen.insert(playlist_id.clone()) {
                continue;
            }
            match self.playlists.get(&playlist_id).await {
                Ok(playlist) => playlists.push(playlist),
                // Collaboration row outlived its playlist
                Err(Error::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        let mut usernames: HashMap<String, Option<String>> = HashMap::new();
        let mut summaries = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            let username = match usernames.get(&playlist.owner) {
                Some(name) => name.clone(),
                None => {
                    let name = self.owner_username(&playlist).await?;
                    usernames.insert(playlist.owner.clone(), name.clone());
                    name
                }
            };
            summaries.push(PlaylistSummary {
                id: playlist.id,
                name: playlist.name,
                username,
            });
        }

        Ok(summaries)
    }

    pub async fn edit_playlist(&self, id: &str, update: PlaylistUpdate) -> Result<()> {
        self.playlists.edit(id, update).await?;
        info!(playlist_id = id, "Playlist updated");
        Ok(())
    }

    /// Delete a playlist with its membership rows and collaborations
    pub async fn delete_playlist(&self, id: &str) -> Result<()> {
        self.playlists.delete(id).await?;
        self.collaborations.purge_playlist(id).await?;
        info!(playlist_id = id, "Playlist deleted");
        Ok(())
    }

    /// Insert the membership row; song existence is checked by the caller
    pub async fn add_song_to_playlist(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        self.playlists.add_member(playlist_id, song_id).await?;
        info!(playlist_id, song_id, "Song added to playlist");
        Ok(())
    }

    /// Playlist metadata and member songs in insertion order
    ///
    /// `NotFound` only when the playlist itself is missing; a playlist with
    /// no songs yields an empty list.
    pub async fn get_songs_in_playlist(&self, playlist_id: &str) -> Result<PlaylistWithSongs> {
        let playlist = self.playlists.get(playlist_id).await?;
        let member_ids = self.playlists.member_ids(playlist_id).await?;
        let songs = self.catalog.summaries(&member_ids).await?;
        let username = self.owner_username(&playlist).await?;

        Ok(PlaylistWithSongs {
            id: playlist.id,
            name: playlist.name,
            username,
            songs,
        })
    }

    pub async fn delete_song_from_playlist(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        self.playlists.remove_member(playlist_id, song_id).await?;
        info!(playlist_id, song_id, "Song removed from playlist");
        Ok(())
    }

    async fn owner_username(&self, playlist: &Playlist) -> Result<Option<String>> {
        match self.users.get(&playlist.owner).await {
            Ok(user) => Ok(Some(user.username)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
