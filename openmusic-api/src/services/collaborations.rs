//! Playlist collaborators

use openmusic_common::{Error, Result};
use std::sync::Arc;
use tracing::info;

use crate::store::CollaborationStore;

#[derive(Clone)]
pub struct CollaborationService {
    collaborations: Arc<dyn CollaborationStore>,
}

impl CollaborationService {
    pub fn new(collaborations: Arc<dyn CollaborationStore>) -> Self {
        Self { collaborations }
    }

    /// `NotFound` unless `user_id` collaborates on `playlist_id`
    pub async fn verify_collaborator(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        match self.collaborations.find(playlist_id, user_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::not_found("Collaboration not found")),
        }
    }

    pub async fn add_collaborator(&self, playlist_id: &str, user_id: &str) -> Result<String> {
        let id = self.collaborations.add(playlist_id, user_id).await?;
        info!(playlist_id, user_id, collaboration_id = %id, "Collaborator added");
        Ok(id)
    }

    pub async fn delete_collaborator(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        self.collaborations.remove(playlist_id, user_id).await?;
        info!(playlist_id, user_id, "Collaborator removed");
        Ok(())
    }
}
