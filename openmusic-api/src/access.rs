//! Playlist access resolution
//!
//! A caller may touch a playlist when they own it or collaborate on it. The
//! two checks produce [`Check`] values and [`combine`] applies the precedence
//! rule:
//!
//! - missing playlist is final; collaborators are never consulted
//! - ownership grants immediately
//! - a non-owner falls back to the collaboration check, and if that also
//!   fails the ownership denial is what the caller sees

use openmusic_common::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use crate::services::CollaborationService;
use crate::store::PlaylistStore;

/// Why a check refused access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    PlaylistNotFound,
    NotOwner,
    NotCollaborator,
}

impl From<Denial> for Error {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::PlaylistNotFound => Error::not_found("Playlist not found"),
            Denial::NotOwner => {
                Error::authorization("You are not allowed to access this resource")
            }
            Denial::NotCollaborator => Error::not_found("Collaboration not found"),
        }
    }
}

/// Outcome of a single access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Granted,
    Denied(Denial),
}

impl Check {
    pub fn into_result(self) -> Result<()> {
        match self {
            Check::Granted => Ok(()),
            Check::Denied(denial) => Err(denial.into()),
        }
    }
}

/// Whether the ownership outcome leaves room for the collaborator fallback
pub fn needs_collaboration_check(ownership: &Check) -> bool {
    matches!(ownership, Check::Denied(Denial::NotOwner))
}

/// Merge an ownership check with the optional collaboration check
///
/// `collaboration` is ignored unless ownership was denied with
/// [`Denial::NotOwner`]. A failed collaboration check never replaces the
/// ownership denial.
pub fn combine(ownership: Check, collaboration: Option<Check>) -> Check {
    match ownership {
        Check::Granted => Check::Granted,
        Check::Denied(Denial::NotOwner) => match collaboration {
            Some(Check::Granted) => Check::Granted,
            _ => Check::Denied(Denial::NotOwner),
        },
        denied => denied,
    }
}

/// Access resolver over the playlist store and the collaboration service
#[derive(Clone)]
pub struct PlaylistAccess {
    playlists: Arc<dyn PlaylistStore>,
    collaborations: CollaborationService,
}

impl PlaylistAccess {
    pub fn new(playlists: Arc<dyn PlaylistStore>, collaborations: CollaborationService) -> Self {
        Self {
            playlists,
            collaborations,
        }
    }

    /// Ownership check
    ///
    /// Storage faults while reading the playlist are returned as errors, not
    /// as denials.
    pub async fn check_owner(&self, playlist_id: &str, user_id: &str) -> Result<Check> {
        match self.playlists.get(playlist_id).await {
            Ok(playlist) if playlist.owner == user_id => Ok(Check::Granted),
            Ok(_) => Ok(Check::Denied(Denial::NotOwner)),
            Err(Error::NotFound(_)) => Ok(Check::Denied(Denial::PlaylistNotFound)),
            Err(e) => Err(e),
        }
    }

    /// Collaboration check; any failure counts as a denial
    pub async fn check_collaborator(&self, playlist_id: &str, user_id: &str) -> Check {
        match self
            .collaborations
            .verify_collaborator(playlist_id, user_id)
            .await
        {
            Ok(()) => Check::Granted,
            Err(e) => {
                debug!(playlist_id, user_id, error = %e, "Collaboration check failed");
                Check::Denied(Denial::NotCollaborator)
            }
        }
    }

    /// Owner-only gate, no collaborator fallback
    pub async fn verify_playlist_owner(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        self.check_owner(playlist_id, user_id).await?.into_result()
    }

    /// Owner-or-collaborator gate
    pub async fn verify_playlist_access(&self, playlist_id: &str, user_id: &str) -> Result<()> {
        let ownership = self.check_owner(playlist_id, user_id).await?;

        let collaboration = if needs_collaboration_check(&ownership) {
            Some(self.check_collaborator(playlist_id, user_id).await)
        } else {
            None
        };

        let decision = combine(ownership, collaboration);
        debug!(playlist_id, user_id, ?decision, "Playlist access resolved");
        decision.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Check; 4] = [
        Check::Granted,
        Check::Denied(Denial::PlaylistNotFound),
        Check::Denied(Denial::NotOwner),
        Check::Denied(Denial::NotCollaborator),
    ];

    #[test]
    fn test_owner_grant_ignores_collaboration() {
        assert_eq!(combine(Check::Granted, None), Check::Granted);
        for collaboration in ALL {
            assert_eq!(combine(Check::Granted, Some(collaboration)), Check::Granted);
        }
    }

    #[test]
    fn test_missing_playlist_is_final() {
        let missing = Check::Denied(Denial::PlaylistNotFound);
        assert!(!needs_collaboration_check(&missing));
        for collaboration in ALL {
            assert_eq!(combine(missing, Some(collaboration)), missing);
        }
    }

    #[test]
    fn test_collaborator_overrides_ownership_denial() {
        let not_owner = Check::Denied(Denial::NotOwner);
        assert!(needs_collaboration_check(&not_owner));
        assert_eq!(combine(not_owner, Some(Check::Granted)), Check::Granted);
    }

    #[test]
    fn test_failed_fallback_keeps_ownership_denial() {
        let not_owner = Check::Denied(Denial::NotOwner);
        assert_eq!(
            combine(not_owner, Some(Check::Denied(Denial::NotCollaborator))),
            not_owner
        );
        assert_eq!(combine(not_owner, None), not_owner);
    }

    #[test]
    fn test_denials_map_to_error_kinds() {
        assert!(matches!(
            Check::Denied(Denial::PlaylistNotFound).into_result(),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            Check::Denied(Denial::NotOwner).into_result(),
            Err(Error::Authorization(_))
        ));
        assert!(Check::Granted.into_result().is_ok());
    }
}
