//! Playlist and playlist membership endpoints
//!
//! Every route here requires a [`CurrentUser`]. Routes addressing one
//! playlist pass the owner-or-collaborator gate before touching it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::extract::{require_non_empty, CurrentUser, Payload, Validate};
use super::{created, data, message, ApiResult, Reply};
use crate::models::{NewPlaylist, PlaylistUpdate};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaylistPayload {
    pub name: String,
}

impl Validate for PlaylistPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongPayload {
    pub song_id: String,
}

impl Validate for PlaylistSongPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("songId", &self.song_id)
    }
}

/// POST /playlists
pub async fn post_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(payload): Payload<PlaylistPayload>,
) -> ApiResult<Reply> {
    let playlist_id = state
        .services
        .playlists
        .add_playlist(NewPlaylist {
            name: payload.name,
            owner: user_id,
        })
        .await?;

    Ok(created("Playlist added", json!({ "playlistId": playlist_id })))
}

/// GET /playlists
pub async fn get_playlists(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Reply> {
    let playlists = state.services.playlists.get_playlists(&user_id).await?;
    Ok(data(StatusCode::OK, json!({ "playlists": playlists })))
}

/// PUT /playlists/:id
pub async fn put_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    CurrentUser(user_id): CurrentUser,
    Payload(payload): Payload<PlaylistPayload>,
) -> ApiResult<Reply> {
    let playlists = &state.services.playlists;
    playlists.verify_playlist_access(&playlist_id, &user_id).await?;
    playlists
        .edit_playlist(
            &playlist_id,
            PlaylistUpdate {
                name: Some(payload.name),
            },
        )
        .await?;

    Ok(message(StatusCode::OK, "Playlist updated"))
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Reply> {
    let playlists = &state.services.playlists;
    playlists.verify_playlist_access(&playlist_id, &user_id).await?;
    playlists.delete_playlist(&playlist_id).await?;

    Ok(message(StatusCode::OK, "Playlist deleted"))
}

/// POST /playlists/:id/songs
pub async fn post_song_to_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    CurrentUser(user_id): CurrentUser,
    Payload(payload): Payload<PlaylistSongPayload>,
) -> ApiResult<Reply> {
    let playlists = &state.services.playlists;
    playlists.verify_playlist_access(&playlist_id, &user_id).await?;
    playlists.verify_song_id(&payload.song_id).await?;
    playlists
        .add_song_to_playlist(&playlist_id, &payload.song_id)
        .await?;

    Ok(message(StatusCode::CREATED, "Song added to playlist"))
}

/// GET /playlists/:id/songs
pub async fn get_songs_in_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Reply> {
    let playlists = &state.services.playlists;
    playlists.verify_playlist_access(&playlist_id, &user_id).await?;
    let playlist = playlists.get_songs_in_playlist(&playlist_id).await?;

    Ok(data(StatusCode::OK, json!({ "playlist": playlist })))
}

/// DELETE /playlists/:id/songs
pub async fn delete_song_from_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    CurrentUser(user_id): CurrentUser,
    Payload(payload): Payload<PlaylistSongPayload>,
) -> ApiResult<Reply> {
    let playlists = &state.services.playlists;
    playlists.verify_playlist_access(&playlist_id, &user_id).await?;
    playlists.verify_song_id(&payload.song_id).await?;
    playlists
        .delete_song_from_playlist(&playlist_id, &payload.song_id)
        .await?;

    Ok(message(StatusCode::OK, "Song removed from playlist"))
}

pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/playlists", get(get_playlists).post(post_playlist))
        .route("/playlists/:id", put(put_playlist).delete(delete_playlist))
        .route(
            "/playlists/:id/songs",
            get(get_songs_in_playlist)
                .post(post_song_to_playlist)
                .delete(delete_song_from_playlist),
        )
}
