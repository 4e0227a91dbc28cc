//! HTTP API integration tests
//!
//! Drives the router with `oneshot` requests over in-memory stores.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use openmusic_api::store::Stores;
use openmusic_api::{build_router, AppState};
use openmusic_common::auth::{now_millis, sign_identity, MAX_PAST_MS};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "test-gateway-secret";

fn test_app() -> Router {
    build_router(AppState::new(Stores::in_memory(), SECRET))
}

/// Identity headers as the gateway would send them
fn signed(user: &str, timestamp: i64, secret: &str) -> Vec<(&'static str, String)> {
    vec![
        ("X-User-Id", user.to_string()),
        ("X-Auth-Timestamp", timestamp.to_string()),
        ("X-Auth-Signature", sign_identity(user, timestamp, secret)),
    ]
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let headers = user
        .map(|user| signed(user, now_millis(), SECRET))
        .unwrap_or_default();
    send_with_headers(app, method, uri, &headers, body).await
}

async fn send_with_headers(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, String)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": username, "fullname": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["userId"].as_str().unwrap().to_string()
}

async fn create_song(app: &Router, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/songs",
        None,
        Some(json!({
            "title": title,
            "year": 2008,
            "genre": "Country",
            "performer": "Taylor Swift",
            "duration": 235
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["songId"].as_str().unwrap().to_string()
}

async fn create_playlist(app: &Router, owner: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/playlists",
        Some(owner),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["playlistId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "openmusic-api");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["persistent"], false);
}

#[tokio::test]
async fn test_health_reports_sqlite_backend() {
    let pool = openmusic_common::db::init_in_memory().await.unwrap();
    let app = build_router(AppState::new(Stores::sqlite(pool), SECRET));

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "sqlite");
    assert_eq!(body["persistent"], true);
}

#[tokio::test]
async fn test_album_crud_and_envelope() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/albums",
        None,
        Some(json!({ "name": "Fearless", "year": 2008 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let album_id = body["data"]["albumId"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/albums/{}", album_id),
        None,
        Some(json!({ "year": 2021 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &format!("/albums/{}", album_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["album"]["name"], "Fearless");
    assert_eq!(body["data"]["album"]["year"], 2021);
    assert_eq!(body["data"]["album"]["songs"], json!([]));

    let (status, _) = send(&app, Method::DELETE, &format!("/albums/{}", album_id), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &format!("/albums/{}", album_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Album not found");
}

#[tokio::test]
async fn test_invalid_payloads_are_bad_request() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/albums",
        None,
        Some(json!({ "name": "", "year": 2008 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    let (status, _) = send(
        &app,
        Method::POST,
        "/albums",
        None,
        Some(json!({ "name": "Fearless" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/songs",
        None,
        Some(json!({
            "title": "Love Story",
            "year": 2008,
            "genre": "Country",
            "performer": "Taylor Swift",
            "duration": -5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_song_search_and_edit() {
    let app = test_app();
    let love = create_song(&app, "Love Story").await;
    create_song(&app, "Bad Blood").await;

    let (status, body) = send(&app, Method::GET, "/songs?title=love", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let songs = body["data"]["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["id"], love.as_str());
    assert_eq!(songs[0]["performer"], "Taylor Swift");
    assert!(songs[0].get("genre").is_none());

    let (status, body) = send(&app, Method::GET, "/songs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["songs"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/songs/{}", love),
        None,
        Some(json!({ "duration": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/songs/{}", love), None, None).await;
    assert_eq!(body["data"]["song"]["title"], "Love Story");
    assert_eq!(body["data"]["song"]["duration"], Value::Null);
}

#[tokio::test]
async fn test_playlist_routes_require_identity() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/playlists", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");

    let (status, _) = send(&app, Method::GET, "/playlists", Some("user-unknown"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsigned_or_forged_identity_is_rejected() {
    let app = test_app();
    let owner = register(&app, "owner").await;
    let playlist = create_playlist(&app, &owner, "private").await;
    let uri = format!("/playlists/{}/songs", playlist);
    let now = now_millis();

    // A real user id on its own is not enough
    let bare = [("X-User-Id", owner.clone())];
    let (status, body) = send_with_headers(&app, Method::GET, &uri, &bare, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");

    let guessed = signed(&owner, now, "guessed-secret");
    let (status, _) = send_with_headers(&app, Method::GET, &uri, &guessed, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stale = signed(&owner, now - MAX_PAST_MS - 5_000, SECRET);
    let (status, _) = send_with_headers(&app, Method::GET, &uri, &stale, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Signature taken from another user's request
    let stranger = register(&app, "stranger").await;
    let mut swapped = signed(&stranger, now, SECRET);
    swapped[0].1 = owner.clone();
    let (status, _) = send_with_headers(&app, Method::GET, &uri, &swapped, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let genuine = signed(&owner, now, SECRET);
    let (status, body) = send_with_headers(&app, Method::GET, &uri, &genuine, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["playlist"]["name"], "private");
}

#[tokio::test]
async fn test_playlist_access_over_http() {
    let app = test_app();
    let owner = register(&app, "owner").await;
    let collaborator = register(&app, "collaborator").await;
    let stranger = register(&app, "stranger").await;
    let playlist = create_playlist(&app, &owner, "pl-1").await;
    let song = create_song(&app, "Love Story").await;

    // Only the owner can add collaborators
    let (status, _) = send(
        &app,
        Method::POST,
        "/collaborations",
        Some(&stranger),
        Some(json!({ "playlistId": playlist, "userId": stranger })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/collaborations",
        Some(&owner),
        Some(json!({ "playlistId": playlist, "userId": collaborator })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["collaborationId"].as_str().unwrap().starts_with("collab-"));

    let songs_uri = format!("/playlists/{}/songs", playlist);

    let (status, _) = send(
        &app,
        Method::POST,
        &songs_uri,
        Some(&collaborator),
        Some(json!({ "songId": song })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, &songs_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["playlist"]["name"], "pl-1");
    assert_eq!(body["data"]["playlist"]["username"], "owner");
    assert_eq!(body["data"]["playlist"]["songs"][0]["id"], song.as_str());

    let (status, body) = send(&app, Method::GET, &songs_uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not allowed to access this resource");

    let (status, _) = send(
        &app,
        Method::GET,
        "/playlists/missing-id/songs",
        Some(&collaborator),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &songs_uri,
        Some(&owner),
        Some(json!({ "songId": song })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &songs_uri,
        Some(&owner),
        Some(json!({ "songId": song })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_adding_unknown_song_is_not_found() {
    let app = test_app();
    let owner = register(&app, "owner").await;
    let playlist = create_playlist(&app, &owner, "pl-1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/playlists/{}/songs", playlist),
        Some(&owner),
        Some(json!({ "songId": "song-missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Song not found");
}

#[tokio::test]
async fn test_list_rename_and_delete_playlists() {
    let app = test_app();
    let owner = register(&app, "owner").await;
    let playlist = create_playlist(&app, &owner, "Road trip").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/playlists/{}", playlist),
        Some(&owner),
        Some(json!({ "name": "Night drive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/playlists", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["playlists"],
        json!([{ "id": playlist, "name": "Night drive", "username": "owner" }])
    );

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/playlists/{}", playlist),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/playlists", Some(&owner), None).await;
    assert_eq!(body["data"]["playlists"], json!([]));
}

#[tokio::test]
async fn test_duplicate_username_is_bad_request() {
    let app = test_app();
    register(&app, "dicoding").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "dicoding", "fullname": "Another" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to add user. Username is already taken");
}
