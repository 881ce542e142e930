//! Plex adapter integration tests against an in-process fake server.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use subfetch_core::{
    config::PlexConfig,
    media::{MediaKind, SectionKind},
    LibraryError, MediaLibrary, MediaType, PlexLibrary,
};

const TOKEN: &str = "plex-token";

#[derive(Debug, Default)]
struct FakeState {
    tokens: Vec<Option<String>>,
    queries: Vec<String>,
    /// Metadata requests for this rating key fail with 500.
    broken_key: Option<String>,
}

type Shared = Arc<Mutex<FakeState>>;

fn record(state: &Shared, headers: &HeaderMap, query: Option<String>) -> bool {
    let token = headers
        .get("x-plex-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut state = state.lock().unwrap();
    let authorized = token.as_deref() == Some(TOKEN);
    state.tokens.push(token);
    if let Some(query) = query {
        state.queries.push(query);
    }
    authorized
}

async fn sections(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !record(&state, &headers, None) {
        return (StatusCode::UNAUTHORIZED, "bad token").into_response();
    }
    r#"{"MediaContainer": {"Directory": [
        {"key": "1", "title": "Movies", "type": "movie"},
        {"key": "2", "title": "TV Shows", "type": "show"},
        {"key": "3", "title": "Music", "type": "artist"}
    ]}}"#
        .into_response()
}

async fn section_all(
    State(state): State<Shared>,
    Path(key): Path<String>,
    headers: HeaderMap,
    uri: axum::http::Uri,
) -> Response {
    record(&state, &headers, uri.query().map(str::to_string));
    match key.as_str() {
        "1" => r#"{"MediaContainer": {"Metadata": [
            {"ratingKey": "101", "title": "Heat",
             "Guid": [{"id": "imdb://tt0113277"}],
             "Media": [{"Part": [{"file": "/movies/Heat.mkv", "size": 2048}]}]},
            {"ratingKey": "102", "title": "No File"}
        ]}}"#
            .into_response(),
        "2" => r#"{"MediaContainer": {"Metadata": [
            {"ratingKey": "201", "title": "Pilot", "grandparentTitle": "Show",
             "parentIndex": 1, "index": 1,
             "Media": [{"Part": [{"file": "/tv/Show/S01E01.mkv"}]}]},
            {"ratingKey": "202", "title": "Special", "grandparentTitle": "Show"}
        ]}}"#
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn metadata(
    State(state): State<Shared>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    record(&state, &headers, None);
    if state.lock().unwrap().broken_key.as_deref() == Some(key.as_str()) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let streams = if key == "101" {
        r#"[{"streamType": 3, "languageCode": "eng"}, {"streamType": 3, "languageCode": ""}]"#
    } else {
        "[]"
    };
    format!(
        r#"{{"MediaContainer": {{"Metadata": [{{"ratingKey": "{}", "title": "x",
            "Media": [{{"Part": [{{"Stream": {}}}]}}]}}]}}}}"#,
        key, streams
    )
    .into_response()
}

async fn start(token: &str) -> (PlexLibrary, Shared) {
    start_with(token, FakeState::default()).await
}

async fn start_with(token: &str, fake: FakeState) -> (PlexLibrary, Shared) {
    let state: Shared = Arc::new(Mutex::new(fake));
    let app = Router::new()
        .route("/library/sections", get(sections))
        .route("/library/sections/{key}/all", get(section_all))
        .route("/library/metadata/{key}", get(metadata))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake server");
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let library = PlexLibrary::new(&PlexConfig {
        url,
        token: token.to_string(),
        timeout_secs: 5,
    })
    .unwrap();
    (library, state)
}

#[tokio::test]
async fn test_sections() {
    let (library, state) = start(TOKEN).await;

    let sections = library.sections().await.unwrap();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].kind, SectionKind::Movie);
    assert_eq!(sections[1].kind, SectionKind::Show);
    assert_eq!(sections[2].kind, SectionKind::Other);
    assert_eq!(state.lock().unwrap().tokens, vec![Some(TOKEN.to_string())]);
}

#[tokio::test]
async fn test_bad_token_is_api_error() {
    let (library, _) = start("wrong").await;

    let err = library.sections().await.unwrap_err();
    assert!(matches!(err, LibraryError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_list_movies_with_streams() {
    let (library, state) = start(TOKEN).await;

    let items = library.list_items("Movies", None).await.unwrap();
    assert_eq!(items.len(), 2);

    let heat = &items[0];
    assert_eq!(heat.id, "101");
    assert_eq!(heat.kind, MediaKind::Movie);
    assert_eq!(heat.guids, vec!["imdb://tt0113277".to_string()]);
    let file = heat.file.as_ref().unwrap();
    assert_eq!(file.path.to_str(), Some("/movies/Heat.mkv"));
    assert_eq!(file.size, Some(2048));
    assert_eq!(heat.subtitle_streams.len(), 2);
    assert_eq!(heat.subtitle_streams[0].language.as_deref(), Some("eng"));
    // Empty language code counts as unlabeled
    assert!(heat.subtitle_streams[1].language.is_none());

    assert!(items[1].file.is_none());

    let queries = state.lock().unwrap().queries.clone();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].contains("type=1"));
    assert!(queries[0].contains("includeGuids=1"));
}

#[tokio::test]
async fn test_failed_item_metadata_does_not_fail_listing() {
    let (library, _) = start_with(
        TOKEN,
        FakeState {
            broken_key: Some("102".to_string()),
            ..Default::default()
        },
    )
    .await;

    let items = library.list_items("Movies", None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Heat");
    assert_eq!(items[0].subtitle_streams.len(), 2);
}

#[tokio::test]
async fn test_list_episodes_drops_unnumbered() {
    let (library, state) = start(TOKEN).await;

    let items = library.list_items("TV Shows", None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].display_name(), "Show - S01E01 - Pilot");
    assert_eq!(items[0].media_type(), MediaType::Episode);
    assert!(state.lock().unwrap().queries[0].contains("type=4"));
}

#[tokio::test]
async fn test_filter_mismatch_is_empty() {
    let (library, state) = start(TOKEN).await;

    let items = library
        .list_items("Movies", Some(MediaType::Episode))
        .await
        .unwrap();
    assert!(items.is_empty());
    assert!(state.lock().unwrap().queries.is_empty());
}

#[tokio::test]
async fn test_non_video_library_is_empty() {
    let (library, _) = start(TOKEN).await;
    assert!(library.list_items("Music", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_library() {
    let (library, _) = start(TOKEN).await;

    let err = library.list_items("Anime", None).await.unwrap_err();
    assert!(matches!(err, LibraryError::NotFound(ref name) if name == "Anime"));
}
