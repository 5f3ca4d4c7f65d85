//! HTTP handlers for `/movies`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cinema_http::error::AppError;
use serde::Deserialize;
use serde_json::{json, Value};

use super::models::Movie;
use super::store::MovieStore;
use super::validation::{validate_movie, validate_partial_movie};

pub const MOVIE_NOT_FOUND: &str = "Movie not found";

const PREFLIGHT_METHODS: &str = "GET, POST, PUT, DELETE, PATCH";

/// Routes relative to the module mount path.
pub fn router(store: Arc<MovieStore>) -> Router {
    Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route(
            "/{id}",
            get(get_movie)
                .patch(update_movie)
                .delete(delete_movie)
                .options(preflight),
        )
        .with_state(store)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub genre: Option<String>,
}

async fn list_movies(
    State(store): State<Arc<MovieStore>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Movie>> {
    let genre = params.genre.as_deref().filter(|genre| !genre.is_empty());
    Json(store.list(genre).await)
}

async fn get_movie(
    State(store): State<Arc<MovieStore>>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, AppError> {
    store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(MOVIE_NOT_FOUND))
}

async fn create_movie(
    State(store): State<Arc<MovieStore>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Movie>), AppError> {
    let Json(body) = payload.map_err(body_rejected)?;
    let data = validate_movie(&body)?;

    let movie = store.create(data).await;
    tracing::info!(movie_id = %movie.id, title = %movie.title, "movie added to catalogue");

    Ok((StatusCode::CREATED, Json(movie)))
}

async fn delete_movie(
    State(store): State<Arc<MovieStore>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let removed = store
        .remove(&id)
        .await
        .ok_or_else(|| AppError::not_found(MOVIE_NOT_FOUND))?;
    tracing::info!(movie_id = %removed.id, "movie removed from catalogue");

    Ok(Json(json!({ "message": "Movie deleted" })))
}

/// The body is validated before the id is looked up, so a malformed patch
/// for an unknown id is a 400 rather than a 404.
async fn update_movie(
    State(store): State<Arc<MovieStore>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    let Json(body) = payload.map_err(body_rejected)?;
    let patch = validate_partial_movie(&body)?;

    store
        .update(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(MOVIE_NOT_FOUND))
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, PREFLIGHT_METHODS),
        ],
        "OK",
    )
}

fn body_rejected(rejection: JsonRejection) -> AppError {
    AppError::bad_request(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::movies::models::{Genre, NewMovie};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        response::Response,
    };
    use tower::ServiceExt;

    const HEAT_ID: &str = "11111111-1111-4111-8111-111111111111";
    const AMELIE_ID: &str = "22222222-2222-4222-8222-222222222222";

    fn fixture() -> Vec<Movie> {
        vec![
            Movie::new(
                HEAT_ID,
                NewMovie {
                    title: "Heat".to_string(),
                    year: 1995,
                    director: "Michael Mann".to_string(),
                    duration: 170,
                    poster: "https://example.com/heat.jpg".to_string(),
                    genre: vec![Genre::Crime, Genre::Action],
                    rate: 8.3,
                },
            ),
            Movie::new(
                AMELIE_ID,
                NewMovie {
                    title: "Amelie".to_string(),
                    year: 2001,
                    director: "Jean-Pierre Jeunet".to_string(),
                    duration: 122,
                    poster: "https://example.com/amelie.jpg".to_string(),
                    genre: vec![Genre::Comedy],
                    rate: 8.3,
                },
            ),
        ]
    }

    fn app() -> (Router, Arc<MovieStore>) {
        let store = Arc::new(MovieStore::new(fixture()));
        (router(Arc::clone(&store)), store)
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid_payload() -> Value {
        json!({
            "title": "Spirited Away",
            "year": 2001,
            "director": "Hayao Miyazaki",
            "duration": 125,
            "poster": "https://example.com/spirited.jpg",
            "genre": ["fantasy", "adventure"]
        })
    }

    #[tokio::test]
    async fn list_returns_whole_collection() {
        let (app, _) = app();

        let response = app.oneshot(request(Method::GET, "/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!(fixture()));
    }

    #[tokio::test]
    async fn list_filter_ignores_case_and_empty_value() {
        let (app, _) = app();

        for uri in ["/?genre=Action", "/?genre=action", "/?genre=ACTION"] {
            let response = app.clone().oneshot(request(Method::GET, uri, None)).await.unwrap();
            let body = json_body(response).await;
            assert_eq!(body, json!([fixture()[0]]), "{uri}");
        }

        let unknown = app
            .clone()
            .oneshot(request(Method::GET, "/?genre=Western", None))
            .await
            .unwrap();
        assert_eq!(json_body(unknown).await, json!([]));

        let empty = app.oneshot(request(Method::GET, "/?genre=", None)).await.unwrap();
        assert_eq!(json_body(empty).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_by_id_and_not_found() {
        let (app, _) = app();

        let found = app
            .clone()
            .oneshot(request(Method::GET, &format!("/{AMELIE_ID}"), None))
            .await
            .unwrap();
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(json_body(found).await["title"], "Amelie");

        let prefix = &HEAT_ID[..8];
        let missing = app
            .oneshot(request(Method::GET, &format!("/{prefix}"), None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(missing).await,
            json!({ "message": MOVIE_NOT_FOUND })
        );
    }

    #[tokio::test]
    async fn create_returns_201_and_applies_defaults() {
        let (app, store) = app();

        let response = app
            .oneshot(request(Method::POST, "/", Some(valid_payload())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["genre"], json!(["Fantasy", "Adventure"]));
        assert_eq!(body["rate"], json!(0.0));

        let id = body["id"].as_str().unwrap();
        assert!(id != HEAT_ID && id != AMELIE_ID);
        assert_eq!(store.len().await, 3);
        assert_eq!(json!(store.get(id).await.unwrap()), body);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_without_mutating() {
        let (app, store) = app();

        let mut with_unknown = valid_payload();
        with_unknown["studio"] = json!("Ghibli");
        let mut missing_title = valid_payload();
        missing_title.as_object_mut().unwrap().remove("title");

        for payload in [with_unknown, missing_title] {
            let response = app
                .clone()
                .oneshot(request(Method::POST, "/", Some(payload)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = json_body(response).await;
            assert!(body["error"].as_array().is_some_and(|issues| !issues.is_empty()));
        }

        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn create_rejects_malformed_json() {
        let (app, store) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"title\": "))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["message"].is_string());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (app, store) = app();
        let uri = format!("/{HEAT_ID}");

        let deleted = app
            .clone()
            .oneshot(request(Method::DELETE, &uri, None))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(
            json_body(deleted).await,
            json!({ "message": "Movie deleted" })
        );

        let again = app
            .clone()
            .oneshot(request(Method::DELETE, &uri, None))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);

        let fetched = app.oneshot(request(Method::GET, &uri, None)).await.unwrap();
        assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() {
        let (app, _) = app();

        let response = app
            .oneshot(request(
                Method::PATCH,
                &format!("/{HEAT_ID}"),
                Some(json!({ "year": 1999 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let mut expected = fixture()[0].clone();
        expected.year = 1999;
        assert_eq!(json_body(response).await, json!(expected));
    }

    #[tokio::test]
    async fn patch_cannot_change_id() {
        let (app, store) = app();

        let response = app
            .oneshot(request(
                Method::PATCH,
                &format!("/{HEAT_ID}"),
                Some(json!({ "id": "hijacked" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.get(HEAT_ID).await.is_some());
        assert!(store.get("hijacked").await.is_none());
    }

    #[tokio::test]
    async fn patch_validates_before_lookup() {
        let (app, _) = app();

        let invalid = app
            .clone()
            .oneshot(request(
                Method::PATCH,
                "/does-not-exist",
                Some(json!({ "rate": 42 })),
            ))
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let valid = app
            .oneshot(request(
                Method::PATCH,
                "/does-not-exist",
                Some(json!({ "rate": 7 })),
            ))
            .await
            .unwrap();
        assert_eq!(valid.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn options_answers_with_cors_headers() {
        let (app, _) = app();

        let response = app
            .oneshot(request(Method::OPTIONS, &format!("/{HEAT_ID}"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            PREFLIGHT_METHODS
        );
    }
}
