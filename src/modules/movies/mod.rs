pub mod models;
pub mod routes;
pub mod seed;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use cinema_kernel::{InitCtx, Module};
use serde_json::json;

use store::MovieStore;

/// Movie catalogue module serving `/movies`
pub struct MoviesModule {
    store: Arc<MovieStore>,
}

impl MoviesModule {
    pub fn new(store: Arc<MovieStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for MoviesModule {
    fn name(&self) -> &'static str {
        "movies"
    }

    fn mount_path(&self) -> String {
        "/movies".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let movies = self.store.len().await;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            movies,
            "movies module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "movies module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let movies = self.store.len().await;
        tracing::info!(
            module = self.name(),
            movies,
            "movies module stopped; in-memory catalogue discarded"
        );
        Ok(())
    }
}

/// Create a new instance of the movies module over `store`
pub fn create_module(store: Arc<MovieStore>) -> Arc<dyn Module> {
    Arc::new(MoviesModule::new(store))
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let movie_response = |description: &str| {
        json!({
            "description": description,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Movie" }
                }
            }
        })
    };
    let not_found = json!({
        "description": "Movie not found",
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/MessageResponse" }
            }
        }
    });
    let invalid = json!({
        "description": "Validation error",
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ValidationErrorResponse" }
            }
        }
    });
    let genres: Vec<&str> = models::Genre::ALL.iter().map(|g| g.as_str()).collect();

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List movies",
                    "tags": ["Movies"],
                    "parameters": [{
                        "name": "genre",
                        "in": "query",
                        "required": false,
                        "description": "Only movies with this genre (case-insensitive)",
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": {
                            "description": "List of movies",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Movie" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Create a movie",
                    "tags": ["Movies"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateMovie" }
                            }
                        }
                    },
                    "responses": {
                        "201": movie_response("Created movie"),
                        "400": invalid.clone()
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a movie",
                    "tags": ["Movies"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": movie_response("Movie"),
                        "404": not_found.clone()
                    }
                },
                "patch": {
                    "summary": "Update some fields of a movie",
                    "tags": ["Movies"],
                    "parameters": [id_param.clone()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/UpdateMovie" }
                            }
                        }
                    },
                    "responses": {
                        "200": movie_response("Updated movie"),
                        "400": invalid,
                        "404": not_found.clone()
                    }
                },
                "delete": {
                    "summary": "Delete a movie",
                    "tags": ["Movies"],
                    "parameters": [id_param],
                    "responses": {
                        "200": {
                            "description": "Movie deleted",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/MessageResponse" }
                                }
                            }
                        },
                        "404": not_found
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Movie": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "title": { "type": "string" },
                        "year": { "type": "integer", "minimum": validation::MIN_YEAR },
                        "director": { "type": "string" },
                        "duration": { "type": "integer", "minimum": 1 },
                        "poster": { "type": "string", "format": "uri" },
                        "genre": {
                            "type": "array",
                            "items": { "type": "string", "enum": genres.clone() }
                        },
                        "rate": {
                            "type": "number",
                            "minimum": validation::MIN_RATE,
                            "maximum": validation::MAX_RATE
                        }
                    },
                    "required": ["id", "title", "year", "director", "duration", "poster", "genre", "rate"]
                },
                "CreateMovie": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer" },
                        "director": { "type": "string" },
                        "duration": { "type": "integer", "minimum": 1 },
                        "poster": { "type": "string", "format": "uri" },
                        "genre": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "type": "string", "enum": genres.clone() }
                        },
                        "rate": { "type": "number", "default": validation::DEFAULT_RATE }
                    },
                    "required": ["title", "year", "director", "duration", "poster", "genre"]
                },
                "UpdateMovie": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "year": { "type": "integer" },
                        "director": { "type": "string" },
                        "duration": { "type": "integer", "minimum": 1 },
                        "poster": { "type": "string", "format": "uri" },
                        "genre": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "type": "string", "enum": genres }
                        },
                        "rate": { "type": "number" }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinema_kernel::settings::Settings;

    #[tokio::test]
    async fn module_lifecycle_reports_store() {
        let store = Arc::new(MovieStore::new(Vec::new()));
        let module = MoviesModule::new(Arc::clone(&store));
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        assert_eq!(module.name(), "movies");
        assert_eq!(module.mount_path(), "/movies");
        assert!(Arc::ptr_eq(&module.store, &store));

        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
    }

    #[test]
    fn openapi_fragment_documents_every_route() {
        let spec = openapi_fragment();
        for method in ["get", "post"] {
            assert!(spec["paths"]["/"][method].is_object(), "/ {method}");
        }
        for method in ["get", "patch", "delete"] {
            assert!(spec["paths"]["/{id}"][method].is_object(), "/{{id}} {method}");
        }
        assert_eq!(
            spec["components"]["schemas"]["Movie"]["properties"]["genre"]["items"]["enum"][8],
            "Sci-Fi"
        );
    }
}
