use anyhow::Result;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use brain_core::store::{self, DataPaths};
use brain_core::{Memory, User};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod auth;
pub mod chat;
pub mod error;
pub mod memories;

use auth::{Otp, Session};

/// Shared handler state. The user and memory vectors are write-through:
/// mutations update the in-memory copy and rewrite the whole JSON file.
/// Sessions and OTPs live in memory only.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<DataPaths>,
    pub users: Arc<RwLock<Vec<User>>>,
    pub memories: Arc<RwLock<Vec<Memory>>>,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub otps: Arc<RwLock<HashMap<String, Otp>>>,
}

pub fn build_app(data_dir: String) -> Result<Router> {
    // Load the flat-JSON data files at startup.
    let paths = DataPaths::new(&data_dir);
    let users = store::load_users(&paths)?;
    let memories = store::load_memories(&paths)?;
    tracing::info!(num_users = users.len(), num_memories = memories.len(), "loaded data files");

    let state = AppState {
        paths: Arc::new(paths),
        users: Arc::new(RwLock::new(users)),
        memories: Arc::new(RwLock::new(memories)),
        sessions: Arc::new(RwLock::new(HashMap::new())),
        otps: Arc::new(RwLock::new(HashMap::new())),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/_health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot", post(auth::forgot))
        .route("/api/auth/reset", post(auth::reset))
        .route("/api/memories", get(memories::list).post(memories::create))
        .route("/api/memories/:id", delete(memories::remove))
        .route("/api/chat", post(chat::chat))
        .fallback(not_found)
        .with_state(state)
        .layer(cors);
    Ok(app)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "ts": brain_core::now_rfc3339() }))
}

/// JSON 404s for API paths, plain text for everything else.
async fn not_found(method: Method, uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        let body = serde_json::json!({ "error": format!("Cannot {} {}", method, uri.path()) });
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    } else {
        (StatusCode::NOT_FOUND, "Not Found").into_response()
    }
}
