//! Memory CRUD routes. All of them resolve the caller first; listings are
//! caller-scoped and most-recent-first.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use brain_core::store;
use brain_core::Memory;
use serde::{Deserialize, Serialize};

use crate::auth::require_caller;
use crate::error::ApiError;
use crate::AppState;

#[derive(Serialize)]
pub struct MemoriesResponse {
    pub memories: Vec<Memory>,
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MemoriesResponse>, ApiError> {
    let user_id = require_caller(&state, &headers)?;
    let memories = state.memories.read();
    Ok(Json(MemoriesResponse {
        memories: store::memories_for_user(&memories, &user_id),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub full_text: Option<String>,
}

#[derive(Serialize)]
pub struct MemoryResponse {
    pub memory: Memory,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateMemoryRequest>,
) -> Result<Json<MemoryResponse>, ApiError> {
    let user_id = require_caller(&state, &headers)?;

    let full_text = req.full_text.unwrap_or_default();
    let full_text = full_text.trim();
    if full_text.is_empty() {
        return Err(ApiError::BadRequest("fullText required".into()));
    }
    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "note".into());

    let memory = Memory::new(user_id.as_str(), title, full_text);
    {
        let mut memories = state.memories.write();
        memories.push(memory.clone());
        store::save_memories(&state.paths, &memories)?;
    }
    tracing::info!(user_id = %user_id, memory_id = %memory.id, "memory saved");
    Ok(Json(MemoryResponse { memory }))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = require_caller(&state, &headers)?;

    {
        let mut memories = state.memories.write();
        let before = memories.len();
        memories.retain(|m| !(m.id == id && m.user_id == user_id));
        if memories.len() == before {
            return Err(ApiError::NotFound("Memory not found".into()));
        }
        store::save_memories(&state.paths, &memories)?;
    }
    tracing::info!(user_id = %user_id, memory_id = %id, "memory deleted");
    Ok(Json(serde_json::json!({ "ok": true, "deletedId": id })))
}
