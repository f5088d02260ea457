//! The pseudo-chat endpoint: keyword retrieval over the caller's memories.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use brain_core::search::{rank, Hit, Query};
use brain_core::store;
use serde::{Deserialize, Serialize};

use crate::auth::caller_id;
use crate::error::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub used: Vec<Hit>,
}

fn empty_reply(reply: String) -> Json<ChatResponse> {
    Json(ChatResponse { reply, used: Vec::new() })
}

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let raw = req.message.unwrap_or_default().trim().to_string();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("message required".into()));
    }

    // Trivially short queries are answered, not scored.
    if raw.chars().count() <= 1 {
        return Ok(empty_reply(format!("No memories found for \"{raw}\" (too short)")));
    }

    let query = Query::parse(&raw);
    if query.is_empty() {
        return Ok(empty_reply(format!(
            "No memories found for \"{raw}\" (no meaningful tokens)"
        )));
    }

    // Anonymous callers simply have no memories to search.
    let user_id = caller_id(&state, &headers)?.unwrap_or_default();
    let candidates = {
        let memories = state.memories.read();
        store::memories_for_user(&memories, &user_id)
    };
    tracing::info!(
        query = %raw,
        tokens = ?query.tokens(),
        scanned = candidates.len(),
        "chat query"
    );

    let used = rank(&query, &candidates);
    tracing::info!(matched = used.len(), "chat results");

    let reply = if used.is_empty() {
        format!("No memories found for \"{raw}\"")
    } else {
        format!("I found {} memory(ies) related to \"{raw}\"", used.len())
    };
    Ok(Json(ChatResponse { reply, used }))
}
