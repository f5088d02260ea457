pub mod search;
pub mod store;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

/// A saved note. Immutable once written; scoring reads it, never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub full_text: String,
    pub created_at: String,
}

impl Memory {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        full_text: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            title: title.into(),
            full_text: full_text.into(),
            created_at: now_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into())
}
