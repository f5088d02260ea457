//! Registration, login and password reset, plus the session layer the
//! other routes use to resolve the caller.
//!
//! Sessions are opaque random tokens held in memory with a fixed lifetime;
//! callers present them as `Authorization: Bearer <token>`. The legacy
//! `x-user-id` header keeps working as a demo fallback.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use brain_core::store;
use brain_core::User;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::error::ApiError;
use crate::AppState;

pub const SESSION_TTL_DAYS: i64 = 7;
const OTP_TTL_MINUTES: i64 = 10;

pub struct Session {
    pub user_id: String,
    pub expires_at: OffsetDateTime,
}

pub struct Otp {
    pub code: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = required_credentials(req)?;
    check_password_policy(&password)?;

    let user = {
        let mut users = state.users.write();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(ApiError::Conflict("account already exists".into()));
        }
        let user = User {
            id: brain_core::new_id(),
            email,
            password_hash: hash_password(&password),
            created_at: brain_core::now_rfc3339(),
        };
        users.push(user.clone());
        store::save_users(&state.paths, &users)?;
        user
    };

    let token = open_session(&state, &user.id);
    tracing::info!(email = %user.email, user_id = %user.id, "registered");
    Ok(Json(AuthResponse { token, user_id: user.id, message: "registered".into() }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = required_credentials(req)?;

    let user = {
        let users = state.users.read();
        users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(&email))
            .cloned()
    };
    // Same message for unknown email and wrong password.
    let user = user.ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;
    if !verify_password(&password, &user.password_hash) {
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    let token = open_session(&state, &user.id);
    tracing::info!(email = %user.email, user_id = %user.id, "logged in");
    Ok(Json(AuthResponse { token, user_id: user.id, message: "logged in".into() }))
}

#[derive(Deserialize)]
pub struct ForgotRequest {
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn forgot(
    State(state): State<AppState>,
    Json(req): Json<ForgotRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("email required".into()))?;

    let known = state
        .users
        .read()
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(&email));
    if !known {
        return Err(ApiError::NotFound("account not found".into()));
    }

    let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
    let otp = Otp {
        code: code.clone(),
        expires_at: OffsetDateTime::now_utc() + Duration::minutes(OTP_TTL_MINUTES),
    };
    state.otps.write().insert(email.to_lowercase(), otp);
    // Local-dev stand-in for email delivery.
    tracing::info!(email = %email, otp = %code, "password reset OTP issued");
    Ok(Json(serde_json::json!({ "message": "otp_sent" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

pub async fn reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (email, otp, new_password) = match (req.email, req.otp, req.new_password) {
        (Some(e), Some(o), Some(p)) if !e.is_empty() && !o.is_empty() && !p.is_empty() => (e, o, p),
        _ => return Err(ApiError::BadRequest("email, otp, newPassword required".into())),
    };

    let key = email.to_lowercase();
    let valid = match state.otps.read().get(&key) {
        Some(record) => record.code == otp && record.expires_at > OffsetDateTime::now_utc(),
        None => false,
    };
    if !valid {
        return Err(ApiError::BadRequest("invalid otp".into()));
    }
    check_password_policy(&new_password)?;

    {
        let mut users = state.users.write();
        let user = users
            .iter_mut()
            .find(|u| u.email.eq_ignore_ascii_case(&email))
            .ok_or_else(|| ApiError::NotFound("account not found".into()))?;
        user.password_hash = hash_password(&new_password);
        store::save_users(&state.paths, &users)?;
    }

    state.otps.write().remove(&key);
    tracing::info!(email = %email, "password reset");
    Ok(Json(serde_json::json!({ "message": "password_reset" })))
}

/// Resolve the caller: a valid Bearer session wins, else the `x-user-id`
/// demo header. `Ok(None)` means anonymous; malformed or expired tokens
/// are rejected outright.
pub fn caller_id(state: &AppState, headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("invalid auth header".into()))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("invalid auth header".into()))?;

        let mut sessions = state.sessions.write();
        return match sessions.get(token) {
            Some(s) if s.expires_at > OffsetDateTime::now_utc() => Ok(Some(s.user_id.clone())),
            Some(_) => {
                sessions.remove(token);
                Err(ApiError::Unauthorized("invalid token".into()))
            }
            None => Err(ApiError::Unauthorized("invalid token".into())),
        };
    }

    if let Some(v) = headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        if !v.is_empty() {
            return Ok(Some(v.to_string()));
        }
    }
    Ok(None)
}

/// Like [`caller_id`] but anonymous callers are a 401.
pub fn require_caller(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    caller_id(state, headers)?.ok_or_else(|| {
        ApiError::Unauthorized("unauthenticated - log in or set x-user-id header".into())
    })
}

pub fn open_session(state: &AppState, user_id: &str) -> String {
    let token = generate_session_token();
    let session = Session {
        user_id: user_id.to_string(),
        expires_at: OffsetDateTime::now_utc() + Duration::days(SESSION_TTL_DAYS),
    };
    state.sessions.write().insert(token.clone(), session);
    token
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn required_credentials(req: Credentials) -> Result<(String, String), ApiError> {
    match (req.email, req.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => Ok((e, p)),
        _ => Err(ApiError::BadRequest("email and password required".into())),
    }
}

/// Lower, upper, digit, special, minimum 8 chars.
fn check_password_policy(password: &str) -> Result<(), ApiError> {
    let ok = password.chars().count() >= 8
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric());
    if ok {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "password must have lower, upper, digit, special and be 8+ chars".into(),
        ))
    }
}

/// Salted SHA-256, stored as `salt$digest` in hex.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let digest = salted_digest(&salt, password);
    format!("{salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => salted_digest(salt, password) == digest,
        None => false,
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashes_verify_and_are_salted() {
        let a = hash_password("Tr1cky-pass");
        let b = hash_password("Tr1cky-pass");
        assert_ne!(a, b);
        assert!(verify_password("Tr1cky-pass", &a));
        assert!(verify_password("Tr1cky-pass", &b));
        assert!(!verify_password("wrong", &a));
        assert!(!verify_password("Tr1cky-pass", "not-a-hash"));
    }

    #[test]
    fn password_policy() {
        assert!(check_password_policy("Abcdef1!").is_ok());
        assert!(check_password_policy("abcdef1!").is_err()); // no upper
        assert!(check_password_policy("ABCDEF1!").is_err()); // no lower
        assert!(check_password_policy("Abcdefg!").is_err()); // no digit
        assert!(check_password_policy("Abcdefg1").is_err()); // no special
        assert!(check_password_policy("Ab1!").is_err()); // too short
    }

    #[test]
    fn session_tokens_are_32_hex_chars() {
        let t = generate_session_token();
        assert_eq!(t.len(), 32);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
