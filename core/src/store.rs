//! Flat-JSON persistence for users and memories.
//!
//! Human-readable `users.json` / `memories.json` under a single data
//! directory. Writes replace the whole file; there is no cross-process
//! locking, callers serialize access in-process.

use crate::{Memory, User};
use anyhow::Result;
use std::fs::{create_dir_all, read_to_string, write};
use std::path::{Path, PathBuf};

pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn users(&self) -> PathBuf { self.root.join("users.json") }
    fn memories(&self) -> PathBuf { self.root.join("memories.json") }
}

pub fn save_users(paths: &DataPaths, users: &[User]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(users)?;
    write(paths.users(), json)?;
    Ok(())
}

/// Missing file loads as an empty list (first run).
pub fn load_users(paths: &DataPaths) -> Result<Vec<User>> {
    let file = paths.users();
    if !file.exists() {
        return Ok(Vec::new());
    }
    let users: Vec<User> = serde_json::from_str(&read_to_string(file)?)?;
    tracing::debug!(num_users = users.len(), "loaded users file");
    Ok(users)
}

pub fn save_memories(paths: &DataPaths, memories: &[Memory]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(memories)?;
    write(paths.memories(), json)?;
    Ok(())
}

pub fn load_memories(paths: &DataPaths) -> Result<Vec<Memory>> {
    let file = paths.memories();
    if !file.exists() {
        return Ok(Vec::new());
    }
    let memories: Vec<Memory> = serde_json::from_str(&read_to_string(file)?)?;
    tracing::debug!(num_memories = memories.len(), "loaded memories file");
    Ok(memories)
}

/// A user's memories, most recent first.
pub fn memories_for_user(memories: &[Memory], user_id: &str) -> Vec<Memory> {
    let mut mems: Vec<Memory> = memories
        .iter()
        .filter(|m| m.user_id == user_id)
        .cloned()
        .collect();
    // RFC 3339 strings order the same lexicographically as by instant.
    mems.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    mems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem(user_id: &str, title: &str, created_at: &str) -> Memory {
        Memory {
            id: crate::new_id(),
            user_id: user_id.into(),
            title: title.into(),
            full_text: "body".into(),
            created_at: created_at.into(),
        }
    }

    #[test]
    fn missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        assert!(load_users(&paths).unwrap().is_empty());
        assert!(load_memories(&paths).unwrap().is_empty());
    }

    #[test]
    fn memories_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let mems = vec![mem("u1", "first", "2024-01-01T00:00:00Z")];
        save_memories(&paths, &mems).unwrap();
        let loaded = load_memories(&paths).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "first");
        assert_eq!(loaded[0].user_id, "u1");
    }

    #[test]
    fn users_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let users = vec![User {
            id: crate::new_id(),
            email: "a@b.c".into(),
            password_hash: "salt$hash".into(),
            created_at: crate::now_rfc3339(),
        }];
        save_users(&paths, &users).unwrap();
        assert_eq!(load_users(&paths).unwrap()[0].email, "a@b.c");
    }

    #[test]
    fn listing_is_user_scoped_and_most_recent_first() {
        let mems = vec![
            mem("u1", "older", "2024-01-01T00:00:00Z"),
            mem("u2", "other user", "2024-06-01T00:00:00Z"),
            mem("u1", "newer", "2024-03-01T00:00:00Z"),
        ];
        let listed = memories_for_user(&mems, "u1");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "newer");
        assert_eq!(listed[1].title, "older");
    }
}
