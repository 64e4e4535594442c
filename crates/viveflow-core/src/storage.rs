//! On-disk persistence for generated frameworks and chat transcripts.
//!
//! Both stores are plain JSON files under a caller-supplied data
//! directory. Updates are read-modify-write with no locking: the app is
//! single-user and single-process by assumption, which is a documented
//! limitation rather than a guarantee.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::framework::{ChatMessage, Framework};

/// Most-recent-first recency list cap.
pub const RECENT_CAP: usize = 10;

/// Sanitizes an idea string for use as a file name component.
///
/// Lowercases, replaces non-alphanumeric chars with `-`, collapses
/// consecutive dashes, and trims leading/trailing dashes.
pub fn sanitize_key(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push('-');
        }
    }
    let collapsed: String = result
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if collapsed.is_empty() {
        return "unnamed".to_string();
    }
    collapsed
}

/// One saved generation: the idea, its normalized document, and an
/// epoch-millis id that doubles as the creation timestamp. Tags and
/// folder are user-edited organization metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFramework {
    pub id: i64,
    pub idea: String,
    pub framework: Framework,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

/// Bounded most-recent-first list of saved frameworks.
///
/// File layout: `<data_dir>/recent.json` holding a JSON array, newest
/// entry first, never longer than [`RECENT_CAP`].
pub struct FrameworkStore {
    path: PathBuf,
}

impl FrameworkStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("recent.json"),
        }
    }

    pub fn list(&self) -> Result<Vec<SavedFramework>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw).context("Failed to parse saved framework list")
    }

    /// Prepend a new entry, dropping the oldest past the cap. Returns the
    /// saved record.
    pub fn push(&self, idea: &str, framework: Framework) -> Result<SavedFramework> {
        let mut entries = self.list()?;
        // Timestamp ids can collide under rapid saves; bump until unique.
        let mut id = Utc::now().timestamp_millis();
        while entries.iter().any(|entry| entry.id == id) {
            id += 1;
        }
        let saved = SavedFramework {
            id,
            idea: idea.to_string(),
            framework,
            tags: Vec::new(),
            folder: None,
        };
        entries.insert(0, saved.clone());
        entries.truncate(RECENT_CAP);
        self.write(&entries)?;
        Ok(saved)
    }

    pub fn find(&self, id: i64) -> Result<Option<SavedFramework>> {
        Ok(self.list()?.into_iter().find(|entry| entry.id == id))
    }

    /// Remove an entry by id. Returns whether anything was removed.
    pub fn remove(&self, id: i64) -> Result<bool> {
        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.write(&entries)?;
        Ok(true)
    }

    /// Replace the organization metadata of a saved entry. Returns the
    /// updated record, or `None` when the id is unknown.
    pub fn set_metadata(
        &self,
        id: i64,
        tags: Vec<String>,
        folder: Option<String>,
    ) -> Result<Option<SavedFramework>> {
        let mut entries = self.list()?;
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(None);
        };
        entry.tags = tags;
        entry.folder = folder;
        let updated = entry.clone();
        self.write(&entries)?;
        Ok(Some(updated))
    }

    fn write(&self, entries: &[SavedFramework]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .context("Failed to serialize framework list")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

/// A chat transcript tied to the idea that produced it and the goal of the
/// document it discussed. A goal change invalidates the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub idea: String,
    pub goal: String,
    pub messages: Vec<ChatMessage>,
}

/// Per-idea chat transcripts, one JSON file per sanitized idea key.
pub struct ChatStore {
    base_dir: PathBuf,
}

impl ChatStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_dir: data_dir.join("chats"),
        }
    }

    fn path_for(&self, idea: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", sanitize_key(idea)))
    }

    /// Load the transcript for an idea, if one exists and its stored goal
    /// still matches `current_goal`. A mismatch means the framework was
    /// regenerated since the conversation happened; the stale transcript
    /// is removed and `None` is returned.
    pub fn load(&self, idea: &str, current_goal: &str) -> Result<Option<ChatTranscript>> {
        let path = self.path_for(idea);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let transcript: ChatTranscript =
            serde_json::from_str(&raw).context("Failed to parse chat transcript")?;
        if transcript.goal != current_goal {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            return Ok(None);
        }
        Ok(Some(transcript))
    }

    pub fn save(&self, idea: &str, goal: &str, messages: &[ChatMessage]) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create {}", self.base_dir.display()))?;
        let transcript = ChatTranscript {
            idea: idea.to_string(),
            goal: goal.to_string(),
            messages: messages.to_vec(),
        };
        let raw = serde_json::to_string_pretty(&transcript)
            .context("Failed to serialize chat transcript")?;
        let path = self.path_for(idea);
        std::fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))
    }
}
