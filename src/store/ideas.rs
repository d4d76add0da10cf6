//! Idea storage and flat-file persistence.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::observability::metrics;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;
/// Maximum note length in characters.
pub const MAX_NOTE_CHARS: usize = 500;
/// Maximum number of tags per idea.
pub const MAX_TAGS: usize = 5;

/// Default page size for listings.
pub const DEFAULT_LIMIT: usize = 20;
/// Hard cap on page size.
pub const MAX_LIMIT: usize = 50;

/// A stored idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    pub id: u64,
    pub title: String,
    pub note: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an idea.
#[derive(Debug, Clone, Deserialize)]
pub struct IdeaDraft {
    pub title: String,
    pub note: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IdeaDraft {
    /// Trim tags, drop empty ones, then check all field bounds.
    pub fn normalize_and_validate(mut self) -> Result<Self, String> {
        self.tags = normalize_tags(self.tags);
        validate_title(&self.title)?;
        validate_note(&self.note)?;
        validate_tags(&self.tags)?;
        Ok(self)
    }
}

/// Partial update for an existing idea. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl IdeaPatch {
    /// Same per-field rules as a draft, applied only to present fields.
    pub fn normalize_and_validate(mut self) -> Result<Self, String> {
        if let Some(tags) = self.tags.take() {
            let tags = normalize_tags(tags);
            validate_tags(&tags)?;
            self.tags = Some(tags);
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(note) = &self.note {
            validate_note(note)?;
        }
        Ok(self)
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn validate_title(title: &str) -> Result<(), String> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_CHARS {
        return Err(format!("title must be 1-{} characters", MAX_TITLE_CHARS));
    }
    Ok(())
}

fn validate_note(note: &str) -> Result<(), String> {
    let len = note.chars().count();
    if len == 0 || len > MAX_NOTE_CHARS {
        return Err(format!("note must be 1-{} characters", MAX_NOTE_CHARS));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), String> {
    if tags.len() > MAX_TAGS {
        return Err(format!("at most {} tags allowed", MAX_TAGS));
    }
    Ok(())
}

/// A thread-safe idea table with optional flat-file persistence.
///
/// Backed by a `DashMap` shared through an internal `Arc`, so clones are
/// cheap handles onto the same table. Every mutation is saved to the data
/// file when one is configured.
#[derive(Clone)]
pub struct IdeaStore {
    ideas: Arc<DashMap<u64, Idea>>,
    next_id: Arc<AtomicU64>,
    data_file: Option<PathBuf>,
    // Serializes saves so concurrent mutations cannot interleave writes.
    save_lock: Arc<Mutex<()>>,
}

impl IdeaStore {
    /// Create a new empty store.
    pub fn new(data_file: Option<PathBuf>) -> Self {
        Self {
            ideas: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            data_file,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load from the data file if it exists; a missing file starts empty.
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let ideas: Vec<Idea> = serde_json::from_reader(reader)?;

            let max_id = ideas.iter().map(|i| i.id).max().unwrap_or(0);
            for idea in ideas {
                store.ideas.insert(idea.id, idea);
            }
            store.next_id.store(max_id + 1, Ordering::SeqCst);

            metrics::record_idea_count(store.ideas.len());
            tracing::info!("Loaded {} ideas from data file", store.ideas.len());
        }
        Ok(store)
    }

    /// Save the whole table to the data file as pretty JSON.
    ///
    /// Saves are serialized behind a lock, and the snapshot is written to a
    /// sibling temp file that is renamed over the target. The data file is
    /// always a complete document, even across crashes or racing mutations.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.data_file {
            let _guard = self.save_lock.lock().expect("save mutex poisoned");

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Snapshot sorted by id so the file diffs cleanly.
            let mut ideas: Vec<Idea> = self.ideas.iter().map(|r| r.value().clone()).collect();
            ideas.sort_by_key(|i| i.id);

            let staging = path.with_extension("json.tmp");
            let file = File::create(&staging)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &ideas)?;
            writer.flush()?;
            std::fs::rename(&staging, path)?;

            tracing::debug!("Saved {} ideas to data file", ideas.len());
        }
        Ok(())
    }

    /// Create an idea from a validated draft.
    pub fn create(&self, draft: IdeaDraft) -> std::io::Result<Idea> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let idea = Idea {
            id,
            title: draft.title,
            note: draft.note,
            tags: draft.tags,
            created_at: Utc::now(),
        };
        self.ideas.insert(id, idea.clone());
        self.save_to_file()?;
        metrics::record_idea_count(self.ideas.len());
        Ok(idea)
    }

    /// Apply a validated patch; `None` when the id is unknown.
    pub fn update(&self, id: u64, patch: IdeaPatch) -> std::io::Result<Option<Idea>> {
        let updated = match self.ideas.get_mut(&id) {
            Some(mut entry) => {
                let idea = entry.value_mut();
                if let Some(title) = patch.title {
                    idea.title = title;
                }
                if let Some(note) = patch.note {
                    idea.note = note;
                }
                if let Some(tags) = patch.tags {
                    idea.tags = tags;
                }
                Some(idea.clone())
            }
            None => None,
        };

        if updated.is_some() {
            self.save_to_file()?;
        }
        Ok(updated)
    }

    /// Delete an idea; `false` when the id is unknown.
    pub fn delete(&self, id: u64) -> std::io::Result<bool> {
        let removed = self.ideas.remove(&id).is_some();
        if removed {
            self.save_to_file()?;
            metrics::record_idea_count(self.ideas.len());
        }
        Ok(removed)
    }

    /// Fetch a single idea.
    pub fn get(&self, id: u64) -> Option<Idea> {
        self.ideas.get(&id).map(|r| r.value().clone())
    }

    /// List ideas newest-first with keyset pagination and substring search.
    ///
    /// `cursor` is the last id the client has seen; only older ideas are
    /// returned. `query` matches case-insensitively against title, note,
    /// and tags. `limit` is clamped to [`MAX_LIMIT`].
    pub fn list(&self, limit: Option<usize>, cursor: Option<u64>, query: Option<&str>) -> Vec<Idea> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let needle = query.map(str::to_lowercase).filter(|q| !q.is_empty());

        let mut ideas: Vec<Idea> = self
            .ideas
            .iter()
            .map(|r| r.value().clone())
            .filter(|idea| cursor.map_or(true, |c| idea.id < c))
            .filter(|idea| match &needle {
                Some(q) => {
                    idea.title.to_lowercase().contains(q)
                        || idea.note.to_lowercase().contains(q)
                        || idea.tags.iter().any(|t| t.to_lowercase().contains(q))
                }
                None => true,
            })
            .collect();

        ideas.sort_by(|a, b| b.id.cmp(&a.id));
        ideas.truncate(limit);
        ideas
    }

    /// Number of stored ideas.
    pub fn count(&self) -> usize {
        self.ideas.len()
    }

    /// Whether mutations are written to disk.
    pub fn is_persistent(&self) -> bool {
        self.data_file.is_some()
    }

    /// Check that the data file location is usable.
    pub fn probe(&self) -> std::io::Result<()> {
        if let Some(path) = &self.data_file {
            if path.exists() {
                File::open(path)?;
            } else if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Initialize the data file if absent; returns whether it already existed.
    pub fn provision(&self) -> std::io::Result<bool> {
        match &self.data_file {
            Some(path) if path.exists() => Ok(true),
            Some(_) => {
                self.save_to_file()?;
                Ok(false)
            }
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, note: &str, tags: &[&str]) -> IdeaDraft {
        IdeaDraft {
            title: title.to_string(),
            note: note.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn draft_validation_boundaries() {
        assert!(draft("a", "b", &[]).normalize_and_validate().is_ok());
        assert!(draft(&"t".repeat(100), &"n".repeat(500), &[])
            .normalize_and_validate()
            .is_ok());
        assert!(draft("", "note", &[]).normalize_and_validate().is_err());
        assert!(draft(&"t".repeat(101), "note", &[])
            .normalize_and_validate()
            .is_err());
        assert!(draft("title", &"n".repeat(501), &[])
            .normalize_and_validate()
            .is_err());
        assert!(draft("title", "note", &["a", "b", "c", "d", "e", "f"])
            .normalize_and_validate()
            .is_err());
    }

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        let parsed = draft("t", "n", &[" rust ", "", "  ", "web"])
            .normalize_and_validate()
            .unwrap();
        assert_eq!(parsed.tags, vec!["rust", "web"]);

        // six raw tags collapse below the ceiling after cleanup
        let parsed = draft("t", "n", &["a", "", "b", " ", "c", "d"])
            .normalize_and_validate()
            .unwrap();
        assert_eq!(parsed.tags.len(), 4);
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let patch = IdeaPatch {
            title: None,
            note: None,
            tags: Some(vec![" one ".to_string()]),
        };
        let patch = patch.normalize_and_validate().unwrap();
        assert_eq!(patch.tags, Some(vec!["one".to_string()]));

        let bad = IdeaPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(bad.normalize_and_validate().is_err());
    }

    #[test]
    fn crud_round_trip() {
        let store = IdeaStore::new(None);
        let idea = store.create(draft("First", "note", &["tag"])).unwrap();
        assert_eq!(idea.id, 1);
        assert_eq!(store.count(), 1);

        let updated = store
            .update(
                idea.id,
                IdeaPatch {
                    note: Some("edited".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.note, "edited");
        assert_eq!(updated.title, "First");

        assert!(store
            .update(999, IdeaPatch::default())
            .unwrap()
            .is_none());

        assert!(store.delete(idea.id).unwrap());
        assert!(!store.delete(idea.id).unwrap());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn list_is_newest_first_with_cursor() {
        let store = IdeaStore::new(None);
        for i in 1..=5 {
            store.create(draft(&format!("idea {}", i), "n", &[])).unwrap();
        }

        let page = store.list(Some(2), None, None);
        let ids: Vec<u64> = page.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![5, 4]);

        let next = store.list(Some(2), Some(4), None);
        let ids: Vec<u64> = next.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn list_clamps_limit() {
        let store = IdeaStore::new(None);
        for i in 0..60 {
            store.create(draft(&format!("idea {}", i), "n", &[])).unwrap();
        }
        assert_eq!(store.list(Some(200), None, None).len(), MAX_LIMIT);
        assert_eq!(store.list(None, None, None).len(), DEFAULT_LIMIT);
    }

    #[test]
    fn substring_search_covers_all_fields() {
        let store = IdeaStore::new(None);
        store.create(draft("Rust weekend", "a note", &[])).unwrap();
        store.create(draft("Garden", "plant RUSTY tools", &[])).unwrap();
        store.create(draft("Other", "nothing", &["trusted"])).unwrap();

        let hits = store.list(None, None, Some("rust"));
        assert_eq!(hits.len(), 3);

        let hits = store.list(None, None, Some("garden"));
        assert_eq!(hits.len(), 1);

        assert_eq!(store.list(None, None, Some("zzz")).len(), 0);
    }

    #[test]
    fn persistence_round_trip() {
        let path = std::env::temp_dir().join(format!("ideas-test-{}.json", uuid::Uuid::new_v4()));

        let store = IdeaStore::new(Some(path.clone()));
        store.create(draft("persisted", "note", &["disk"])).unwrap();

        let loaded = IdeaStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.count(), 1);
        let idea = loaded.list(None, None, None).remove(0);
        assert_eq!(idea.title, "persisted");
        assert_eq!(idea.tags, vec!["disk"]);

        // id allocation continues past the highest stored id
        let next = loaded.create(draft("second", "note", &[])).unwrap();
        assert_eq!(next.id, 2);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn concurrent_creates_never_tear_the_file() {
        let path = std::env::temp_dir().join(format!("ideas-race-{}.json", uuid::Uuid::new_v4()));
        let store = IdeaStore::new(Some(path.clone()));

        std::thread::scope(|scope| {
            for t in 0..8 {
                let store = store.clone();
                scope.spawn(move || {
                    for i in 0..5 {
                        store
                            .create(draft(&format!("idea {}-{}", t, i), "n", &[]))
                            .unwrap();
                    }
                });
            }
        });

        // every interleaving must leave a complete, parseable snapshot
        let reloaded = IdeaStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.count(), 40);

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn missing_file_starts_empty() {
        let path = std::env::temp_dir().join(format!("ideas-missing-{}.json", uuid::Uuid::new_v4()));
        let store = IdeaStore::load_from_file(&path).unwrap();
        assert_eq!(store.count(), 0);
        assert!(store.is_persistent());
    }

    #[test]
    fn provision_reports_existing_file() {
        let path = std::env::temp_dir().join(format!("ideas-prov-{}.json", uuid::Uuid::new_v4()));
        let store = IdeaStore::new(Some(path.clone()));

        assert!(!store.provision().unwrap());
        assert!(path.exists());
        assert!(store.provision().unwrap());

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
