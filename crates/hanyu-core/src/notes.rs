//! Notepad entries
//!
//! A thin wrapper over the synchronized store: notes are plain records
//! with no dedup rules, ordered newest first for display.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::identity::IdentityResolver;
use crate::models::{NoteContent, NoteRecord, RecordId};
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;
use crate::store::{Record, StoreName, SyncedStore};

const NOTES: StoreName = StoreName {
    cache_key: "notes",
    remote_field: "notes",
};

impl Record for NoteRecord {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }
}

/// The notepad collection
pub struct NoteStore {
    inner: SyncedStore<NoteRecord>,
}

impl NoteStore {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            inner: SyncedStore::new(NOTES, cache, remote, identity),
        }
    }

    pub async fn load(&mut self) {
        self.inner.load().await;
    }

    /// Save a text note, returning its id
    pub fn add_text(&mut self, title: impl Into<String>, content: impl Into<String>) -> RecordId {
        let note = NoteRecord::text(title, content);
        let id = note.id.clone();
        self.inner.mutate(|records| records.push(note));
        id
    }

    /// Save a drawing note, returning its id
    pub fn add_drawing(&mut self, title: impl Into<String>, drawing: Vec<u8>) -> RecordId {
        let note = NoteRecord::drawing(title, drawing);
        let id = note.id.clone();
        self.inner.mutate(|records| records.push(note));
        id
    }

    /// Replace the title and body of an existing note
    pub fn update(&mut self, id: &RecordId, title: impl Into<String>, body: NoteContent) {
        let id = id.clone();
        let title = title.into();
        self.inner.mutate(|records| {
            if let Some(note) = records.iter_mut().find(|n| n.id == id) {
                note.title = title;
                note.body = body;
                note.date = Utc::now();
            }
        });
    }

    pub fn delete(&mut self, id: &RecordId) {
        self.inner.delete(id);
    }

    pub fn get(&self, id: &RecordId) -> Option<&NoteRecord> {
        self.inner.get(id)
    }

    pub fn records(&self) -> &[NoteRecord] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::storage::FileCache;
    use crate::testutil::MemoryRemote;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> NoteStore {
        NoteStore::new(
            Arc::new(FileCache::new(temp_dir.path())),
            Arc::new(MemoryRemote::new()),
            Arc::new(IdentityResolver::new(Arc::new(FixedIdentity::guest()))),
        )
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut notes = store(&temp_dir);
        notes.load().await;

        let id = notes.add_text("Shopping", "买东西");

        let note = notes.get(&id).unwrap();
        assert_eq!(note.title, "Shopping");
        assert_eq!(
            note.body,
            NoteContent::Text {
                content: "买东西".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update() {
        let temp_dir = TempDir::new().unwrap();
        let mut notes = store(&temp_dir);
        notes.load().await;

        let id = notes.add_text("Draft", "first");
        notes.update(
            &id,
            "Final",
            NoteContent::Text {
                content: "second".to_string(),
            },
        );

        let note = notes.get(&id).unwrap();
        assert_eq!(note.title, "Final");
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let mut notes = store(&temp_dir);
        notes.load().await;

        let id = notes.add_drawing("Strokes", vec![0x1, 0x2]);
        assert_eq!(notes.len(), 1);

        notes.delete(&id);
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reload() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut notes = store(&temp_dir);
            notes.load().await;
            notes.add_text("Kept", "content");
        }

        let mut reopened = store(&temp_dir);
        reopened.load().await;
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.records()[0].title, "Kept");
    }
}
