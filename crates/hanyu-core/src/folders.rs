//! Custom vocabulary folders
//!
//! User-curated collections of vocabulary snapshots, used as quiz and
//! memory-game sources. Within a folder, entries are deduplicated by
//! vocabulary id.

use std::sync::Arc;

use crate::identity::IdentityResolver;
use crate::models::{Folder, RecordId, VocabSnapshot};
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;
use crate::store::{Record, StoreName, SyncedStore};

const FOLDERS: StoreName = StoreName {
    cache_key: "customFolders",
    remote_field: "customFolders",
};

impl Record for Folder {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// The custom folder collection
pub struct FolderStore {
    inner: SyncedStore<Folder>,
}

impl FolderStore {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            inner: SyncedStore::new(FOLDERS, cache, remote, identity),
        }
    }

    pub async fn load(&mut self) {
        self.inner.load().await;
    }

    /// Create a folder, returning its id
    pub fn create(&mut self, name: impl Into<String>) -> RecordId {
        let folder = Folder::new(name);
        let id = folder.id.clone();
        self.inner.mutate(|records| records.push(folder));
        id
    }

    pub fn rename(&mut self, id: &RecordId, name: impl Into<String>) {
        let id = id.clone();
        let name = name.into();
        self.inner.mutate(|records| {
            if let Some(folder) = records.iter_mut().find(|f| f.id == id) {
                folder.name = name;
            }
        });
    }

    /// Add a vocabulary snapshot to a folder; duplicates by vocabulary
    /// id are ignored
    pub fn add_vocab(&mut self, id: &RecordId, vocab: VocabSnapshot) {
        let id = id.clone();
        self.inner.mutate(|records| {
            if let Some(folder) = records.iter_mut().find(|f| f.id == id) {
                if !folder.vocab.iter().any(|v| v.id == vocab.id) {
                    folder.vocab.push(vocab);
                }
            }
        });
    }

    pub fn remove_vocab(&mut self, id: &RecordId, vocab_id: &str) {
        let id = id.clone();
        let vocab_id = vocab_id.to_string();
        self.inner.mutate(|records| {
            if let Some(folder) = records.iter_mut().find(|f| f.id == id) {
                folder.vocab.retain(|v| v.id != vocab_id);
            }
        });
    }

    pub fn delete(&mut self, id: &RecordId) {
        self.inner.delete(id);
    }

    pub fn get(&self, id: &RecordId) -> Option<&Folder> {
        self.inner.get(id)
    }

    pub fn records(&self) -> &[Folder] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
