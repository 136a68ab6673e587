//! Bookmarked vocabulary
//!
//! A synchronized store specialization with duplicate suppression:
//! equivalence is `(word, course)`, not record id, because ids are
//! assigned per device at creation time. Toggling from the flashcard UI
//! checks for an equivalent bookmark before inserting and removes by
//! equivalence when un-bookmarking.

use std::sync::Arc;

use crate::catalog::CourseCatalog;
use crate::identity::IdentityResolver;
use crate::models::{Bookmark, CourseRef, RecordId, VocabSnapshot};
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;
use crate::store::{Record, StoreName, SyncedStore};

const BOOKMARKS: StoreName = StoreName {
    cache_key: "bookmarks",
    remote_field: "bookmarks",
};

impl Record for Bookmark {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// The bookmark collection
pub struct BookmarkStore {
    inner: SyncedStore<Bookmark>,
}

impl BookmarkStore {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            inner: SyncedStore::new(BOOKMARKS, cache, remote, identity),
        }
    }

    pub async fn load(&mut self) {
        self.inner.load().await;
    }

    /// Toggle the bookmark for a word at a course location
    ///
    /// Returns `true` when the word is now bookmarked. Adding an
    /// equivalent bookmark twice never grows the collection.
    pub fn toggle(
        &mut self,
        vocab: VocabSnapshot,
        course: CourseRef,
        topic_name: &str,
    ) -> bool {
        if self.contains(&vocab.word, course) {
            self.remove(&vocab.word, course);
            false
        } else {
            let bookmark = Bookmark::new(vocab, course, topic_name);
            self.inner.mutate(|records| {
                // Re-check inside the transform so two rapid toggles
                // cannot both insert
                if !records.iter().any(|b| b.matches(&bookmark.vocab.word, course)) {
                    records.push(bookmark);
                }
            });
            true
        }
    }

    /// Whether an equivalent bookmark exists
    pub fn contains(&self, word: &str, course: CourseRef) -> bool {
        self.inner.records().iter().any(|b| b.matches(word, course))
    }

    /// Remove by equivalence, not by id
    pub fn remove(&mut self, word: &str, course: CourseRef) {
        let word = word.to_string();
        self.inner
            .mutate(|records| records.retain(|b| !b.matches(&word, course)));
    }

    /// Record the flashcard position to resume at
    pub fn set_resume_index(&mut self, id: &RecordId, resume_index: usize) {
        let id = id.clone();
        self.inner.mutate(|records| {
            if let Some(bookmark) = records.iter_mut().find(|b| b.id == id) {
                bookmark.resume_index = resume_index;
            }
        });
    }

    /// Refresh topic display names from the catalog
    ///
    /// A single, externally-triggered pass. It never reschedules itself;
    /// callers that want periodic refresh own their own scheduler.
    pub fn refresh(&mut self, catalog: &CourseCatalog) {
        let names: Vec<Option<String>> = self
            .inner
            .records()
            .iter()
            .map(|b| catalog.topic_name(b.course).map(str::to_string))
            .collect();

        self.inner.mutate(|records| {
            for (bookmark, name) in records.iter_mut().zip(names) {
                if let Some(name) = name {
                    bookmark.topic_name = name;
                }
            }
        });
    }

    pub fn records(&self) -> &[Bookmark] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
