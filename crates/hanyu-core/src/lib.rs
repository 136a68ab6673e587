//! Hanyu Core Library
//!
//! Core functionality for Hanyu, a local-first Mandarin study
//! companion: every stateful feature (quiz scores, bookmarks, notes,
//! memory-game attempts, custom folders, the "continue learning"
//! pointer) is backed by one synchronized local-first store.
//!
//! # Architecture
//!
//! - **In-memory collection**: single source of truth for the UI
//! - **Local cache**: synchronous blob persistence, always consistent
//!   with memory after a mutation
//! - **Remote document**: one per user, reconciled best-effort and
//!   fire-and-forget; remote truth wins on cold start
//!
//! # Quick Start
//!
//! ```text
//! let identity = Arc::new(IdentityResolver::new(provider));
//! let cache = Arc::new(FileCache::new(config.cache_dir()));
//! let remote = Arc::new(HttpRemote::new(url));
//!
//! let mut bookmarks = BookmarkStore::new(cache, remote, identity);
//! bookmarks.load().await;
//! bookmarks.toggle(snapshot, course, "Greetings");
//! ```
//!
//! # Modules
//!
//! - `store`: the generalized synchronized store
//! - `models`: record types shared across features
//! - `identity`: per-user key resolution
//! - `storage`: local cache primitives
//! - `remote`: remote document store access
//! - `bookmarks`, `notes`, `folders`, `progress`: feature stores
//! - `quiz`: quiz resume state machine and scoring
//! - `stats`: streak and chart-bucket aggregation
//! - `memory`: memory-matching game loop
//! - `catalog`: course names and vocabulary lookup
//! - `config`: application configuration

pub mod bookmarks;
pub mod catalog;
pub mod config;
pub mod folders;
pub mod identity;
pub mod memory;
pub mod models;
pub mod notes;
pub mod progress;
pub mod quiz;
pub mod remote;
pub mod stats;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use bookmarks::BookmarkStore;
pub use catalog::{CourseCatalog, VocabEntry, VocabSource};
pub use config::Config;
pub use folders::FolderStore;
pub use identity::{FixedIdentity, IdentityProvider, IdentityResolver, UserKey};
pub use memory::{GamePhase, GuessOutcome, MemoryCard, MemoryGame, MemoryScoreStore};
pub use models::{
    Bookmark, CourseRef, Folder, MemoryAttempt, NoteContent, NoteRecord, ProgressPointer,
    QuizResult, RecordId, VocabSnapshot,
};
pub use notes::NoteStore;
pub use progress::ProgressStore;
pub use quiz::{AnswerOutcome, QuizContext, QuizPhase, QuizQuestion, QuizSession, TopicQuizState};
pub use remote::{HttpRemote, RemoteDocuments, RemoteError};
pub use stats::{bucketize, streak_days, Bucket, Granularity, Sample};
pub use storage::{FileCache, LocalCache, StorageError, StorageResult};
pub use store::{Record, StoreName, SyncedStore};
