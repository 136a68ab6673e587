//! Data models for Hanyu
//!
//! Defines the records persisted through the synchronized stores: quiz
//! results, memory-game attempts, bookmarks, notes, folders, and the
//! "continue learning" progress pointer.
//!
//! Record identity is an opaque string assigned by the writer at creation
//! time, never by the backing store, so identifiers are comparable across
//! devices and backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque record identifier, unique within its collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A location in the course: level file, chapter, topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseRef {
    pub level: u8,
    pub chapter: u8,
    pub topic: u8,
}

impl CourseRef {
    pub fn new(level: u8, chapter: u8, topic: u8) -> Self {
        Self {
            level,
            chapter,
            topic,
        }
    }
}

/// Immutable, denormalized copy of a vocabulary entry
///
/// Embedded inside result and attempt records so historical data stays
/// viewable even if the canonical vocabulary content changes or is
/// unavailable offline. Snapshots are display-only and are never
/// re-resolved against live content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabSnapshot {
    pub id: String,
    pub word: String,
    pub pinyin: String,
}

impl VocabSnapshot {
    pub fn new(
        id: impl Into<String>,
        word: impl Into<String>,
        pinyin: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            word: word.into(),
            pinyin: pinyin.into(),
        }
    }
}

/// Result of one completed quiz attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    pub correct: u32,
    pub total: u32,
    pub context_title: String,
    pub course: Option<CourseRef>,
    pub folder: Option<RecordId>,
    pub vocab: Vec<VocabSnapshot>,
    pub answers: Vec<String>,
}

impl QuizResult {
    /// Create a result, enforcing the record invariants
    ///
    /// `correct` is clamped to `total`, and `vocab`/`answers` are trimmed
    /// to equal length.
    pub fn new(
        correct: u32,
        total: u32,
        context_title: impl Into<String>,
        mut vocab: Vec<VocabSnapshot>,
        mut answers: Vec<String>,
    ) -> Self {
        let len = vocab.len().min(answers.len());
        vocab.truncate(len);
        answers.truncate(len);
        Self {
            id: RecordId::new(),
            date: Utc::now(),
            correct: correct.min(total),
            total,
            context_title: context_title.into(),
            course: None,
            folder: None,
            vocab,
            answers,
        }
    }

    /// Attach the course location this quiz was taken in
    pub fn with_course(mut self, course: CourseRef) -> Self {
        self.course = Some(course);
        self
    }

    /// Attach the custom folder this quiz was drawn from
    pub fn with_folder(mut self, folder: RecordId) -> Self {
        self.folder = Some(folder);
        self
    }

    /// Score as a percentage, 0 for an empty quiz
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total) * 100.0
    }

    /// Letter grade for this result
    pub fn grade(&self) -> &'static str {
        grade_for(self.percent())
    }
}

/// Map a percent score onto the fixed grade bands
pub fn grade_for(percent: f64) -> &'static str {
    match percent {
        p if p >= 75.0 => "A1",
        p if p >= 70.0 => "A2",
        p if p >= 65.0 => "B3",
        p if p >= 60.0 => "B4",
        p if p >= 55.0 => "C5",
        p if p >= 50.0 => "C6",
        p if p >= 45.0 => "D7",
        p if p >= 40.0 => "E8",
        _ => "F9",
    }
}

/// Result of one completed memory-matching round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryAttempt {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    pub tries: u32,
    pub context_title: String,
    pub course: Option<CourseRef>,
    pub folder: Option<RecordId>,
    pub vocab: Vec<VocabSnapshot>,
}

impl MemoryAttempt {
    pub fn new(tries: u32, context_title: impl Into<String>, vocab: Vec<VocabSnapshot>) -> Self {
        Self {
            id: RecordId::new(),
            date: Utc::now(),
            tries,
            context_title: context_title.into(),
            course: None,
            folder: None,
            vocab,
        }
    }

    pub fn with_course(mut self, course: CourseRef) -> Self {
        self.course = Some(course);
        self
    }

    pub fn with_folder(mut self, folder: RecordId) -> Self {
        self.folder = Some(folder);
        self
    }
}

/// A bookmarked vocabulary entry
///
/// Equivalence for duplicate suppression is `(word, course)`, not `id`:
/// toggling from the flashcard UI must find an existing equivalent
/// bookmark regardless of which device created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: RecordId,
    pub vocab: VocabSnapshot,
    pub course: CourseRef,
    /// Display name of the topic, refreshable from the course catalog
    pub topic_name: String,
    /// Flashcard position to resume at within the topic
    pub resume_index: usize,
}

impl Bookmark {
    pub fn new(vocab: VocabSnapshot, course: CourseRef, topic_name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            vocab,
            course,
            topic_name: topic_name.into(),
            resume_index: 0,
        }
    }

    /// Whether this bookmark refers to the same word at the same location
    pub fn matches(&self, word: &str, course: CourseRef) -> bool {
        self.vocab.word == word && self.course == course
    }
}

/// Body of a note: typed text or a freehand drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "noteType", rename_all = "lowercase")]
pub enum NoteContent {
    Text { content: String },
    Drawing { drawing: Vec<u8> },
}

/// A notepad entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: RecordId,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub body: NoteContent,
}

impl NoteRecord {
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            title: title.into(),
            date: Utc::now(),
            body: NoteContent::Text {
                content: content.into(),
            },
        }
    }

    pub fn drawing(title: impl Into<String>, drawing: Vec<u8>) -> Self {
        Self {
            id: RecordId::new(),
            title: title.into(),
            date: Utc::now(),
            body: NoteContent::Drawing { drawing },
        }
    }
}

/// A user-defined vocabulary folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: RecordId,
    pub name: String,
    pub vocab: Vec<VocabSnapshot>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            name: name.into(),
            vocab: Vec::new(),
        }
    }
}

/// The single "continue learning" cursor
///
/// A singleton, not a collection: stored remotely as a structured
/// sub-object with explicit fields rather than an encoded blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPointer {
    pub level: u8,
    pub chapter: u8,
    pub topic: u8,
    #[serde(rename = "currentIndex")]
    pub current_index: usize,
}

impl ProgressPointer {
    pub fn new(course: CourseRef, current_index: usize) -> Self {
        Self {
            level: course.level,
            chapter: course.chapter,
            topic: course.topic,
            current_index,
        }
    }

    pub fn course(&self) -> CourseRef {
        CourseRef::new(self.level, self.chapter, self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn test_quiz_result_percent() {
        let result = QuizResult::new(8, 10, "HSK 1", Vec::new(), Vec::new());
        assert_eq!(result.percent(), 80.0);
        assert_eq!(result.grade(), "A1");
    }

    #[test]
    fn test_quiz_result_empty_total() {
        let result = QuizResult::new(0, 0, "empty", Vec::new(), Vec::new());
        assert_eq!(result.percent(), 0.0);
        assert_eq!(result.grade(), "F9");
    }

    #[test]
    fn test_quiz_result_clamps_correct() {
        let result = QuizResult::new(12, 10, "clamped", Vec::new(), Vec::new());
        assert_eq!(result.correct, 10);
        assert_eq!(result.percent(), 100.0);
    }

    #[test]
    fn test_quiz_result_trims_answers() {
        let vocab = vec![
            VocabSnapshot::new("1", "你好", "nǐ hǎo"),
            VocabSnapshot::new("2", "谢谢", "xiè xiè"),
        ];
        let answers = vec!["你好".to_string()];
        let result = QuizResult::new(1, 2, "trim", vocab, answers);
        assert_eq!(result.vocab.len(), result.answers.len());
        assert_eq!(result.vocab.len(), 1);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(grade_for(100.0), "A1");
        assert_eq!(grade_for(75.0), "A1");
        assert_eq!(grade_for(74.9), "A2");
        assert_eq!(grade_for(70.0), "A2");
        assert_eq!(grade_for(65.0), "B3");
        assert_eq!(grade_for(60.0), "B4");
        assert_eq!(grade_for(55.0), "C5");
        assert_eq!(grade_for(50.0), "C6");
        assert_eq!(grade_for(45.0), "D7");
        assert_eq!(grade_for(40.0), "E8");
        assert_eq!(grade_for(39.9), "F9");
        assert_eq!(grade_for(0.0), "F9");
    }

    #[test]
    fn test_bookmark_matches_by_word_and_course() {
        let course = CourseRef::new(1, 1, 1);
        let bookmark = Bookmark::new(VocabSnapshot::new("1", "你好", "nǐ hǎo"), course, "Greetings");

        assert!(bookmark.matches("你好", course));
        assert!(!bookmark.matches("谢谢", course));
        assert!(!bookmark.matches("你好", CourseRef::new(1, 1, 2)));
    }

    #[test]
    fn test_note_content_serialization() {
        let note = NoteRecord::text("Shopping", "买东西");
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"noteType\":\"text\""));

        let parsed: NoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, note);

        let sketch = NoteRecord::drawing("Strokes", vec![1, 2, 3]);
        let json = serde_json::to_string(&sketch).unwrap();
        let parsed: NoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sketch);
    }

    #[test]
    fn test_progress_pointer_round_trip() {
        let pointer = ProgressPointer::new(CourseRef::new(2, 3, 1), 14);
        let json = serde_json::to_value(&pointer).unwrap();
        assert_eq!(json["currentIndex"], 14);

        let parsed: ProgressPointer = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, pointer);
        assert_eq!(parsed.course(), CourseRef::new(2, 3, 1));
    }
}
