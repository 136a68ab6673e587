//! Course catalog and vocabulary content access
//!
//! The catalog is a data table mapping `(level, chapter, topic)` to
//! display names, loaded from a structured JSON resource shipped with
//! the app. It replaces per-platform switch tables so names live in one
//! place.
//!
//! Vocabulary content itself is an external, read-only collaborator:
//! the core looks entries up through [`VocabSource`] and embeds
//! [`VocabSnapshot`](crate::models::VocabSnapshot) copies into records,
//! never references.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::{CourseRef, VocabSnapshot};

/// A canonical vocabulary entry from the content source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VocabEntry {
    pub id: String,
    pub word: String,
    pub pinyin: String,
}

impl VocabEntry {
    /// Denormalized copy for embedding into records
    pub fn snapshot(&self) -> VocabSnapshot {
        VocabSnapshot::new(&self.id, &self.word, &self.pinyin)
    }
}

/// Read-only lookup into the vocabulary content
///
/// Keyed by course location; `None` when the location does not exist.
/// The core never mutates the content.
pub trait VocabSource: Send + Sync {
    fn entries(&self, course: CourseRef) -> Option<Vec<VocabEntry>>;
}

#[derive(Debug, Deserialize)]
struct TopicEntry {
    topic: u8,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChapterEntry {
    chapter: u8,
    name: String,
    topics: Vec<TopicEntry>,
}

#[derive(Debug, Deserialize)]
struct LevelEntry {
    level: u8,
    name: String,
    chapters: Vec<ChapterEntry>,
}

/// Display names for every level, chapter, and topic
#[derive(Debug, Deserialize)]
pub struct CourseCatalog {
    levels: Vec<LevelEntry>,
}

impl CourseCatalog {
    /// Parse a catalog from its JSON resource
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse course catalog")
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read course catalog: {:?}", path))?;
        Self::from_json(&content)
    }

    pub fn level_name(&self, level: u8) -> Option<&str> {
        self.level_entry(level).map(|l| l.name.as_str())
    }

    pub fn chapter_name(&self, level: u8, chapter: u8) -> Option<&str> {
        self.chapter_entry(level, chapter).map(|c| c.name.as_str())
    }

    pub fn topic_name(&self, course: CourseRef) -> Option<&str> {
        self.chapter_entry(course.level, course.chapter)?
            .topics
            .iter()
            .find(|t| t.topic == course.topic)
            .map(|t| t.name.as_str())
    }

    /// "Level · Chapter · Topic" title for result records
    pub fn context_title(&self, course: CourseRef) -> Option<String> {
        Some(format!(
            "{} · {} · {}",
            self.level_name(course.level)?,
            self.chapter_name(course.level, course.chapter)?,
            self.topic_name(course)?
        ))
    }

    fn level_entry(&self, level: u8) -> Option<&LevelEntry> {
        self.levels.iter().find(|l| l.level == level)
    }

    fn chapter_entry(&self, level: u8, chapter: u8) -> Option<&ChapterEntry> {
        self.level_entry(level)?
            .chapters
            .iter()
            .find(|c| c.chapter == chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "levels": [
            {
                "level": 1,
                "name": "HSK 1",
                "chapters": [
                    {
                        "chapter": 1,
                        "name": "Basics",
                        "topics": [
                            { "topic": 1, "name": "Greetings" },
                            { "topic": 2, "name": "Numbers" }
                        ]
                    }
                ]
            },
            {
                "level": 2,
                "name": "HSK 2",
                "chapters": []
            }
        ]
    }"#;

    #[test]
    fn test_lookup_names() {
        let catalog = CourseCatalog::from_json(CATALOG_JSON).unwrap();

        assert_eq!(catalog.level_name(1), Some("HSK 1"));
        assert_eq!(catalog.chapter_name(1, 1), Some("Basics"));
        assert_eq!(
            catalog.topic_name(CourseRef::new(1, 1, 2)),
            Some("Numbers")
        );
    }

    #[test]
    fn test_unknown_location_is_none() {
        let catalog = CourseCatalog::from_json(CATALOG_JSON).unwrap();

        assert_eq!(catalog.level_name(9), None);
        assert_eq!(catalog.chapter_name(2, 1), None);
        assert_eq!(catalog.topic_name(CourseRef::new(1, 1, 9)), None);
    }

    #[test]
    fn test_context_title() {
        let catalog = CourseCatalog::from_json(CATALOG_JSON).unwrap();

        assert_eq!(
            catalog.context_title(CourseRef::new(1, 1, 1)).unwrap(),
            "HSK 1 · Basics · Greetings"
        );
        assert!(catalog.context_title(CourseRef::new(2, 1, 1)).is_none());
    }

    #[test]
    fn test_malformed_catalog_is_an_error() {
        assert!(CourseCatalog::from_json("{\"levels\": 3}").is_err());
    }

    #[test]
    fn test_vocab_entry_snapshot() {
        let entry = VocabEntry {
            id: "w-1".to_string(),
            word: "你好".to_string(),
            pinyin: "nǐ hǎo".to_string(),
        };

        let snapshot = entry.snapshot();
        assert_eq!(snapshot.word, "你好");
        assert_eq!(snapshot.pinyin, "nǐ hǎo");
    }
}
