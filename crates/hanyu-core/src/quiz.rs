//! Multiple-choice quiz sessions and scoring
//!
//! A topic's quiz attempt is a `TopicQuizState` persisted through the
//! synchronized store so the user can leave mid-quiz and resume on the
//! same question, on any device. The state machine is
//! `NotStarted -> InProgress(left_off_index) -> Completed`:
//!
//! - answering question `i == left_off_index` records the selection and
//!   advances the pointer;
//! - answering `i < left_off_index` (navigating back) only re-displays
//!   the recorded answer;
//! - reaching `left_off_index == questions.len()` scores the attempt,
//!   appends a `QuizResult`, and deletes the state — a fresh attempt on
//!   the same topic starts over.
//!
//! Requesting a quiz for a topic with an in-progress state returns that
//! state unchanged; only a fully completed leftover is replaced. Inserts
//! deduplicate by topic key so there are never two live states for one
//! topic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identity::IdentityResolver;
use crate::models::{CourseRef, QuizResult, RecordId, VocabSnapshot};
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;
use crate::store::{Record, StoreName, SyncedStore};

const QUIZ_STATES: StoreName = StoreName {
    cache_key: "topic_quiz_states",
    remote_field: "quizStates",
};

const QUIZ_RESULTS: StoreName = StoreName {
    cache_key: "quiz_results_v2",
    remote_field: "scores",
};

/// One question in a quiz attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: String,
    /// Empty until answered
    pub selected_option: String,
}

impl QuizQuestion {
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            correct_option: correct_option.into(),
            selected_option: String::new(),
        }
    }

    /// Answered and not the correct option
    pub fn is_wrong(&self) -> bool {
        !self.selected_option.is_empty() && self.selected_option != self.correct_option
    }
}

/// Where a quiz attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    /// Next unanswered question index
    InProgress(usize),
    Completed,
}

/// Persisted resume state for one topic's quiz attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicQuizState {
    pub id: RecordId,
    pub topic_key: String,
    pub left_off_index: usize,
    pub questions: Vec<QuizQuestion>,
}

impl TopicQuizState {
    pub fn new(topic_key: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        Self {
            id: RecordId::new(),
            topic_key: topic_key.into(),
            left_off_index: 0,
            questions,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.left_off_index >= self.questions.len()
    }

    pub fn phase(&self) -> QuizPhase {
        if self.is_completed() {
            QuizPhase::Completed
        } else if self.left_off_index == 0 {
            QuizPhase::NotStarted
        } else {
            QuizPhase::InProgress(self.left_off_index)
        }
    }
}

impl Record for TopicQuizState {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for QuizResult {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }
}

/// Display context carried into the result on completion
#[derive(Debug, Clone)]
pub struct QuizContext {
    pub title: String,
    pub course: Option<CourseRef>,
    pub folder: Option<RecordId>,
    /// Snapshots of the quizzed vocabulary, one per question
    pub vocab: Vec<VocabSnapshot>,
}

/// What happened to an answer
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// Selection recorded, pointer advanced
    Recorded { next_index: usize },
    /// Navigated back; the previously recorded answer, unchanged
    Revisited { previous: String },
    /// Last question answered; attempt scored and the state deleted
    Completed(QuizResult),
    /// No live state for this topic
    NoSession,
    /// Question index out of range or ahead of the pointer
    OutOfRange,
}

/// Quiz resume states plus the scored-results collection
pub struct QuizSession {
    states: SyncedStore<TopicQuizState>,
    results: SyncedStore<QuizResult>,
}

impl QuizSession {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            states: SyncedStore::new(
                QUIZ_STATES,
                Arc::clone(&cache),
                Arc::clone(&remote),
                Arc::clone(&identity),
            ),
            results: SyncedStore::new(QUIZ_RESULTS, cache, remote, identity),
        }
    }

    pub async fn load(&mut self) {
        self.states.load().await;
        self.results.load().await;
    }

    /// Return the live state for a topic, building a fresh one when
    /// there is none or the previous attempt was fully completed
    ///
    /// Idempotent for an in-progress topic: the existing state comes
    /// back unchanged and `build` is not called.
    pub fn start_or_resume<F>(&mut self, topic_key: &str, build: F) -> TopicQuizState
    where
        F: FnOnce() -> Vec<QuizQuestion>,
    {
        if let Some(existing) = self
            .states
            .records()
            .iter()
            .find(|s| s.topic_key == topic_key && !s.is_completed())
        {
            debug!(topic_key, left_off = existing.left_off_index, "resuming quiz");
            return existing.clone();
        }

        let state = TopicQuizState::new(topic_key, build());
        let fresh = state.clone();
        let key = topic_key.to_string();
        self.states.mutate(|records| {
            // One live state per topic key
            records.retain(|s| s.topic_key != key);
            records.push(state);
        });
        fresh
    }

    /// Answer question `index` of a topic's live quiz
    pub fn answer(
        &mut self,
        topic_key: &str,
        index: usize,
        selection: &str,
        context: &QuizContext,
    ) -> AnswerOutcome {
        let Some(mut state) = self
            .states
            .records()
            .iter()
            .find(|s| s.topic_key == topic_key)
            .cloned()
        else {
            return AnswerOutcome::NoSession;
        };

        if index >= state.questions.len() || index > state.left_off_index {
            return AnswerOutcome::OutOfRange;
        }

        if index < state.left_off_index {
            // Back navigation re-displays without advancing
            return AnswerOutcome::Revisited {
                previous: state.questions[index].selected_option.clone(),
            };
        }

        state.questions[index].selected_option = selection.to_string();
        state.left_off_index += 1;

        if state.is_completed() {
            let result = self.complete(&state, context);
            return AnswerOutcome::Completed(result);
        }

        let next_index = state.left_off_index;
        let id = state.id.clone();
        self.states.mutate(|records| {
            if let Some(stored) = records.iter_mut().find(|s| s.id == id) {
                *stored = state;
            }
        });
        AnswerOutcome::Recorded { next_index }
    }

    /// Score the finished attempt, record the result, drop the state
    fn complete(&mut self, state: &TopicQuizState, context: &QuizContext) -> QuizResult {
        let (correct, total) = score(&state.questions);
        let answers = state
            .questions
            .iter()
            .map(|q| q.selected_option.clone())
            .collect();

        let mut result = QuizResult::new(
            correct,
            total,
            context.title.clone(),
            context.vocab.clone(),
            answers,
        );
        if let Some(course) = context.course {
            result = result.with_course(course);
        }
        if let Some(folder) = &context.folder {
            result = result.with_folder(folder.clone());
        }

        self.states.delete(&state.id);
        let stored = result.clone();
        self.results.mutate(|records| records.push(stored));
        result
    }

    /// The live state for a topic, if any
    pub fn state(&self, topic_key: &str) -> Option<&TopicQuizState> {
        self.states
            .records()
            .iter()
            .find(|s| s.topic_key == topic_key)
    }

    /// Scored results, newest first
    pub fn results(&self) -> &[QuizResult] {
        self.results.records()
    }

    /// Delete a result (swipe-to-delete)
    pub fn delete_result(&mut self, id: &RecordId) {
        self.results.delete(id);
    }

    pub fn delete_results(&mut self, ids: &[RecordId]) {
        self.results.delete_all(ids);
    }
}

/// Score a completed question list
///
/// Wrong means answered with something other than the correct option;
/// everything else counts toward `correct`.
fn score(questions: &[QuizQuestion]) -> (u32, u32) {
    let total = questions.len() as u32;
    let wrong = questions.iter().filter(|q| q.is_wrong()).count() as u32;
    (total - wrong, total)
}
