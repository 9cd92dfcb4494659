//! Quiz content and validation
//!
//! This module defines the authored content of a game: a titled, ordered
//! sequence of timed questions. A quiz is deep-copied into a session when
//! the session is created, so a running game is immune to concurrent edits
//! of the quiz it was launched from. Players only ever see a redacted view
//! of a question that never carries the answer key.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::constants;

type ValidationResult = garde::Result;

/// Validates that an answering window falls within the configured bounds
fn validate_duration(val: &Duration) -> ValidationResult {
    let (min, max) = (
        constants::question::MIN_DURATION,
        constants::question::MAX_DURATION,
    );
    if (min..=max).contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "duration is outside of the bounds [{min},{max}]",
        )))
    }
}

/// Validates the four answer slots of a choice question
fn validate_answer_slots(slots: &[String; constants::question::CHOICE_SLOTS]) -> ValidationResult {
    if slots
        .iter()
        .any(|s| s.len() > constants::question::MAX_ANSWER_LENGTH)
    {
        return Err(garde::Error::new("answer slot is too long"));
    }
    Ok(())
}

/// A complete quiz: a title and the questions played in order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Quiz {
    /// The title of the quiz (shown on the host's screens only)
    #[garde(length(max = constants::quiz::MAX_TITLE_LENGTH))]
    pub title: String,

    /// The ordered questions of the quiz
    #[garde(length(max = constants::quiz::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Returns the number of questions in this quiz
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Checks whether this quiz contains any questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the question at the given index, if it exists
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// A single timed question
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    /// The question text displayed to everyone
    #[garde(length(min = 1, max = constants::question::MAX_TEXT_LENGTH))]
    pub text: String,
    /// Optional URL of an image shown with the question
    #[garde(inner(length(max = constants::question::MAX_IMAGE_URL_LENGTH)))]
    pub image: Option<String>,
    /// How long the answering window stays open once the clock starts
    #[garde(custom(|v, _| validate_duration(v)))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub duration: Duration,
    /// How the question is answered and judged
    #[garde(dive)]
    pub kind: QuestionKind,
}

impl Question {
    /// Returns the redacted view of this question sent to players
    ///
    /// The view carries everything needed to render and answer the
    /// question, and nothing that would reveal the answer key.
    pub fn view(&self) -> QuestionView {
        match &self.kind {
            QuestionKind::Choice { answers, .. } => QuestionView::Choice {
                answers: answers.clone(),
            },
            QuestionKind::Typing { .. } => QuestionView::Typing,
            QuestionKind::Buzzer => QuestionView::Buzzer,
        }
    }

    /// Checks whether this question is resolved by buzzer arbitration
    /// rather than direct answer submission
    pub fn is_buzzer(&self) -> bool {
        matches!(self.kind, QuestionKind::Buzzer)
    }
}

/// The answering mechanism of a question
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub enum QuestionKind {
    /// Four fixed answer slots; exactly one is correct
    Choice {
        /// The four answer slots, in display order
        #[garde(custom(|v, _| validate_answer_slots(v)))]
        answers: [String; constants::question::CHOICE_SLOTS],
        /// Index of the correct slot
        #[garde(range(max = constants::question::CHOICE_SLOTS - 1))]
        correct: usize,
    },
    /// Free text input, matched case-insensitively after trimming
    Typing {
        /// The accepted answer text
        #[garde(length(min = 1, max = constants::question::MAX_ANSWER_LENGTH))]
        correct_text: String,
    },
    /// No direct answers; the first player to buzz answers out loud and
    /// the host judges them
    Buzzer,
}

/// A player-safe view of a question's answering mechanism
///
/// This mirrors [`QuestionKind`] with the answer key stripped, so it can
/// be broadcast to every participant without leaking the solution.
#[derive(Debug, Clone, Serialize)]
pub enum QuestionView {
    /// The four answer slots, without the correct index
    Choice {
        /// The four answer slots, in display order
        answers: [String; constants::question::CHOICE_SLOTS],
    },
    /// Free text input
    Typing,
    /// Buzzer arbitration
    Buzzer,
}

impl QuestionView {
    /// Checks whether this view describes a buzzer question
    pub fn is_buzzer(&self) -> bool {
        matches!(self, QuestionView::Buzzer)
    }
}
