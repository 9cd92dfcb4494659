//! Answer judgment and reward calculation
//!
//! This module decides whether a submitted answer is correct and how many
//! points it is worth. Rewards favor speed: a correct answer submitted the
//! instant the clock starts is worth twice the flat base, decaying linearly
//! to exactly the base at the end of the answering window.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::quiz::QuestionKind;

/// An answer submitted by a player for a direct-answer question
///
/// Buzzer questions have no submitted answer; they are resolved by claim
/// and host judgment instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// Index of the selected slot on a choice question
    Choice(usize),
    /// Free text typed for a typing question
    Typing(String),
}

/// Normalizes a text answer for comparison
///
/// Matching is whitespace-trim- and case-insensitive: `"Paris"`,
/// `"paris "`, and `" PARIS"` all compare equal.
fn clean(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Judges whether an answer is correct for a question
///
/// An answer of the wrong shape for the question (or any answer to a
/// buzzer question) is simply incorrect.
pub fn check(kind: &QuestionKind, answer: &Answer) -> bool {
    match (kind, answer) {
        (QuestionKind::Choice { correct, .. }, Answer::Choice(index)) => index == correct,
        (QuestionKind::Typing { correct_text }, Answer::Typing(text)) => {
            clean(text) == clean(correct_text)
        }
        _ => false,
    }
}

/// Calculates the reward for a correct answer
///
/// The reward is `base + base * time_remaining / duration`, rounded to the
/// nearest integer, with the remaining time clamped to the answering
/// window: full remaining time earns `2 * base`, none earns exactly
/// `base`. Incorrect answers never reach this function; they score 0.
///
/// # Arguments
///
/// * `base` - Flat component of the reward
/// * `time_remaining` - Time left on the clock when the answer arrived
/// * `duration` - Total length of the answering window
pub fn reward(base: u64, time_remaining: Duration, duration: Duration) -> u64 {
    if duration.is_zero() {
        return base;
    }

    let fraction = (time_remaining.as_secs_f64() / duration.as_secs_f64()).min(1.0);
    (base as f64 * (1.0 + fraction)).round() as u64
}
