//! Configuration constants for the Mohoot session engine
//!
//! This module contains the limits and tuning knobs used throughout the
//! engine to ensure data integrity and provide consistent boundaries for
//! quiz content, sessions, and scoring.

/// Quiz-level configuration constants
pub mod quiz {
    /// Maximum number of questions allowed in a single quiz
    pub const MAX_QUESTION_COUNT: usize = 100;
    /// Maximum length of a quiz title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
}

/// Per-question configuration constants
pub mod question {
    /// Maximum length of the question text
    pub const MAX_TEXT_LENGTH: usize = 200;
    /// Maximum length of an attached image URL
    pub const MAX_IMAGE_URL_LENGTH: usize = 2000;
    /// Number of answer slots on a choice question
    pub const CHOICE_SLOTS: usize = 4;
    /// Maximum length of a single answer slot or accepted text answer
    pub const MAX_ANSWER_LENGTH: usize = 200;
    /// Minimum answering window in seconds
    pub const MIN_DURATION: u64 = 5;
    /// Maximum answering window in seconds
    pub const MAX_DURATION: u64 = 240;
}

/// Session-level configuration constants
pub mod session {
    use std::time::Duration;

    /// Maximum number of players allowed in a single session
    pub const MAX_PLAYER_COUNT: usize = 1000;
    /// Delay between announcing a question and the answer clock starting,
    /// giving clients time to render before the countdown begins
    pub const PRE_ROLL: Duration = Duration::from_secs(2);
    /// Maximum number of entries shown on lobby and leaderboard screens
    pub const DISPLAY_LIMIT: usize = 50;
}

/// Nickname configuration constants
pub mod nickname {
    /// Maximum length of a player nickname in characters
    pub const MAX_LENGTH: usize = 30;
}

/// Scoring configuration constants
pub mod scoring {
    /// Flat reward component of the standard scoring scheme
    pub const STANDARD_BASE: u64 = 500;
    /// Flat reward component of the compact scoring scheme
    pub const COMPACT_BASE: u64 = 5;
}
