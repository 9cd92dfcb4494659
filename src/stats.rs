//! Per-player running totals across sessions
//!
//! This module tracks lifetime counters for each player, independent of
//! any single game. All counters are monotonically non-decreasing and are
//! updated exclusively through increment deltas, never by replacing a
//! previously read value, so concurrent sessions or devices belonging to
//! the same player cannot lose each other's updates.

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::roster::Id;

/// Lifetime totals for one player
///
/// Every field defaults to zero so reads of never-initialized players (or
/// records written by an older build with fewer counters) come back
/// merged with zero-valued defaults.
#[serde_with::serde_as]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    /// Number of sessions played to completion
    pub total_games_played: u64,
    /// Number of completed sessions finished with the top score
    pub total_games_won: u64,
    /// Number of questions answered across all sessions
    pub total_questions_answered: u64,
    /// Number of those answers judged correct
    pub total_correct_answers: u64,
    /// Number of those answers judged incorrect
    pub total_incorrect_answers: u64,
    /// Total points earned across all sessions
    pub total_score: u64,
    /// Total time spent in sessions, join to finish
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub total_playtime: Duration,
}

impl PlayerStats {
    /// Applies an increment delta to these totals
    ///
    /// Counters saturate rather than wrap, preserving monotonicity even
    /// in pathological cases.
    pub fn apply(&mut self, delta: &StatsDelta) {
        self.total_games_played = self.total_games_played.saturating_add(delta.games_played);
        self.total_games_won = self.total_games_won.saturating_add(delta.games_won);
        self.total_questions_answered = self
            .total_questions_answered
            .saturating_add(delta.questions_answered);
        self.total_correct_answers = self
            .total_correct_answers
            .saturating_add(delta.correct_answers);
        self.total_incorrect_answers = self
            .total_incorrect_answers
            .saturating_add(delta.incorrect_answers);
        self.total_score = self.total_score.saturating_add(delta.score);
        self.total_playtime = self.total_playtime.saturating_add(delta.playtime);
    }
}

/// A composable bundle of stat increments
///
/// Deltas are combined with `+` and applied atomically as one update.
#[serde_with::serde_as]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Add,
)]
pub struct StatsDelta {
    /// Completed sessions to add
    pub games_played: u64,
    /// Won sessions to add
    pub games_won: u64,
    /// Answered questions to add
    pub questions_answered: u64,
    /// Correct answers to add
    pub correct_answers: u64,
    /// Incorrect answers to add
    pub incorrect_answers: u64,
    /// Points to add
    pub score: u64,
    /// Playtime to add
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub playtime: Duration,
}

impl StatsDelta {
    /// One completed session
    pub fn game_played() -> Self {
        Self {
            games_played: 1,
            ..Self::default()
        }
    }

    /// One won session
    pub fn game_won() -> Self {
        Self {
            games_won: 1,
            ..Self::default()
        }
    }

    /// One answered question, judged correct or not
    pub fn question_answered(correct: bool) -> Self {
        Self {
            questions_answered: 1,
            correct_answers: u64::from(correct),
            incorrect_answers: u64::from(!correct),
            ..Self::default()
        }
    }

    /// Points earned
    pub fn score(points: u64) -> Self {
        Self {
            score: points,
            ..Self::default()
        }
    }

    /// Time spent in a session
    pub fn playtime(duration: Duration) -> Self {
        Self {
            playtime: duration,
            ..Self::default()
        }
    }
}

/// Backing store for per-player totals
///
/// Implementations must translate every call into an atomic increment
/// against the store, never a local read-add-write, so updates from
/// concurrent sessions or tabs of the same player are never lost.
pub trait StatsStore {
    /// Atomically adds a delta to a player's totals
    fn increment(&mut self, player: Id, delta: &StatsDelta);

    /// Reads a player's current totals
    ///
    /// Players with no recorded activity read as all-zero totals.
    fn totals(&self, player: Id) -> PlayerStats;
}

/// An in-process stats store
///
/// Serves tests and single-process deployments; increments are trivially
/// atomic because the store is behind a mutable borrow.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStatsStore {
    totals: HashMap<Id, PlayerStats>,
}

impl StatsStore for MemoryStatsStore {
    fn increment(&mut self, player: Id, delta: &StatsDelta) {
        self.totals.entry(player).or_default().apply(delta);
    }

    fn totals(&self, player: Id) -> PlayerStats {
        self.totals.get(&player).copied().unwrap_or_default()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_deltas_compose_with_add() {
        let delta = StatsDelta::question_answered(true) + StatsDelta::score(750);

        assert_eq!(delta.questions_answered, 1);
        assert_eq!(delta.correct_answers, 1);
        assert_eq!(delta.incorrect_answers, 0);
        assert_eq!(delta.score, 750);
    }

    #[test]
    fn test_apply_accumulates() {
        let mut stats = PlayerStats::default();

        stats.apply(&(StatsDelta::question_answered(true) + StatsDelta::score(500)));
        stats.apply(&StatsDelta::question_answered(false));
        stats.apply(&(StatsDelta::game_played() + StatsDelta::playtime(Duration::from_secs(90))));

        assert_eq!(stats.total_questions_answered, 2);
        assert_eq!(stats.total_correct_answers, 1);
        assert_eq!(stats.total_incorrect_answers, 1);
        assert_eq!(stats.total_score, 500);
        assert_eq!(stats.total_games_played, 1);
        assert_eq!(stats.total_games_won, 0);
        assert_eq!(stats.total_playtime, Duration::from_secs(90));
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = PlayerStats {
            total_score: u64::MAX,
            ..PlayerStats::default()
        };
        stats.apply(&StatsDelta::score(1));
        assert_eq!(stats.total_score, u64::MAX);
    }

    #[test]
    fn test_memory_store_reads_zero_defaults() {
        let store = MemoryStatsStore::default();
        assert_eq!(store.totals(Id::new()), PlayerStats::default());
    }

    #[test]
    fn test_memory_store_accumulates_per_player() {
        let mut store = MemoryStatsStore::default();
        let a = Id::new();
        let b = Id::new();

        store.increment(a, &StatsDelta::score(100));
        store.increment(a, &StatsDelta::score(50));
        store.increment(b, &StatsDelta::game_won());

        assert_eq!(store.totals(a).total_score, 150);
        assert_eq!(store.totals(b).total_games_won, 1);
        assert_eq!(store.totals(b).total_score, 0);
    }

    #[test]
    fn test_missing_fields_deserialize_as_zero() {
        let stats: PlayerStats = serde_json::from_str("{\"total_score\": 42}").unwrap();
        assert_eq!(stats.total_score, 42);
        assert_eq!(stats.total_games_played, 0);
        assert_eq!(stats.total_playtime, Duration::ZERO);
    }
}
