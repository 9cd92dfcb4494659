//! # Mohoot Session Engine
//!
//! This library provides the core logic of the Mohoot live quiz game: a
//! host drives a shared session through a lock-step sequence of timed
//! question rounds while players join by PIN, submit answers, and race
//! over a first-responder buzzer.
//!
//! The session is an authoritative in-memory state machine. Every
//! command from the host and every answer or buzz from a player is
//! serialized through it, and every client derives its view from the
//! messages it broadcasts, so the contested parts of the protocol
//! (buzzer claims, score updates) resolve deterministically in arrival
//! order.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod buzzer;
pub mod constants;
pub mod nickname;
pub mod pin;
pub mod player;
pub mod quiz;
pub mod registry;
pub mod roster;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod tunnel;

/// A display list that keeps the exact count while limiting the items
///
/// Lobby and leaderboard screens show a bounded number of entries but
/// still report the real total, e.g. "412 players" above the first 50
/// names.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedList<T> {
    /// The exact total count of items
    exact_count: usize,
    /// The items kept for display (up to the limit)
    items: Vec<T>,
}

impl<T: Clone> TruncatedList<T> {
    /// Creates a truncated list from an iterator
    ///
    /// # Arguments
    ///
    /// * `list` - The items, in display order
    /// * `limit` - Maximum number of items to keep
    /// * `exact_count` - The true total (may exceed `limit`)
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Returns the exact total count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the items kept for display
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
