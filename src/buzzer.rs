//! First-responder buzzer arbitration
//!
//! For buzzer questions nobody submits a direct answer; instead, players
//! race to claim the round. Exactly one claim can be held at a time. If
//! the host judges the claimant wrong, the claimant is locked out for the
//! rest of the round and the buzzer reopens for everyone else. All
//! attempts are serialized through the owning session, so arbitration is
//! a plain check-then-set with no store-level transaction involved.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::roster::Id;

/// A held buzzer claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The player holding the claim
    pub player: Id,
    /// When the claim was made, used for the time bonus if the host
    /// awards points
    pub at: SystemTime,
}

/// Reasons a buzz attempt can be refused
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    /// Another claim is already held for this round
    #[error("another player already buzzed")]
    AlreadyClaimed,
    /// The player was judged wrong earlier this round
    #[error("player is locked out for this round")]
    LockedOut,
}

/// The buzzer state of one open round
///
/// A fresh (unclaimed, nobody locked) state is created every time a new
/// round opens; locks never carry over between rounds.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BuzzerState {
    /// The currently held claim, if any
    claimed: Option<Claim>,
    /// Players excluded from buzzing again this round
    locked: HashSet<Id>,
}

impl BuzzerState {
    /// Attempts to claim the buzzer for a player
    ///
    /// Succeeds only if nobody holds a claim and the player is not locked
    /// out; every other near-simultaneous attempt observes the held claim
    /// and fails.
    ///
    /// # Errors
    ///
    /// * `ClaimError::LockedOut` - the player was judged wrong this round
    /// * `ClaimError::AlreadyClaimed` - a claim is already held
    pub fn claim(&mut self, player: Id, at: SystemTime) -> Result<Claim, ClaimError> {
        if self.locked.contains(&player) {
            return Err(ClaimError::LockedOut);
        }
        if self.claimed.is_some() {
            return Err(ClaimError::AlreadyClaimed);
        }

        let claim = Claim { player, at };
        self.claimed = Some(claim);
        Ok(claim)
    }

    /// Returns the currently held claim, if any
    pub fn claimant(&self) -> Option<Claim> {
        self.claimed
    }

    /// Locks the current claimant out and reopens the buzzer
    ///
    /// Only the player holding the claim can be locked; anything else is
    /// a no-op so a stale judgment cannot evict a newer claim.
    ///
    /// # Returns
    ///
    /// `true` if the claim was released and the player locked out
    pub fn lock(&mut self, player: Id) -> bool {
        match self.claimed {
            Some(claim) if claim.player == player => {
                self.claimed = None;
                self.locked.insert(player);
                true
            }
            _ => false,
        }
    }

    /// Checks whether a player is locked out for this round
    pub fn is_locked(&self, player: Id) -> bool {
        self.locked.contains(&player)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_claim_wins() {
        let mut buzzer = BuzzerState::default();
        let players: Vec<Id> = (0..10).map(|_| Id::new()).collect();
        let now = SystemTime::now();

        let winners: Vec<Id> = players
            .iter()
            .filter_map(|p| buzzer.claim(*p, now).ok())
            .map(|claim| claim.player)
            .collect();

        assert_eq!(winners, vec![players[0]]);
        assert_eq!(buzzer.claimant().unwrap().player, players[0]);
    }

    #[test]
    fn test_lock_reopens_for_remaining_players() {
        let mut buzzer = BuzzerState::default();
        let first = Id::new();
        let second = Id::new();
        let now = SystemTime::now();

        buzzer.claim(first, now).unwrap();
        assert!(buzzer.lock(first));
        assert!(buzzer.claimant().is_none());
        assert!(buzzer.is_locked(first));

        assert_eq!(buzzer.claim(first, now), Err(ClaimError::LockedOut));
        assert!(buzzer.claim(second, now).is_ok());
    }

    #[test]
    fn test_lock_only_applies_to_the_claimant() {
        let mut buzzer = BuzzerState::default();
        let claimant = Id::new();
        let bystander = Id::new();

        buzzer.claim(claimant, SystemTime::now()).unwrap();
        assert!(!buzzer.lock(bystander));
        assert_eq!(buzzer.claimant().unwrap().player, claimant);
        assert!(!buzzer.is_locked(bystander));
    }

    #[test]
    fn test_lock_without_claim_is_a_no_op() {
        let mut buzzer = BuzzerState::default();
        assert!(!buzzer.lock(Id::new()));
    }

    #[test]
    fn test_double_buzz_by_the_same_player() {
        let mut buzzer = BuzzerState::default();
        let player = Id::new();
        let now = SystemTime::now();

        buzzer.claim(player, now).unwrap();
        assert_eq!(buzzer.claim(player, now), Err(ClaimError::AlreadyClaimed));
    }

    #[test]
    fn test_fresh_state_every_round() {
        let buzzer = BuzzerState::default();
        assert!(buzzer.claimant().is_none());
        assert!(!buzzer.is_locked(Id::new()));
    }
}
