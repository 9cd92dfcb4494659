//! Player nickname management and validation
//!
//! This module validates and tracks the display names used within a single
//! session. Names are trimmed, bounded in length, content-filtered, and
//! unique across distinct players; a rejoining player may keep or change
//! their own name without tripping the uniqueness check.

use std::collections::HashMap;

use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{constants, roster::Id};

/// Errors that can occur during nickname validation and assignment
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The nickname is already in use by another player
    #[error("nickname already in-use")]
    Taken,
    /// The nickname is empty or contains only whitespace
    #[error("nickname cannot be empty")]
    Empty,
    /// The nickname contains inappropriate content
    #[error("nickname is inappropriate")]
    Inappropriate,
    /// The nickname exceeds the maximum allowed length
    #[error("nickname is too long")]
    TooLong,
}

/// Serialization helper for the Nicknames struct
#[derive(Deserialize)]
struct NicknamesSerde {
    mapping: HashMap<Id, String>,
}

/// Tracks the nickname of every player in a session
///
/// Maintains a bidirectional mapping between player ids and their cleaned
/// nicknames so uniqueness checks are constant time. The reverse mapping
/// is rebuilt on deserialization rather than stored.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "NicknamesSerde")]
pub struct Nicknames {
    /// Primary mapping from player id to cleaned nickname
    mapping: HashMap<Id, String>,

    /// Reverse mapping from nickname to owning player (not serialized)
    #[serde(skip_serializing)]
    reverse_mapping: HashMap<String, Id>,
}

impl From<NicknamesSerde> for Nicknames {
    fn from(serde: NicknamesSerde) -> Self {
        let NicknamesSerde { mapping } = serde;
        let reverse_mapping = mapping
            .iter()
            .map(|(id, name)| (name.to_owned(), *id))
            .collect();
        Self {
            mapping,
            reverse_mapping,
        }
    }
}

impl Nicknames {
    /// Retrieves the nickname of a player
    pub fn get(&self, id: Id) -> Option<&str> {
        self.mapping.get(&id).map(String::as_str)
    }

    /// Validates a nickname and assigns it to a player
    ///
    /// The name is trimmed before any other check. A player re-asserting
    /// their current name, or choosing a new one, releases their previous
    /// name; names held by other players are rejected.
    ///
    /// # Arguments
    ///
    /// * `id` - The player taking the name
    /// * `name` - The requested nickname
    ///
    /// # Returns
    ///
    /// The cleaned nickname that was stored.
    ///
    /// # Errors
    ///
    /// * `Error::TooLong` - name exceeds the configured maximum length
    /// * `Error::Empty` - name is empty after trimming whitespace
    /// * `Error::Inappropriate` - name fails the content filter
    /// * `Error::Taken` - name belongs to a different player
    pub fn set(&mut self, id: Id, name: &str) -> Result<String, Error> {
        if name.len() > constants::nickname::MAX_LENGTH {
            return Err(Error::TooLong);
        }
        let name = rustrict::trim_whitespace(name);
        if name.is_empty() {
            return Err(Error::Empty);
        }
        if name.is_inappropriate() {
            return Err(Error::Inappropriate);
        }
        if let Some(owner) = self.reverse_mapping.get(name) {
            if *owner != id {
                return Err(Error::Taken);
            }
        }

        if let Some(previous) = self.mapping.insert(id, name.to_owned()) {
            self.reverse_mapping.remove(&previous);
        }
        self.reverse_mapping.insert(name.to_owned(), id);

        Ok(name.to_owned())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_set_trims_whitespace() {
        let mut nicknames = Nicknames::default();
        let id = Id::new();

        assert_eq!(nicknames.set(id, "  Ada  ").unwrap(), "Ada");
        assert_eq!(nicknames.get(id), Some("Ada"));
    }

    #[test]
    fn test_empty_nickname_rejected() {
        let mut nicknames = Nicknames::default();

        assert_eq!(nicknames.set(Id::new(), ""), Err(Error::Empty));
        assert_eq!(nicknames.set(Id::new(), "   "), Err(Error::Empty));
    }

    #[test]
    fn test_too_long_nickname_rejected() {
        let mut nicknames = Nicknames::default();
        let long = "a".repeat(constants::nickname::MAX_LENGTH + 1);

        assert_eq!(nicknames.set(Id::new(), &long), Err(Error::TooLong));
    }

    #[test]
    fn test_inappropriate_nickname_rejected() {
        let mut nicknames = Nicknames::default();

        assert_eq!(
            nicknames.set(Id::new(), "fuck"),
            Err(Error::Inappropriate)
        );
    }

    #[test]
    fn test_duplicate_across_players_rejected() {
        let mut nicknames = Nicknames::default();

        nicknames.set(Id::new(), "Ada").unwrap();
        assert_eq!(nicknames.set(Id::new(), "Ada"), Err(Error::Taken));
    }

    #[test]
    fn test_rejoining_player_may_keep_or_change_name() {
        let mut nicknames = Nicknames::default();
        let id = Id::new();

        nicknames.set(id, "Ada").unwrap();
        assert_eq!(nicknames.set(id, "Ada").unwrap(), "Ada");
        assert_eq!(nicknames.set(id, "Grace").unwrap(), "Grace");
        assert_eq!(nicknames.get(id), Some("Grace"));

        // the released name becomes available again
        let other = Id::new();
        assert_eq!(nicknames.set(other, "Ada").unwrap(), "Ada");
    }

    #[test]
    fn test_serde_rebuilds_reverse_mapping() {
        let mut nicknames = Nicknames::default();
        let id = Id::new();
        nicknames.set(id, "Ada").unwrap();

        let json = serde_json::to_string(&nicknames).unwrap();
        let mut restored: Nicknames = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.get(id), Some("Ada"));
        assert_eq!(restored.set(Id::new(), "Ada"), Err(Error::Taken));
    }
}
