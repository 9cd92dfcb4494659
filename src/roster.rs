//! Participant tracking and per-player records
//!
//! This module manages everyone attached to a session: the single host
//! and the joined players. For each player it keeps the authoritative
//! record of their score and answer history, and it provides the
//! broadcast helpers the engine uses to fan messages out to connected
//! participants.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    constants,
    scoring::Answer,
    session::{SyncMessage, UpdateMessage},
    tunnel::Tunnel,
};

/// A stable identifier for a participant
///
/// Ids come from the identity provider and persist across reconnects,
/// reloads, and devices; a rejoining player presents the same id and gets
/// their existing record back.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random participant id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random participant id (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the id as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an id from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The role of a participant, without any associated data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Role {
    /// The single client driving session transitions
    Host,
    /// A joined player
    Player,
}

/// A participant and their associated state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Participant {
    /// The game host; holds no record of its own
    Host,
    /// A player with their session-scoped record
    Player(PlayerRecord),
}

impl Participant {
    /// Returns the role of this participant
    pub fn role(&self) -> Role {
        match self {
            Participant::Host => Role::Host,
            Participant::Player(_) => Role::Player,
        }
    }
}

/// The authoritative per-player record within one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Display name, unique within the session
    pub nickname: String,
    /// Optional avatar URL from the identity provider
    pub photo: Option<String>,
    /// Total points earned this session; never decreases
    pub score: u64,
    /// The answer submitted for the last answered round, if it had one
    ///
    /// Buzzer rounds resolved by host judgment leave this `None` while
    /// still marking the round answered below.
    pub last_answer: Option<Answer>,
    /// The round id this player last answered
    ///
    /// Comparing this against the open round's id is the sole
    /// "already answered" check; it survives reloads and duplicate
    /// deliveries because it lives in the session, not the client.
    pub last_answered_round: Option<u64>,
}

impl PlayerRecord {
    fn new(nickname: String, photo: Option<String>) -> Self {
        Self {
            nickname,
            photo,
            score: 0,
            last_answer: None,
            last_answered_round: None,
        }
    }

    /// Checks whether this player already answered the given round
    pub fn answered(&self, round_id: u64) -> bool {
        self.last_answered_round == Some(round_id)
    }
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// The player this row belongs to
    pub player: Id,
    /// The player's nickname at the time of display
    pub nickname: String,
    /// The player's total score
    pub score: u64,
}

/// Errors that can occur when joining a session
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The session has reached the maximum number of allowed players
    #[error("maximum number of players reached")]
    Full,
    /// The host cannot join its own session as a player
    #[error("the host cannot join as a player")]
    Host,
}

/// Serialization helper for the Roster struct
#[derive(Deserialize)]
struct RosterSerde {
    mapping: HashMap<Id, Participant>,
    join_order: Vec<Id>,
}

/// Tracks all participants of one session
///
/// Holds the primary id-to-participant mapping, the order in which
/// players joined (used for stable leaderboard ties), and a reverse index
/// by role for efficient broadcast filtering. The reverse index is
/// rebuilt on deserialization rather than stored.
#[derive(Serialize, Deserialize)]
#[serde(from = "RosterSerde")]
pub struct Roster {
    /// Primary mapping from participant id to their state
    mapping: HashMap<Id, Participant>,
    /// Player ids in the order they first joined
    join_order: Vec<Id>,

    /// Reverse index by role (not serialized)
    #[serde(skip_serializing)]
    reverse_mapping: EnumMap<Role, HashSet<Id>>,
}

impl From<RosterSerde> for Roster {
    fn from(serde: RosterSerde) -> Self {
        let RosterSerde {
            mapping,
            join_order,
        } = serde;
        let mut reverse_mapping: EnumMap<Role, HashSet<Id>> = EnumMap::default();
        for (id, participant) in &mapping {
            reverse_mapping[participant.role()].insert(*id);
        }
        Self {
            mapping,
            join_order,
            reverse_mapping,
        }
    }
}

impl Roster {
    /// Creates a roster with the host already registered
    pub fn with_host(host_id: Id) -> Self {
        Self {
            mapping: {
                let mut map = HashMap::default();
                map.insert(host_id, Participant::Host);
                map
            },
            join_order: Vec::new(),
            reverse_mapping: {
                let mut map: EnumMap<Role, HashSet<Id>> = EnumMap::default();
                map[Role::Host].insert(host_id);
                map
            },
        }
    }

    /// Returns the role of a participant, if they are known
    pub fn role(&self, id: Id) -> Option<Role> {
        self.mapping.get(&id).map(Participant::role)
    }

    /// Returns the record of a player, if they have joined
    pub fn record(&self, id: Id) -> Option<&PlayerRecord> {
        match self.mapping.get(&id) {
            Some(Participant::Player(record)) => Some(record),
            _ => None,
        }
    }

    /// Checks whether a participant could join as a player right now
    ///
    /// # Errors
    ///
    /// * `Error::Host` - the id belongs to the host
    /// * `Error::Full` - the session is at capacity and the id is new
    pub fn can_accept(&self, id: Id) -> Result<(), Error> {
        match self.mapping.get(&id) {
            Some(Participant::Host) => Err(Error::Host),
            Some(Participant::Player(_)) => Ok(()),
            None => {
                if self.specific_count(Role::Player) >= constants::session::MAX_PLAYER_COUNT {
                    Err(Error::Full)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Adds a player, or refreshes the profile of a returning one
    ///
    /// A rejoining player keeps their score and answer-tracking fields;
    /// only the profile fields (nickname, photo) are overwritten. This is
    /// what makes rejoin-after-disconnect lossless and reload-safe.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Roster::can_accept`].
    pub fn join(&mut self, id: Id, nickname: String, photo: Option<String>) -> Result<(), Error> {
        self.can_accept(id)?;

        match self.mapping.get_mut(&id) {
            Some(Participant::Player(record)) => {
                record.nickname = nickname;
                record.photo = photo;
            }
            _ => {
                self.mapping
                    .insert(id, Participant::Player(PlayerRecord::new(nickname, photo)));
                self.reverse_mapping[Role::Player].insert(id);
                self.join_order.push(id);
            }
        }

        Ok(())
    }

    /// Records an accepted answer (or buzzer judgment) for a player
    ///
    /// Marks the round answered, stores the submitted answer if there was
    /// one, and adds the earned points. Scores only ever grow.
    pub fn record_answer(&mut self, id: Id, round_id: u64, answer: Option<Answer>, points: u64) {
        if let Some(Participant::Player(record)) = self.mapping.get_mut(&id) {
            record.last_answer = answer;
            record.last_answered_round = Some(round_id);
            record.score = record.score.saturating_add(points);
        }
    }

    /// Counts how many players have answered the given round
    pub fn answered_count(&self, round_id: u64) -> usize {
        self.join_order
            .iter()
            .filter_map(|id| self.record(*id))
            .filter(|record| record.answered(round_id))
            .count()
    }

    /// Returns the nicknames of all joined players, in join order
    pub fn player_names(&self) -> Vec<String> {
        self.join_order
            .iter()
            .filter_map(|id| self.record(*id))
            .map(|record| record.nickname.clone())
            .collect_vec()
    }

    /// Returns the leaderboard, sorted by score descending
    ///
    /// The sort is stable over join order, so tied players appear in the
    /// order they joined.
    pub fn standings(&self) -> Vec<Standing> {
        self.join_order
            .iter()
            .filter_map(|id| {
                self.record(*id).map(|record| Standing {
                    player: *id,
                    nickname: record.nickname.clone(),
                    score: record.score,
                })
            })
            .sorted_by_key(|standing| std::cmp::Reverse(standing.score))
            .collect_vec()
    }

    /// Returns the highest score among all players, or zero with none
    pub fn top_score(&self) -> u64 {
        self.join_order
            .iter()
            .filter_map(|id| self.record(*id))
            .map(|record| record.score)
            .max()
            .unwrap_or(0)
    }

    /// Gets the count of participants with a specific role
    pub fn specific_count(&self, filter: Role) -> usize {
        self.reverse_mapping[filter].len()
    }

    /// Gets all participants with active tunnels
    ///
    /// # Returns
    ///
    /// Tuples of (id, tunnel, role) for every participant whose tunnel
    /// the finder can produce.
    pub fn vec<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) -> Vec<(Id, T, Role)> {
        self.reverse_mapping
            .values()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| match (tunnel_finder(*id), self.mapping.get(id)) {
                (Some(tunnel), Some(participant)) => Some((*id, tunnel, participant.role())),
                _ => None,
            })
            .collect_vec()
    }

    /// Gets the connected participants of a specific role
    pub fn specific_vec<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        filter: Role,
        tunnel_finder: F,
    ) -> Vec<(Id, T)> {
        self.reverse_mapping[filter]
            .iter()
            .filter_map(|id| tunnel_finder(*id).map(|tunnel| (*id, tunnel)))
            .collect_vec()
    }

    /// Sends an update message to a specific participant
    pub fn send<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        id: Id,
        tunnel_finder: F,
    ) {
        let Some(tunnel) = tunnel_finder(id) else {
            return;
        };

        tunnel.send(message);
    }

    /// Sends a state synchronization message to a specific participant
    pub fn send_sync<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &SyncMessage,
        id: Id,
        tunnel_finder: F,
    ) {
        let Some(tunnel) = tunnel_finder(id) else {
            return;
        };

        tunnel.send_sync(message);
    }

    /// Sends personalized messages to all participants
    ///
    /// The sender function is called per participant and may return a
    /// different message per recipient, or `None` to skip them.
    pub fn announce_with<S, T: Tunnel, F: Fn(Id) -> Option<T>>(&self, sender: S, tunnel_finder: F)
    where
        S: Fn(Id, Role) -> Option<UpdateMessage>,
    {
        for (id, tunnel, role) in self.vec(tunnel_finder) {
            let Some(message) = sender(id, role) else {
                continue;
            };

            tunnel.send(&message);
        }
    }

    /// Broadcasts an update message to every connected participant
    pub fn announce<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        tunnel_finder: F,
    ) {
        self.announce_with(|_, _| Some(message.to_owned()), tunnel_finder);
    }

    /// Sends an update message to every connected participant of a role
    pub fn announce_specific<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        filter: Role,
        message: &UpdateMessage,
        tunnel_finder: F,
    ) {
        for (_, tunnel) in self.specific_vec(filter, tunnel_finder) {
            tunnel.send(message);
        }
    }

    /// Closes the tunnel of every connected participant
    pub fn close_all<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) {
        for (_, tunnel, _) in self.vec(&tunnel_finder) {
            tunnel.close();
        }
    }
}
