//! The authoritative session engine
//!
//! This module contains the state machine coordinating one live game:
//! a lobby where players gather, a lock-step sequence of timed question
//! rounds, leaderboard reveals between them, and a terminal finished
//! state. The session is the single source of truth; the host drives
//! every transition, players only submit answers and buzzer claims, and
//! every client derives its view from the messages broadcast here.
//!
//! Because all commands are serialized through one `Session` value, the
//! contested operations of the protocol (buzzer claiming, score updates)
//! need no store-level transactions: they are plain method calls.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    TruncatedList,
    buzzer::BuzzerState,
    constants,
    nickname::{self, Nicknames},
    quiz::{QuestionView, Quiz},
    roster::{self, Id, Role, Roster, Standing},
    scoring::{self, Answer},
    tunnel::Tunnel,
};

/// The current phase of a session
///
/// Sessions progress `Lobby → Question → Leaderboard → Question → … →
/// Finished`. Only the host triggers transitions; `Finished` is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Status {
    /// Players may join; the game has not started
    Lobby,
    /// A question round is open
    Question(Box<OpenRound>),
    /// Standings are on display after the question at `index`
    Leaderboard {
        /// Index of the question the standings follow
        index: usize,
    },
    /// The game is over
    Finished,
}

/// The live state of one open question round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRound {
    /// Index of the question in the quiz
    pub index: usize,
    /// Token identifying this round, strictly increasing per session
    ///
    /// Clients compare this, not the status, to detect a round they have
    /// not answered yet; redelivered status never looks like a new round.
    pub round_id: u64,
    /// When the answer clock starts (announcement time plus the pre-roll)
    pub start_time: SystemTime,
    /// When the answer window closes
    pub end_time: SystemTime,
    /// Buzzer arbitration state, fresh each round
    pub buzzer: BuzzerState,
}

/// Tuning options of a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, garde::Validate)]
pub struct Options {
    /// Flat component of the answer reward; a correct answer earns
    /// between one and two times this, depending on speed
    #[garde(range(min = 1))]
    pub base_points: u64,
}

impl Default for Options {
    /// Defaults to the standard scoring scheme
    fn default() -> Self {
        Self {
            base_points: constants::scoring::STANDARD_BASE,
        }
    }
}

/// Messages received from participants
///
/// Incoming messages are tagged by the sender's claimed role and are
/// dropped unless the tag matches the sender's actual role in the roster.
#[derive(Debug, Deserialize, Clone, derive_more::From)]
pub enum IncomingMessage {
    /// Commands from the game host
    Host(IncomingHostMessage),
    /// Messages from joined players
    Player(IncomingPlayerMessage),
}

impl IncomingMessage {
    /// Validates that a message matches the sender's role
    fn follows(&self, sender_role: Role) -> bool {
        matches!(
            (self, sender_role),
            (IncomingMessage::Host(_), Role::Host)
                | (IncomingMessage::Player(_), Role::Player)
        )
    }
}

/// Commands the host can issue
///
/// These are the only way a session changes status.
#[derive(Debug, Deserialize, Clone, Copy)]
pub enum IncomingHostMessage {
    /// Leave the lobby and open the first question
    Start,
    /// Close the open question and display standings
    RevealLeaderboard,
    /// Open the next question, or finish if none remain
    Advance,
    /// Judge the current buzzer claimant correct and award points
    AwardBuzzer(Id),
    /// Judge the current buzzer claimant wrong; lock them out for the
    /// round and reopen the buzzer
    LockBuzzer(Id),
}

/// Messages players can send
#[derive(Debug, Deserialize, Clone)]
pub enum IncomingPlayerMessage {
    /// Submit an answer for an open round
    Answer {
        /// The round being answered
        round_id: u64,
        /// The submitted answer
        answer: Answer,
        /// When the player submitted, used for the time bonus
        submitted_at: SystemTime,
    },
    /// Claim the buzzer on an open buzzer round
    Buzz {
        /// The round being claimed
        round_id: u64,
        /// When the claim was made
        at: SystemTime,
    },
}

/// A question round as announced to participants
///
/// Carries everything a client needs to render and answer the question;
/// the embedded [`QuestionView`] never contains the answer key.
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub struct RoundSnapshot {
    /// Index of the question in the quiz
    pub index: usize,
    /// Total number of questions in the quiz
    pub count: usize,
    /// Token identifying this round
    pub round_id: u64,
    /// The question text
    pub text: String,
    /// Optional image shown with the question
    pub image: Option<String>,
    /// The redacted answering mechanism
    pub view: QuestionView,
    /// When the answer clock starts
    pub start_time: SystemTime,
    /// When the answer window closes
    pub end_time: SystemTime,
}

/// A player's score and leaderboard position
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSnapshot {
    /// Total points earned so far
    pub points: u64,
    /// Position in the leaderboard (1-indexed)
    pub rank: usize,
}

/// Terminal summary sent when a session finishes
#[derive(Debug, Serialize, Clone)]
pub enum FinishedSummary {
    /// Summary for the host
    Host {
        /// Final standings of every player
        standings: Vec<Standing>,
        /// Number of questions played
        question_count: usize,
        /// Number of players who participated
        player_count: usize,
    },
    /// Summary for one player
    Player {
        /// The player's final score
        score: u64,
        /// The player's final rank (1-indexed)
        rank: usize,
        /// The highest final score in the session; a player whose score
        /// equals this counts the game as won, ties included
        top_score: u64,
        /// Number of questions played
        question_count: usize,
    },
}

/// Deltas broadcast to participants as the session changes
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// (Host) The lobby roster changed
    Lobby {
        /// Nicknames of the joined players, in join order
        players: TruncatedList<String>,
    },
    /// A new question round opened
    RoundOpened(RoundSnapshot),
    /// (Host) Number of players who have answered the open round
    AnswerTally(usize),
    /// (Submitting player) The judged result of an accepted answer or
    /// buzzer attempt
    AnswerJudged {
        /// The round the result belongs to
        round_id: u64,
        /// Whether the answer was judged correct
        correct: bool,
        /// Points awarded
        points: u64,
    },
    /// A player claimed the buzzer
    BuzzerClaimed {
        /// The claiming player
        player: Id,
        /// Their nickname, for display on every screen
        nickname: String,
    },
    /// The claimant was judged wrong; un-locked players may buzz again
    BuzzerReopened {
        /// The round the buzzer belongs to
        round_id: u64,
    },
    /// (Host) Standings revealed after a question
    Leaderboard {
        /// Index of the question the standings follow
        index: usize,
        /// Total number of questions
        count: usize,
        /// Standings sorted by score descending
        standings: TruncatedList<Standing>,
    },
    /// (Player) Own score shown while standings are on display
    Score {
        /// The player's score, if they have joined the standings
        score: Option<ScoreSnapshot>,
    },
    /// The session finished
    Finished(FinishedSummary),
    /// The session was closed by the host
    ///
    /// Clients must clear any resume state and return to a join screen.
    Terminated,
}

/// Full-state messages for connecting or reconnecting participants
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// The session is in the lobby
    Lobby {
        /// Nicknames of the joined players, in join order
        players: TruncatedList<String>,
    },
    /// A question round is open
    Question {
        /// The round as announced
        snapshot: RoundSnapshot,
        /// Whether this participant already answered the round; this is
        /// derived from the session-held record, so it survives reloads
        answered: bool,
        /// The current buzzer claimant, if any
        buzzed: Option<Id>,
        /// Whether this participant is locked out of the buzzer
        locked_out: bool,
        /// Number of players who have answered
        answered_count: usize,
    },
    /// (Host) Standings are on display
    Leaderboard {
        /// Index of the question the standings follow
        index: usize,
        /// Total number of questions
        count: usize,
        /// Standings sorted by score descending
        standings: TruncatedList<Standing>,
    },
    /// (Player) Standings are on display
    Score {
        /// Index of the question the standings follow
        index: usize,
        /// Total number of questions
        count: usize,
        /// The player's own score
        score: Option<ScoreSnapshot>,
    },
    /// The session finished
    Finished(FinishedSummary),
}

/// Errors that can occur when a player joins a session
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The nickname failed validation
    #[error(transparent)]
    Nickname(#[from] nickname::Error),
    /// The roster refused the player
    #[error(transparent)]
    Roster(#[from] roster::Error),
}

/// Looks up a player's score and rank in sorted standings
fn score_in(standings: &[Standing], id: Id) -> Option<ScoreSnapshot> {
    standings
        .iter()
        .position(|standing| standing.player == id)
        .map(|position| ScoreSnapshot {
            points: standings[position].score,
            rank: position + 1,
        })
}

/// One live game session
///
/// Owns the frozen quiz, the roster of participants, and the status state
/// machine. All mutation goes through [`Session::receive_message`] and
/// [`Session::add_player`], so concurrent intent (several players buzzing,
/// a player answering while the host advances) resolves in arrival order.
#[derive(Serialize, Deserialize)]
pub struct Session {
    /// The quiz being played, copied at creation time
    ///
    /// Never re-read from anywhere, so edits to the source quiz cannot
    /// affect a running session.
    quiz: Quiz,
    /// Tuning options
    options: Options,
    /// All participants and their records
    pub roster: Roster,
    /// Nickname uniqueness registry
    nicknames: Nicknames,
    /// Current phase
    pub status: Status,
    /// Next round token to hand out
    next_round_id: u64,

    /// Final standings, computed once when the session finishes
    #[serde(skip)]
    final_standings: once_cell_serde::sync::OnceCell<Vec<Standing>>,
}

impl Debug for Session {
    /// Custom debug implementation that avoids printing the full roster
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("quiz", &self.quiz.title)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a new session in the lobby
    ///
    /// # Arguments
    ///
    /// * `quiz` - The quiz to play; the session takes its own copy
    /// * `options` - Tuning options
    /// * `host_id` - The participant allowed to drive transitions
    pub fn new(quiz: Quiz, options: Options, host_id: Id) -> Self {
        Self {
            quiz,
            options,
            roster: Roster::with_host(host_id),
            nicknames: Nicknames::default(),
            status: Status::Lobby,
            next_round_id: 0,
            final_standings: once_cell_serde::sync::OnceCell::new(),
        }
    }

    /// Returns the number of questions in the session's quiz
    pub fn question_count(&self) -> usize {
        self.quiz.len()
    }

    /// Adds a player, or refreshes the profile of a returning one
    ///
    /// A returning player keeps their score and answer history. While the
    /// session is in the lobby the host's waiting screen is refreshed;
    /// in every case the joiner receives a sync of the current state so a
    /// mid-game join lands on the right screen immediately.
    ///
    /// # Errors
    ///
    /// Returns a [`JoinError`] if the nickname fails validation or the
    /// roster refuses the player.
    pub fn add_player<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        player: Id,
        nickname: &str,
        photo: Option<String>,
        tunnel_finder: F,
    ) -> Result<(), JoinError> {
        self.roster.can_accept(player)?;
        let nickname = self.nicknames.set(player, nickname)?;
        self.roster.join(player, nickname, photo)?;

        if matches!(self.status, Status::Lobby) {
            self.roster.announce_specific(
                Role::Host,
                &UpdateMessage::Lobby {
                    players: self.lobby_names(),
                },
                &tunnel_finder,
            );
        }

        self.roster.send_sync(
            &self.state_message(player, Role::Player),
            player,
            tunnel_finder,
        );

        Ok(())
    }

    /// Handles an incoming message from a participant
    ///
    /// Messages whose role tag does not match the sender's actual role
    /// are dropped, as are commands that do not apply to the current
    /// status; a stale or malicious message can never corrupt the state
    /// machine, at worst it does nothing.
    pub fn receive_message<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        sender: Id,
        message: IncomingMessage,
        tunnel_finder: F,
    ) {
        let Some(role) = self.roster.role(sender) else {
            return;
        };

        if !message.follows(role) {
            return;
        }

        match message {
            IncomingMessage::Host(message) => match message {
                IncomingHostMessage::Start => self.start(tunnel_finder),
                IncomingHostMessage::RevealLeaderboard => self.reveal_leaderboard(tunnel_finder),
                IncomingHostMessage::Advance => self.advance(tunnel_finder),
                IncomingHostMessage::AwardBuzzer(player) => {
                    self.award_buzzer(player, tunnel_finder);
                }
                IncomingHostMessage::LockBuzzer(player) => {
                    self.lock_buzzer(player, tunnel_finder);
                }
            },
            IncomingMessage::Player(message) => match message {
                IncomingPlayerMessage::Answer {
                    round_id,
                    answer,
                    submitted_at,
                } => self.handle_answer(sender, round_id, answer, submitted_at, tunnel_finder),
                IncomingPlayerMessage::Buzz { round_id, at } => {
                    self.handle_buzz(sender, round_id, at, tunnel_finder);
                }
            },
        }
    }

    /// Sends a participant the sync message for the current state
    ///
    /// Used when a participant connects or reconnects mid-game.
    pub fn sync<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, id: Id, tunnel_finder: F) {
        let Some(role) = self.roster.role(id) else {
            return;
        };

        self.roster
            .send_sync(&self.state_message(id, role), id, tunnel_finder);
    }

    /// Announces the end of the session and closes every tunnel
    ///
    /// Clients observe the terminal message (or the closed channel) and
    /// return to a join-capable state.
    pub fn close<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) {
        self.roster
            .announce(&UpdateMessage::Terminated, &tunnel_finder);
        self.roster.close_all(tunnel_finder);
    }

    /// Returns the message necessary to synchronize a participant's view
    pub fn state_message(&self, id: Id, role: Role) -> SyncMessage {
        match &self.status {
            Status::Lobby => SyncMessage::Lobby {
                players: self.lobby_names(),
            },
            Status::Question(round) => SyncMessage::Question {
                snapshot: self.round_snapshot(round),
                answered: self
                    .roster
                    .record(id)
                    .is_some_and(|record| record.answered(round.round_id)),
                buzzed: round.buzzer.claimant().map(|claim| claim.player),
                locked_out: round.buzzer.is_locked(id),
                answered_count: self.roster.answered_count(round.round_id),
            },
            Status::Leaderboard { index } => {
                let standings = self.roster.standings();
                match role {
                    Role::Host => SyncMessage::Leaderboard {
                        index: *index,
                        count: self.quiz.len(),
                        standings: Self::truncated(&standings),
                    },
                    Role::Player => SyncMessage::Score {
                        index: *index,
                        count: self.quiz.len(),
                        score: score_in(&standings, id),
                    },
                }
            }
            Status::Finished => {
                let standings = self.final_standings();
                SyncMessage::Finished(self.summary_for(id, role, &standings))
            }
        }
    }

    /// Names for the lobby waiting screen
    fn lobby_names(&self) -> TruncatedList<String> {
        let names = self.roster.player_names();
        let count = names.len();
        TruncatedList::new(
            names.into_iter(),
            constants::session::DISPLAY_LIMIT,
            count,
        )
    }

    /// Truncates standings for display
    fn truncated(standings: &[Standing]) -> TruncatedList<Standing> {
        TruncatedList::new(
            standings.iter().cloned(),
            constants::session::DISPLAY_LIMIT,
            standings.len(),
        )
    }

    /// Builds the announcement snapshot of an open round
    fn round_snapshot(&self, round: &OpenRound) -> RoundSnapshot {
        let question = self
            .quiz
            .question(round.index)
            .expect("open round always references a quiz question");

        RoundSnapshot {
            index: round.index,
            count: self.quiz.len(),
            round_id: round.round_id,
            text: question.text.clone(),
            image: question.image.clone(),
            view: question.view(),
            start_time: round.start_time,
            end_time: round.end_time,
        }
    }

    /// The cached final standings, computing them on first use
    fn final_standings(&self) -> Vec<Standing> {
        self.final_standings
            .get_or_init(|| self.roster.standings())
            .clone()
    }

    /// Builds the terminal summary for one participant
    fn summary_for(&self, id: Id, role: Role, standings: &[Standing]) -> FinishedSummary {
        match role {
            Role::Host => FinishedSummary::Host {
                standings: standings.to_vec(),
                question_count: self.quiz.len(),
                player_count: standings.len(),
            },
            Role::Player => {
                let own = score_in(standings, id);
                FinishedSummary::Player {
                    score: own.map_or(0, |snapshot| snapshot.points),
                    rank: own.map_or(standings.len(), |snapshot| snapshot.rank),
                    top_score: standings.first().map_or(0, |standing| standing.score),
                    question_count: self.quiz.len(),
                }
            }
        }
    }

    /// Leaves the lobby and opens the first question
    ///
    /// A quiz with no questions finishes immediately.
    fn start<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: F) {
        if !matches!(self.status, Status::Lobby) {
            return;
        }

        if self.quiz.is_empty() {
            self.finish(tunnel_finder);
        } else {
            self.open_question(0, tunnel_finder);
        }
    }

    /// Opens the question at `index` as a fresh round
    ///
    /// Hands out a new round token, computes the answer window with the
    /// pre-roll buffer, resets the buzzer, and announces the round to
    /// everyone.
    fn open_question<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, index: usize, tunnel_finder: F) {
        let Some(question) = self.quiz.question(index) else {
            return;
        };

        let round_id = self.next_round_id;
        self.next_round_id += 1;

        let start_time = SystemTime::now() + constants::session::PRE_ROLL;
        let end_time = start_time + question.duration;

        let round = OpenRound {
            index,
            round_id,
            start_time,
            end_time,
            buzzer: BuzzerState::default(),
        };
        let snapshot = self.round_snapshot(&round);
        self.status = Status::Question(Box::new(round));

        self.roster
            .announce(&UpdateMessage::RoundOpened(snapshot), tunnel_finder);
    }

    /// Closes the open question and displays standings
    ///
    /// Scores were already applied as answers arrived; this only changes
    /// status and fans out the appropriate view per role.
    fn reveal_leaderboard<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: F) {
        let Status::Question(round) = &self.status else {
            return;
        };
        let index = round.index;

        self.status = Status::Leaderboard { index };

        let standings = self.roster.standings();
        let count = self.quiz.len();
        let truncated = Self::truncated(&standings);

        self.roster.announce_with(
            |id, role| {
                Some(match role {
                    Role::Host => UpdateMessage::Leaderboard {
                        index,
                        count,
                        standings: truncated.clone(),
                    },
                    Role::Player => UpdateMessage::Score {
                        score: score_in(&standings, id),
                    },
                })
            },
            tunnel_finder,
        );
    }

    /// Opens the next question, or finishes if none remain
    ///
    /// Valid from an open question (skipping the leaderboard) or from the
    /// leaderboard; works with zero joined players. A finished session
    /// never advances again.
    fn advance<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: F) {
        let next = match &self.status {
            Status::Question(round) => round.index + 1,
            Status::Leaderboard { index } => index + 1,
            Status::Lobby | Status::Finished => return,
        };

        if next < self.quiz.len() {
            self.open_question(next, tunnel_finder);
        } else {
            self.finish(tunnel_finder);
        }
    }

    /// Ends the game and announces the terminal summaries
    fn finish<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: F) {
        self.status = Status::Finished;

        let standings = self.final_standings();

        self.roster.announce_with(
            |id, role| Some(UpdateMessage::Finished(self.summary_for(id, role, &standings))),
            tunnel_finder,
        );
    }

    /// Judges and records a player's answer submission
    ///
    /// Rejected without any record change when the round token is stale,
    /// the question is not a direct-answer one, the player already
    /// answered this round, or the submission is later than the window's
    /// end. An accepted answer updates the player's record, replies with
    /// the judged result, and refreshes the host's tally.
    fn handle_answer<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        player: Id,
        round_id: u64,
        answer: Answer,
        submitted_at: SystemTime,
        tunnel_finder: F,
    ) {
        let Status::Question(round) = &self.status else {
            return;
        };
        if round.round_id != round_id {
            return;
        }
        let Some(question) = self.quiz.question(round.index) else {
            return;
        };
        if question.is_buzzer() {
            return;
        }
        let Some(record) = self.roster.record(player) else {
            return;
        };
        if record.answered(round_id) {
            return;
        }
        if submitted_at > round.end_time {
            return;
        }

        let correct = scoring::check(&question.kind, &answer);
        let points = if correct {
            let remaining = round
                .end_time
                .duration_since(submitted_at)
                .unwrap_or_default();
            scoring::reward(self.options.base_points, remaining, question.duration)
        } else {
            0
        };

        self.roster
            .record_answer(player, round_id, Some(answer), points);

        self.roster.send(
            &UpdateMessage::AnswerJudged {
                round_id,
                correct,
                points,
            },
            player,
            &tunnel_finder,
        );
        self.roster.announce_specific(
            Role::Host,
            &UpdateMessage::AnswerTally(self.roster.answered_count(round_id)),
            tunnel_finder,
        );
    }

    /// Attempts a buzzer claim for a player
    ///
    /// A successful claim is broadcast to everyone; losing attempts
    /// observe the broadcast instead of receiving a rejection.
    fn handle_buzz<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        player: Id,
        round_id: u64,
        at: SystemTime,
        tunnel_finder: F,
    ) {
        let Status::Question(round) = &mut self.status else {
            return;
        };
        if round.round_id != round_id {
            return;
        }
        let Some(question) = self.quiz.question(round.index) else {
            return;
        };
        if !question.is_buzzer() {
            return;
        }
        let Some(record) = self.roster.record(player) else {
            return;
        };
        if record.answered(round_id) {
            return;
        }

        if round.buzzer.claim(player, at).is_ok() {
            let nickname = record.nickname.clone();
            self.roster.announce(
                &UpdateMessage::BuzzerClaimed { player, nickname },
                tunnel_finder,
            );
        }
    }

    /// Awards the current buzzer claimant their points
    ///
    /// Only valid while the named player holds the claim. The reward uses
    /// the claim timestamp, so buzzing fast pays the same time bonus a
    /// fast typed answer would. The claim stays held; the host moves on
    /// by revealing the leaderboard or advancing.
    fn award_buzzer<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, player: Id, tunnel_finder: F) {
        let Status::Question(round) = &self.status else {
            return;
        };
        let Some(question) = self.quiz.question(round.index) else {
            return;
        };
        if !question.is_buzzer() {
            return;
        }
        let Some(claim) = round.buzzer.claimant() else {
            return;
        };
        if claim.player != player {
            return;
        }

        let round_id = round.round_id;
        let remaining = round.end_time.duration_since(claim.at).unwrap_or_default();
        let points = scoring::reward(self.options.base_points, remaining, question.duration);

        self.roster.record_answer(player, round_id, None, points);

        self.roster.send(
            &UpdateMessage::AnswerJudged {
                round_id,
                correct: true,
                points,
            },
            player,
            &tunnel_finder,
        );
        self.roster.announce_specific(
            Role::Host,
            &UpdateMessage::AnswerTally(self.roster.answered_count(round_id)),
            tunnel_finder,
        );
    }

    /// Locks the current buzzer claimant out and reopens the buzzer
    ///
    /// The locked player receives an explicit incorrect result; everyone
    /// is told the buzzer is open again.
    fn lock_buzzer<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, player: Id, tunnel_finder: F) {
        let Status::Question(round) = &mut self.status else {
            return;
        };
        let round_id = round.round_id;

        if round.buzzer.lock(player) {
            self.roster.send(
                &UpdateMessage::AnswerJudged {
                    round_id,
                    correct: false,
                    points: 0,
                },
                player,
                &tunnel_finder,
            );
            self.roster
                .announce(&UpdateMessage::BuzzerReopened { round_id }, tunnel_finder);
        }
    }
}
