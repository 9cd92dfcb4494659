//! The client-side player agent
//!
//! A [`PlayerAgent`] is the reactive half of a joined player: it consumes
//! the update and sync messages pushed by the session and derives the
//! local view the UI renders from. It never holds authoritative state —
//! the session-held record is the truth — but it carries the local
//! conveniences the protocol needs on the client: an optimistic answered
//! guard, the staged text of a typing answer, exactly-once stat
//! accounting when a game finishes, and the durable resume PIN that lets
//! a reloaded client find its way back into the game.

use web_time::SystemTime;

use crate::{
    pin::Pin,
    roster::Id,
    scoring::Answer,
    session::{FinishedSummary, IncomingPlayerMessage, SyncMessage, UpdateMessage},
    stats::{StatsDelta, StatsStore},
};

/// Durable client-side storage for resume state
///
/// Implementations back this with whatever the platform offers for small
/// persistent key-value data. Only the PIN of the session being played is
/// stored; everything else is recovered from the session itself.
pub trait ResumeStore {
    /// Remembers the session being played
    fn save(&mut self, pin: Pin);

    /// Returns the session to resume, if one was saved
    fn load(&self) -> Option<Pin>;

    /// Forgets any saved session
    ///
    /// Called whenever the session ends or is lost, so a stale PIN is
    /// never retried forever.
    fn clear(&mut self);
}

/// An in-process resume store, mostly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryResumeStore(Option<Pin>);

impl ResumeStore for MemoryResumeStore {
    fn save(&mut self, pin: Pin) {
        self.0 = Some(pin);
    }

    fn load(&self) -> Option<Pin> {
        self.0
    }

    fn clear(&mut self) {
        self.0 = None;
    }
}

/// The judged outcome of the player's last submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    /// Whether the answer was judged correct
    pub correct: bool,
    /// Points awarded
    pub points: u64,
}

/// The reactive state of one joined player client
///
/// Feed every pushed [`UpdateMessage`] to [`PlayerAgent::apply_update`]
/// and every [`SyncMessage`] to [`PlayerAgent::apply_sync`]; both are
/// idempotent under the duplicate deliveries a push channel may produce.
#[derive(Debug)]
pub struct PlayerAgent<R: ResumeStore> {
    /// This player's stable id
    player: Id,
    /// The session being played
    pin: Pin,
    /// Durable resume storage
    resume: R,

    /// The round currently on screen
    round_id: Option<u64>,
    /// Whether the open round is a buzzer round
    buzzer_round: bool,
    /// Local answered guard; optimistic, forced true by syncs that show
    /// the session-held record already answered
    answered: bool,
    /// Text staged for a typing answer, cleared when a new round opens
    staged_text: String,
    /// The judged outcome of this round's submission, if any
    result: Option<RoundResult>,
    /// Who holds the buzzer, as last broadcast
    buzzed_by: Option<Id>,
    /// Whether this player is locked out of the buzzer this round
    locked_out: bool,

    /// When this client joined, for playtime accounting
    joined_at: SystemTime,
    /// Whether the finished-game stats have been recorded
    finished_processed: bool,
    /// Whether the session is gone (ended, deleted, or unreachable)
    ended: bool,
}

impl<R: ResumeStore> PlayerAgent<R> {
    /// Creates the agent for a freshly joined player
    ///
    /// Writes the PIN through the resume store so a reloaded client can
    /// rejoin the same session.
    pub fn begin(player: Id, pin: Pin, mut resume: R, now: SystemTime) -> Self {
        resume.save(pin);

        Self {
            player,
            pin,
            resume,
            round_id: None,
            buzzer_round: false,
            answered: false,
            staged_text: String::new(),
            result: None,
            buzzed_by: None,
            locked_out: false,
            joined_at: now,
            finished_processed: false,
            ended: false,
        }
    }

    /// The session this agent is attached to
    pub fn pin(&self) -> Pin {
        self.pin
    }

    /// Whether this player has answered the round on screen
    pub fn answered(&self) -> bool {
        self.answered
    }

    /// The judged outcome of this round's submission, if delivered yet
    pub fn result(&self) -> Option<RoundResult> {
        self.result
    }

    /// Who holds the buzzer, if anyone
    pub fn buzzed_by(&self) -> Option<Id> {
        self.buzzed_by
    }

    /// Whether this player is locked out of the buzzer this round
    pub fn locked_out(&self) -> bool {
        self.locked_out
    }

    /// The text staged for a typing answer
    pub fn staged_text(&self) -> &str {
        &self.staged_text
    }

    /// Whether the session is gone and the client should be back on the
    /// join screen
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Applies a pushed delta to the local view
    ///
    /// Completion stats are recorded through `stats` exactly once even if
    /// the terminal message is delivered multiple times.
    pub fn apply_update<S: StatsStore>(
        &mut self,
        update: &UpdateMessage,
        stats: &mut S,
        now: SystemTime,
    ) {
        match update {
            UpdateMessage::RoundOpened(snapshot) => {
                self.enter_round(snapshot.round_id, snapshot.view.is_buzzer());
            }
            UpdateMessage::AnswerJudged {
                round_id,
                correct,
                points,
            } => {
                if self.round_id != Some(*round_id) || self.result.is_some() {
                    return;
                }
                self.answered = true;
                self.result = Some(RoundResult {
                    correct: *correct,
                    points: *points,
                });
                if self.buzzer_round && !correct {
                    self.locked_out = true;
                }
                stats.increment(
                    self.player,
                    &(StatsDelta::question_answered(*correct) + StatsDelta::score(*points)),
                );
            }
            UpdateMessage::BuzzerClaimed { player, .. } => {
                self.buzzed_by = Some(*player);
            }
            UpdateMessage::BuzzerReopened { round_id } => {
                if self.round_id == Some(*round_id) {
                    self.buzzed_by = None;
                }
            }
            UpdateMessage::Finished(summary) => {
                self.process_finish(summary, stats, now);
            }
            UpdateMessage::Terminated => self.session_lost(),
            UpdateMessage::Lobby { .. }
            | UpdateMessage::AnswerTally(_)
            | UpdateMessage::Leaderboard { .. }
            | UpdateMessage::Score { .. } => {}
        }
    }

    /// Applies a full-state sync to the local view
    ///
    /// Used on connect and reconnect. The `answered` flag carried by a
    /// question sync comes from the session-held record, so a client
    /// reloaded mid-round cannot answer the same round twice even though
    /// its local guard was lost.
    pub fn apply_sync<S: StatsStore>(
        &mut self,
        sync: &SyncMessage,
        stats: &mut S,
        now: SystemTime,
    ) {
        match sync {
            SyncMessage::Question {
                snapshot,
                answered,
                buzzed,
                locked_out,
                ..
            } => {
                self.enter_round(snapshot.round_id, snapshot.view.is_buzzer());
                self.answered |= answered;
                self.buzzed_by = *buzzed;
                self.locked_out = *locked_out;
            }
            SyncMessage::Finished(summary) => self.process_finish(summary, stats, now),
            SyncMessage::Lobby { .. }
            | SyncMessage::Leaderboard { .. }
            | SyncMessage::Score { .. } => {}
        }
    }

    /// Handles the loss of the session
    ///
    /// Covers host-side termination, a vanished session, and subscription
    /// failures alike: resume state is cleared and the client is routed
    /// back to a join-capable state, never left stalled.
    pub fn session_lost(&mut self) {
        self.ended = true;
        self.resume.clear();
    }

    /// Submits a choice answer for the round on screen
    ///
    /// Returns the message to send, or `None` if the local guard rejects
    /// the submission. The guard is a convenience; the session-held
    /// record check is what actually prevents double answers.
    pub fn submit_choice(&mut self, index: usize, now: SystemTime) -> Option<IncomingPlayerMessage> {
        let round_id = self.submittable()?;
        self.answered = true;

        Some(IncomingPlayerMessage::Answer {
            round_id,
            answer: Answer::Choice(index),
            submitted_at: now,
        })
    }

    /// Stages text for a typing answer
    pub fn stage_text(&mut self, text: &str) {
        text.clone_into(&mut self.staged_text);
    }

    /// Submits the staged typing answer for the round on screen
    pub fn submit_typed(&mut self, now: SystemTime) -> Option<IncomingPlayerMessage> {
        let round_id = self.submittable()?;
        self.answered = true;

        Some(IncomingPlayerMessage::Answer {
            round_id,
            answer: Answer::Typing(std::mem::take(&mut self.staged_text)),
            submitted_at: now,
        })
    }

    /// Attempts to claim the buzzer
    ///
    /// Returns `None` while somebody holds the claim, after a lock-out,
    /// or once this player has been judged this round.
    pub fn buzz(&mut self, now: SystemTime) -> Option<IncomingPlayerMessage> {
        if !self.buzzer_round || self.locked_out || self.buzzed_by.is_some() {
            return None;
        }
        let round_id = self.submittable()?;

        Some(IncomingPlayerMessage::Buzz { round_id, at: now })
    }

    /// The round id to submit against, if submitting makes sense now
    fn submittable(&self) -> Option<u64> {
        if self.answered || self.ended {
            return None;
        }
        self.round_id
    }

    /// Resets the per-round view when a new round appears
    fn enter_round(&mut self, round_id: u64, buzzer_round: bool) {
        if self.round_id == Some(round_id) {
            return;
        }

        self.round_id = Some(round_id);
        self.buzzer_round = buzzer_round;
        self.answered = false;
        self.staged_text.clear();
        self.result = None;
        self.buzzed_by = None;
        self.locked_out = false;
    }

    /// Records completion stats, exactly once
    fn process_finish<S: StatsStore>(
        &mut self,
        summary: &FinishedSummary,
        stats: &mut S,
        now: SystemTime,
    ) {
        if self.finished_processed {
            return;
        }
        self.finished_processed = true;

        if let FinishedSummary::Player {
            score, top_score, ..
        } = summary
        {
            let mut delta = StatsDelta::game_played()
                + StatsDelta::playtime(now.duration_since(self.joined_at).unwrap_or_default());
            if score == top_score {
                delta = delta + StatsDelta::game_won();
            }
            stats.increment(self.player, &delta);
        }

        self.resume.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::quiz::QuestionView;
    use crate::session::RoundSnapshot;
    use crate::stats::MemoryStatsStore;

    fn snapshot(round_id: u64, view: QuestionView) -> RoundSnapshot {
        let start_time = SystemTime::now();
        RoundSnapshot {
            index: 0,
            count: 2,
            round_id,
            text: "Question".to_string(),
            image: None,
            view,
            start_time,
            end_time: start_time + Duration::from_secs(20),
        }
    }

    fn choice_view() -> QuestionView {
        QuestionView::Choice {
            answers: [
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
        }
    }

    fn agent() -> PlayerAgent<MemoryResumeStore> {
        PlayerAgent::begin(
            Id::new(),
            Pin::new(),
            MemoryResumeStore::default(),
            SystemTime::now(),
        )
    }

    fn player_summary(score: u64, top_score: u64) -> FinishedSummary {
        FinishedSummary::Player {
            score,
            rank: 1,
            top_score,
            question_count: 2,
        }
    }

    #[test]
    fn test_begin_saves_resume_pin() {
        let pin = Pin::new();
        let mut store = MemoryResumeStore::default();
        store.save(Pin::new());

        let agent = PlayerAgent::begin(Id::new(), pin, store, SystemTime::now());

        assert_eq!(agent.resume.load(), Some(pin));
    }

    #[test]
    fn test_new_round_resets_local_flags() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();

        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(1, choice_view())),
            &mut stats,
            now,
        );
        agent.submit_choice(0, now).unwrap();
        agent.stage_text("left over");
        assert!(agent.answered());

        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(2, choice_view())),
            &mut stats,
            now,
        );

        assert!(!agent.answered());
        assert_eq!(agent.staged_text(), "");
        assert_eq!(agent.result(), None);

        // redelivery of the same round must not reset anything
        agent.submit_choice(1, now).unwrap();
        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(2, choice_view())),
            &mut stats,
            now,
        );
        assert!(agent.answered());
    }

    #[test]
    fn test_submit_only_once_per_round() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();

        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(1, choice_view())),
            &mut stats,
            now,
        );

        assert!(agent.submit_choice(2, now).is_some());
        assert!(agent.submit_choice(2, now).is_none());
        assert!(agent.submit_typed(now).is_none());
    }

    #[test]
    fn test_submit_without_open_round_refused() {
        let mut agent = agent();
        assert!(agent.submit_choice(0, SystemTime::now()).is_none());
    }

    #[test]
    fn test_judged_result_records_question_stats_once() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();
        let player = agent.player;

        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(1, choice_view())),
            &mut stats,
            now,
        );
        agent.submit_choice(0, now);

        let judged = UpdateMessage::AnswerJudged {
            round_id: 1,
            correct: true,
            points: 750,
        };
        agent.apply_update(&judged, &mut stats, now);
        agent.apply_update(&judged, &mut stats, now);

        assert_eq!(agent.result(), Some(RoundResult {
            correct: true,
            points: 750,
        }));
        let totals = stats.totals(player);
        assert_eq!(totals.total_questions_answered, 1);
        assert_eq!(totals.total_correct_answers, 1);
        assert_eq!(totals.total_score, 750);
    }

    #[test]
    fn test_sync_forces_answered_flag_after_reload() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();

        agent.apply_sync(
            &SyncMessage::Question {
                snapshot: snapshot(3, choice_view()),
                answered: true,
                buzzed: None,
                locked_out: false,
                answered_count: 1,
            },
            &mut stats,
            now,
        );

        assert!(agent.answered());
        assert!(agent.submit_choice(0, now).is_none());
    }

    #[test]
    fn test_finish_stats_fire_exactly_once_under_duplicates() {
        let t0 = SystemTime::now();
        let mut agent = PlayerAgent::begin(Id::new(), Pin::new(), MemoryResumeStore::default(), t0);
        let mut stats = MemoryStatsStore::default();
        let player = agent.player;
        let t1 = t0 + Duration::from_secs(60);

        let finished = UpdateMessage::Finished(player_summary(750, 750));
        agent.apply_update(&finished, &mut stats, t1);
        agent.apply_update(&finished, &mut stats, t1);
        agent.apply_sync(
            &SyncMessage::Finished(player_summary(750, 750)),
            &mut stats,
            t1,
        );

        let totals = stats.totals(player);
        assert_eq!(totals.total_games_played, 1);
        assert_eq!(totals.total_games_won, 1);
        assert_eq!(totals.total_playtime, Duration::from_secs(60));
        assert_eq!(agent.resume.load(), None);
    }

    #[test]
    fn test_tied_top_score_counts_as_a_win() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let player = agent.player;

        agent.apply_update(
            &UpdateMessage::Finished(player_summary(500, 500)),
            &mut stats,
            SystemTime::now(),
        );

        assert_eq!(stats.totals(player).total_games_won, 1);
    }

    #[test]
    fn test_lower_score_is_not_a_win() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let player = agent.player;

        agent.apply_update(
            &UpdateMessage::Finished(player_summary(400, 900)),
            &mut stats,
            SystemTime::now(),
        );

        let totals = stats.totals(player);
        assert_eq!(totals.total_games_played, 1);
        assert_eq!(totals.total_games_won, 0);
    }

    #[test]
    fn test_terminated_clears_resume_and_routes_to_join() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();

        agent.apply_update(&UpdateMessage::Terminated, &mut stats, SystemTime::now());

        assert!(agent.ended());
        assert_eq!(agent.resume.load(), None);
        assert!(agent.submit_choice(0, SystemTime::now()).is_none());
    }

    #[test]
    fn test_buzz_guards() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();

        // not a buzzer round
        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(1, choice_view())),
            &mut stats,
            now,
        );
        assert!(agent.buzz(now).is_none());

        // buzzer round: allowed until someone claims
        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(2, QuestionView::Buzzer)),
            &mut stats,
            now,
        );
        assert!(agent.buzz(now).is_some());

        let rival = Id::new();
        agent.apply_update(
            &UpdateMessage::BuzzerClaimed {
                player: rival,
                nickname: "Rival".to_string(),
            },
            &mut stats,
            now,
        );
        assert_eq!(agent.buzzed_by(), Some(rival));
        assert!(agent.buzz(now).is_none());

        agent.apply_update(&UpdateMessage::BuzzerReopened { round_id: 2 }, &mut stats, now);
        assert_eq!(agent.buzzed_by(), None);
        assert!(agent.buzz(now).is_some());
    }

    #[test]
    fn test_wrong_buzz_judgment_locks_out_locally() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();
        let player = agent.player;

        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(5, QuestionView::Buzzer)),
            &mut stats,
            now,
        );
        agent.apply_update(
            &UpdateMessage::BuzzerClaimed {
                player,
                nickname: "Me".to_string(),
            },
            &mut stats,
            now,
        );
        agent.apply_update(
            &UpdateMessage::AnswerJudged {
                round_id: 5,
                correct: false,
                points: 0,
            },
            &mut stats,
            now,
        );
        agent.apply_update(&UpdateMessage::BuzzerReopened { round_id: 5 }, &mut stats, now);

        assert!(agent.locked_out());
        assert!(agent.buzz(now).is_none());
        assert_eq!(stats.totals(player).total_incorrect_answers, 1);
    }

    #[test]
    fn test_typed_submission_takes_staged_text() {
        let mut agent = agent();
        let mut stats = MemoryStatsStore::default();
        let now = SystemTime::now();

        agent.apply_update(
            &UpdateMessage::RoundOpened(snapshot(1, QuestionView::Typing)),
            &mut stats,
            now,
        );
        agent.stage_text(" Paris ");

        let message = agent.submit_typed(now).unwrap();
        match message {
            IncomingPlayerMessage::Answer { round_id, answer, .. } => {
                assert_eq!(round_id, 1);
                assert_eq!(answer, Answer::Typing(" Paris ".to_string()));
            }
            IncomingPlayerMessage::Buzz { .. } => panic!("expected an answer"),
        }
        assert_eq!(agent.staged_text(), "");
    }
}
