//! Active sessions, addressed by PIN
//!
//! The registry owns every running session and routes joins and commands
//! to them. Because commands borrow a session mutably for their whole
//! duration, all writes to one session are serialized here, which is the
//! property the buzzer arbitration and scoring rely on.

use std::collections::HashMap;

use garde::Validate;
use thiserror::Error;

use crate::{
    pin::Pin,
    quiz::Quiz,
    roster::Id,
    session::{Options, Session},
    tunnel::Tunnel,
};

/// How many PINs to try before giving up on session creation
///
/// With a six-digit space this only trips when the registry is nearly
/// saturated with active sessions.
const MAX_PIN_ATTEMPTS: usize = 1000;

/// Errors that can occur when creating a session
#[derive(Error, Debug)]
pub enum CreateError {
    /// The quiz or options failed validation
    #[error("invalid game configuration: {0}")]
    Invalid(#[from] garde::Report),
    /// No unused PIN could be found
    #[error("no unused pin available")]
    PinsExhausted,
}

/// Errors that can occur when addressing an existing session
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No active session has this PIN
    ///
    /// Recoverable: the client surfaces a dismissable message and stays
    /// on the join screen.
    #[error("no active session with this pin")]
    NotFound,
}

/// All currently active sessions
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<Pin, Session>,
}

impl Registry {
    /// Creates a new session and returns its PIN
    ///
    /// Validates the quiz and options, then generates random PINs until
    /// one does not collide with an active session. An existing session
    /// is never overwritten.
    ///
    /// # Errors
    ///
    /// * `CreateError::Invalid` - the quiz or options failed validation
    /// * `CreateError::PinsExhausted` - no unused PIN found within the
    ///   attempt limit
    pub fn create(&mut self, quiz: Quiz, options: Options, host: Id) -> Result<Pin, CreateError> {
        quiz.validate()?;
        options.validate()?;

        let pin = (0..MAX_PIN_ATTEMPTS)
            .map(|_| Pin::new())
            .find(|pin| !self.sessions.contains_key(pin))
            .ok_or(CreateError::PinsExhausted)?;

        self.sessions.insert(pin, Session::new(quiz, options, host));
        Ok(pin)
    }

    /// Looks up a session by PIN
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown or already-ended PIN.
    pub fn session(&self, pin: Pin) -> Result<&Session, Error> {
        self.sessions.get(&pin).ok_or(Error::NotFound)
    }

    /// Looks up a session by PIN for command dispatch
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown or already-ended PIN.
    pub fn session_mut(&mut self, pin: Pin) -> Result<&mut Session, Error> {
        self.sessions.get_mut(&pin).ok_or(Error::NotFound)
    }

    /// Ends a session: announces the closure and drops it
    ///
    /// Every connected participant observes the terminal message and a
    /// closed tunnel; the PIN becomes available for reuse.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown or already-ended PIN.
    pub fn end<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        pin: Pin,
        tunnel_finder: F,
    ) -> Result<(), Error> {
        let session = self.sessions.remove(&pin).ok_or(Error::NotFound)?;
        session.close(tunnel_finder);
        Ok(())
    }

    /// Returns the number of active sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Checks whether any session is active
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
