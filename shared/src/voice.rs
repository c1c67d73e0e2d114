//! Voice input session state machine.
//!
//! `Idle -> Listening -> Idle` on a final result, end of speech or `stop()`,
//! and `Listening -> ErrorReported -> Idle` on an engine error. Engine
//! signals are tagged with the session they belong to; anything for a
//! session that is no longer current, or arriving after disposal, is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::capabilities::SpeechSignal;
use crate::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Random, so a session from a previous screen can never collide with
    /// one from the current screen.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().as_u64_pair().0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice-{:016x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoicePhase {
    #[default]
    Idle,
    Listening {
        session: SessionId,
        locale: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceStartError {
    #[error("a voice session is already listening")]
    AlreadyListening,
    #[error("voice input has been disposed")]
    Disposed,
}

/// What a signal did to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceTransition {
    Started,
    Partial,
    /// Final result; forward it to the query field. Emitted once per session.
    Transcript(String),
    Ended,
    ErrorReported(CatalogError),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoiceController {
    phase: VoicePhase,
    engine_started: bool,
    partial: Option<String>,
    last_error: Option<CatalogError>,
    disposed: bool,
}

impl VoiceController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, locale: &str) -> Result<SessionId, VoiceStartError> {
        if self.disposed {
            return Err(VoiceStartError::Disposed);
        }
        if let VoicePhase::Listening { session, .. } = &self.phase {
            debug!(%session, "voice: start rejected, already listening");
            return Err(VoiceStartError::AlreadyListening);
        }

        let session = SessionId::generate();
        self.phase = VoicePhase::Listening {
            session,
            locale: locale.to_string(),
        };
        self.engine_started = false;
        self.partial = None;
        self.last_error = None;

        info!(%session, locale, "voice: listening");
        Ok(session)
    }

    /// User cancelled. Returns the session that was stopped, if any; late
    /// results from it are discarded.
    pub fn stop(&mut self) -> Option<SessionId> {
        match std::mem::take(&mut self.phase) {
            VoicePhase::Listening { session, .. } => {
                info!(%session, "voice: stopped by user");
                self.engine_started = false;
                self.partial = None;
                Some(session)
            }
            VoicePhase::Idle => None,
        }
    }

    pub fn handle(&mut self, session: SessionId, signal: SpeechSignal) -> VoiceTransition {
        if self.disposed || self.current_session() != Some(session) {
            debug!(%session, ?signal, "voice: ignoring signal for inactive session");
            return VoiceTransition::Ignored;
        }

        match signal {
            SpeechSignal::Started => {
                self.engine_started = true;
                VoiceTransition::Started
            }
            SpeechSignal::PartialResults(alternatives) => {
                self.partial = SpeechSignal::best_alternative(&alternatives).map(str::to_string);
                VoiceTransition::Partial
            }
            SpeechSignal::Results(alternatives) => {
                let transcript = SpeechSignal::best_alternative(&alternatives).map(str::to_string);
                self.finish();
                match transcript {
                    Some(text) => {
                        info!(%session, "voice: final result");
                        VoiceTransition::Transcript(text)
                    }
                    None => {
                        debug!(%session, "voice: final result was empty");
                        VoiceTransition::Ended
                    }
                }
            }
            SpeechSignal::Ended => {
                self.finish();
                VoiceTransition::Ended
            }
            SpeechSignal::StartFailed(error) => {
                warn!(%session, code = ?error.code, message = %error.message, "voice: engine failed to start");
                self.report(CatalogError::VoiceStart(error))
            }
            SpeechSignal::Error(error) => {
                warn!(%session, code = ?error.code, message = %error.message, "voice: engine error");
                self.report(CatalogError::VoiceEngine(error))
            }
        }
    }

    /// Tears the controller down. Returns `true` the first time, when the
    /// engine still has to be released.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        info!(listening = self.is_listening(), "voice: disposing");
        self.finish();
        self.disposed = true;
        true
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.phase, VoicePhase::Listening { .. })
    }

    pub fn engine_started(&self) -> bool {
        self.engine_started
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn phase(&self) -> &VoicePhase {
        &self.phase
    }

    pub fn current_session(&self) -> Option<SessionId> {
        match &self.phase {
            VoicePhase::Listening { session, .. } => Some(*session),
            VoicePhase::Idle => None,
        }
    }

    pub fn partial_transcript(&self) -> Option<&str> {
        self.partial.as_deref()
    }

    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    fn report(&mut self, error: CatalogError) -> VoiceTransition {
        self.finish();
        self.last_error = Some(error.clone());
        VoiceTransition::ErrorReported(error)
    }

    fn finish(&mut self) {
        self.phase = VoicePhase::Idle;
        self.engine_started = false;
        self.partial = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::VoiceError;

    fn results(text: &str) -> SpeechSignal {
        SpeechSignal::Results(vec![text.to_string()])
    }

    #[test]
    fn start_enters_listening() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        assert!(voice.is_listening());
        assert_eq!(voice.current_session(), Some(session));
        assert_eq!(voice.handle(session, SpeechSignal::Started), VoiceTransition::Started);
        assert!(voice.engine_started());
    }

    #[test]
    fn second_start_rejected_while_listening() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        assert_eq!(voice.start("en-US"), Err(VoiceStartError::AlreadyListening));
        assert_eq!(voice.current_session(), Some(session));
    }

    #[test]
    fn final_result_emits_once_and_returns_to_idle() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        voice.handle(session, SpeechSignal::Started);

        assert_eq!(
            voice.handle(session, results("arya")),
            VoiceTransition::Transcript("arya".into())
        );
        assert!(!voice.is_listening());

        assert_eq!(voice.handle(session, results("arya")), VoiceTransition::Ignored);
        assert_eq!(voice.handle(session, SpeechSignal::Ended), VoiceTransition::Ignored);
    }

    #[test]
    fn can_start_again_after_result() {
        let mut voice = VoiceController::new();
        let first = voice.start("en-US").unwrap();
        voice.handle(first, results("jon"));
        let second = voice.start("en-US").unwrap();
        assert_ne!(first, second);
        assert_eq!(voice.handle(first, results("late")), VoiceTransition::Ignored);
        assert!(voice.is_listening());
    }

    #[test]
    fn partial_results_are_tracked_not_emitted() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        let transition = voice.handle(
            session,
            SpeechSignal::PartialResults(vec!["ar".into(), "are".into()]),
        );
        assert_eq!(transition, VoiceTransition::Partial);
        assert_eq!(voice.partial_transcript(), Some("ar"));
        assert!(voice.is_listening());
    }

    #[test]
    fn empty_result_ends_without_transcript() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        assert_eq!(
            voice.handle(session, SpeechSignal::Results(vec![])),
            VoiceTransition::Ended
        );
        assert!(!voice.is_listening());
    }

    #[test]
    fn error_is_reported_then_idle() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        let error = VoiceError::new("No speech input").with_code("6");
        let reported = CatalogError::VoiceEngine(error.clone());
        assert_eq!(
            voice.handle(session, SpeechSignal::Error(error)),
            VoiceTransition::ErrorReported(reported.clone())
        );
        assert!(!voice.is_listening());
        assert_eq!(voice.last_error(), Some(&reported));

        voice.start("en-US").unwrap();
        assert!(voice.last_error().is_none());
    }

    #[test]
    fn start_failure_is_reported_distinctly() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        let error = VoiceError::new("Microphone permission denied");
        assert_eq!(
            voice.handle(session, SpeechSignal::StartFailed(error.clone())),
            VoiceTransition::ErrorReported(CatalogError::VoiceStart(error))
        );
        assert!(!voice.is_listening());
        assert_eq!(
            voice.last_error().map(CatalogError::user_facing_message).as_deref(),
            Some("Failed to start voice recognition: Microphone permission denied")
        );
    }

    #[test]
    fn stop_discards_late_results() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        assert_eq!(voice.stop(), Some(session));
        assert!(!voice.is_listening());
        assert_eq!(voice.handle(session, results("late")), VoiceTransition::Ignored);
        assert_eq!(voice.stop(), None);
    }

    #[test]
    fn dispose_during_session_ignores_late_events() {
        let mut voice = VoiceController::new();
        let session = voice.start("en-US").unwrap();
        assert!(voice.dispose());
        let snapshot = voice.clone();

        assert_eq!(voice.handle(session, results("late")), VoiceTransition::Ignored);
        assert_eq!(
            voice.handle(session, SpeechSignal::Error(VoiceError::new("late"))),
            VoiceTransition::Ignored
        );
        assert_eq!(voice, snapshot);
        assert_eq!(voice.start("en-US"), Err(VoiceStartError::Disposed));
    }

    #[test]
    fn dispose_is_idempotent_and_works_when_idle() {
        let mut voice = VoiceController::new();
        assert!(voice.dispose());
        assert!(!voice.dispose());
        assert!(voice.is_disposed());
    }
}
