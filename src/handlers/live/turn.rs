//! Explicit turn state for one relay session.

use parking_lot::Mutex;

/// Conversation turn state.
///
/// Lives implicitly in the ordering of relay events; it is kept explicit
/// here so both sides of the relay agree on whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// No turn in progress
    #[default]
    Idle,
    /// The client is streaming audio or text
    UserTurnOpen,
    /// The backend is emitting audio or text
    ModelTurnOpen,
    /// A model turn was interrupted; awaiting acknowledgement to the client
    Interrupted,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Idle => write!(f, "idle"),
            TurnState::UserTurnOpen => write!(f, "user_turn_open"),
            TurnState::ModelTurnOpen => write!(f, "model_turn_open"),
            TurnState::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Shared turn tracker. The inbound router drives the user-side transitions,
/// the event state machine drives the model-side ones.
#[derive(Default)]
pub struct TurnTracker {
    state: Mutex<TurnState>,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TurnState {
        *self.state.lock()
    }

    fn transition(&self, from: &[TurnState], to: TurnState) -> bool {
        let mut state = self.state.lock();
        if from.contains(&state) {
            tracing::debug!(from = %state, to = %to, "turn transition");
            *state = to;
            true
        } else {
            false
        }
    }

    /// First audio or text frame of a user turn.
    pub fn user_input(&self) -> bool {
        self.transition(&[TurnState::Idle], TurnState::UserTurnOpen)
    }

    /// The user turn was committed (sentinel processed or text turn sent).
    pub fn user_commit(&self) -> bool {
        self.transition(&[TurnState::UserTurnOpen], TurnState::Idle)
    }

    /// First output event of a model turn.
    pub fn model_output(&self) -> bool {
        self.transition(
            &[TurnState::Idle, TurnState::UserTurnOpen],
            TurnState::ModelTurnOpen,
        )
    }

    /// The model finished its turn.
    pub fn model_complete(&self) -> bool {
        self.transition(&[TurnState::ModelTurnOpen], TurnState::Idle)
    }

    /// The backend reported an interruption. Valid from any state.
    pub fn interrupt(&self) {
        let mut state = self.state.lock();
        tracing::debug!(from = %state, "turn interrupted");
        *state = TurnState::Interrupted;
    }

    /// The interruption was reported to the client.
    pub fn interrupt_acknowledged(&self) -> bool {
        self.transition(&[TurnState::Interrupted], TurnState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn_cycle() {
        let turns = TurnTracker::new();
        assert_eq!(turns.state(), TurnState::Idle);

        assert!(turns.user_input());
        assert_eq!(turns.state(), TurnState::UserTurnOpen);

        // Subsequent input frames of the same turn are no-ops
        assert!(!turns.user_input());
        assert_eq!(turns.state(), TurnState::UserTurnOpen);

        assert!(turns.user_commit());
        assert_eq!(turns.state(), TurnState::Idle);
    }

    #[test]
    fn test_model_turn_cycle() {
        let turns = TurnTracker::new();

        assert!(turns.model_output());
        assert_eq!(turns.state(), TurnState::ModelTurnOpen);

        assert!(!turns.model_output());

        assert!(turns.model_complete());
        assert_eq!(turns.state(), TurnState::Idle);
    }

    #[test]
    fn test_model_output_during_user_turn() {
        // The backend can start answering before the commit is acknowledged.
        let turns = TurnTracker::new();
        turns.user_input();
        assert!(turns.model_output());
        assert_eq!(turns.state(), TurnState::ModelTurnOpen);
    }

    #[test]
    fn test_interrupt_from_any_state() {
        let from_idle = TurnTracker::new();
        from_idle.interrupt();
        assert_eq!(from_idle.state(), TurnState::Interrupted);
        assert!(from_idle.interrupt_acknowledged());
        assert_eq!(from_idle.state(), TurnState::Idle);

        let from_user = TurnTracker::new();
        from_user.user_input();
        from_user.interrupt();
        assert_eq!(from_user.state(), TurnState::Interrupted);

        let from_model = TurnTracker::new();
        from_model.model_output();
        from_model.interrupt();
        assert_eq!(from_model.state(), TurnState::Interrupted);
        assert!(from_model.interrupt_acknowledged());
        assert_eq!(from_model.state(), TurnState::Idle);
    }

    #[test]
    fn test_commit_without_open_turn_is_noop() {
        let turns = TurnTracker::new();
        assert!(!turns.user_commit());
        assert!(!turns.model_complete());
        assert!(!turns.interrupt_acknowledged());
        assert_eq!(turns.state(), TurnState::Idle);
    }
}
