use crate::{Error, Result};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Validating,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisEvent {
    /// The user pressed "Analyze".
    Trigger,
    InputEmpty,
    InputAccepted,
    /// The label was produced and handed to the renderer.
    Rendered,
    Failed,
}

/// Lifecycle of a single trigger: `Idle → Validating → (Idle | Running → Idle)`.
pub struct AnalysisStateMachine {
    state: AnalysisState,
}

impl AnalysisStateMachine {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
        }
    }

    pub fn current_state(&self) -> AnalysisState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == AnalysisState::Idle
    }

    pub fn transition(&mut self, event: AnalysisEvent) -> Result<()> {
        let new_state = match (self.state, event) {
            (AnalysisState::Idle, AnalysisEvent::Trigger) => AnalysisState::Validating,
            (AnalysisState::Validating, AnalysisEvent::InputEmpty) => AnalysisState::Idle,
            (AnalysisState::Validating, AnalysisEvent::InputAccepted) => AnalysisState::Running,
            (AnalysisState::Running, AnalysisEvent::Rendered) => AnalysisState::Idle,
            (AnalysisState::Running, AnalysisEvent::Failed) => AnalysisState::Idle,
            _ => {
                warn!(
                    "Invalid analysis transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", self.state),
                    requested: format!("{:?}", event),
                });
            }
        };

        debug!(
            "Analysis state {:?} -> {:?} (event: {:?})",
            self.state, new_state, event
        );
        self.state = new_state;
        Ok(())
    }
}

impl Default for AnalysisStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
