use super::fsm::{AnalysisEvent, AnalysisStateMachine};
use crate::{
    Result,
    model::{Sentiment, SentimentModel},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Shown instead of a label when there is nothing to analyze.
pub const EMPTY_INPUT_PROMPT: &str = "Please enter some text.";

/// Result of one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Analysis {
    /// Input was empty or whitespace; the model was not called.
    Empty,
    Label(Sentiment),
}

impl Analysis {
    pub fn sentiment(&self) -> Option<Sentiment> {
        match self {
            Self::Empty => None,
            Self::Label(sentiment) => Some(*sentiment),
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn SentimentModel>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    /// Runs the pipeline at most once. Inference errors are returned as-is;
    /// there is no retry.
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        let mut fsm = AnalysisStateMachine::new();
        fsm.transition(AnalysisEvent::Trigger)?;

        if text.trim().is_empty() {
            fsm.transition(AnalysisEvent::InputEmpty)?;
            info!("Empty input, skipping inference");
            return Ok(Analysis::Empty);
        }

        fsm.transition(AnalysisEvent::InputAccepted)?;
        match self.model.classify(text) {
            Ok(sentiment) => {
                fsm.transition(AnalysisEvent::Rendered)?;
                info!(
                    label = sentiment.label(),
                    chars = text.chars().count(),
                    "Analysis complete"
                );
                Ok(Analysis::Label(sentiment))
            }
            Err(e) => {
                fsm.transition(AnalysisEvent::Failed)?;
                error!("Inference failed: {}", e);
                Err(e)
            }
        }
    }
}
