mod executor;
pub mod fsm;

pub use executor::{Analysis, Analyzer, EMPTY_INPUT_PROMPT};
pub use fsm::{AnalysisEvent, AnalysisState, AnalysisStateMachine};
