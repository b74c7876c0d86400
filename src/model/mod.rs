//! Local inference: tokenizer, DistilBERT classifier and the loader that ties them together.

mod classifier;
mod loader;
mod tokenizer;
mod types;

pub use classifier::{ClassifierHeadConfig, DistilBertClassifier};
pub use loader::SentimentClassifier;
pub use tokenizer::Preprocessor;
pub use types::*;

use crate::Result;

/// Text in, sentiment out. Implementations must be safe to call from several
/// requests at once without mutating shared state.
pub trait SentimentModel: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment>;
}
