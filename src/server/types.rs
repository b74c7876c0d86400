use crate::analysis::{Analysis, EMPTY_INPUT_PROMPT};
use serde::{Deserialize, Serialize};

/// Body of the HTML form post.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalyzeResponse {
    Empty { message: String },
    Label { label: String, class_index: u32 },
}

impl From<Analysis> for AnalyzeResponse {
    fn from(analysis: Analysis) -> Self {
        match analysis {
            Analysis::Empty => Self::Empty {
                message: EMPTY_INPUT_PROMPT.to_string(),
            },
            Analysis::Label(sentiment) => Self::Label {
                label: sentiment.label().to_string(),
                class_index: sentiment.class_index(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
