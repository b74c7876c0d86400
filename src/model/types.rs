use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Every encoding is padded or truncated to exactly this many positions.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// Number of classes the fine-tuned head scores.
pub const NUM_CLASSES: usize = 2;

/// Binary sentiment. Class 1 is positive and class 0 negative, following the
/// label order the classifier was fine-tuned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    pub fn from_class_index(index: u32) -> Result<Self> {
        match index {
            0 => Ok(Self::Negative),
            1 => Ok(Self::Positive),
            other => Err(Error::model(format!(
                "class index {other} outside the two sentiment classes"
            ))),
        }
    }

    pub fn class_index(self) -> u32 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Token ids and attention mask for a single input, always `MAX_SEQUENCE_LENGTH` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl EncodedInput {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Positions holding real tokens (including `[CLS]`/`[SEP]`), i.e. not padding.
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}
