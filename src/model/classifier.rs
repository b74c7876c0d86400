use super::types::{EncodedInput, NUM_CLASSES, Sentiment};
use crate::{Error, Result};
use candle_core::{D, Device, IndexOp, Module, Tensor};
use candle_nn::{Linear, VarBuilder, linear};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use serde::Deserialize;
use std::collections::HashMap;

/// Fields of `config.json` the classification head needs. The same file is
/// also parsed into the backbone's own config.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierHeadConfig {
    pub dim: usize,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

impl ClassifierHeadConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.id2label.is_empty() && self.id2label.len() != NUM_CLASSES {
            let mut labels: Vec<&str> = self.id2label.values().map(String::as_str).collect();
            labels.sort_unstable();
            return Err(Error::model(format!(
                "expected a {}-class head, config declares {}: {}",
                NUM_CLASSES,
                self.id2label.len(),
                labels.join(", ")
            )));
        }
        Ok(())
    }
}

/// DistilBERT with the sequence-classification head: `[CLS]` hidden state →
/// `pre_classifier` → ReLU → `classifier` → two logits.
///
/// Weights are plain tensors, never variables, so nothing is tracked for
/// gradients; DistilBERT applies no dropout at inference.
pub struct DistilBertClassifier {
    backbone: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    device: Device,
}

impl DistilBertClassifier {
    pub fn load(
        vb: VarBuilder,
        config: &DistilBertConfig,
        head: &ClassifierHeadConfig,
    ) -> Result<Self> {
        let backbone = DistilBertModel::load(vb.pp("distilbert"), config)?;
        let pre_classifier = linear(head.dim, head.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(head.dim, NUM_CLASSES, vb.pp("classifier"))?;

        Ok(Self {
            backbone,
            pre_classifier,
            classifier,
            device: vb.device().clone(),
        })
    }

    /// Raw class scores, shape `(1, 2)`.
    pub fn logits(&self, encoded: &EncodedInput) -> Result<Tensor> {
        let seq_len = encoded.len();
        let input_ids = Tensor::new(encoded.input_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        // The backbone fills scores with -inf wherever the mask is non-zero,
        // so the mask marks padding rather than real tokens.
        let padding: Vec<u8> = encoded
            .attention_mask
            .iter()
            .map(|&m| u8::from(m == 0))
            .collect();
        let mask = Tensor::from_vec(padding, (1, 1, 1, seq_len), &self.device)?;

        let hidden = self.backbone.forward(&input_ids, &mask)?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&cls)?.relu()?;
        Ok(self.classifier.forward(&pooled)?)
    }

    pub fn predict(&self, encoded: &EncodedInput) -> Result<Sentiment> {
        let logits = self.logits(encoded)?;
        let class_index = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;
        Sentiment::from_class_index(class_index)
    }
}
