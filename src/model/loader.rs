use super::SentimentModel;
use super::classifier::{ClassifierHeadConfig, DistilBertClassifier};
use super::tokenizer::Preprocessor;
use super::types::{EncodedInput, Sentiment};
use crate::{
    Error, Result,
    assets::{CONFIG_FILE, FetchReport, VOCAB_FILE, WEIGHTS_FILE},
};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::distilbert::Config as DistilBertConfig;
use std::path::Path;
use tracing::{info, warn};

/// Classifier and tokenizer loaded once at startup and shared read-only.
pub struct SentimentClassifier {
    preprocessor: Preprocessor,
    model: DistilBertClassifier,
}

impl SentimentClassifier {
    /// Load from a directory populated by the asset fetcher.
    ///
    /// The fetch report decides which failed downloads are fatal: a required
    /// artifact that failed and has no copy on disk aborts the load, anything
    /// else is logged and the load carries on.
    pub fn load(model_dir: &Path, report: &FetchReport) -> Result<Self> {
        check_fetch_report(report)?;

        let config_path = model_dir.join(CONFIG_FILE);
        let weights_path = model_dir.join(WEIGHTS_FILE);
        for required in [&config_path, &weights_path, &model_dir.join(VOCAB_FILE)] {
            if !required.exists() {
                return Err(Error::missing_artifact(
                    required.display().to_string(),
                    format!("not found in {}", model_dir.display()),
                ));
            }
        }

        let config_str = std::fs::read_to_string(&config_path)?;
        let backbone_config: DistilBertConfig = serde_json::from_str(&config_str)
            .map_err(|e| Error::model(format!("invalid {}: {}", config_path.display(), e)))?;
        let head_config: ClassifierHeadConfig = serde_json::from_str(&config_str)
            .map_err(|e| Error::model(format!("invalid {}: {}", config_path.display(), e)))?;
        head_config.validate()?;

        let device = Device::Cpu;
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)? };
        let model = DistilBertClassifier::load(vb, &backbone_config, &head_config)?;

        let preprocessor = Preprocessor::load(model_dir)?;

        info!(
            dim = head_config.dim,
            model = %weights_path.display(),
            "loaded sentiment classifier"
        );
        Ok(Self {
            preprocessor,
            model,
        })
    }

    pub fn encode(&self, text: &str) -> Result<EncodedInput> {
        self.preprocessor.encode(text)
    }

    pub fn predict(&self, encoded: &EncodedInput) -> Result<Sentiment> {
        self.model.predict(encoded)
    }
}

impl SentimentModel for SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let encoded = self.encode(text)?;
        self.predict(&encoded)
    }
}

fn check_fetch_report(report: &FetchReport) -> Result<()> {
    for outcome in report.failures() {
        let artifact = &outcome.artifact;
        let reason = outcome.result.as_ref().err().cloned().unwrap_or_default();

        if artifact.local_path.exists() {
            warn!(
                "Fetching {} failed ({}), using the copy already at {}",
                artifact.remote_key,
                reason,
                artifact.local_path.display()
            );
        } else if artifact.required {
            return Err(Error::missing_artifact(artifact.file_name(), reason));
        } else {
            warn!(
                "Optional artifact {} unavailable ({}), falling back to defaults",
                artifact.remote_key, reason
            );
        }
    }
    Ok(())
}
