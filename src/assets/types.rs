use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const SPECIAL_TOKENS_FILE: &str = "special_tokens_map.json";
pub const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
pub const VOCAB_FILE: &str = "vocab.txt";

/// One remote object and where it lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub remote_key: String,
    pub local_path: PathBuf,
    /// Whether the model cannot be loaded without this file.
    pub required: bool,
}

impl Artifact {
    pub fn new(
        remote_key: impl Into<String>,
        local_path: impl Into<PathBuf>,
        required: bool,
    ) -> Self {
        Self {
            remote_key: remote_key.into(),
            local_path: local_path.into(),
            required,
        }
    }

    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.remote_key.clone())
    }
}

/// The five files a fine-tuned DistilBERT classifier is published as.
pub fn model_artifacts(prefix: &str, model_dir: &Path) -> Vec<Artifact> {
    [
        (CONFIG_FILE, true),
        (WEIGHTS_FILE, true),
        (SPECIAL_TOKENS_FILE, false),
        (TOKENIZER_CONFIG_FILE, false),
        (VOCAB_FILE, true),
    ]
    .into_iter()
    .map(|(file, required)| {
        Artifact::new(object_key(prefix, file), model_dir.join(file), required)
    })
    .collect()
}

pub fn object_key(prefix: &str, file: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file.to_string()
    } else {
        format!("{prefix}/{file}")
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub artifact: Artifact,
    /// Bytes written on success, the failure reason otherwise.
    pub result: std::result::Result<u64, String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-artifact results of one fetch pass. Empty when fetching was skipped.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(FetchOutcome::is_success)
    }

    pub fn outcome_for(&self, remote_key: &str) -> Option<&FetchOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.artifact.remote_key == remote_key)
    }
}
