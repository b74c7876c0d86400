use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::distilbert::Config as DistilBertConfig;
use sentiment_web::{
    assets::{
        CONFIG_FILE, SPECIAL_TOKENS_FILE, TOKENIZER_CONFIG_FILE, VOCAB_FILE, WEIGHTS_FILE,
        object_key,
    },
    config::{Config, LogsConfig, ModelConfig, ServerConfig, StorageBackend, StorageConfig},
    model::{ClassifierHeadConfig, DistilBertClassifier, Sentiment},
};
use serde_json::{Value, json};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use super::mocks::MockObjectStore;

pub const MODEL_FILES: [&str; 5] = [
    CONFIG_FILE,
    WEIGHTS_FILE,
    SPECIAL_TOKENS_FILE,
    TOKENIZER_CONFIG_FILE,
    VOCAB_FILE,
];

/// Word-level vocabulary small enough to reason about ids by hand.
pub const VOCAB: [&str; 16] = [
    "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "i", "love", "this", "!", "hate", "movie",
    "great", "terrible", "the", "was", "it",
];

pub const PAD_ID: u32 = 0;
pub const CLS_ID: u32 = 2;
pub const SEP_ID: u32 = 3;

const DIM: usize = 8;

/// `config.json` for a one-layer DistilBERT with an 8-wide hidden state.
pub fn tiny_config_json() -> Value {
    json!({
        "architectures": ["DistilBertForSequenceClassification"],
        "model_type": "distilbert",
        "vocab_size": VOCAB.len(),
        "dim": DIM,
        "n_layers": 1,
        "n_heads": 2,
        "hidden_dim": 16,
        "activation": "gelu",
        "dropout": 0.1,
        "attention_dropout": 0.1,
        "seq_classif_dropout": 0.2,
        "max_position_embeddings": 512,
        "initializer_range": 0.02,
        "pad_token_id": 0,
        "sinusoidal_pos_embds": false,
        "id2label": { "0": "NEGATIVE", "1": "POSITIVE" },
        "label2id": { "NEGATIVE": 0, "POSITIVE": 1 }
    })
}

/// Writes a complete model directory with random weights.
///
/// With `bias` set, the classifier weights are zeroed and its bias pushed
/// towards that class, so every input gets the same label.
pub fn write_tiny_model(dir: &Path, bias: Option<Sentiment>) {
    std::fs::create_dir_all(dir).unwrap();

    let config = tiny_config_json();
    std::fs::write(dir.join(CONFIG_FILE), config.to_string()).unwrap();
    std::fs::write(dir.join(VOCAB_FILE), VOCAB.join("\n") + "\n").unwrap();
    std::fs::write(
        dir.join(TOKENIZER_CONFIG_FILE),
        json!({ "do_lower_case": true, "model_max_length": 512, "tokenize_chinese_chars": true })
            .to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.join(SPECIAL_TOKENS_FILE),
        json!({
            "unk_token": "[UNK]",
            "sep_token": "[SEP]",
            "pad_token": "[PAD]",
            "cls_token": "[CLS]",
            "mask_token": "[MASK]"
        })
        .to_string(),
    )
    .unwrap();

    let device = Device::Cpu;
    let mut varmap = VarMap::new();
    {
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let backbone: DistilBertConfig = serde_json::from_value(config.clone()).unwrap();
        let head: ClassifierHeadConfig = serde_json::from_value(config).unwrap();
        DistilBertClassifier::load(vb, &backbone, &head).unwrap();
    }

    if let Some(sentiment) = bias {
        let logits: [f32; 2] = match sentiment {
            Sentiment::Negative => [5.0, -5.0],
            Sentiment::Positive => [-5.0, 5.0],
        };
        varmap
            .set_one(
                "classifier.weight",
                Tensor::zeros((2, DIM), DType::F32, &device).unwrap(),
            )
            .unwrap();
        varmap
            .set_one("classifier.bias", Tensor::new(&logits, &device).unwrap())
            .unwrap();
    }

    varmap.save(dir.join(WEIGHTS_FILE)).unwrap();
}

/// A temp dir holding a tiny model under `sentiment_model/`.
pub fn tiny_model_dir(bias: Option<Sentiment>) -> TempDir {
    let temp_dir = create_temp_dir();
    write_tiny_model(&temp_dir.path().join("sentiment_model"), bias);
    temp_dir
}

/// A mock bucket serving the files of `model_dir` under `prefix/`.
pub fn mock_store_with_model(model_dir: &Path, prefix: &str) -> MockObjectStore {
    MODEL_FILES
        .iter()
        .fold(MockObjectStore::new(), |store, file| {
            let bytes = std::fs::read(model_dir.join(file)).unwrap();
            store.with_object(&object_key(prefix, file), bytes)
        })
}

/// Create a test configuration with sensible defaults
pub fn create_test_config(model_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        storage: StorageConfig {
            enabled: false,
            backend: StorageBackend::Http,
            bucket: "test-bucket".to_string(),
            prefix: "sentiment_model".to_string(),
            region: None,
            profile: None,
            endpoint: Some("http://localhost:9000".to_string()),
        },
        model: ModelConfig {
            dir: model_dir.to_string_lossy().to_string(),
        },
    }
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// `n` whitespace-separated in-vocabulary words.
pub fn long_text(n: usize) -> String {
    vec!["love"; n].join(" ")
}

pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 8081
  logs:
    level: "debug"

storage:
  backend: "http"
  bucket: "sentimentanalysiskaran"
  prefix: "sentiment_model"
  endpoint: "https://s3.eu-west-1.amazonaws.com"

model:
  dir: "/tmp/sentiment_model"
"#;

pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"
"#;

/// Collects formatted log lines so tests can assert on what was logged.
///
/// Install with `tracing::subscriber::set_default(logs.subscriber())`; the
/// guard only covers the current thread, which is enough for `tokio::test`.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Lines logged at `level` (e.g. `"WARN"`) that mention `needle`.
    pub fn lines_at(&self, level: &str, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(level) && line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
