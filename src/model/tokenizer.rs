use super::types::{EncodedInput, MAX_SEQUENCE_LENGTH};
use crate::{
    Error, Result,
    assets::{SPECIAL_TOKENS_FILE, TOKENIZER_CONFIG_FILE, VOCAB_FILE},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Special tokens appear either as plain strings or as added-token objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SpecialToken {
    Plain(String),
    Added { content: String },
}

impl SpecialToken {
    fn content(&self) -> &str {
        match self {
            Self::Plain(s) => s,
            Self::Added { content } => content,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SpecialTokens {
    unk_token: Option<SpecialToken>,
    sep_token: Option<SpecialToken>,
    pad_token: Option<SpecialToken>,
    cls_token: Option<SpecialToken>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenizerConfigJson {
    do_lower_case: Option<bool>,
    strip_accents: Option<bool>,
    tokenize_chinese_chars: Option<bool>,
    #[serde(flatten)]
    special: SpecialTokens,
}

/// Resolved special token, with its id in the vocabulary.
#[derive(Debug, Clone)]
struct Token {
    text: String,
    id: u32,
}

/// Turns raw text into a fixed-length `[CLS] … [SEP] [PAD]…` encoding.
pub struct Preprocessor {
    tokenizer: Tokenizer,
}

impl Preprocessor {
    /// Build a WordPiece tokenizer from `vocab.txt`, taking casing and special
    /// tokens from `tokenizer_config.json` and `special_tokens_map.json` when present.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let vocab_path = model_dir.join(VOCAB_FILE);
        let tokenizer_config: TokenizerConfigJson =
            read_optional_json(&model_dir.join(TOKENIZER_CONFIG_FILE))?;
        let special_map: SpecialTokens =
            read_optional_json(&model_dir.join(SPECIAL_TOKENS_FILE))?;

        let pick = |from_map: &Option<SpecialToken>,
                    from_config: &Option<SpecialToken>,
                    default: &str| {
            from_map
                .as_ref()
                .or(from_config.as_ref())
                .map(|t| t.content().to_string())
                .unwrap_or_else(|| default.to_string())
        };
        let special = &tokenizer_config.special;
        let unk = pick(&special_map.unk_token, &special.unk_token, "[UNK]");
        let sep = pick(&special_map.sep_token, &special.sep_token, "[SEP]");
        let pad = pick(&special_map.pad_token, &special.pad_token, "[PAD]");
        let cls = pick(&special_map.cls_token, &special.cls_token, "[CLS]");

        let vocab_str = vocab_path.to_str().ok_or_else(|| {
            Error::tokenization(format!("non UTF-8 path: {}", vocab_path.display()))
        })?;
        let wordpiece = WordPiece::from_file(vocab_str)
            .unk_token(unk)
            .build()
            .map_err(|e| {
                Error::tokenization(format!(
                    "Failed to read vocabulary '{}': {}",
                    vocab_path.display(),
                    e
                ))
            })?;

        let mut tokenizer = Tokenizer::new(wordpiece);

        let lowercase = tokenizer_config.do_lower_case.unwrap_or(true);
        tokenizer.with_normalizer(Some(BertNormalizer::new(
            true,
            tokenizer_config.tokenize_chinese_chars.unwrap_or(true),
            tokenizer_config.strip_accents,
            lowercase,
        )));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

        let sep = resolve(&tokenizer, sep)?;
        let cls = resolve(&tokenizer, cls)?;
        let pad = resolve(&tokenizer, pad)?;

        tokenizer.with_post_processor(Some(BertProcessing::new(
            (sep.text, sep.id),
            (cls.text, cls.id),
        )));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| Error::tokenization(format!("set truncation: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(MAX_SEQUENCE_LENGTH),
            pad_id: pad.id,
            pad_token: pad.text,
            ..Default::default()
        }));

        info!(
            vocab_size = tokenizer.get_vocab_size(true),
            lowercase,
            vocab = %vocab_path.display(),
            "loaded tokenizer"
        );
        Ok(Self { tokenizer })
    }

    pub fn encode(&self, text: &str) -> Result<EncodedInput> {
        let encoding = self.tokenizer.encode(text, true).map_err(|e| {
            Error::tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let encoded = EncodedInput {
            input_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
        };
        debug!(tokens = encoded.token_count(), "encoded input");

        if encoded.len() != MAX_SEQUENCE_LENGTH {
            return Err(Error::tokenization(format!(
                "expected {} positions, tokenizer produced {}",
                MAX_SEQUENCE_LENGTH,
                encoded.len()
            )));
        }
        Ok(encoded)
    }
}

fn resolve(tokenizer: &Tokenizer, text: String) -> Result<Token> {
    let id = tokenizer.token_to_id(&text).ok_or_else(|| {
        Error::tokenization(format!("special token '{text}' missing from vocabulary"))
    })?;
    Ok(Token { text, id })
}

fn read_optional_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        debug!("{} not present, using defaults", path.display());
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
