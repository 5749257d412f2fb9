//! Sentence embedding backends behind the [`Embedder`] seam.
//!
//! The real backend runs a local MiniLM BERT checkpoint on candle; the fake
//! backend hashes tokens into a deterministic unit vector and exists so the
//! whole pipeline can be exercised hermetically (`APP_USE_FAKE_EMBEDDINGS=1`).

pub mod device;
pub mod pool;
pub mod tokenize;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

pub use subdex_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::{l2_normalize, masked_mean};
use crate::tokenize::tokenize_on_device;

/// Sequence length every subject is truncated or padded to. Subjects are
/// short phrases; 256 leaves generous headroom.
const MAX_LEN: usize = 256;

/// MiniLM-class sentence encoder loaded from a local model directory
/// containing `tokenizer.json`, `config.json` and `pytorch_model.bin`.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    hidden_size: usize,
}

impl BertEmbedder {
    pub fn new(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading sentence encoder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let hidden_size = config.hidden_size;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;

        info!(hidden_size, "sentence encoder ready");
        Ok(Self { model, tokenizer, device, hidden_size })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize_on_device(&self.tokenizer, text, MAX_LEN, &self.device)?;
        let token_type_ids = Tensor::zeros((1, MAX_LEN), DType::U32, &self.device)?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean(&hidden, &attention_mask)?;
        let normalized = l2_normalize(&pooled)?;

        let vector: Vec<f32> = normalized.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        debug_assert_eq!(vector.len(), self.hidden_size);
        Ok(vector)
    }
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize {
        self.hidden_size
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

/// Deterministic stand-in for the model: each whitespace token is hashed to
/// one coordinate, then the vector is L2-normalized. Same input, same
/// vector, on every platform.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let mut v = vec![0f32; self.dim];
            for (i, token) in text.split_whitespace().enumerate() {
                let mut hasher = XxHash64::with_seed(0);
                token.hash(&mut hasher);
                let h = hasher.finish();
                let idx = (h as usize) % self.dim;
                let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
                v[idx] += val + (i as f32 % 3.0) * 0.01;
            }
            let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
            for x in &mut v {
                *x /= norm;
            }
            out.push(v);
        }
        Ok(out)
    }
}

/// Embedding dimension of the default MiniLM checkpoint, and of the fake
/// embedder that stands in for it.
pub const DEFAULT_DIM: usize = 384;

/// Build the process-wide embedder. `APP_USE_FAKE_EMBEDDINGS=1` selects the
/// deterministic fake; otherwise the local model directory is resolved and
/// loaded, and a failure there is fatal to the caller since nothing
/// downstream can proceed without embeddings.
pub fn default_embedder() -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(DEFAULT_DIM)));
    }
    Ok(Box::new(BertEmbedder::new(&resolve_model_dir()?)?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            debug!(dir = %p.display(), "using APP_MODEL_DIR");
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            debug!(dir = %p.display(), "using MODEL_DIR");
            return Ok(p);
        }
    }
    let conventional = Path::new("models/all-minilm-l6-v2");
    if conventional.exists() {
        return Ok(conventional.to_path_buf());
    }
    Err(anyhow!(
        "Could not locate the sentence-encoder model directory; set APP_MODEL_DIR or place the checkpoint under models/all-minilm-l6-v2"
    ))
}
