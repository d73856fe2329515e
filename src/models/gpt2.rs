//! GPT-2 (distilgpt2) text generation implementation.
//!
//! A from-scratch Candle port of the GPT-2 decoder: learned token + position
//! embeddings, pre-norm blocks with causal self-attention, and an LM head tied
//! to the token embedding. Checkpoints store their linear weights in Conv1D
//! layout `[in, out]`, so every projection is transposed on load.

use candle_core::{Device, IndexOp, Result as CandleResult, Tensor, D};
use candle_nn::{embedding, layer_norm, Embedding, LayerNorm, Linear, Module, VarBuilder};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::error::Result;
use crate::loaders::{self, HubFile};
use crate::models::{ModelCache, TextGenerationModel};
use crate::pipelines::text_generation::params::GenerationParams;

/// Hub repository the weights and tokenizer are fetched from.
pub const MODEL_REPO: &str = "distilgpt2";

fn default_layer_norm_epsilon() -> f64 {
    1e-5
}

/// GPT-2 architecture hyperparameters, deserialized from the repository's `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Vocabulary size.
    pub vocab_size: usize,
    /// Maximum number of positions (context length).
    pub n_positions: usize,
    /// Embedding width.
    pub n_embd: usize,
    /// Number of transformer blocks.
    pub n_layer: usize,
    /// Number of attention heads.
    pub n_head: usize,
    /// LayerNorm epsilon.
    #[serde(default = "default_layer_norm_epsilon")]
    pub layer_norm_epsilon: f64,
    /// Beginning-of-sequence token ID.
    #[serde(default)]
    pub bos_token_id: Option<u32>,
    /// End-of-sequence token ID.
    #[serde(default)]
    pub eos_token_id: Option<u32>,
}

// Checkpoint weights use Conv1D layout [in, out]; Linear wants [out, in].
fn linear_from_conv1d(nin: usize, nout: usize, vb: VarBuilder) -> CandleResult<Linear> {
    let weight = vb.get((nin, nout), "weight")?.t()?.contiguous()?;
    let bias = vb.get(nout, "bias")?;
    Ok(Linear::new(weight, Some(bias)))
}

fn causal_mask(t: usize, total: usize, device: &Device) -> CandleResult<Tensor> {
    // Query i (at absolute position offset + i) may attend to keys 0..=offset + i.
    let offset = total - t;
    let mask: Vec<u8> = (0..t)
        .flat_map(|i| (0..total).map(move |j| u8::from(j > offset + i)))
        .collect();
    Tensor::from_vec(mask, (t, total), device)
}

fn masked_fill(on_false: &Tensor, mask: &Tensor, on_true: f32) -> CandleResult<Tensor> {
    let shape = mask.shape();
    let on_true = Tensor::new(on_true, on_false.device())?.broadcast_as(shape.dims())?;
    mask.where_cond(&on_true, on_false)
}

struct Attention {
    c_attn: Linear,
    c_proj: Linear,
    n_head: usize,
    head_dim: usize,
}

impl Attention {
    fn load(cfg: &Config, vb: VarBuilder) -> CandleResult<Self> {
        Ok(Self {
            c_attn: linear_from_conv1d(cfg.n_embd, 3 * cfg.n_embd, vb.pp("c_attn"))?,
            c_proj: linear_from_conv1d(cfg.n_embd, cfg.n_embd, vb.pp("c_proj"))?,
            n_head: cfg.n_head,
            head_dim: cfg.n_embd / cfg.n_head,
        })
    }

    fn forward(&self, x: &Tensor, kv_cache: &mut Option<(Tensor, Tensor)>) -> CandleResult<Tensor> {
        let (b, t, c) = x.dims3()?;

        let qkv = self.c_attn.forward(x)?;
        let q = qkv.narrow(2, 0, c)?;
        let k = qkv.narrow(2, c, c)?;
        let v = qkv.narrow(2, 2 * c, c)?;

        let shape = (b, t, self.n_head, self.head_dim);
        let q = q.reshape(shape)?.transpose(1, 2)?.contiguous()?;
        let k = k.reshape(shape)?.transpose(1, 2)?.contiguous()?;
        let v = v.reshape(shape)?.transpose(1, 2)?.contiguous()?;

        let (k, v) = match kv_cache.take() {
            Some((prev_k, prev_v)) => (
                Tensor::cat(&[&prev_k, &k], 2)?.contiguous()?,
                Tensor::cat(&[&prev_v, &v], 2)?.contiguous()?,
            ),
            None => (k, v),
        };
        *kv_cache = Some((k.clone(), v.clone()));

        let total = k.dim(2)?;
        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let att = (q.matmul(&k.transpose(D::Minus2, D::Minus1)?)? * scale)?;

        // Single-token decode steps attend to the whole cache; no mask needed.
        let att = if t > 1 {
            let mask = causal_mask(t, total, x.device())?.broadcast_as(att.shape())?;
            masked_fill(&att, &mask, f32::NEG_INFINITY)?
        } else {
            att
        };

        let att = candle_nn::ops::softmax_last_dim(&att)?;
        let y = att.matmul(&v)?;
        let y = y.transpose(1, 2)?.reshape((b, t, c))?;
        self.c_proj.forward(&y)
    }
}

struct Mlp {
    c_fc: Linear,
    c_proj: Linear,
}

impl Mlp {
    fn load(cfg: &Config, vb: VarBuilder) -> CandleResult<Self> {
        let hidden = 4 * cfg.n_embd;
        Ok(Self {
            c_fc: linear_from_conv1d(cfg.n_embd, hidden, vb.pp("c_fc"))?,
            c_proj: linear_from_conv1d(hidden, cfg.n_embd, vb.pp("c_proj"))?,
        })
    }

    fn forward(&self, x: &Tensor) -> CandleResult<Tensor> {
        // GPT-2 uses the tanh-approximated gelu ("gelu_new").
        self.c_proj.forward(&self.c_fc.forward(x)?.gelu()?)
    }
}

struct Block {
    ln_1: LayerNorm,
    attn: Attention,
    ln_2: LayerNorm,
    mlp: Mlp,
}

impl Block {
    fn load(cfg: &Config, vb: VarBuilder) -> CandleResult<Self> {
        Ok(Self {
            ln_1: layer_norm(cfg.n_embd, cfg.layer_norm_epsilon, vb.pp("ln_1"))?,
            attn: Attention::load(cfg, vb.pp("attn"))?,
            ln_2: layer_norm(cfg.n_embd, cfg.layer_norm_epsilon, vb.pp("ln_2"))?,
            mlp: Mlp::load(cfg, vb.pp("mlp"))?,
        })
    }

    fn forward(&self, x: &Tensor, kv_cache: &mut Option<(Tensor, Tensor)>) -> CandleResult<Tensor> {
        let x = (x + self.attn.forward(&self.ln_1.forward(x)?, kv_cache)?)?;
        let x = (&x + self.mlp.forward(&self.ln_2.forward(&x)?)?)?;
        Ok(x)
    }
}

struct Weights {
    wte: Embedding,
    wpe: Embedding,
    blocks: Vec<Block>,
    ln_f: LayerNorm,
    lm_head: Linear,
}

impl Weights {
    fn load(cfg: &Config, vb: VarBuilder) -> CandleResult<Self> {
        // Checkpoints exported from the bare decoder keep tensors at the root;
        // LM-head exports nest them under "transformer".
        let vb = if vb.contains_tensor("wte.weight") {
            vb
        } else {
            vb.pp("transformer")
        };

        let wte = embedding(cfg.vocab_size, cfg.n_embd, vb.pp("wte"))?;
        let wpe = embedding(cfg.n_positions, cfg.n_embd, vb.pp("wpe"))?;
        let vb_h = vb.pp("h");
        let blocks = (0..cfg.n_layer)
            .map(|i| Block::load(cfg, vb_h.pp(i)))
            .collect::<CandleResult<Vec<_>>>()?;
        let ln_f = layer_norm(cfg.n_embd, cfg.layer_norm_epsilon, vb.pp("ln_f"))?;

        // The LM head shares its weight matrix with the token embedding.
        let lm_head = Linear::new(wte.embeddings().clone(), None);

        Ok(Self {
            wte,
            wpe,
            blocks,
            ln_f,
            lm_head,
        })
    }

    fn forward(&self, input_ids: &Tensor, cache: &mut Cache) -> CandleResult<Tensor> {
        let (_b, t) = input_ids.dims2()?;
        let pos = cache.position;

        let positions =
            Tensor::arange(pos as u32, (pos + t) as u32, input_ids.device())?.unsqueeze(0)?;
        let mut x = self
            .wte
            .forward(input_ids)?
            .broadcast_add(&self.wpe.forward(&positions)?)?;

        for (block, kv_cache) in self.blocks.iter().zip(cache.kv.iter_mut()) {
            x = block.forward(&x, kv_cache)?;
        }

        let x = self.ln_f.forward(&x)?;
        let x = x.i((.., t - 1, ..))?;
        let logits = self.lm_head.forward(&x)?;

        cache.position += t;
        Ok(logits)
    }
}

/// Per-invocation decode state: one KV cache entry per block plus the absolute position.
pub struct Cache {
    kv: Vec<Option<(Tensor, Tensor)>>,
    position: usize,
}

impl ModelCache for Cache {
    fn reset(&mut self) {
        for entry in self.kv.iter_mut() {
            *entry = None;
        }
        self.position = 0;
    }

    fn current_seq_len(&self) -> usize {
        self.position
    }
}

/// GPT-2 model handle holding the loaded weights.
///
/// The handle is immutable; decode state lives in the [`Cache`] created per
/// generation, so one model can serve any number of sequential runs.
pub struct Gpt2Model {
    weights: Weights,
    config: Config,
}

impl Gpt2Model {
    /// Download (or reuse the cached) distilgpt2 checkpoint and load it onto `device`.
    pub fn from_hf(device: &Device) -> Result<Self> {
        let started = std::time::Instant::now();

        let config_path = HubFile::new(MODEL_REPO, "config.json").load()?;
        let config: Config = serde_json::from_str(&std::fs::read_to_string(config_path)?)?;

        let vb = loaders::load_weights(MODEL_REPO, device)?;
        let weights = Weights::load(&config, vb)?;

        tracing::debug!(elapsed = ?started.elapsed(), "loaded distilgpt2 model weights");
        Ok(Self { weights, config })
    }

    /// The architecture hyperparameters this model was loaded with.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl TextGenerationModel for Gpt2Model {
    type Cache = Cache;

    fn get_tokenizer(&self) -> Result<Tokenizer> {
        loaders::load_tokenizer(MODEL_REPO)
    }

    fn get_eos_token(&self) -> Option<u32> {
        self.config.eos_token_id
    }

    fn get_bos_token(&self) -> Option<u32> {
        self.config.bos_token_id
    }

    fn get_max_seq_len(&self) -> usize {
        self.config.n_positions
    }

    fn new_cache(&self) -> Cache {
        Cache {
            kv: vec![None; self.config.n_layer],
            position: 0,
        }
    }

    fn forward(&self, input: &Tensor, cache: &mut Cache) -> CandleResult<Tensor> {
        self.weights.forward(input, cache)
    }

    // The distilgpt2 card ships no sampling defaults, so decoding is greedy
    // unless the caller overrides it.
    fn default_generation_params(&self) -> GenerationParams {
        GenerationParams::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_from_hub_json() {
        let raw = r#"{
            "activation_function": "gelu_new",
            "bos_token_id": 50256,
            "eos_token_id": 50256,
            "n_ctx": 1024,
            "n_embd": 768,
            "n_head": 12,
            "n_layer": 6,
            "n_positions": 1024,
            "vocab_size": 50257
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.n_layer, 6);
        assert_eq!(config.n_head, 12);
        assert_eq!(config.vocab_size, 50257);
        assert_eq!(config.eos_token_id, Some(50256));
        assert_eq!(config.layer_norm_epsilon, 1e-5);
    }

    #[test]
    fn config_defaults_optional_token_ids() {
        let raw = r#"{
            "n_embd": 8,
            "n_head": 2,
            "n_layer": 1,
            "n_positions": 16,
            "vocab_size": 32
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.bos_token_id, None);
        assert_eq!(config.eos_token_id, None);
    }

    #[test]
    fn causal_mask_allows_only_past_positions() {
        let mask = causal_mask(2, 5, &Device::Cpu).unwrap();
        let rows = mask.to_vec2::<u8>().unwrap();
        // Offset 3: query 0 sees keys 0..=3, query 1 sees keys 0..=4.
        assert_eq!(rows[0], vec![0, 0, 0, 0, 1]);
        assert_eq!(rows[1], vec![0, 0, 0, 0, 0]);
    }
}
