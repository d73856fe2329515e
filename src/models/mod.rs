//! Model implementations and the traits the pipelines drive them through.

use candle_core::Tensor;
use tokenizers::Tokenizer;

use crate::error::Result;
use crate::pipelines::text_generation::params::GenerationParams;

pub(crate) mod gpt2;

pub use gpt2::{Config as Gpt2Config, Gpt2Model};

// ============ Core model traits ============

/// Trait for KV cache types.
///
/// A cache holds all per-invocation decode state; the model itself stays
/// immutable and can be shared.
pub trait ModelCache: Send {
    /// Reset the cache to empty state.
    fn reset(&mut self);
    /// Get current sequence length in cache.
    fn current_seq_len(&self) -> usize;
}

/// Core trait for text generation models.
pub trait TextGenerationModel {
    /// The KV cache type for this model.
    type Cache: ModelCache + Send;

    /// Get the tokenizer for this model.
    fn get_tokenizer(&self) -> Result<Tokenizer>;

    /// Get the primary end-of-sequence token ID.
    fn get_eos_token(&self) -> Option<u32>;

    /// Get all end-of-sequence token IDs.
    fn get_eos_tokens(&self) -> Vec<u32> {
        self.get_eos_token().into_iter().collect()
    }

    /// Get the beginning-of-sequence token ID, used to seed empty prompts.
    fn get_bos_token(&self) -> Option<u32> {
        None
    }

    /// Get the maximum sequence length this model supports.
    fn get_max_seq_len(&self) -> usize;

    /// Create a new empty KV cache for generation.
    fn new_cache(&self) -> Self::Cache;

    /// Run a forward pass, returning next-token logits for the last input position.
    fn forward(&self, input: &Tensor, cache: &mut Self::Cache) -> candle_core::Result<Tensor>;

    /// Get default generation parameters for this model.
    fn default_generation_params(&self) -> GenerationParams {
        GenerationParams::default()
    }
}
