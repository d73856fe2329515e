use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::utils::apply_repeat_penalty;
use tokenizers::Tokenizer;

use super::params::GenerationParams;
use crate::error::{PipelineError, Result};
use crate::models::TextGenerationModel;
use crate::pipelines::stats::GenerationStats;

// ============ Output types ============

/// Output from [`TextGenerationPipeline::run`].
#[derive(Debug)]
pub struct Output {
    /// The decoded sequence: the prompt echoed verbatim, followed by the continuation.
    pub text: String,
    /// Execution statistics.
    pub stats: GenerationStats,
}

// ============ Generation seam ============

/// One-shot text generation, as consumed by downstream pipelines.
///
/// Implementations return one or more candidate texts; each candidate contains
/// the submitted prompt verbatim, followed by the generated continuation. That
/// echo is a contract: callers slice the continuation off at the prompt's
/// length, exactly like the upstream `transformers` pipeline output shape.
pub trait TextGeneration {
    /// Generate candidate texts for the prompt. The pipeline in this crate
    /// requests exactly one candidate and returns a single-element vector.
    fn generate(&self, prompt: &str) -> Result<Vec<String>>;
}

// ============ Pipeline ============

/// Pipeline for generating a text completion from a prompt.
///
/// Construct with [`TextGenerationPipelineBuilder`](super::TextGenerationPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// # use puppy_reply::text_generation::TextGenerationPipelineBuilder;
/// # fn main() -> puppy_reply::error::Result<()> {
/// let pipeline = TextGenerationPipelineBuilder::gpt2().max_length(32).build()?;
///
/// let output = pipeline.run("Once upon a time")?;
/// println!("{}", output.text);
/// println!(
///     "[{} tokens in {:.2}s]",
///     output.stats.tokens_generated,
///     output.stats.total_time.as_secs_f64()
/// );
/// # Ok(())
/// # }
/// ```
pub struct TextGenerationPipeline<M: TextGenerationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) params: GenerationParams,
    pub(crate) device: Device,
}

impl<M: TextGenerationModel> TextGenerationPipeline<M> {
    pub(crate) fn new(model: M, params: GenerationParams, device: Device) -> Result<Self> {
        let tokenizer = model.get_tokenizer()?;
        Ok(Self {
            model,
            tokenizer,
            params,
            device,
        })
    }

    /// Generate a completion for `prompt`, blocking until done.
    ///
    /// The returned text is the full decoded sequence (prompt echo plus
    /// continuation). Generation stops at an end-of-sequence token or once the
    /// total length reaches [`GenerationParams::max_length`], whichever comes
    /// first; a prompt already at the limit yields the echo alone.
    pub fn run(&self, prompt: &str) -> Result<Output> {
        let mut stats = GenerationStats::new();

        let mut tokens = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| {
                PipelineError::Tokenization(format!(
                    "Tokenization failed on '{}…': {}",
                    prompt.chars().take(50).collect::<String>(),
                    e
                ))
            })?
            .get_ids()
            .to_vec();

        // GPT-2 cannot run on zero tokens; seed an empty prompt with BOS the way
        // the upstream pipeline does. It is special, so it never reaches the output.
        if tokens.is_empty() {
            let bos = self.model.get_bos_token().ok_or_else(|| {
                PipelineError::Tokenization("prompt produced no tokens".to_string())
            })?;
            tokens.push(bos);
        }

        let max_seq_len = self.model.get_max_seq_len();
        if tokens.len() > max_seq_len {
            return Err(PipelineError::Generation(format!(
                "prompt is {} tokens, model context is {max_seq_len}",
                tokens.len()
            )));
        }

        stats.set_prompt_tokens(tokens.len());

        let limit = self.params.max_length.min(max_seq_len);
        let max_new = limit.saturating_sub(tokens.len());

        let mut generated: Vec<u32> = Vec::with_capacity(max_new);
        if max_new > 0 {
            let eos_tokens = self.model.get_eos_tokens();
            let mut cache = self.model.new_cache();
            let mut processor =
                LogitsProcessor::from_sampling(self.params.seed, self.params.sampling_strategy());

            let input = Tensor::new(tokens.as_slice(), &self.device)?.unsqueeze(0)?;
            let logits = self.model.forward(&input, &mut cache)?.squeeze(0)?;
            let mut next_token = processor.sample(&logits)?;

            loop {
                if eos_tokens.contains(&next_token) {
                    break;
                }
                generated.push(next_token);
                stats.record_token();
                if generated.len() >= max_new {
                    break;
                }

                let input = Tensor::new(&[next_token], &self.device)?.unsqueeze(0)?;
                let logits = self.model.forward(&input, &mut cache)?.squeeze(0)?;

                let start_at = generated.len().saturating_sub(self.params.repeat_last_n);
                let logits = if self.params.repeat_penalty <= 1.0 {
                    logits
                } else {
                    apply_repeat_penalty(&logits, self.params.repeat_penalty, &generated[start_at..])?
                };

                next_token = processor.sample(&logits)?;
            }
        }

        let mut all_tokens = tokens;
        all_tokens.extend_from_slice(&generated);
        let text = self
            .tokenizer
            .decode(&all_tokens, /*skip_special_tokens=*/ true)
            .map_err(|e| PipelineError::Tokenization(format!("Token decode failed: {e}")))?;

        stats.finalize();
        tracing::debug!(
            prompt_tokens = stats.prompt_tokens,
            tokens_generated = stats.tokens_generated,
            elapsed = ?stats.total_time,
            "generation finished"
        );

        Ok(Output { text, stats })
    }

    /// Returns the model's maximum context length in tokens.
    pub fn max_context_length(&self) -> usize {
        self.model.get_max_seq_len()
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Count tokens in text without generating.
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let tokens = self.tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}…': {}",
                text.chars().take(50).collect::<String>(),
                e
            ))
        })?;
        Ok(tokens.get_ids().len())
    }
}

impl<M: TextGenerationModel> TextGeneration for TextGenerationPipeline<M> {
    fn generate(&self, prompt: &str) -> Result<Vec<String>> {
        Ok(vec![self.run(prompt)?.text])
    }
}
