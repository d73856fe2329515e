use super::params::GenerationOverrides;
use super::pipeline::TextGenerationPipeline;
use crate::error::Result;
use crate::models::{Gpt2Model, TextGenerationModel};
use crate::pipelines::utils::DeviceRequest;

/// Builder for constructing [`TextGenerationPipeline`] instances.
///
/// # Example
///
/// ```rust,no_run
/// use puppy_reply::text_generation::TextGenerationPipelineBuilder;
///
/// # fn main() -> puppy_reply::error::Result<()> {
/// let pipeline = TextGenerationPipelineBuilder::gpt2()
///     .temperature(0.7)
///     .top_k(40)
///     .max_length(64)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct TextGenerationPipelineBuilder {
    overrides: GenerationOverrides,
    device_request: DeviceRequest,
}

impl TextGenerationPipelineBuilder {
    /// Create a builder for the GPT-2 (distilgpt2) model.
    pub fn gpt2() -> Self {
        Self::default()
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Set sampling temperature. 0.0 = greedy decoding, higher = more random.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.overrides.temperature = Some(temperature);
        self
    }

    /// Set penalty for repeating tokens. 1.0 = no penalty.
    pub fn repeat_penalty(mut self, repeat_penalty: f32) -> Self {
        self.overrides.repeat_penalty = Some(repeat_penalty);
        self
    }

    /// Set how many recent tokens to consider for repeat penalty.
    pub fn repeat_last_n(mut self, repeat_last_n: usize) -> Self {
        self.overrides.repeat_last_n = Some(repeat_last_n);
        self
    }

    /// Set random seed for reproducible sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.overrides.seed = Some(seed);
        self
    }

    /// Set the maximum total sequence length in tokens, prompt included.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.overrides.max_length = Some(max_length);
        self
    }

    /// Set nucleus sampling threshold (0.0-1.0).
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.overrides.top_p = Some(top_p.clamp(0.0, 1.0));
        self
    }

    /// Only sample from the top k most likely tokens.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.overrides.top_k = Some(top_k);
        self
    }

    /// Build the pipeline, downloading and loading the model if needed.
    pub fn build(self) -> Result<TextGenerationPipeline<Gpt2Model>> {
        let device = self.device_request.resolve()?;
        let model = Gpt2Model::from_hf(&device)?;
        let params = self.overrides.resolve(model.default_generation_params());
        TextGenerationPipeline::new(model, params, device)
    }
}
