use super::pipeline::{ReplyPipeline, MAX_REPLY_TOKENS};
use crate::error::Result;
use crate::models::Gpt2Model;
use crate::pipelines::text_generation::{TextGenerationPipeline, TextGenerationPipelineBuilder};
use crate::pipelines::utils::DeviceRequest;

/// Builder for [`ReplyPipeline`] instances backed by the real model.
///
/// The generation settings are fixed: a total output length of
/// [`MAX_REPLY_TOKENS`] tokens and a single candidate sequence. Only the
/// device is selectable.
///
/// # Example
///
/// ```rust,no_run
/// use puppy_reply::reply::ReplyPipelineBuilder;
///
/// # fn main() -> puppy_reply::error::Result<()> {
/// let pipeline = ReplyPipelineBuilder::new().build()?;
/// println!("{}", pipeline.reply("Hello!")?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ReplyPipelineBuilder {
    device_request: DeviceRequest,
}

impl ReplyPipelineBuilder {
    /// Create a builder with default settings (CPU).
    pub fn new() -> Self {
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

    /// Build the pipeline, downloading and loading the model if needed.
    pub fn build(self) -> Result<ReplyPipeline<TextGenerationPipeline<Gpt2Model>>> {
        let builder = TextGenerationPipelineBuilder::gpt2().max_length(MAX_REPLY_TOKENS);
        let builder = match self.device_request {
            DeviceRequest::Cpu => builder.cpu(),
            DeviceRequest::Cuda(index) => builder.cuda(index),
        };
        Ok(ReplyPipeline::new(builder.build()?))
    }
}
