//! Text generation pipeline.
//!
//! Generates a completion for a prompt with one blocking call. The decoded
//! output always starts with the prompt itself (the echo contract downstream
//! pipelines slice against), followed by the model's continuation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use puppy_reply::text_generation::TextGenerationPipelineBuilder;
//!
//! # fn main() -> puppy_reply::error::Result<()> {
//! let pipeline = TextGenerationPipelineBuilder::gpt2()
//!     .max_length(64)
//!     .build()?;
//!
//! let output = pipeline.run("The best thing about dogs is")?;
//! println!("{}", output.text);
//! # Ok(())
//! # }
//! ```

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod params;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{Gpt2Config, Gpt2Model, ModelCache, TextGenerationModel};
pub use crate::pipelines::stats::GenerationStats;
pub use builder::TextGenerationPipelineBuilder;
pub use params::GenerationParams;
pub use pipeline::{Output, TextGeneration, TextGenerationPipeline};
