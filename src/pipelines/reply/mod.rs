//! Puppy reply pipeline.
//!
//! Formats a user message into a fixed puppy-persona prompt, runs one
//! generation pass, and trims the continuation to a short single-sentence
//! reply. The whole flow is one blocking call with no retained state.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use puppy_reply::reply::ReplyPipelineBuilder;
//!
//! # fn main() -> puppy_reply::error::Result<()> {
//! let pipeline = ReplyPipelineBuilder::new().build()?;
//! let reply = pipeline.reply("Who's a good boy?")?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Generators
//!
//! [`ReplyPipeline`] works with any [`TextGeneration`](crate::text_generation::TextGeneration)
//! implementation, which is how the tests substitute canned model output:
//!
//! ```rust
//! use puppy_reply::error::Result;
//! use puppy_reply::reply::{puppy_prompt, ReplyPipeline};
//! use puppy_reply::text_generation::TextGeneration;
//!
//! struct Canned;
//!
//! impl TextGeneration for Canned {
//!     fn generate(&self, prompt: &str) -> Result<Vec<String>> {
//!         Ok(vec![format!("{prompt} Woof!")])
//!     }
//! }
//!
//! let pipeline = ReplyPipeline::new(Canned);
//! assert_eq!(pipeline.reply("hi").unwrap(), "Woof!");
//! ```

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod pipeline;

// ============ Public API ============

pub use builder::ReplyPipelineBuilder;
pub use pipeline::{puppy_prompt, ReplyPipeline, MAX_REPLY_TOKENS};
