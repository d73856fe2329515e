//! Single-sentence puppy replies from a local distilgpt2.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). The crate loads the
//! pretrained model once, runs one blocking generation pass per request, and trims
//! the raw continuation down to a short in-character reply.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use puppy_reply::reply::ReplyPipelineBuilder;
//!
//! # fn main() -> puppy_reply::error::Result<()> {
//! let pipeline = ReplyPipelineBuilder::new().build()?;
//! println!("{}", pipeline.reply("Who's a good boy?")?);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;

pub use pipelines::{reply, text_generation};
