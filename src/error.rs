//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// Nothing in the crate recovers from these; the CLI lets them propagate out of
/// `main` and terminate the run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenization failure. Check input text.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// The model produced no usable output, or an input exceeded what it can accept.
    #[error("{0}")]
    Generation(String),

    /// The generated text did not begin with the submitted prompt.
    ///
    /// The reply formatter slices the continuation off at the prompt's length and
    /// depends on the generator echoing the prompt verbatim. A mismatch means the
    /// echo contract was broken, so failing beats silently mis-slicing.
    #[error("generated text does not start with the prompt (prompt '{prompt_preview}…', output '{output_preview}…')")]
    PromptEcho {
        /// First characters of the prompt that was submitted.
        prompt_preview: String,
        /// First characters of the text that came back.
        output_preview: String,
    },

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {value}"))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}
