use crate::error::{PipelineError, Result};
use crate::pipelines::text_generation::TextGeneration;

/// Total output length in tokens (prompt included) requested per reply.
pub const MAX_REPLY_TOKENS: usize = 60;

/// Build the puppy prompt for a user message.
///
/// The template is fixed and reproduced verbatim, quoted framing included,
/// because the model conditions on it. The message is interpolated as-is:
/// empty strings, quotes and newlines all pass through unvalidated.
pub fn puppy_prompt(user_message: &str) -> String {
    format!("You are a friendly puppy. Someone says: \"{user_message}\". You reply as a cute puppy: ")
}

/// Cut a raw continuation down to a single short sentence.
///
/// Keeps only the text before the first line break, trims surrounding
/// whitespace, then cuts at the first period (keeping it) if there is one.
/// The result may be empty. Applying this twice yields the same string.
pub(crate) fn trim_reply(continuation: &str) -> String {
    let first_line = continuation.split('\n').next().unwrap_or_default();
    let trimmed = first_line.trim();
    match trimmed.find('.') {
        Some(idx) => trimmed[..=idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Generates short in-character puppy replies to user messages.
///
/// Construct with [`ReplyPipelineBuilder`](super::ReplyPipelineBuilder) for the
/// real model, or wrap any [`TextGeneration`] implementation directly (tests do
/// this with canned generators).
///
/// # Examples
///
/// ```rust,no_run
/// # use puppy_reply::reply::ReplyPipelineBuilder;
/// # fn main() -> puppy_reply::error::Result<()> {
/// let pipeline = ReplyPipelineBuilder::new().build()?;
/// let reply = pipeline.reply("Hello!")?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct ReplyPipeline<G: TextGeneration> {
    generator: G,
}

impl<G: TextGeneration> ReplyPipeline<G> {
    /// Wrap a generator in a reply pipeline.
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Produce a reply to `user_message`.
    ///
    /// One generation call, one candidate. The candidate must echo the prompt
    /// verbatim; the continuation is sliced off at the prompt's length and
    /// trimmed to at most one line and one sentence. The reply may be the
    /// empty string if the model produced no usable continuation.
    pub fn reply(&self, user_message: &str) -> Result<String> {
        let prompt = puppy_prompt(user_message);

        let candidates = self.generator.generate(&prompt)?;
        let text = candidates.into_iter().next().ok_or_else(|| {
            PipelineError::Generation("generator returned no candidates".to_string())
        })?;

        let continuation = text.strip_prefix(&prompt).ok_or_else(|| {
            PipelineError::PromptEcho {
                prompt_preview: prompt.chars().take(50).collect(),
                output_preview: text.chars().take(50).collect(),
            }
        })?;

        Ok(trim_reply(continuation))
    }
}
