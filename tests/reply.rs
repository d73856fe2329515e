use puppy_reply::error::{PipelineError, Result};
use puppy_reply::reply::{puppy_prompt, ReplyPipeline};
use puppy_reply::text_generation::TextGeneration;

/// Echoes the prompt and appends a fixed continuation, like the real pipeline does.
struct CannedGenerator {
    continuation: &'static str,
}

impl TextGeneration for CannedGenerator {
    fn generate(&self, prompt: &str) -> Result<Vec<String>> {
        Ok(vec![format!("{prompt}{}", self.continuation)])
    }
}

/// Returns its output without the prompt echo, breaking the contract.
struct NoEchoGenerator;

impl TextGeneration for NoEchoGenerator {
    fn generate(&self, _prompt: &str) -> Result<Vec<String>> {
        Ok(vec!["Woof! Woof!".to_string()])
    }
}

/// Returns an empty candidate list.
struct EmptyGenerator;

impl TextGeneration for EmptyGenerator {
    fn generate(&self, _prompt: &str) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

#[test]
fn reply_is_cut_to_one_sentence() -> Result<()> {
    let pipeline = ReplyPipeline::new(CannedGenerator {
        continuation: " Woof! I am so happy to see you. Let's play!",
    });
    assert_eq!(pipeline.reply("Hello!")?, "Woof! I am so happy to see you.");
    Ok(())
}

#[test]
fn reply_is_empty_when_continuation_starts_with_a_line_break() -> Result<()> {
    let pipeline = ReplyPipeline::new(CannedGenerator {
        continuation: "\nWoof woof",
    });
    assert_eq!(pipeline.reply("")?, "");
    Ok(())
}

#[test]
fn reply_without_period_or_line_break_passes_through() -> Result<()> {
    let pipeline = ReplyPipeline::new(CannedGenerator {
        continuation: "wag wag wag",
    });
    assert_eq!(pipeline.reply("Hello!")?, "wag wag wag");
    Ok(())
}

#[test]
fn reply_never_contains_a_line_break() -> Result<()> {
    for continuation in [" Woof!\nBark!", "\n\n", " one\ntwo\nthree", "Yip.\nYip."] {
        let pipeline = ReplyPipeline::new(CannedGenerator { continuation });
        let reply = pipeline.reply("hi")?;
        assert!(!reply.contains('\n'), "line break in {reply:?}");
    }
    Ok(())
}

#[test]
fn reply_with_period_ends_with_exactly_one() -> Result<()> {
    let pipeline = ReplyPipeline::new(CannedGenerator {
        continuation: " So. Many. Sentences.",
    });
    let reply = pipeline.reply("hi")?;
    assert_eq!(reply, "So.");
    assert!(reply.ends_with('.'));
    assert_eq!(reply.matches('.').count(), 1);
    Ok(())
}

#[test]
fn reply_handles_messages_with_quotes_and_newlines() -> Result<()> {
    let pipeline = ReplyPipeline::new(CannedGenerator {
        continuation: " Woof!",
    });
    assert_eq!(pipeline.reply("say \"woof\"")?, "Woof!");
    assert_eq!(pipeline.reply("line one\nline two")?, "Woof!");
    Ok(())
}

#[test]
fn missing_prompt_echo_is_an_explicit_error() {
    let pipeline = ReplyPipeline::new(NoEchoGenerator);
    let err = pipeline.reply("Hello!").unwrap_err();
    assert!(matches!(err, PipelineError::PromptEcho { .. }), "got {err:?}");
}

#[test]
fn empty_candidate_list_is_an_error() {
    let pipeline = ReplyPipeline::new(EmptyGenerator);
    let err = pipeline.reply("Hello!").unwrap_err();
    assert!(matches!(err, PipelineError::Generation(_)), "got {err:?}");
}

#[test]
fn prompt_echo_check_slices_at_offset_not_by_search() -> Result<()> {
    // The continuation repeats prompt-like text; only the leading echo is removed.
    let pipeline = ReplyPipeline::new(CannedGenerator {
        continuation: "You are a friendly puppy",
    });
    assert_eq!(pipeline.reply("hi")?, "You are a friendly puppy");
    Ok(())
}

#[test]
fn prompt_template_matches_for_representative_messages() {
    for (message, expected) in [
        (
            "Hello!",
            "You are a friendly puppy. Someone says: \"Hello!\". You reply as a cute puppy: ",
        ),
        (
            "",
            "You are a friendly puppy. Someone says: \"\". You reply as a cute puppy: ",
        ),
        (
            "a \"quoted\" word",
            "You are a friendly puppy. Someone says: \"a \"quoted\" word\". You reply as a cute puppy: ",
        ),
    ] {
        assert_eq!(puppy_prompt(message), expected);
    }
}
