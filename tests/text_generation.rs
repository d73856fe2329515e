//! Tests that exercise the real distilgpt2 checkpoint. Ignored by default
//! because they download weights from the Hugging Face Hub.

use puppy_reply::error::Result;
use puppy_reply::reply::ReplyPipelineBuilder;
use puppy_reply::text_generation::TextGenerationPipelineBuilder;

#[test]
#[ignore = "downloads distilgpt2 from the Hugging Face Hub"]
fn output_echoes_the_prompt() -> Result<()> {
    let pipeline = TextGenerationPipelineBuilder::gpt2().max_length(24).build()?;

    let prompt = "The best thing about dogs is";
    let output = pipeline.run(prompt)?;
    assert!(output.text.starts_with(prompt), "no echo in {:?}", output.text);
    assert!(output.stats.prompt_tokens > 0);
    Ok(())
}

#[test]
#[ignore = "downloads distilgpt2 from the Hugging Face Hub"]
fn greedy_decoding_is_deterministic() -> Result<()> {
    let pipeline = TextGenerationPipelineBuilder::gpt2().max_length(24).build()?;

    let first = pipeline.run("Once upon a time")?;
    let second = pipeline.run("Once upon a time")?;
    assert_eq!(first.text, second.text);
    Ok(())
}

#[test]
#[ignore = "downloads distilgpt2 from the Hugging Face Hub"]
fn prompt_at_the_length_limit_yields_only_the_echo() -> Result<()> {
    let pipeline = TextGenerationPipelineBuilder::gpt2().max_length(4).build()?;

    let prompt = "one two three four five six seven";
    let output = pipeline.run(prompt)?;
    assert_eq!(output.stats.tokens_generated, 0);
    assert_eq!(output.text, prompt);
    Ok(())
}

#[test]
#[ignore = "downloads distilgpt2 from the Hugging Face Hub"]
fn reply_is_a_single_trimmed_line() -> Result<()> {
    let pipeline = ReplyPipelineBuilder::new().build()?;

    let reply = pipeline.reply("Hello!")?;
    assert!(!reply.contains('\n'));
    assert_eq!(reply, reply.trim());
    if let Some(idx) = reply.find('.') {
        assert_eq!(idx, reply.len() - 1, "text after the first period in {reply:?}");
    }
    Ok(())
}
