use clap::Parser;
use puppy_reply::error::Result;
use puppy_reply::reply::ReplyPipelineBuilder;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "puppy-reply",
    version,
    about = "Replies to a message as a cute puppy (distilgpt2, Candle backend)"
)]
struct Args {
    /// The message to say to the puppy. Empty when omitted.
    message: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let pipeline = ReplyPipelineBuilder::new().build()?;
    let reply = pipeline.reply(args.message.as_deref().unwrap_or_default())?;
    println!("{reply}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_a_message() {
        let args = Args::try_parse_from(["puppy-reply", "Hello!"]).expect("message should parse");
        assert_eq!(args.message.as_deref(), Some("Hello!"));
    }

    #[test]
    fn cli_allows_missing_message() {
        let args = Args::try_parse_from(["puppy-reply"]).expect("no message should parse");
        assert!(args.message.is_none());
    }

    #[test]
    fn cli_rejects_extra_arguments() {
        let extra = Args::try_parse_from(["puppy-reply", "hi", "there"]);
        assert!(extra.is_err());
    }
}
