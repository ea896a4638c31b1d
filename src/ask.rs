//! One-shot question answering from the command line.

use anyhow::Result;

use crate::config::Config;
use crate::engine::{AnswerError, Engine};

/// Run the ask command: bootstrap the engine, answer one question, print
/// the reply to stdout.
pub async fn run_ask(config: &Config, question: &str, k: Option<usize>) -> Result<()> {
    let mut config = config.clone();
    if let Some(k) = k {
        config.retrieval.top_k = k;
    }

    let engine = Engine::bootstrap(&config).await?;

    match engine.answer(question).await {
        Ok(reply) => println!("{}", reply),
        // Chat failures become the reply text, same contract as POST /chat.
        Err(AnswerError::Completion(e)) => println!("{}", e.to_reply()),
        Err(AnswerError::Provider(e)) => return Err(e.into()),
    }

    Ok(())
}
