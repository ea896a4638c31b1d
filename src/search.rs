//! Semantic search against the knowledge base from the command line.

use anyhow::Result;

use crate::config::Config;
use crate::engine::Engine;

/// Run the search command: embed the query and print the most similar
/// chunks with their scores, best first.
pub async fn run_search(config: &Config, query: &str, k: Option<usize>) -> Result<()> {
    let engine = Engine::bootstrap(config).await?;
    let k = k.unwrap_or(config.retrieval.top_k);

    let hits = engine.retrieve_scored(query, k).await?;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for hit in &hits {
        println!("[{}] score: {:.4}", hit.index, hit.score);
        println!("    {}", snippet(&hit.text, 160));
        println!();
    }

    Ok(())
}

/// First `max_chars` characters of `text`, with an ellipsis when truncated.
/// Newlines collapse to spaces so each hit stays on one line.
fn snippet(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
