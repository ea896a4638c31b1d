//! Chunking preview without embedding.
//!
//! Extracts and chunks the knowledge base exactly as `serve` would, then
//! prints summary statistics. Makes no network calls, so it is the quickest
//! way to sanity-check a document and chunking settings.

use anyhow::Result;

use crate::chunk;
use crate::config::Config;
use crate::extract;

/// Run the chunks command.
pub fn run_chunks(config: &Config) -> Result<()> {
    let text = extract::extract_text(&config.source.path, config.source.max_extract_bytes)?;
    let chunks = chunk::chunk_text(&text, &config.chunking);

    println!("knowledge base: {}", config.source.path.display());
    println!("  characters: {}", text.chars().count());
    println!("  chunks:     {}", chunks.len());

    if !chunks.is_empty() {
        let lengths: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
        let total: usize = lengths.iter().sum();
        let shortest = lengths.iter().min().copied().unwrap_or(0);
        let longest = lengths.iter().max().copied().unwrap_or(0);
        println!("  shortest:   {} chars", shortest);
        println!("  longest:    {} chars", longest);
        println!("  average:    {} chars", total / chunks.len());
    }

    Ok(())
}
