use crate::config::{ChunkingConfig, OverlapMode};

/// A contiguous piece of the knowledge base. `index` is the position in the
/// filtered chunk list, so indices are always dense starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// A sentence boundary is only used as a cut point when it falls within this
/// many characters of the window end.
const SENTENCE_LOOKBACK: usize = 300;

/// Pieces at or below this many characters carry too little context to be
/// worth indexing.
const MIN_CHUNK_CHARS: usize = 50;

/// Splits `text` into chunks, dropping pieces that are too short to retrieve
/// meaningfully. Empty input produces no chunks.
pub fn chunk_text(text: &str, options: &ChunkingConfig) -> Vec<Chunk> {
    windows(text, options)
        .into_iter()
        .filter(|piece| piece.chars().count() > MIN_CHUNK_CHARS)
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

/// Walks `text` in character windows of `chunk_size`, trimming each window
/// back to the last ". " boundary when one sits close enough to the end.
fn windows(text: &str, options: &ChunkingConfig) -> Vec<String> {
    let chunk_size = options.chunk_size;

    // Byte offset of every character plus one past the end, so windows can
    // be sliced by character position without re-walking the text.
    let byte_offsets: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = byte_offsets.len() - 1;

    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < total_chars {
        let window_end = (start + chunk_size).min(total_chars);
        let window = &text[byte_offsets[start]..byte_offsets[window_end]];

        let mut piece = window;
        let mut end = window_end;
        if let Some(cut_bytes) = window.rfind(". ") {
            let cut = window[..cut_bytes].chars().count();
            if cut > 0 && cut + SENTENCE_LOOKBACK > chunk_size {
                piece = &window[..cut_bytes + 1];
                end = start + cut + 1;
            }
        }

        pieces.push(piece.trim().to_string());
        if end >= total_chars {
            break;
        }
        start = advance(start, end, options);
    }

    pieces
}

/// Next window start after emitting a piece that ended at character `end`.
/// Always moves forward by at least one character so the walk terminates
/// even when the overlap reaches back past the piece start.
fn advance(start: usize, end: usize, options: &ChunkingConfig) -> usize {
    let next = match options.overlap_mode {
        OverlapMode::Legacy => end.saturating_sub(options.overlap).max(end),
        OverlapMode::Truncated => end.saturating_sub(options.overlap),
        OverlapMode::Window => (start + options.chunk_size).saturating_sub(options.overlap),
    };
    next.max(start + 1)
}
