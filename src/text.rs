/// Longest note body Notado accepts, in characters.
pub const MAX_HIGHLIGHT_LEN: usize = 8191;

/// Trims surrounding whitespace and swaps every newline for a single space.
pub fn normalise(s: &str) -> String {
    s.trim().replace('\n', " ")
}

/// Splits `text` into consecutive pieces of at most `max_len` characters.
///
/// Boundaries fall on every `max_len`th character, so joining the pieces gives back `text`.
/// Empty input yields no pieces.
pub fn split_highlight(text: &str, max_len: usize) -> Vec<String> {
    if text.is_empty() || max_len == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(text.len() / max_len + 1);
    let mut remaining = text;
    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .nth(max_len)
            .map(|(pos, _)| pos)
            .unwrap_or(remaining.len());
        chunks.push(remaining[..split_at].to_string());
        remaining = &remaining[split_at..];
    }

    chunks
}
