// Utility functions
pub mod jsonl;

/// Truncate text to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Single-line preview of chunk text for console output.
pub fn snippet(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars).replace('\n', " ")
}
