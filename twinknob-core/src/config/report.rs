//! Helpers for the build-time configuration report

/// Longest prefix of `text` holding at most `max_chars` characters
///
/// Cuts on a character boundary, so multi-byte text never splits.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
