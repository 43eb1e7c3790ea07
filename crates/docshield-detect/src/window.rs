//! Char-boundary-safe context windows
//!
//! Spans are byte offsets into UTF-8 text. Window radii are applied in bytes
//! and snapped outward to char boundaries so slicing never panics on
//! multi-byte Hangul.

/// Slice a window of `radius` bytes around `[start, end)`, widened to the
/// nearest char boundaries and clamped to the text.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = end.saturating_add(radius).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

/// Same window, with newlines normalized to spaces for display
pub fn normalized_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    context_window(text, start, end, radius).replace('\n', " ")
}

/// First `n` bytes of the text, snapped to a char boundary
pub fn head(text: &str, n: usize) -> &str {
    let mut hi = n.min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[..hi]
}
