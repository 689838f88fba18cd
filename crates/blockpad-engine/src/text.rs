//! Conversions between UTF-16 code unit offsets (what the UI reports for
//! carets) and byte indices into Rust strings.

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte index for a UTF-16 offset.
///
/// An offset that falls inside a surrogate pair snaps back to the start of
/// that character; offsets past the end map to `text.len()`.
pub fn byte_index(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// Split `text` at a UTF-16 offset.
pub fn split_at_utf16(text: &str, utf16_offset: usize) -> (&str, &str) {
    text.split_at(byte_index(text, utf16_offset))
}
