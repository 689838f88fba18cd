//! Caret-relative `[[` detection. Offsets are UTF-16 code units.

pub const OPEN: &str = "[[";
pub const CLOSE: &str = "]]";

const BRACKET_OPEN: u16 = b'[' as u16;
const BRACKET_CLOSE: u16 = b']' as u16;
const NEWLINE: u16 = b'\n' as u16;

/// Offset of the nearest unclosed `[[` before `caret`.
///
/// Scans backward from `caret - 1` and gives up at a `]` or a newline, so a
/// closed link or a previous line never counts. Needs `caret >= 2`.
pub fn find_start(text: &str, caret: usize) -> Option<usize> {
    let units: Vec<u16> = text.encode_utf16().collect();
    if caret < 2 || caret > units.len() {
        return None;
    }
    for i in (1..caret).rev() {
        match units[i] {
            BRACKET_CLOSE | NEWLINE => return None,
            BRACKET_OPEN if units[i - 1] == BRACKET_OPEN => return Some(i - 1),
            _ => {}
        }
    }
    None
}

/// Text typed between the trigger at `start` and the caret.
pub fn query_at(text: &str, start: usize, caret: usize) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let from = (start + OPEN.len()).min(units.len());
    let to = caret.clamp(from, units.len());
    String::from_utf16_lossy(&units[from..to])
}

/// `text` with `[start, caret)` replaced by `[[link]]`, and the caret offset
/// just past the inserted link.
pub fn splice_link(text: &str, start: usize, caret: usize, link: &str) -> (String, usize) {
    let units: Vec<u16> = text.encode_utf16().collect();
    let start = start.min(units.len());
    let caret = caret.clamp(start, units.len());
    let inserted = format!("{OPEN}{link}{CLOSE}");

    let mut out = String::from_utf16_lossy(&units[..start]);
    out.push_str(&inserted);
    out.push_str(&String::from_utf16_lossy(&units[caret..]));
    (out, start + inserted.encode_utf16().count())
}
