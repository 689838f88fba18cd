use std::sync::OnceLock;

use regex::Regex;

use super::syntax::{Fence, Heading, ImageRef, ListMarker};

/// Classification of a single line from local facts only.
///
/// This is phase 1 of parsing: a line is classified without looking at its
/// neighbours. Whether a line is fence content is decided by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Whitespace only
    Blank,
    /// Opens a code or math fence; `info` is the trimmed text after the marker
    FenceOpen { fence: Fence, info: &'a str },
    Image { path: &'a str },
    Heading { level: u8, text: &'a str },
    ListItem {
        ordered: bool,
        level: u32,
        text: &'a str,
    },
    Text(&'a str),
}

fn list_item_regex() -> &'static Regex {
    static LIST_ITEM: OnceLock<Regex> = OnceLock::new();
    LIST_ITEM.get_or_init(|| {
        Regex::new(r"^([ \t]*)([-*]|\d+\.) (.*)$").expect("Invalid list item regex")
    })
}

/// Classify one line (without its line terminator).
pub fn classify(line: &str) -> LineClass<'_> {
    if line.trim().is_empty() {
        return LineClass::Blank;
    }

    if let Some((fence, info)) = Fence::open(line) {
        return LineClass::FenceOpen {
            fence,
            info: info.trim(),
        };
    }

    if let Some(path) = ImageRef::path(line) {
        return LineClass::Image { path };
    }

    for (prefix, level) in Heading::PREFIXES {
        if let Some(text) = line.strip_prefix(prefix) {
            return LineClass::Heading { level, text };
        }
    }

    if let Some(caps) = list_item_regex().captures(line)
        && let (Some(indent), Some(marker), Some(text)) = (caps.get(1), caps.get(2), caps.get(3))
    {
        return LineClass::ListItem {
            ordered: marker.as_str().ends_with('.'),
            level: indent_level(indent.as_str()),
            text: text.as_str(),
        };
    }

    LineClass::Text(line)
}

/// Nesting level of a run of leading whitespace (floor division).
pub fn indent_level(indent: &str) -> u32 {
    let width: usize = indent
        .chars()
        .map(|c| if c == '\t' { ListMarker::TAB_WIDTH } else { 1 })
        .sum();
    (width / ListMarker::INDENT_WIDTH) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", LineClass::Blank)]
    #[case("   \t", LineClass::Blank)]
    #[case("```rust ", LineClass::FenceOpen { fence: Fence::Code, info: "rust" })]
    #[case("$$", LineClass::FenceOpen { fence: Fence::Math, info: "" })]
    #[case("![](img/cat.png)", LineClass::Image { path: "img/cat.png" })]
    #[case("# One", LineClass::Heading { level: 1, text: "One" })]
    #[case("## Two", LineClass::Heading { level: 2, text: "Two" })]
    #[case("### Three", LineClass::Heading { level: 3, text: "Three" })]
    #[case("#### Four", LineClass::Text("#### Four"))]
    #[case("#NoSpace", LineClass::Text("#NoSpace"))]
    #[case("- item", LineClass::ListItem { ordered: false, level: 0, text: "item" })]
    #[case("* item", LineClass::ListItem { ordered: false, level: 0, text: "item" })]
    #[case("    - deep", LineClass::ListItem { ordered: false, level: 2, text: "deep" })]
    #[case("   - odd", LineClass::ListItem { ordered: false, level: 1, text: "odd" })]
    #[case("\t- tabbed", LineClass::ListItem { ordered: false, level: 1, text: "tabbed" })]
    #[case("12. twelfth", LineClass::ListItem { ordered: true, level: 0, text: "twelfth" })]
    #[case("- ", LineClass::ListItem { ordered: false, level: 0, text: "" })]
    #[case("1.5 apples", LineClass::Text("1.5 apples"))]
    #[case("plain text", LineClass::Text("plain text"))]
    fn test_classifies_lines(#[case] line: &str, #[case] expected: LineClass<'static>) {
        assert_eq!(classify(line), expected);
    }
}
