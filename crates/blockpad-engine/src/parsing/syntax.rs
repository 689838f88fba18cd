//! Markdown delimiters owned in one place. Parser and serializer refer to
//! these constants; neither hardcodes a marker string.

/// Fenced multi-line block delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fence {
    Code,
    Math,
}

impl Fence {
    pub const CODE: &'static str = "```";
    pub const MATH: &'static str = "$$";

    pub fn marker(self) -> &'static str {
        match self {
            Fence::Code => Self::CODE,
            Fence::Math => Self::MATH,
        }
    }

    /// Fence opened by `line`, if any, with the text after the marker.
    pub fn open(line: &str) -> Option<(Fence, &str)> {
        if let Some(info) = line.strip_prefix(Self::CODE) {
            Some((Fence::Code, info))
        } else {
            line.strip_prefix(Self::MATH).map(|info| (Fence::Math, info))
        }
    }

    /// Any line starting with the marker closes the fence, whatever follows it.
    pub fn closes(self, line: &str) -> bool {
        line.starts_with(self.marker())
    }
}

pub struct Heading;

impl Heading {
    /// Longest first, so `### ` is never read as `# ` plus text.
    pub const PREFIXES: [(&'static str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];

    pub fn prefix(level: u8) -> &'static str {
        match level {
            1 => "# ",
            2 => "## ",
            _ => "### ",
        }
    }
}

pub struct ListMarker;

impl ListMarker {
    pub const BULLET: &'static str = "- ";
    /// Spaces per list nesting level
    pub const INDENT_WIDTH: usize = 2;
    /// A tab counts as one full level of indentation
    pub const TAB_WIDTH: usize = 2;
}

pub struct ImageRef;

impl ImageRef {
    pub const OPEN: &'static str = "![](";
    pub const CLOSE: &'static str = ")";

    pub fn path(line: &str) -> Option<&str> {
        let path = line.strip_prefix(Self::OPEN)?.strip_suffix(Self::CLOSE)?;
        if path.is_empty() || path.contains(Self::CLOSE) {
            None
        } else {
            Some(path)
        }
    }

    pub fn render(path: &str) -> String {
        format!("{}{path}{}", Self::OPEN, Self::CLOSE)
    }
}
