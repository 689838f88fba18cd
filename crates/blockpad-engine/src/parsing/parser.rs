use anyhow::Context;

use crate::document::{BlockKind, BlockNode, Document};

use super::classify::{LineClass, classify};
use super::syntax::Fence;

#[derive(Debug)]
enum LeafState {
    None,
    Fence {
        fence: Fence,
        language: Option<String>,
        lines: Vec<String>,
    },
}

/// Single forward pass over lines, emitting one block per line except inside
/// fences, which consume lines verbatim until their closing marker.
///
/// Blank line policy: leading and trailing blanks are dropped, a run of blanks
/// between content collapses to one empty paragraph, and the first blank line
/// straight after a closed fence is swallowed (the serializer writes one there).
pub struct BlockBuilder {
    leaf: LeafState,
    out: Vec<BlockNode>,
    pending_blank: bool,
    after_fence: bool,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            leaf: LeafState::None,
            out: vec![],
            pending_blank: false,
            after_fence: false,
        }
    }

    pub fn push(&mut self, line: &str) {
        if self.in_fence() {
            self.consume_fence_line(line);
            return;
        }

        let class = classify(line);
        if class == LineClass::Blank {
            if self.after_fence {
                self.after_fence = false;
            } else if !self.out.is_empty() {
                self.pending_blank = true;
            }
            return;
        }

        self.after_fence = false;
        if self.pending_blank {
            self.out.push(BlockNode::empty_paragraph());
            self.pending_blank = false;
        }

        match class {
            LineClass::Blank => {}
            LineClass::FenceOpen { fence, info } => {
                let language = match fence {
                    Fence::Code if !info.is_empty() => Some(info.to_string()),
                    _ => None,
                };
                self.leaf = LeafState::Fence {
                    fence,
                    language,
                    lines: vec![],
                };
            }
            LineClass::Image { path } => self.out.push(BlockNode::image(path)),
            LineClass::Heading { level, text } => {
                let kind = match level {
                    1 => BlockKind::Heading1,
                    2 => BlockKind::Heading2,
                    _ => BlockKind::Heading3,
                };
                self.out.push(BlockNode::new(kind, text));
            }
            LineClass::ListItem {
                ordered,
                level,
                text,
            } => {
                let kind = if ordered {
                    BlockKind::NumberedList { level }
                } else {
                    BlockKind::BulletList { level }
                };
                self.out.push(BlockNode::new(kind, text));
            }
            LineClass::Text(text) => self.out.push(BlockNode::paragraph(text)),
        }
    }

    pub fn finish(mut self) -> Vec<BlockNode> {
        // EOF flush: an unterminated fence keeps everything after its opener
        self.flush_fence();
        self.out
    }

    fn in_fence(&self) -> bool {
        matches!(self.leaf, LeafState::Fence { .. })
    }

    fn consume_fence_line(&mut self, line: &str) {
        let closes = match &mut self.leaf {
            LeafState::Fence { fence, lines, .. } => {
                if fence.closes(line) {
                    true
                } else {
                    lines.push(line.to_string());
                    false
                }
            }
            LeafState::None => return,
        };
        if closes {
            self.flush_fence();
            self.after_fence = true;
        }
    }

    fn flush_fence(&mut self) {
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        if let LeafState::Fence {
            fence,
            language,
            lines,
        } = prev
        {
            let kind = match fence {
                Fence::Code => BlockKind::CodeBlock { language },
                Fence::Math => BlockKind::MathBlock,
            };
            self.out.push(BlockNode::new(kind, lines.join("\n")));
        }
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse markdown text into a document. Total: every input yields a document.
pub fn parse_markdown(text: &str) -> Document {
    let mut builder = BlockBuilder::new();
    // `lines` only strips `\r` directly before `\n`
    for line in text.lines() {
        builder.push(line.trim_end_matches('\r'));
    }
    Document::from_blocks(builder.finish())
}

/// Parse a note read as raw bytes. Fails only if they are not UTF-8.
pub fn parse_markdown_bytes(bytes: &[u8]) -> anyhow::Result<Document> {
    let text = std::str::from_utf8(bytes).context("note is not valid UTF-8")?;
    Ok(parse_markdown(text))
}
