use crate::document::{BlockKind, BlockNode, Document};

use super::syntax::{Fence, Heading, ImageRef, ListMarker};

/// Render a document as markdown.
///
/// Each block becomes its canonical line(s). Numbered items are renumbered
/// from their position (see [`list_number`]), never from stored content.
/// Fenced blocks are followed by one blank line when more blocks follow.
pub fn serialize_document(doc: &Document) -> String {
    if doc.is_blank() {
        return String::new();
    }

    let blocks = doc.blocks();
    let mut lines: Vec<String> = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        render_block(blocks, index, block, &mut lines);
        if block.block_type().is_fenced() && index + 1 < blocks.len() {
            lines.push(String::new());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_block(blocks: &[BlockNode], index: usize, block: &BlockNode, lines: &mut Vec<String>) {
    let content = block.content();
    match block.kind() {
        BlockKind::Paragraph => lines.push(content.to_string()),
        BlockKind::Heading1 => lines.push(format!("{}{content}", Heading::prefix(1))),
        BlockKind::Heading2 => lines.push(format!("{}{content}", Heading::prefix(2))),
        BlockKind::Heading3 => lines.push(format!("{}{content}", Heading::prefix(3))),
        BlockKind::BulletList { level } => {
            lines.push(format!("{}{}{content}", indent(*level), ListMarker::BULLET));
        }
        BlockKind::NumberedList { level } => {
            let number = list_number(blocks, index);
            lines.push(format!("{}{number}. {content}", indent(*level)));
        }
        BlockKind::CodeBlock { language } => {
            let opener = format!("{}{}", Fence::CODE, language.as_deref().unwrap_or(""));
            render_fence(opener, Fence::CODE, content, lines);
        }
        BlockKind::MathBlock => render_fence(Fence::MATH.to_string(), Fence::MATH, content, lines),
        BlockKind::Image => lines.push(ImageRef::render(content)),
    }
}

fn render_fence(opener: String, closer: &str, content: &str, lines: &mut Vec<String>) {
    lines.push(opener);
    if !content.is_empty() {
        lines.extend(content.split('\n').map(str::to_string));
    }
    lines.push(closer.to_string());
}

fn indent(level: u32) -> String {
    " ".repeat(level as usize * ListMarker::INDENT_WIDTH)
}

/// Display number of the numbered-list item at `index`.
///
/// Counts the consecutive numbered items at the same level directly above
/// it; deeper-nested list items in between do not break the run. Returns 1
/// for a block that is not a numbered item.
pub fn list_number(blocks: &[BlockNode], index: usize) -> usize {
    let Some(BlockKind::NumberedList { level }) = blocks.get(index).map(BlockNode::kind) else {
        return 1;
    };
    let mut number = 1;
    for block in blocks[..index].iter().rev() {
        match block.kind() {
            BlockKind::NumberedList { level: l } if l == level => number += 1,
            BlockKind::BulletList { level: l } | BlockKind::NumberedList { level: l }
                if l > level => {}
            _ => break,
        }
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockNode, BlockType};
    use crate::parsing::parse_markdown;

    fn numbered(level: u32, content: &str) -> BlockNode {
        BlockNode::new(BlockKind::NumberedList { level }, content)
    }

    #[test]
    fn test_blank_document_serializes_to_nothing() {
        assert_eq!(serialize_document(&Document::new()), "");
    }

    #[test]
    fn test_numbering_ignores_stored_content() {
        let doc = Document::from_blocks(vec![
            numbered(0, "7. seven"),
            numbered(0, "x"),
            numbered(0, "y"),
        ]);
        insta::assert_snapshot!(serialize_document(&doc), @r"
1. 7. seven
2. x
3. y
");
    }

    #[test]
    fn test_numbering_restarts_after_other_blocks() {
        let doc = Document::from_blocks(vec![
            numbered(0, "a"),
            BlockNode::paragraph("break"),
            numbered(0, "b"),
        ]);
        assert_eq!(list_number(doc.blocks(), 2), 1);
    }

    #[test]
    fn test_nested_items_do_not_break_numbering() {
        let blocks = vec![
            numbered(0, "a"),
            BlockNode::new(BlockKind::BulletList { level: 1 }, "child"),
            numbered(1, "nested"),
            numbered(0, "b"),
        ];
        assert_eq!(list_number(&blocks, 2), 1);
        assert_eq!(list_number(&blocks, 3), 2);
    }

    #[test]
    fn test_shallower_item_breaks_numbering() {
        let blocks = vec![
            numbered(1, "a"),
            BlockNode::new(BlockKind::BulletList { level: 0 }, "parent"),
            numbered(1, "b"),
        ];
        assert_eq!(list_number(&blocks, 2), 1);
    }

    #[test]
    fn test_every_block_type_renders_canonically() {
        let doc = Document::from_blocks(vec![
            BlockNode::new(BlockKind::Heading1, "Title"),
            BlockNode::new(BlockKind::Heading2, "Sub"),
            BlockNode::new(BlockKind::Heading3, "Small"),
            BlockNode::paragraph("Some text"),
            BlockNode::new(BlockKind::BulletList { level: 0 }, "top"),
            BlockNode::new(BlockKind::BulletList { level: 1 }, "nested"),
            BlockNode::new(
                BlockKind::CodeBlock {
                    language: Some("rust".into()),
                },
                "fn main() {}",
            ),
            BlockNode::new(BlockKind::MathBlock, "a^2 + b^2"),
            BlockNode::image("img/diagram.png"),
        ]);
        insta::assert_snapshot!(serialize_document(&doc), @r"
# Title
## Sub
### Small
Some text
- top
  - nested
```rust
fn main() {}
```

$$
a^2 + b^2
$$

![](img/diagram.png)
");
    }

    #[test]
    fn test_fence_line_inside_content_closes_early() {
        let doc = Document::from_blocks(vec![BlockNode::new(
            BlockKind::CodeBlock { language: None },
            "before\n```\nafter",
        )]);
        let markdown = serialize_document(&doc);
        assert_eq!(markdown, "```\nbefore\n```\nafter\n```\n");

        // no escape exists, so the reload splits the block
        let reloaded = parse_markdown(&markdown);
        let kinds: Vec<_> = reloaded
            .blocks()
            .iter()
            .map(|b| (b.block_type(), b.content().to_string()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (BlockType::CodeBlock, "before".to_string()),
                (BlockType::Paragraph, "after".to_string()),
                (BlockType::CodeBlock, String::new()),
            ]
        );
    }

    #[test]
    fn test_empty_code_block_has_no_content_line() {
        let doc = Document::from_blocks(vec![BlockNode::new(
            BlockKind::CodeBlock { language: None },
            "",
        )]);
        assert_eq!(serialize_document(&doc), "```\n```\n");
    }
}
