use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier of a block.
///
/// Identity survives content and type changes, so UI elements can stay
/// bound to the same block while it is edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fieldless discriminant of [`BlockKind`], used by registries and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    CodeBlock,
    MathBlock,
    Image,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::BulletList,
        BlockType::NumberedList,
        BlockType::CodeBlock,
        BlockType::MathBlock,
        BlockType::Image,
    ];

    pub fn is_list(self) -> bool {
        matches!(self, BlockType::BulletList | BlockType::NumberedList)
    }

    /// Code and math blocks hold multi-line verbatim content.
    pub fn is_fenced(self) -> bool {
        matches!(self, BlockType::CodeBlock | BlockType::MathBlock)
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Heading3 => "heading3",
            BlockType::BulletList => "bulletList",
            BlockType::NumberedList => "numberedList",
            BlockType::CodeBlock => "codeBlock",
            BlockType::MathBlock => "mathBlock",
            BlockType::Image => "image",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Block type together with the fields only that type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList { level: u32 },
    NumberedList { level: u32 },
    CodeBlock { language: Option<String> },
    MathBlock,
    /// Content holds the image path
    Image,
}

impl BlockKind {
    /// Build a kind from its discriminant.
    ///
    /// `language` is kept only for code blocks and `level` only for lists.
    pub fn from_type(block_type: BlockType, language: Option<String>, level: u32) -> Self {
        match block_type {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::Heading1 => BlockKind::Heading1,
            BlockType::Heading2 => BlockKind::Heading2,
            BlockType::Heading3 => BlockKind::Heading3,
            BlockType::BulletList => BlockKind::BulletList { level },
            BlockType::NumberedList => BlockKind::NumberedList { level },
            BlockType::CodeBlock => BlockKind::CodeBlock { language },
            BlockType::MathBlock => BlockKind::MathBlock,
            BlockType::Image => BlockKind::Image,
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading1 => BlockType::Heading1,
            BlockKind::Heading2 => BlockType::Heading2,
            BlockKind::Heading3 => BlockType::Heading3,
            BlockKind::BulletList { .. } => BlockType::BulletList,
            BlockKind::NumberedList { .. } => BlockType::NumberedList,
            BlockKind::CodeBlock { .. } => BlockType::CodeBlock,
            BlockKind::MathBlock => BlockType::MathBlock,
            BlockKind::Image => BlockType::Image,
        }
    }

    pub fn list_level(&self) -> Option<u32> {
        match self {
            BlockKind::BulletList { level } | BlockKind::NumberedList { level } => Some(*level),
            _ => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            BlockKind::CodeBlock { language } => language.as_deref(),
            _ => None,
        }
    }

    /// Same kind at another list level. Non-list kinds are returned unchanged.
    pub fn with_list_level(&self, level: u32) -> Self {
        match self {
            BlockKind::BulletList { .. } => BlockKind::BulletList { level },
            BlockKind::NumberedList { .. } => BlockKind::NumberedList { level },
            other => other.clone(),
        }
    }
}

/// Immutable unit of document content.
///
/// Every change goes through a `with_*` method that returns a new value;
/// the block id is carried over unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    id: BlockId,
    kind: BlockKind,
    content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

impl BlockNode {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: content.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, content)
    }

    pub fn empty_paragraph() -> Self {
        Self::paragraph(String::new())
    }

    pub fn image(path: impl Into<String>) -> Self {
        Self::new(BlockKind::Image, path)
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn language(&self) -> Option<&str> {
        self.kind.language()
    }

    pub fn list_level(&self) -> Option<u32> {
        self.kind.list_level()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn with_kind(self, kind: BlockKind) -> Self {
        Self { kind, ..self }
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self
        }
    }

    pub fn with_attributes(self, attributes: BTreeMap<String, String>) -> Self {
        Self { attributes, ..self }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Equality ignoring the block id.
    pub fn same_content(&self, other: &BlockNode) -> bool {
        self.kind == other.kind
            && self.content == other.content
            && self.attributes == other.attributes
    }
}
