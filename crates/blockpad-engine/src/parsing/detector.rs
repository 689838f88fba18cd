use regex::Regex;

use crate::document::BlockType;
use crate::error::{EngineError, Result};
use crate::text::utf16_len;

/// Trigger pattern for one block type.
#[derive(Debug, Clone)]
struct Trigger {
    block_type: BlockType,
    pattern: Regex,
}

/// Ordered, immutable map from block type to its trigger pattern.
///
/// Patterns are tried in registration order, so more specific triggers must
/// be registered before the ones they overlap with (`### ` before `# `).
/// Types registered without a pattern (paragraph, image) never match; they
/// are listed so the registry knows every type it supports.
#[derive(Debug, Clone)]
pub struct BlockTypeRegistry {
    types: Vec<BlockType>,
    triggers: Vec<Trigger>,
}

/// Collects `(type, pattern)` pairs and compiles them into a registry.
#[derive(Debug, Default)]
pub struct BlockTypeRegistryBuilder {
    entries: Vec<(BlockType, Option<String>)>,
}

impl BlockTypeRegistryBuilder {
    pub fn register(mut self, block_type: BlockType, pattern: Option<&str>) -> Self {
        self.entries.push((block_type, pattern.map(str::to_string)));
        self
    }

    pub fn build(self) -> Result<BlockTypeRegistry> {
        let mut types = Vec::with_capacity(self.entries.len());
        let mut triggers = vec![];
        for (block_type, pattern) in self.entries {
            if !types.contains(&block_type) {
                types.push(block_type);
            }
            if let Some(pattern) = pattern {
                let pattern = Regex::new(&pattern)
                    .map_err(|source| EngineError::InvalidPattern { block_type, source })?;
                triggers.push(Trigger {
                    block_type,
                    pattern,
                });
            }
        }
        Ok(BlockTypeRegistry { types, triggers })
    }
}

impl BlockTypeRegistry {
    pub fn builder() -> BlockTypeRegistryBuilder {
        BlockTypeRegistryBuilder::default()
    }

    /// The built-in block types and their markdown triggers.
    pub fn standard() -> Self {
        Self::builder()
            .register(BlockType::Heading3, Some(r"^###\s"))
            .register(BlockType::Heading2, Some(r"^##\s"))
            .register(BlockType::Heading1, Some(r"^#\s"))
            .register(BlockType::BulletList, Some(r"^[-*]\s"))
            .register(BlockType::NumberedList, Some(r"^(\d+)\.\s"))
            .register(BlockType::CodeBlock, Some(r"^```([a-z]*)$"))
            .register(BlockType::MathBlock, Some(r"^\$\$$"))
            .register(BlockType::Paragraph, None)
            .register(BlockType::Image, None)
            .build()
            .expect("Built-in trigger patterns must compile")
    }

    pub fn types(&self) -> &[BlockType] {
        &self.types
    }

    pub fn supports(&self, block_type: BlockType) -> bool {
        self.types.contains(&block_type)
    }

    pub fn has_trigger(&self, block_type: BlockType) -> bool {
        self.triggers.iter().any(|t| t.block_type == block_type)
    }
}

impl Default for BlockTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// A trigger that matched the start of a block's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBlock {
    pub block_type: BlockType,
    /// Length of the matched trigger in UTF-16 code units
    pub matched_prefix_len: usize,
    /// Content with the trigger removed
    pub remaining_content: String,
    /// Fence language captured by a code-block trigger, if non-empty
    pub language: Option<String>,
}

/// Runs a registry's triggers against typed content.
#[derive(Debug, Clone, Default)]
pub struct BlockTypeDetector {
    registry: BlockTypeRegistry,
}

impl BlockTypeDetector {
    pub fn new(registry: BlockTypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BlockTypeRegistry {
        &self.registry
    }

    /// First trigger (in registration order) that matches `text`.
    ///
    /// `None` means the content stays a paragraph.
    pub fn detect(&self, text: &str) -> Option<DetectedBlock> {
        self.registry.triggers.iter().find_map(|trigger| {
            let caps = trigger.pattern.captures(text)?;
            let matched = caps.get(0)?;
            let language = match trigger.block_type {
                BlockType::CodeBlock => caps
                    .get(1)
                    .map(|m| m.as_str())
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_string),
                _ => None,
            };
            Some(DetectedBlock {
                block_type: trigger.block_type,
                matched_prefix_len: utf16_len(matched.as_str()),
                remaining_content: text[matched.end()..].to_string(),
                language,
            })
        })
    }

    /// Like [`detect`](Self::detect) but only for triggers that convert on
    /// space: fenced triggers match whole lines and fire on Enter instead.
    pub fn detect_on_space(&self, text: &str) -> Option<DetectedBlock> {
        self.detect(text).filter(|d| !d.block_type.is_fenced())
    }

    /// Fenced-block trigger matching the entire content, for Enter.
    pub fn detect_on_enter(&self, text: &str) -> Option<DetectedBlock> {
        self.detect(text).filter(|d| d.block_type.is_fenced())
    }
}
