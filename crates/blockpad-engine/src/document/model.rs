use serde::{Deserialize, Serialize};

use crate::document::{BlockId, BlockNode};
use crate::error::{EngineError, Result};

/// Ordered, versioned collection of blocks.
///
/// A document is a value: every edit returns a new `Document` and leaves the
/// receiver untouched. It always holds at least one block; edits that would
/// empty it produce the canonical empty document (one empty paragraph).
/// `version` grows by one on every structural edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<BlockNode>,
    version: u64,
}

impl Document {
    /// The canonical empty document.
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockNode::empty_paragraph()],
            version: 0,
        }
    }

    /// Build a document at version 0. An empty list yields the canonical
    /// empty document.
    pub fn from_blocks(blocks: Vec<BlockNode>) -> Self {
        if blocks.is_empty() {
            return Self::new();
        }
        Self { blocks, version: 0 }
    }

    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, index: usize) -> Option<&BlockNode> {
        self.blocks.get(index)
    }

    /// Block at `index`, or `IndexOutOfRange`.
    pub fn block(&self, index: usize) -> Result<&BlockNode> {
        self.blocks.get(index).ok_or(EngineError::IndexOutOfRange {
            index,
            len: self.blocks.len(),
        })
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    /// True for a document holding only one empty paragraph.
    pub fn is_blank(&self) -> bool {
        self.blocks.len() == 1
            && self.blocks[0].block_type() == crate::document::BlockType::Paragraph
            && self.blocks[0].is_empty()
    }

    /// Insert `block` before `index`; `index == block_count()` appends.
    pub fn insert_block(&self, index: usize, block: BlockNode) -> Result<Document> {
        if index > self.blocks.len() {
            return Err(self.out_of_range(index));
        }
        let mut blocks = self.blocks.clone();
        blocks.insert(index, block);
        Ok(self.next(blocks))
    }

    /// Remove the block at `index`.
    ///
    /// Removing the only block leaves a fresh empty paragraph in its place.
    pub fn remove_block(&self, index: usize) -> Result<Document> {
        self.block(index)?;
        let mut blocks = self.blocks.clone();
        blocks.remove(index);
        Ok(self.next(blocks))
    }

    /// Replace the block at `index` with `block`.
    pub fn update_block(&self, index: usize, block: BlockNode) -> Result<Document> {
        self.block(index)?;
        let mut blocks = self.blocks.clone();
        blocks[index] = block;
        Ok(self.next(blocks))
    }

    /// Replace the blocks in `start..end` with `new_blocks`.
    pub fn replace_blocks(
        &self,
        start: usize,
        end: usize,
        new_blocks: Vec<BlockNode>,
    ) -> Result<Document> {
        if start > end || end > self.blocks.len() {
            return Err(EngineError::InvalidRange {
                start,
                end,
                len: self.blocks.len(),
            });
        }
        let mut blocks = self.blocks.clone();
        blocks.splice(start..end, new_blocks);
        Ok(self.next(blocks))
    }

    /// Equality ignoring block ids and version.
    pub fn same_content(&self, other: &Document) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.same_content(b))
    }

    fn next(&self, mut blocks: Vec<BlockNode>) -> Document {
        if blocks.is_empty() {
            blocks.push(BlockNode::empty_paragraph());
        }
        Document {
            blocks,
            version: self.version + 1,
        }
    }

    fn out_of_range(&self, index: usize) -> EngineError {
        EngineError::IndexOutOfRange {
            index,
            len: self.blocks.len(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
