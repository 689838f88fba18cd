use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A caret position: block index plus UTF-16 offset into that block's content.
///
/// Positions order by block first, then offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub block_index: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block_index: usize, offset: usize) -> Self {
        Self {
            block_index,
            offset,
        }
    }

    pub fn compare(&self, other: &Position) -> Ordering {
        self.cmp(other)
    }

    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &Position) -> bool {
        self > other
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.block_index
            .cmp(&other.block_index)
            .then(self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Anchor/focus pair. The anchor is where the selection started and the
/// focus is where the caret is; either may come first in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// A caret with no extent.
    pub fn collapsed(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn caret(block_index: usize, offset: usize) -> Self {
        Self::collapsed(Position::new(block_index, offset))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Earlier of anchor and focus, whatever the selection direction.
    pub fn start(&self) -> Position {
        self.anchor.min(self.focus)
    }

    /// Later of anchor and focus, whatever the selection direction.
    pub fn end(&self) -> Position {
        self.anchor.max(self.focus)
    }

    pub fn is_backward(&self) -> bool {
        self.focus.is_before(&self.anchor)
    }

    pub fn spans_multiple_blocks(&self) -> bool {
        self.anchor.block_index != self.focus.block_index
    }
}
