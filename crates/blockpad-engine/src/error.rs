use crate::document::BlockType;

/// Errors raised by document, operation and history functions.
///
/// An invalid index is always a caller bug; the engine reports it instead of
/// clamping so the caller's view of the document can be corrected.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("block index {index} out of range for document of {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("block range {start}..{end} invalid for document of {len} blocks")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("invalid trigger pattern for {block_type:?}: {source}")]
    InvalidPattern {
        block_type: BlockType,
        source: regex::Error,
    },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
