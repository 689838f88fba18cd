pub mod document;
pub mod editing;
pub mod error;
pub mod io;
pub mod models;
pub mod parsing;
pub mod text;
pub mod wikilink;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use document::{BlockId, BlockKind, BlockNode, BlockType, Document};
pub use editing::{
    EditorSession, EnterOutcome, History, HistoryOptions, Operation, Position, Selection,
    SessionEvent, Transaction, create_inverse_transaction,
};
pub use error::{EngineError, Result};
pub use io::*;
pub use models::NoteFile;
pub use parsing::{
    BlockTypeDetector, BlockTypeRegistry, DetectedBlock, LanguageRegistry, parse_markdown,
    serialize_document,
};
pub use wikilink::{NoteIndex, WikiLinkEvent, WikiLinkSession, find_start};
