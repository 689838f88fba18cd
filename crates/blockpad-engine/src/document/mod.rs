//! # Document Model
//!
//! Immutable block documents. A [`Document`] is an ordered list of
//! [`BlockNode`]s plus a version counter; all edits are pure functions that
//! return a new document. Edits are normally not called directly but through
//! [`Operation`](crate::editing::Operation)s so they can be undone.

pub mod block;
pub mod model;

pub use block::{BlockId, BlockKind, BlockNode, BlockType};
pub use model::Document;
