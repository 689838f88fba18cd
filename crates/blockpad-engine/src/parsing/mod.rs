//! # Markdown Codec
//!
//! Line-oriented conversion between markdown text and
//! [`Document`](crate::document::Document)s.
//!
//! Parsing runs in two phases like a small block parser:
//!
//! 1. [`classify`] looks at one line in isolation and says what it could be.
//! 2. [`parser::BlockBuilder`] walks the classified lines once, tracking
//!    whether it is inside a fence, and emits blocks.
//!
//! Parsing is total: any line that is not recognised becomes a paragraph.
//! [`serialize_document`] is the structural inverse. The pair is stable after
//! one normalisation pass (`parse(serialize(parse(m)))` equals `parse(m)`),
//! but not byte-identical to arbitrary input.
//!
//! [`detector`] holds the trigger registry that turns typed markdown syntax
//! into block type changes while editing.

pub mod classify;
pub mod detector;
pub mod languages;
pub mod parser;
pub mod serialize;
pub mod syntax;

pub use detector::{BlockTypeDetector, BlockTypeRegistry, DetectedBlock};
pub use languages::{Language, LanguageRegistry};
pub use parser::{parse_markdown, parse_markdown_bytes};
pub use serialize::{list_number, serialize_document};
