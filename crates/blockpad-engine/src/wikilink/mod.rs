//! # Wiki Links
//!
//! Autocomplete for `[[Note Title]]` references. [`trigger`] finds an open
//! `[[` relative to the caret, [`session`] tracks the active trigger and its
//! search results, and [`search`] is the interface to whatever lists notes.

pub mod search;
pub mod session;
pub mod trigger;

pub use search::{NoteIndex, NotePage, NoteSummary, SearchError, SearchRequest, StaticIndex};
pub use session::{ActiveLink, LinkInsertion, WikiLinkEvent, WikiLinkSession, WikiLinkState};
pub use trigger::find_start;
