/*!
 * # Editing Core
 *
 * Everything that changes a [`Document`](crate::document::Document) goes
 * through this module.
 *
 * ## Layers
 *
 * - **`operation`**: [`Operation`] is a closed set of atomic edits. Each one
 *   can `apply` itself and build its own `inverse` from the document it is
 *   about to change.
 * - **`transaction`**: a [`Transaction`] groups operations with the selection
 *   before and after. [`create_inverse_transaction`] walks the operations in
 *   order, capturing each inverse against the intermediate state, then
 *   reverses the list.
 * - **`history`**: [`History`] keeps bounded undo/redo stacks and merges
 *   transactions that arrive within the grouping window. Time comes from an
 *   injected [`Clock`].
 * - **`selection`**: [`Position`] and [`Selection`] value types.
 * - **`session`**: [`EditorSession`] owns the current document, selection and
 *   history and turns UI callbacks (space, enter, backspace, ...) into
 *   transactions.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use blockpad_engine::editing::{EditorSession, EnterOutcome};
 *
 * let mut session = EditorSession::from_markdown("hello world");
 * assert_eq!(session.handle_enter(0, 5).unwrap(), EnterOutcome::Split);
 * assert_eq!(session.to_markdown(), "hello\n world\n");
 * session.undo().unwrap();
 * assert_eq!(session.to_markdown(), "hello world\n");
 * ```
 */

pub mod history;
pub mod operation;
pub mod selection;
pub mod session;
pub mod transaction;

pub use history::{Clock, History, HistoryOptions, ManualClock, SystemClock};
pub use operation::Operation;
pub use selection::{Position, Selection};
pub use session::{EditorSession, EnterOutcome, SessionEvent, SubscriptionId};
pub use transaction::{Transaction, create_inverse_transaction};
