use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::document::Document;
use crate::editing::{Transaction, create_inverse_transaction};
use crate::error::Result;

/// Time source for history grouping, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and advance the clock a `History` owns.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// History tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Oldest entries are dropped once the undo stack grows past this
    pub max_undo_levels: usize,
    /// Transactions pushed closer together than this merge into one undo step
    pub grouping_window_ms: u64,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_undo_levels: 100,
            grouping_window_ms: 500,
        }
    }
}

/// An undo entry: the transaction and the document it was first applied to.
#[derive(Debug, Clone)]
struct Entry {
    transaction: Transaction,
    before: Document,
}

/// Bounded undo/redo stacks with time-windowed grouping.
///
/// History stores transactions, never documents it applies itself: `pop_undo`
/// and `pop_redo` hand back a transaction for the caller to apply. Calling
/// either from inside a `push` is not supported.
pub struct History<C: Clock = SystemClock> {
    undo_stack: VecDeque<Entry>,
    redo_stack: Vec<Transaction>,
    options: HistoryOptions,
    last_transaction_time: Option<u64>,
    clock: C,
}

impl History<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(HistoryOptions::default(), SystemClock)
    }
}

impl Default for History<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> History<C> {
    pub fn with_clock(options: HistoryOptions, clock: C) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            options,
            last_transaction_time: None,
            clock,
        }
    }

    pub fn options(&self) -> HistoryOptions {
        self.options
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Record `transaction`, which is about to be applied to `before`.
    ///
    /// Empty transactions are ignored. Any push clears the redo stack. A push
    /// within the grouping window of the previous one is merged into the top
    /// undo entry instead of adding a new one.
    pub fn push(&mut self, transaction: Transaction, before: &Document) {
        if transaction.is_empty() {
            return;
        }
        self.redo_stack.clear();

        let now = self.clock.now_ms();
        let within_window = self
            .last_transaction_time
            .is_some_and(|last| now.saturating_sub(last) < self.options.grouping_window_ms);
        self.last_transaction_time = Some(now);

        if within_window && let Some(top) = self.undo_stack.back_mut() {
            log::debug!(
                "history: grouping {} operation(s) into previous undo step",
                transaction.len()
            );
            top.transaction.merge(transaction);
            return;
        }

        self.undo_stack.push_back(Entry {
            transaction,
            before: before.clone(),
        });
        while self.undo_stack.len() > self.options.max_undo_levels {
            self.undo_stack.pop_front();
            log::debug!("history: dropped oldest undo step");
        }
    }

    /// Pop the newest undo step and return the transaction that reverses it.
    ///
    /// `current` is the document the returned transaction will be applied
    /// to. Returns `Ok(None)` when there is nothing to undo.
    pub fn pop_undo(&mut self, current: &Document) -> Result<Option<Transaction>> {
        let Some(entry) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        let inverse = match create_inverse_transaction(&entry.transaction, &entry.before) {
            Ok(inverse) => inverse,
            Err(err) => {
                self.undo_stack.push_back(entry);
                return Err(err);
            }
        };
        let expected = entry.transaction.apply(&entry.before);
        if !expected.is_ok_and(|doc| doc.same_content(current)) {
            log::warn!(
                "history: document v{} does not match the state undo was recorded against",
                current.version()
            );
        }
        self.redo_stack.push(entry.transaction);
        self.last_transaction_time = None;
        Ok(Some(inverse))
    }

    /// Pop the newest redo step. The transaction is returned verbatim for the
    /// caller to re-apply to `current`, which becomes its undo baseline.
    pub fn pop_redo(&mut self, current: &Document) -> Option<Transaction> {
        let transaction = self.redo_stack.pop()?;
        self.undo_stack.push_back(Entry {
            transaction: transaction.clone(),
            before: current.clone(),
        });
        self.last_transaction_time = None;
        Some(transaction)
    }

    /// Forget everything, e.g. when a different document is loaded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_transaction_time = None;
    }

    /// Stop the next push from merging into the current top entry.
    pub fn break_grouping(&mut self) {
        self.last_transaction_time = None;
    }
}
