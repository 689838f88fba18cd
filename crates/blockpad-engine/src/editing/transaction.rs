use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::editing::{Operation, Selection};
use crate::error::Result;

/// Ordered group of operations applied, and undone, as one unit.
///
/// Operations apply left to right, each against the document produced by
/// the one before it. The selection snapshots let undo and redo put the
/// caret back where it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub operations: Vec<Operation>,
    pub selection_before: Option<Selection>,
    pub selection_after: Option<Selection>,
    pub description: Option<String>,
    /// Milliseconds since the Unix epoch (or since the injected clock's origin)
    pub timestamp: u64,
}

impl Transaction {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            ..Self::default()
        }
    }

    pub fn single(operation: Operation) -> Self {
        Self::new(vec![operation])
    }

    pub fn with_selection_before(mut self, selection: Selection) -> Self {
        self.selection_before = Some(selection);
        self
    }

    pub fn with_selection_after(mut self, selection: Selection) -> Self {
        self.selection_after = Some(selection);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Fold the operations over `doc` left to right.
    pub fn apply(&self, doc: &Document) -> Result<Document> {
        self.operations
            .iter()
            .try_fold(doc.clone(), |current, op| op.apply(&current))
    }

    /// See [`create_inverse_transaction`].
    pub fn inverse(&self, original: &Document) -> Result<Transaction> {
        create_inverse_transaction(self, original)
    }

    /// Append `newer` onto this transaction, as when consecutive edits are
    /// grouped into one undo step.
    ///
    /// The earlier `selection_before` is kept; selection after, description
    /// and timestamp come from `newer`.
    pub fn merge(&mut self, newer: Transaction) {
        self.operations.extend(newer.operations);
        if newer.selection_after.is_some() {
            self.selection_after = newer.selection_after;
        }
        if newer.description.is_some() {
            self.description = newer.description;
        }
        self.timestamp = newer.timestamp;
    }
}

/// Build the transaction that undoes `tx`.
///
/// `original` is the document `tx` was applied to. Each inverse is captured
/// against the intermediate state its operation saw, then the list is
/// reversed so undo replays the steps last-first. Selections are swapped.
pub fn create_inverse_transaction(tx: &Transaction, original: &Document) -> Result<Transaction> {
    let mut current = original.clone();
    let mut inverses = Vec::with_capacity(tx.operations.len());
    for op in &tx.operations {
        inverses.push(op.inverse(&current)?);
        current = op.apply(&current)?;
    }
    inverses.reverse();

    Ok(Transaction {
        operations: inverses,
        selection_before: tx.selection_after,
        selection_after: tx.selection_before,
        description: tx.description.clone(),
        timestamp: tx.timestamp,
    })
}
