use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{BlockKind, BlockNode, Document};
use crate::error::{EngineError, Result};

/// Atomic, reversible edit to a [`Document`].
///
/// Operations carry only their forward data; [`Operation::inverse`] reads the
/// exact prior values out of the document the operation is about to be
/// applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    InsertBlock {
        index: usize,
        block: BlockNode,
    },
    DeleteBlock {
        index: usize,
    },
    UpdateContent {
        index: usize,
        content: String,
    },
    UpdateType {
        index: usize,
        kind: BlockKind,
    },
    UpdateListLevel {
        index: usize,
        level: u32,
    },
    UpdateAttributes {
        index: usize,
        attributes: BTreeMap<String, String>,
    },
    ReplaceBlocks {
        start: usize,
        end: usize,
        blocks: Vec<BlockNode>,
    },
}

impl Operation {
    /// Apply to `doc`, returning the edited document.
    pub fn apply(&self, doc: &Document) -> Result<Document> {
        match self {
            Operation::InsertBlock { index, block } => doc.insert_block(*index, block.clone()),
            Operation::DeleteBlock { index } => doc.remove_block(*index),
            Operation::UpdateContent { index, content } => {
                let block = doc.block(*index)?.clone().with_content(content.clone());
                doc.update_block(*index, block)
            }
            Operation::UpdateType { index, kind } => {
                let block = doc.block(*index)?.clone().with_kind(kind.clone());
                doc.update_block(*index, block)
            }
            Operation::UpdateListLevel { index, level } => {
                let block = doc.block(*index)?.clone();
                let kind = block.kind().with_list_level(*level);
                doc.update_block(*index, block.with_kind(kind))
            }
            Operation::UpdateAttributes { index, attributes } => {
                let block = doc.block(*index)?.clone().with_attributes(attributes.clone());
                doc.update_block(*index, block)
            }
            Operation::ReplaceBlocks { start, end, blocks } => {
                doc.replace_blocks(*start, *end, blocks.clone())
            }
        }
    }

    /// The operation that undoes `self`.
    ///
    /// `before` must be the document state this operation is applied to,
    /// not the state it produces.
    pub fn inverse(&self, before: &Document) -> Result<Operation> {
        let inverse = match self {
            Operation::InsertBlock { index, .. } => {
                if *index > before.block_count() {
                    return Err(EngineError::IndexOutOfRange {
                        index: *index,
                        len: before.block_count(),
                    });
                }
                Operation::DeleteBlock { index: *index }
            }
            Operation::DeleteBlock { index } => {
                let removed = before.block(*index)?.clone();
                if before.block_count() == 1 {
                    // deleting the last block left a placeholder paragraph behind
                    Operation::ReplaceBlocks {
                        start: 0,
                        end: 1,
                        blocks: vec![removed],
                    }
                } else {
                    Operation::InsertBlock {
                        index: *index,
                        block: removed,
                    }
                }
            }
            Operation::UpdateContent { index, .. } => Operation::UpdateContent {
                index: *index,
                content: before.block(*index)?.content().to_string(),
            },
            Operation::UpdateType { index, .. } => Operation::UpdateType {
                index: *index,
                kind: before.block(*index)?.kind().clone(),
            },
            Operation::UpdateListLevel { index, .. } => Operation::UpdateListLevel {
                index: *index,
                level: before.block(*index)?.list_level().unwrap_or(0),
            },
            Operation::UpdateAttributes { index, .. } => Operation::UpdateAttributes {
                index: *index,
                attributes: before.block(*index)?.attributes().clone(),
            },
            Operation::ReplaceBlocks { start, end, blocks } => {
                let len = before.block_count();
                if start > end || *end > len {
                    return Err(EngineError::InvalidRange {
                        start: *start,
                        end: *end,
                        len,
                    });
                }
                let removed = before.blocks()[*start..*end].to_vec();
                if len - (end - start) + blocks.len() == 0 {
                    Operation::ReplaceBlocks {
                        start: 0,
                        end: 1,
                        blocks: removed,
                    }
                } else {
                    Operation::ReplaceBlocks {
                        start: *start,
                        end: start + blocks.len(),
                        blocks: removed,
                    }
                }
            }
        };
        Ok(inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> Document {
        Document::from_blocks(vec![
            BlockNode::new(BlockKind::Heading1, "Title"),
            BlockNode::new(BlockKind::BulletList { level: 1 }, "item")
                .with_attribute("collapsed", "true"),
            BlockNode::paragraph("body"),
        ])
    }

    fn assert_reverses(op: Operation, doc: &Document) {
        let inverse = op.inverse(doc).unwrap();
        let after = op.apply(doc).unwrap();
        let restored = inverse.apply(&after).unwrap();
        assert!(
            restored.same_content(doc),
            "inverse of {op:?} did not restore document: {restored:?}"
        );
    }

    #[rstest]
    #[case(Operation::InsertBlock { index: 0, block: BlockNode::paragraph("new") })]
    #[case(Operation::InsertBlock { index: 3, block: BlockNode::paragraph("new") })]
    #[case(Operation::DeleteBlock { index: 1 })]
    #[case(Operation::UpdateContent { index: 2, content: "changed".into() })]
    #[case(Operation::UpdateType { index: 0, kind: BlockKind::CodeBlock { language: Some("rust".into()) } })]
    #[case(Operation::UpdateListLevel { index: 1, level: 3 })]
    #[case(Operation::UpdateAttributes { index: 1, attributes: BTreeMap::new() })]
    #[case(Operation::ReplaceBlocks { start: 0, end: 2, blocks: vec![BlockNode::paragraph("x")] })]
    #[case(Operation::ReplaceBlocks { start: 1, end: 1, blocks: vec![BlockNode::paragraph("x"), BlockNode::paragraph("y")] })]
    #[case(Operation::ReplaceBlocks { start: 0, end: 3, blocks: vec![] })]
    fn test_inverse_restores_document(#[case] op: Operation) {
        assert_reverses(op, &sample());
    }

    #[test]
    fn test_deleting_sole_block_is_reversible() {
        let doc = Document::from_blocks(vec![BlockNode::new(BlockKind::Heading2, "only")]);
        let op = Operation::DeleteBlock { index: 0 };

        let after = op.apply(&doc).unwrap();
        assert!(after.is_blank());

        let restored = op.inverse(&doc).unwrap().apply(&after).unwrap();
        assert_eq!(restored.blocks(), doc.blocks());
    }

    #[test]
    fn test_inverse_of_delete_restores_original_identity() {
        let doc = sample();
        let op = Operation::DeleteBlock { index: 1 };
        let restored = op
            .inverse(&doc)
            .unwrap()
            .apply(&op.apply(&doc).unwrap())
            .unwrap();
        assert_eq!(restored.blocks()[1].id(), doc.blocks()[1].id());
    }

    #[test]
    fn test_update_type_keeps_content_and_id() {
        let doc = sample();
        let op = Operation::UpdateType {
            index: 2,
            kind: BlockKind::Heading3,
        };
        let after = op.apply(&doc).unwrap();
        assert_eq!(after.blocks()[2].block_type(), BlockType::Heading3);
        assert_eq!(after.blocks()[2].content(), "body");
        assert_eq!(after.blocks()[2].id(), doc.blocks()[2].id());
    }

    #[test]
    fn test_list_level_change_ignores_non_list_blocks() {
        let doc = sample();
        let op = Operation::UpdateListLevel { index: 0, level: 2 };
        let after = op.apply(&doc).unwrap();
        assert_eq!(after.blocks()[0].kind(), &BlockKind::Heading1);
    }

    #[test]
    fn test_out_of_range_operations_fail() {
        let doc = sample();
        let op = Operation::UpdateContent {
            index: 9,
            content: String::new(),
        };
        assert!(matches!(
            op.apply(&doc),
            Err(EngineError::IndexOutOfRange { index: 9, len: 3 })
        ));
        assert!(op.inverse(&doc).is_err());
    }
}
