use crate::document::{BlockKind, BlockNode, BlockType, Document};
use crate::editing::{
    Clock, History, HistoryOptions, Operation, Position, Selection, SystemClock, Transaction,
};
use crate::error::Result;
use crate::parsing::{BlockTypeDetector, DetectedBlock, LanguageRegistry};
use crate::parsing::{parse_markdown, serialize_document};
use crate::text::{split_at_utf16, utf16_len};
use crate::wikilink::{NoteIndex, WikiLinkEvent, WikiLinkSession};

pub type SubscriptionId = u64;

/// Notification sent to subscribers after a command changes state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    DocumentChanged { version: u64 },
    SelectionChanged(Selection),
    WikiLink(WikiLinkEvent),
}

/// What `handle_enter` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// A paragraph holding a fence trigger became a code or math block
    Converted,
    /// An empty list item became a paragraph
    ExitedList,
    /// The block was split at the caret
    Split,
    /// Code and math blocks take Enter as a literal newline
    NotHandled,
}

type Observer = Box<dyn FnMut(&SessionEvent)>;

/// One open document and everything needed to edit it.
///
/// Every command builds a single [`Transaction`], records it in [`History`],
/// applies it and notifies subscribers. Block indices and offsets come from
/// the UI; offsets are UTF-16 code units. An invalid index is returned as an
/// error and leaves the session untouched.
pub struct EditorSession<C: Clock = SystemClock> {
    document: Document,
    selection: Selection,
    history: History<C>,
    detector: BlockTypeDetector,
    languages: LanguageRegistry,
    wikilink: WikiLinkSession,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl EditorSession<SystemClock> {
    pub fn new(document: Document) -> Self {
        Self::with_clock(document, HistoryOptions::default(), SystemClock)
    }

    pub fn from_markdown(text: &str) -> Self {
        Self::new(parse_markdown(text))
    }
}

impl<C: Clock> EditorSession<C> {
    pub fn with_clock(document: Document, options: HistoryOptions, clock: C) -> Self {
        Self {
            document,
            selection: Selection::caret(0, 0),
            history: History::with_clock(options, clock),
            detector: BlockTypeDetector::default(),
            languages: LanguageRegistry::default(),
            wikilink: WikiLinkSession::new(),
            observers: vec![],
            next_subscription: 1,
        }
    }

    pub fn with_detector(mut self, detector: BlockTypeDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_wikilink(mut self, wikilink: WikiLinkSession) -> Self {
        self.wikilink = wikilink;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn history(&self) -> &History<C> {
        &self.history
    }

    pub fn detector(&self) -> &BlockTypeDetector {
        &self.detector
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    pub fn wikilink(&self) -> &WikiLinkSession {
        &self.wikilink
    }

    pub fn wikilink_mut(&mut self) -> &mut WikiLinkSession {
        &mut self.wikilink
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SessionEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Replace the document wholesale. History does not span documents.
    pub fn load_markdown(&mut self, text: &str) {
        self.document = parse_markdown(text);
        self.history.clear();
        self.selection = Selection::caret(0, 0);
        if let Some(event) = self.wikilink.deactivate() {
            self.emit(SessionEvent::WikiLink(event));
        }
        self.emit(SessionEvent::DocumentChanged {
            version: self.document.version(),
        });
        self.emit(SessionEvent::SelectionChanged(self.selection));
    }

    pub fn to_markdown(&self) -> String {
        serialize_document(&self.document)
    }

    /// The block's text was edited. Returns false if it was unchanged.
    pub fn handle_content_change(&mut self, index: usize, text: &str) -> Result<bool> {
        let block = self.document.block(index)?;
        if block.content() == text {
            return Ok(false);
        }

        // the caret moves by the change in length; elsewhere it lands at the end
        let old_len = utf16_len(block.content());
        let len = utf16_len(text);
        let caret = match self.selection.focus {
            Position { block_index, offset } if block_index == index => {
                (offset + len).saturating_sub(old_len).min(len)
            }
            _ => len,
        };
        self.commit(
            vec![Operation::UpdateContent {
                index,
                content: text.to_string(),
            }],
            Selection::caret(index, caret),
            "typing",
        )?;

        if let Some(event) = self.wikilink.on_text_change(index, text, caret) {
            self.emit(SessionEvent::WikiLink(event));
        }
        Ok(true)
    }

    /// Change a block's type from a toolbar or menu.
    pub fn handle_block_type_change(
        &mut self,
        index: usize,
        block_type: BlockType,
        language: Option<&str>,
    ) -> Result<bool> {
        let block = self.document.block(index)?;
        let language = language.map(|tag| self.languages.canonical_tag(tag));
        let kind = BlockKind::from_type(block_type, language, block.list_level().unwrap_or(0));
        if *block.kind() == kind {
            return Ok(false);
        }
        let selection = self.selection;
        self.commit(
            vec![Operation::UpdateType { index, kind }],
            selection,
            "change block type",
        )?;
        Ok(true)
    }

    /// A space was typed: convert a paragraph that now starts with a
    /// trigger such as `# ` or `- `. Returns false if nothing matched.
    pub fn handle_space(&mut self, index: usize) -> Result<bool> {
        let block = self.document.block(index)?;
        if block.block_type() != BlockType::Paragraph {
            return Ok(false);
        }
        let Some(detected) = self.detector.detect_on_space(block.content()) else {
            return Ok(false);
        };
        log::debug!("session: block {index} converted to {}", detected.block_type);
        self.convert(index, detected, "convert block")?;
        Ok(true)
    }

    /// Enter was pressed with the caret at `cursor`.
    pub fn handle_enter(&mut self, index: usize, cursor: usize) -> Result<EnterOutcome> {
        let block = self.document.block(index)?.clone();

        if block.block_type() == BlockType::Paragraph
            && let Some(detected) = self.detector.detect_on_enter(block.content())
        {
            self.convert(index, detected, "convert block")?;
            return Ok(EnterOutcome::Converted);
        }

        let block_type = block.block_type();
        if block_type.is_list() && block.is_empty() {
            self.commit(
                vec![Operation::UpdateType {
                    index,
                    kind: BlockKind::Paragraph,
                }],
                Selection::caret(index, 0),
                "exit list",
            )?;
            return Ok(EnterOutcome::ExitedList);
        }

        if block_type.is_fenced() {
            return Ok(EnterOutcome::NotHandled);
        }

        let (left, right) = if block_type == BlockType::Image {
            (block.content(), "")
        } else {
            split_at_utf16(block.content(), cursor)
        };
        let next_kind = if block_type.is_list() {
            block.kind().clone()
        } else {
            BlockKind::Paragraph
        };

        let mut operations = vec![];
        if left != block.content() {
            operations.push(Operation::UpdateContent {
                index,
                content: left.to_string(),
            });
        }
        operations.push(Operation::InsertBlock {
            index: index + 1,
            block: BlockNode::new(next_kind, right),
        });
        self.commit(operations, Selection::caret(index + 1, 0), "split block")?;
        Ok(EnterOutcome::Split)
    }

    /// Backspace with the caret at offset 0 of the block.
    pub fn handle_backspace_at_start(&mut self, index: usize) -> Result<bool> {
        let block = self.document.block(index)?.clone();

        if block.block_type() != BlockType::Paragraph {
            let operation = match block.list_level() {
                Some(level) if level > 0 => Operation::UpdateListLevel {
                    index,
                    level: level - 1,
                },
                _ => Operation::UpdateType {
                    index,
                    kind: BlockKind::Paragraph,
                },
            };
            self.commit(vec![operation], Selection::caret(index, 0), "unformat block")?;
            return Ok(true);
        }

        if index == 0 {
            return Ok(false);
        }
        let previous = self.document.block(index - 1)?.clone();
        let join = utf16_len(previous.content());

        if previous.block_type() == BlockType::Image {
            if !block.is_empty() {
                return Ok(false);
            }
            self.commit(
                vec![Operation::DeleteBlock { index }],
                Selection::caret(index - 1, join),
                "delete block",
            )?;
            return Ok(true);
        }

        let merged = format!("{}{}", previous.content(), block.content());
        self.commit(
            vec![
                Operation::UpdateContent {
                    index: index - 1,
                    content: merged,
                },
                Operation::DeleteBlock { index },
            ],
            Selection::caret(index - 1, join),
            "merge blocks",
        )?;
        Ok(true)
    }

    /// Delete the whole block.
    pub fn handle_delete(&mut self, index: usize) -> Result<()> {
        self.document.block(index)?;
        let caret = match index.checked_sub(1) {
            Some(previous) => {
                Selection::caret(previous, utf16_len(self.document.block(previous)?.content()))
            }
            None => Selection::caret(0, 0),
        };
        self.commit(vec![Operation::DeleteBlock { index }], caret, "delete block")
    }

    /// The UI reports a new selection inside one block.
    pub fn handle_selection_change(&mut self, index: usize, start: usize, end: usize) -> Result<()> {
        let content = self.document.block(index)?.content().to_string();
        let selection = Selection::new(Position::new(index, start), Position::new(index, end));
        if selection != self.selection {
            self.selection = selection;
            self.emit(SessionEvent::SelectionChanged(selection));
        }

        let event = if selection.is_collapsed() {
            self.wikilink.on_selection_change(index, &content, end)
        } else {
            self.wikilink.deactivate()
        };
        if let Some(event) = event {
            self.emit(SessionEvent::WikiLink(event));
        }
        Ok(())
    }

    /// Nest a list item one level deeper, at most one deeper than the list
    /// item above it.
    pub fn indent(&mut self, index: usize) -> Result<bool> {
        let Some(level) = self.document.block(index)?.list_level() else {
            return Ok(false);
        };
        let max_level = match index.checked_sub(1).and_then(|i| self.document.get(i)) {
            Some(previous) => previous.list_level().map_or(0, |l| l + 1),
            None => 0,
        };
        if level + 1 > max_level {
            return Ok(false);
        }
        let selection = self.selection;
        self.commit(
            vec![Operation::UpdateListLevel {
                index,
                level: level + 1,
            }],
            selection,
            "indent",
        )?;
        Ok(true)
    }

    pub fn outdent(&mut self, index: usize) -> Result<bool> {
        let level = match self.document.block(index)?.list_level() {
            Some(level) if level > 0 => level,
            _ => return Ok(false),
        };
        let selection = self.selection;
        self.commit(
            vec![Operation::UpdateListLevel {
                index,
                level: level - 1,
            }],
            selection,
            "outdent",
        )?;
        Ok(true)
    }

    /// Insert an image block referencing `path` after block `after_index`.
    pub fn insert_image(&mut self, after_index: usize, path: &str) -> Result<()> {
        let index = after_index + 1;
        self.commit(
            vec![Operation::InsertBlock {
                index,
                block: BlockNode::image(path),
            }],
            Selection::caret(index, 0),
            "insert image",
        )
    }

    /// Insert an empty paragraph after block `after_index` and put the caret in it.
    pub fn insert_paragraph(&mut self, after_index: usize) -> Result<()> {
        let index = after_index + 1;
        self.commit(
            vec![Operation::InsertBlock {
                index,
                block: BlockNode::empty_paragraph(),
            }],
            Selection::caret(index, 0),
            "insert paragraph",
        )
    }

    /// Search for the active wiki-link query.
    pub fn refresh_wikilink_results(&mut self, index: &dyn NoteIndex) {
        self.wikilink.refresh_results(index);
    }

    /// Accept `link` for the active wiki-link trigger in the focused block.
    pub fn select_wikilink(&mut self, link: &str) -> Result<bool> {
        let block_index = self.selection.focus.block_index;
        let content = self.document.block(block_index)?.content().to_string();
        let Some(insertion) = self.wikilink.handle_select(link, block_index, &content) else {
            return Ok(false);
        };
        self.commit(
            vec![Operation::UpdateContent {
                index: insertion.block_index,
                content: insertion.content,
            }],
            Selection::caret(insertion.block_index, insertion.caret),
            "insert link",
        )?;
        self.emit(SessionEvent::WikiLink(WikiLinkEvent::TriggerEnd));
        Ok(true)
    }

    /// Undo the newest step. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(inverse) = self.history.pop_undo(&self.document)? else {
            return Ok(false);
        };
        self.document = inverse.apply(&self.document)?;
        self.restore(inverse.selection_after);
        Ok(true)
    }

    /// Redo the newest undone step. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(transaction) = self.history.pop_redo(&self.document) else {
            return Ok(false);
        };
        self.document = transaction.apply(&self.document)?;
        self.restore(transaction.selection_after);
        Ok(true)
    }

    fn restore(&mut self, selection: Option<Selection>) {
        if let Some(selection) = selection {
            self.selection = selection;
        }
        if let Some(event) = self.wikilink.deactivate() {
            self.emit(SessionEvent::WikiLink(event));
        }
        self.emit(SessionEvent::DocumentChanged {
            version: self.document.version(),
        });
        self.emit(SessionEvent::SelectionChanged(self.selection));
    }

    fn convert(&mut self, index: usize, detected: DetectedBlock, description: &str) -> Result<()> {
        let language = detected
            .language
            .map(|tag| self.languages.canonical_tag(&tag));
        let kind = BlockKind::from_type(detected.block_type, language, 0);
        self.commit(
            vec![
                Operation::UpdateType { index, kind },
                Operation::UpdateContent {
                    index,
                    content: detected.remaining_content,
                },
            ],
            Selection::caret(index, 0),
            description,
        )
    }

    /// Apply `operations` as one transaction and record it.
    fn commit(
        &mut self,
        operations: Vec<Operation>,
        selection_after: Selection,
        description: &str,
    ) -> Result<()> {
        let transaction = Transaction::new(operations)
            .with_selection_before(self.selection)
            .with_selection_after(selection_after)
            .with_description(description)
            .with_timestamp(self.history.clock().now_ms());

        let next = transaction.apply(&self.document)?;
        self.history.push(transaction, &self.document);
        self.document = next;

        self.emit(SessionEvent::DocumentChanged {
            version: self.document.version(),
        });
        if selection_after != self.selection {
            self.selection = selection_after;
            self.emit(SessionEvent::SelectionChanged(selection_after));
        }
        Ok(())
    }

    fn emit(&mut self, event: SessionEvent) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::ManualClock;
    use crate::error::EngineError;
    use crate::parsing::{BlockTypeRegistry, Language};
    use crate::wikilink::StaticIndex;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(markdown: &str) -> (EditorSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new(10_000);
        let session = EditorSession::with_clock(
            parse_markdown(markdown),
            HistoryOptions::default(),
            clock.clone(),
        );
        (session, clock)
    }

    fn summary(session: &EditorSession<ManualClock>) -> Vec<(BlockType, String)> {
        session
            .document()
            .blocks()
            .iter()
            .map(|b| (b.block_type(), b.content().to_string()))
            .collect()
    }

    #[rstest]
    #[case("# ", BlockType::Heading1)]
    #[case("## ", BlockType::Heading2)]
    #[case("### ", BlockType::Heading3)]
    #[case("- ", BlockType::BulletList)]
    #[case("1. ", BlockType::NumberedList)]
    fn test_space_converts_trigger(#[case] typed: &str, #[case] expected: BlockType) {
        let (mut s, _) = session("");
        s.handle_content_change(0, typed).unwrap();
        assert!(s.handle_space(0).unwrap());
        assert_eq!(summary(&s), vec![(expected, String::new())]);
        assert_eq!(s.selection(), Selection::caret(0, 0));
    }

    #[test]
    fn test_space_keeps_text_after_trigger() {
        let (mut s, _) = session("# already");
        s.handle_block_type_change(0, BlockType::Paragraph, None)
            .unwrap();
        s.handle_content_change(0, "- rest").unwrap();
        assert!(s.handle_space(0).unwrap());
        assert_eq!(summary(&s), vec![(BlockType::BulletList, "rest".into())]);
    }

    #[test]
    fn test_custom_detector_and_languages() {
        let registry = BlockTypeRegistry::builder()
            .register(BlockType::Heading1, Some(r"^=\s"))
            .register(BlockType::CodeBlock, Some(r"^~~~([a-z]*)$"))
            .build()
            .unwrap();
        let languages =
            LanguageRegistry::new(vec![Language::new("haskell", "Haskell", &["hs"])]);
        let (s, _) = session("");
        let mut s = s
            .with_detector(BlockTypeDetector::new(registry))
            .with_languages(languages);

        s.handle_content_change(0, "# ").unwrap();
        assert!(!s.handle_space(0).unwrap());
        s.handle_content_change(0, "= ").unwrap();
        assert!(s.handle_space(0).unwrap());
        assert_eq!(summary(&s), vec![(BlockType::Heading1, String::new())]);

        s.handle_block_type_change(0, BlockType::Paragraph, None)
            .unwrap();
        s.handle_content_change(0, "~~~hs").unwrap();
        assert_eq!(s.handle_enter(0, 5).unwrap(), EnterOutcome::Converted);
        assert_eq!(s.document().blocks()[0].language(), Some("haskell"));
    }

    #[test]
    fn test_wikilink_result_limit_comes_from_session() {
        let (s, _) = session("");
        let mut s = s.with_wikilink(WikiLinkSession::with_result_limit(2));
        s.handle_content_change(0, "[[").unwrap();
        s.refresh_wikilink_results(&StaticIndex::from_titles(["a", "b", "c"]));
        assert_eq!(s.wikilink().active().unwrap().results.len(), 2);
    }

    #[test]
    fn test_space_on_plain_text_does_nothing() {
        let (mut s, _) = session("hello ");
        assert!(!s.handle_space(0).unwrap());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_enter_on_fence_trigger_converts_with_canonical_language() {
        let (mut s, _) = session("");
        s.handle_content_change(0, "```py").unwrap();
        assert_eq!(s.handle_enter(0, 5).unwrap(), EnterOutcome::Converted);
        let block = &s.document().blocks()[0];
        assert_eq!(block.block_type(), BlockType::CodeBlock);
        assert_eq!(block.language(), Some("python"));
        assert_eq!(block.content(), "");
    }

    #[test]
    fn test_enter_splits_paragraph_at_caret() {
        let (mut s, _) = session("hello world");
        assert_eq!(s.handle_enter(0, 5).unwrap(), EnterOutcome::Split);
        assert_eq!(
            summary(&s),
            vec![
                (BlockType::Paragraph, "hello".into()),
                (BlockType::Paragraph, " world".into()),
            ]
        );
        assert_eq!(s.selection(), Selection::caret(1, 0));
    }

    #[test]
    fn test_enter_in_list_continues_list_at_same_level() {
        let (mut s, _) = session("- a\n  - child");
        s.handle_enter(1, 5).unwrap();
        let last = &s.document().blocks()[2];
        assert_eq!(last.kind(), &BlockKind::BulletList { level: 1 });
        assert!(last.is_empty());
    }

    #[test]
    fn test_enter_after_heading_continues_as_paragraph() {
        let (mut s, _) = session("# Title");
        s.handle_enter(0, 5).unwrap();
        assert_eq!(
            summary(&s),
            vec![
                (BlockType::Heading1, "Title".into()),
                (BlockType::Paragraph, "".into()),
            ]
        );
    }

    #[test]
    fn test_enter_on_empty_list_item_exits_list() {
        let (mut s, _) = session("1. one\n1. ");
        assert_eq!(s.handle_enter(1, 0).unwrap(), EnterOutcome::ExitedList);
        assert_eq!(s.document().blocks()[1].block_type(), BlockType::Paragraph);
        assert_eq!(s.document().block_count(), 2);
    }

    #[test]
    fn test_enter_in_code_block_is_left_to_ui() {
        let (mut s, _) = session("```\ncode\n```");
        assert_eq!(s.handle_enter(0, 2).unwrap(), EnterOutcome::NotHandled);
        assert!(!s.can_undo());
    }

    #[test]
    fn test_enter_splits_on_utf16_offset() {
        let (mut s, _) = session("😀x");
        s.handle_enter(0, 2).unwrap();
        assert_eq!(
            summary(&s),
            vec![
                (BlockType::Paragraph, "😀".into()),
                (BlockType::Paragraph, "x".into()),
            ]
        );
    }

    #[test]
    fn test_backspace_outdents_then_unformats_list() {
        let (mut s, _) = session("- a\n  - b");
        s.handle_backspace_at_start(1).unwrap();
        assert_eq!(
            s.document().blocks()[1].kind(),
            &BlockKind::BulletList { level: 0 }
        );
        s.handle_backspace_at_start(1).unwrap();
        assert_eq!(s.document().blocks()[1].block_type(), BlockType::Paragraph);
    }

    #[test]
    fn test_backspace_merges_paragraph_into_previous() {
        let (mut s, _) = session("# Head\ntail");
        assert!(s.handle_backspace_at_start(1).unwrap());
        assert_eq!(summary(&s), vec![(BlockType::Heading1, "Headtail".into())]);
        assert_eq!(s.selection(), Selection::caret(0, 4));
    }

    #[test]
    fn test_backspace_on_first_paragraph_is_noop() {
        let (mut s, _) = session("only");
        assert!(!s.handle_backspace_at_start(0).unwrap());
    }

    #[test]
    fn test_backspace_never_merges_into_image() {
        let (mut s, _) = session("![](a.png)\ntext");
        assert!(!s.handle_backspace_at_start(1).unwrap());
        assert_eq!(s.document().block_count(), 2);

        s.handle_content_change(1, "").unwrap();
        assert!(s.handle_backspace_at_start(1).unwrap());
        assert_eq!(summary(&s), vec![(BlockType::Image, "a.png".into())]);
    }

    #[test]
    fn test_delete_moves_caret_to_end_of_previous_block() {
        let (mut s, _) = session("abc\ndef");
        s.handle_delete(1).unwrap();
        assert_eq!(s.selection(), Selection::caret(0, 3));
    }

    #[test]
    fn test_deleting_only_block_leaves_empty_paragraph() {
        let (mut s, _) = session("# gone");
        s.handle_delete(0).unwrap();
        assert!(s.document().is_blank());
    }

    #[test]
    fn test_indent_is_limited_by_previous_item() {
        let (mut s, _) = session("- a\n- b");
        assert!(!s.indent(0).unwrap());
        assert!(s.indent(1).unwrap());
        assert!(!s.indent(1).unwrap());
        assert!(s.outdent(1).unwrap());
        assert!(!s.outdent(1).unwrap());
    }

    #[test]
    fn test_invalid_index_is_an_error_and_changes_nothing() {
        let (mut s, _) = session("a");
        let err = s.handle_content_change(5, "x").unwrap_err();
        assert!(matches!(err, EngineError::IndexOutOfRange { index: 5, len: 1 }));
        assert!(!s.can_undo());
    }

    #[test]
    fn test_typing_burst_undoes_as_one_step() {
        let (mut s, clock) = session("");
        for text in ["h", "he", "hel"] {
            s.handle_content_change(0, text).unwrap();
            clock.advance(100);
        }
        clock.advance(1_000);
        s.handle_enter(0, 3).unwrap();

        assert!(s.undo().unwrap());
        assert_eq!(s.document().block_count(), 1);
        assert!(s.undo().unwrap());
        assert!(s.document().is_blank());
        assert!(!s.undo().unwrap());

        assert!(s.redo().unwrap());
        assert_eq!(s.document().blocks()[0].content(), "hel");
    }

    #[test]
    fn test_undo_restores_selection() {
        let (mut s, _) = session("ab");
        s.handle_selection_change(0, 1, 1).unwrap();
        s.handle_enter(0, 1).unwrap();
        assert_eq!(s.selection(), Selection::caret(1, 0));

        s.undo().unwrap();
        assert_eq!(s.selection(), Selection::caret(0, 1));
        s.redo().unwrap();
        assert_eq!(s.selection(), Selection::caret(1, 0));
    }

    #[test]
    fn test_load_clears_history() {
        let (mut s, _) = session("a");
        s.handle_content_change(0, "b").unwrap();
        s.load_markdown("# fresh");
        assert!(!s.can_undo());
        assert_eq!(s.to_markdown(), "# fresh\n");
    }

    #[test]
    fn test_observers_see_events_until_unsubscribed() {
        let (mut s, _) = session("a");
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        let id = s.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        s.handle_content_change(0, "ab").unwrap();
        assert!(matches!(
            seen.borrow()[0],
            SessionEvent::DocumentChanged { .. }
        ));

        assert!(s.unsubscribe(id));
        let count = seen.borrow().len();
        s.handle_content_change(0, "abc").unwrap();
        assert_eq!(seen.borrow().len(), count);
    }

    #[test]
    fn test_wikilink_flow_inserts_link() {
        let (mut s, _) = session("");
        let index = StaticIndex::from_titles(["Groceries", "Garden plan"]);

        s.handle_selection_change(0, 0, 0).unwrap();
        s.handle_content_change(0, "buy [[Gro").unwrap();
        assert!(s.wikilink().is_active());

        s.refresh_wikilink_results(&index);
        assert_eq!(s.wikilink().selected_title(), Some("Groceries"));

        assert!(s.select_wikilink("Groceries").unwrap());
        assert_eq!(s.document().blocks()[0].content(), "buy [[Groceries]]");
        assert_eq!(s.selection(), Selection::caret(0, 17));
        assert!(!s.wikilink().is_active());
    }

    #[test]
    fn test_insert_image_after_block() {
        let (mut s, _) = session("a\nb");
        s.insert_image(0, "pics/cat.png").unwrap();
        assert_eq!(
            summary(&s),
            vec![
                (BlockType::Paragraph, "a".into()),
                (BlockType::Image, "pics/cat.png".into()),
                (BlockType::Paragraph, "b".into()),
            ]
        );
    }

    #[test]
    fn test_insert_paragraph_after_fenced_block() {
        let (mut s, _) = session("```\ncode\n```");
        s.insert_paragraph(0).unwrap();
        assert_eq!(
            summary(&s),
            vec![
                (BlockType::CodeBlock, "code".into()),
                (BlockType::Paragraph, "".into()),
            ]
        );
        assert_eq!(s.selection(), Selection::caret(1, 0));
        s.undo().unwrap();
        assert_eq!(s.document().block_count(), 1);
    }
}
