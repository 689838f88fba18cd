use std::collections::HashSet;

use super::search::{NoteIndex, NotePage, SearchError, SearchRequest};
use super::trigger::{find_start, query_at, splice_link};

pub const DEFAULT_RESULT_LIMIT: usize = 20;

/// An open `[[` trigger and its autocomplete state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLink {
    pub session_id: u64,
    pub block_index: usize,
    /// UTF-16 offset of the opening `[[`
    pub start_offset: usize,
    pub query: String,
    pub results: Vec<String>,
    pub selected_index: usize,
    pub loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WikiLinkState {
    #[default]
    Inactive,
    Active(ActiveLink),
}

/// What changed after a caret or content update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiLinkEvent {
    TriggerStart {
        block_index: usize,
        start_offset: usize,
        query: String,
    },
    QueryUpdate {
        query: String,
    },
    TriggerEnd,
}

/// Result of accepting a suggestion: the block's new content and caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInsertion {
    pub block_index: usize,
    pub content: String,
    pub caret: usize,
}

/// Wiki-link trigger and query state machine.
///
/// At most one search is in flight; a query typed while one is outstanding
/// is not queued, so results can lag the query by a keystroke. Every
/// activation gets a fresh session id and a search response is only applied
/// if it carries the id of the session that is still active.
#[derive(Debug, Clone)]
pub struct WikiLinkSession {
    state: WikiLinkState,
    next_session_id: u64,
    in_flight: Option<u64>,
    result_limit: usize,
}

impl WikiLinkSession {
    pub fn new() -> Self {
        Self::with_result_limit(DEFAULT_RESULT_LIMIT)
    }

    pub fn with_result_limit(result_limit: usize) -> Self {
        Self {
            state: WikiLinkState::Inactive,
            next_session_id: 1,
            in_flight: None,
            result_limit,
        }
    }

    pub fn state(&self) -> &WikiLinkState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveLink> {
        match &self.state {
            WikiLinkState::Active(link) => Some(link),
            WikiLinkState::Inactive => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    pub fn is_search_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Re-evaluate after the block's content changed.
    pub fn on_text_change(
        &mut self,
        block_index: usize,
        text: &str,
        caret: usize,
    ) -> Option<WikiLinkEvent> {
        self.evaluate(block_index, text, caret)
    }

    /// Re-evaluate after the caret moved.
    pub fn on_selection_change(
        &mut self,
        block_index: usize,
        text: &str,
        caret: usize,
    ) -> Option<WikiLinkEvent> {
        self.evaluate(block_index, text, caret)
    }

    fn evaluate(&mut self, block_index: usize, text: &str, caret: usize) -> Option<WikiLinkEvent> {
        let Some(start) = find_start(text, caret) else {
            return self.deactivate();
        };
        let query = query_at(text, start, caret);
        if query.contains(']') || query.contains('\n') {
            return self.deactivate();
        }

        if let WikiLinkState::Active(link) = &mut self.state
            && link.block_index == block_index
            && link.start_offset == start
        {
            if link.query == query {
                return None;
            }
            link.query.clone_from(&query);
            return Some(WikiLinkEvent::QueryUpdate { query });
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;
        log::debug!("wikilink: session {session_id} opened at {block_index}:{start}");
        self.state = WikiLinkState::Active(ActiveLink {
            session_id,
            block_index,
            start_offset: start,
            query: query.clone(),
            results: vec![],
            selected_index: 0,
            loading: false,
        });
        Some(WikiLinkEvent::TriggerStart {
            block_index,
            start_offset: start,
            query,
        })
    }

    /// Force the session inactive.
    pub fn deactivate(&mut self) -> Option<WikiLinkEvent> {
        match std::mem::take(&mut self.state) {
            WikiLinkState::Active(link) => {
                log::debug!("wikilink: session {} closed", link.session_id);
                Some(WikiLinkEvent::TriggerEnd)
            }
            WikiLinkState::Inactive => None,
        }
    }

    /// Start a search for the active query.
    ///
    /// `None` when inactive or while another search is outstanding.
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let WikiLinkState::Active(link) = &mut self.state else {
            return None;
        };
        link.loading = true;
        self.in_flight = Some(link.session_id);
        Some(SearchRequest {
            session_id: link.session_id,
            query: link.query.clone(),
            limit: self.result_limit,
        })
    }

    /// Deliver the response to `request`.
    ///
    /// Clears the in-flight guard if `request` holds it. Results are applied
    /// only when the request's session is still the active one; a failure
    /// leaves the session active with no results.
    pub fn complete_search(
        &mut self,
        request: &SearchRequest,
        response: Result<NotePage, SearchError>,
    ) {
        if self.in_flight == Some(request.session_id) {
            self.in_flight = None;
        }

        let WikiLinkState::Active(link) = &mut self.state else {
            log::debug!("wikilink: dropping results for closed session {}", request.session_id);
            return;
        };
        if link.session_id != request.session_id {
            log::debug!(
                "wikilink: dropping results for session {}, active session is {}",
                request.session_id,
                link.session_id
            );
            return;
        }

        link.loading = false;
        link.selected_index = 0;
        match response {
            Ok(page) => {
                let mut seen = HashSet::new();
                link.results = page
                    .items
                    .iter()
                    .map(|item| item.display_title())
                    .filter(|title| seen.insert(title.to_string()))
                    .take(self.result_limit)
                    .map(str::to_string)
                    .collect();
            }
            Err(err) => {
                log::warn!("wikilink: {err}; showing no suggestions");
                link.results.clear();
            }
        }
    }

    /// Run a search to completion against `index`.
    pub fn refresh_results(&mut self, index: &dyn NoteIndex) {
        if let Some(request) = self.begin_search() {
            let response = request.run(index);
            self.complete_search(&request, response);
        }
    }

    pub fn select_next(&mut self) {
        if let WikiLinkState::Active(link) = &mut self.state
            && !link.results.is_empty()
        {
            link.selected_index = (link.selected_index + 1) % link.results.len();
        }
    }

    pub fn select_previous(&mut self) {
        if let WikiLinkState::Active(link) = &mut self.state
            && !link.results.is_empty()
        {
            let len = link.results.len();
            link.selected_index = (link.selected_index + len - 1) % len;
        }
    }

    pub fn selected_title(&self) -> Option<&str> {
        let link = self.active()?;
        link.results.get(link.selected_index).map(String::as_str)
    }

    /// Splice `[[link]]` over the trigger and query in `text`, the current
    /// content of block `block_index`, and close the session.
    ///
    /// `None` (and no state change) if the session is inactive or belongs to
    /// a different block.
    pub fn handle_select(
        &mut self,
        link: &str,
        block_index: usize,
        text: &str,
    ) -> Option<LinkInsertion> {
        let active = self.active()?;
        if active.block_index != block_index {
            return None;
        }
        let caret = active.start_offset + 2 + crate::text::utf16_len(&active.query);
        let (content, caret) = splice_link(text, active.start_offset, caret, link);
        self.deactivate();
        Some(LinkInsertion {
            block_index,
            content,
            caret,
        })
    }
}

impl Default for WikiLinkSession {
    fn default() -> Self {
        Self::new()
    }
}
