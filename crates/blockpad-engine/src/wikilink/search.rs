use serde::{Deserialize, Serialize};

/// The search collaborator failed; the session recovers with no results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("note search unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub note_id: String,
    pub title: Option<String>,
    pub summary: String,
}

impl NoteSummary {
    /// Title shown in autocomplete; untitled notes fall back to their id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.note_id)
    }
}

/// One page of search results. `cursor` fetches the next page, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePage {
    pub items: Vec<NoteSummary>,
    pub cursor: Option<String>,
}

/// Lists notes for wiki-link autocomplete.
pub trait NoteIndex {
    fn list_notes(
        &self,
        limit: usize,
        cursor: Option<&str>,
        query: Option<&str>,
    ) -> Result<NotePage, SearchError>;
}

/// A search issued by a wiki-link session.
///
/// `session_id` ties the response back to the trigger that asked for it, so a
/// response for an abandoned trigger is recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub session_id: u64,
    pub query: String,
    pub limit: usize,
}

impl SearchRequest {
    pub fn run(&self, index: &dyn NoteIndex) -> Result<NotePage, SearchError> {
        let query = Some(self.query.as_str()).filter(|q| !q.is_empty());
        index.list_notes(self.limit, None, query)
    }
}

/// Fixed list of notes, filtered by case-insensitive title substring.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    notes: Vec<NoteSummary>,
}

impl StaticIndex {
    pub fn new(notes: Vec<NoteSummary>) -> Self {
        Self { notes }
    }

    pub fn from_titles<'a>(titles: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            titles
                .into_iter()
                .map(|title| NoteSummary {
                    note_id: title.to_string(),
                    title: Some(title.to_string()),
                    summary: String::new(),
                })
                .collect(),
        )
    }
}

impl NoteIndex for StaticIndex {
    fn list_notes(
        &self,
        limit: usize,
        cursor: Option<&str>,
        query: Option<&str>,
    ) -> Result<NotePage, SearchError> {
        let needle = query.map(str::to_lowercase);
        let matching: Vec<&NoteSummary> = self
            .notes
            .iter()
            .filter(|note| match &needle {
                Some(needle) => note.display_title().to_lowercase().contains(needle),
                None => true,
            })
            .collect();

        let offset = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let end = (offset + limit).min(matching.len());
        let items = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|note| (*note).clone())
            .collect();
        let cursor = (end < matching.len()).then(|| end.to_string());
        Ok(NotePage { items, cursor })
    }
}
