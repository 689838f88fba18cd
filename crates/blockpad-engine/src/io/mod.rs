use crate::document::Document;
use crate::models::NoteFile;
use crate::parsing::{parse_markdown, serialize_document};
use crate::wikilink::{NoteIndex, NotePage, NoteSummary, SearchError};
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Read a note and return its raw markdown
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write raw markdown to a note, creating parent directories as needed
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Read and parse a note.
pub fn load_document(relative_path: &RelativePath, notes_root: &Path) -> Result<Document, IoError> {
    let text = read_file(relative_path, notes_root)?;
    let doc = parse_markdown(&text);
    log::debug!("loaded {relative_path}: {} blocks", doc.block_count());
    Ok(doc)
}

/// Serialize and write a note.
pub fn save_document(
    relative_path: &RelativePath,
    notes_root: &Path,
    doc: &Document,
) -> Result<(), IoError> {
    write_file(relative_path, notes_root, &serialize_document(doc))?;
    log::debug!("saved {relative_path} at version {}", doc.version());
    Ok(())
}

/// All markdown files under the notes directory, sorted
pub fn scan_markdown_files(notes_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !notes_root.exists() {
        return Err(IoError::InvalidNotesDir(
            "notes directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir).map_err(IoError::Io)? {
        let path = entry.map_err(IoError::Io)?.path();
        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }
    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }
    Ok(())
}

/// Wiki-link search over the note files in a directory.
///
/// The directory is rescanned on every query; titles match by
/// case-insensitive substring.
#[derive(Debug, Clone)]
pub struct NotesDirIndex {
    notes_root: PathBuf,
}

impl NotesDirIndex {
    pub fn new(notes_root: impl Into<PathBuf>) -> Self {
        Self {
            notes_root: notes_root.into(),
        }
    }

    pub fn notes(&self) -> Result<Vec<NoteFile>, IoError> {
        Ok(scan_markdown_files(&self.notes_root)?
            .iter()
            .filter_map(|path| NoteFile::from_absolute(path, &self.notes_root))
            .collect())
    }
}

impl NoteIndex for NotesDirIndex {
    fn list_notes(
        &self,
        limit: usize,
        cursor: Option<&str>,
        query: Option<&str>,
    ) -> Result<NotePage, SearchError> {
        let notes = self
            .notes()
            .map_err(|err| SearchError::Unavailable(err.to_string()))?;
        let needle = query.map(str::to_lowercase);
        let matching: Vec<NoteFile> = notes
            .into_iter()
            .filter(|note| {
                needle
                    .as_deref()
                    .is_none_or(|n| note.title().to_lowercase().contains(n))
            })
            .collect();

        let offset = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let items = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|note| NoteSummary {
                note_id: note.relative_path().to_string(),
                title: Some(note.title().to_string()),
                summary: note.display_path().to_string(),
            })
            .collect::<Vec<_>>();
        let next = offset + items.len();
        let cursor = (next < matching.len()).then(|| next.to_string());
        Ok(NotePage { items, cursor })
    }
}
