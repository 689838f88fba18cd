use relative_path::{RelativePath, RelativePathBuf};
use std::path::Path;

use crate::wikilink::trigger::{CLOSE, OPEN};

const EXTENSION: &str = ".md";

/// A note on disk, addressed relative to the notes root
#[derive(Debug, Clone, PartialEq)]
pub struct NoteFile {
    relative_path: RelativePathBuf,
    title: String,
    display_path: String,
}

impl NoteFile {
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let title = relative_path
            .file_name()
            .map(|name| name.strip_suffix(EXTENSION).unwrap_or(name))
            .unwrap_or("Untitled")
            .to_string();
        let display_path = {
            let path_str = relative_path.as_str();
            path_str
                .strip_suffix(EXTENSION)
                .unwrap_or(path_str)
                .to_string()
        };

        Self {
            relative_path,
            title,
            display_path,
        }
    }

    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    /// `None` if `path` is not under `notes_root` or is not valid UTF-8
    pub fn from_absolute(path: &Path, notes_root: &Path) -> Option<Self> {
        let relative = path.strip_prefix(notes_root).ok()?;
        RelativePathBuf::from_path(relative).ok().map(Self::new)
    }

    /// The note a `[[target]]` wiki link points at. Targets may include
    /// folders, e.g. `journal/2024-01-01`.
    pub fn for_link(target: &str) -> Self {
        Self::new(RelativePathBuf::from(format!("{}{EXTENSION}", target.trim())))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// File name without the extension
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Relative path without the extension
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    /// Wiki link text referring to this note
    pub fn link(&self) -> String {
        format!("{OPEN}{}{CLOSE}", self.display_path)
    }
}

impl From<&str> for NoteFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}
