//! Editor lifecycle events delivered to the controller.

use std::path::{Path, PathBuf};

/// A file as the editor knows it. `path` is absent for unsaved buffers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileContext {
    path: Option<PathBuf>,
}

impl FileContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A buffer that has never been saved.
    pub fn untitled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl From<Option<PathBuf>> for FileContext {
    fn from(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

/// The item that became active in the editor workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveItem {
    Editor(FileContext),
    /// Settings pages, image previews and anything else without a text buffer.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A text editor was opened (or already open when the controller activated).
    FileOpened(FileContext),
    FileSaved(FileContext),
    /// A text editor was destroyed.
    FileClosed(FileContext),
    ActiveItemChanged(ActiveItem),
    /// The status indicator was clicked: copy the shown value.
    IndicatorClicked,
    /// "Hash current file" command: digest the active file into the clipboard.
    HashActiveFile,
    /// "Hash selected file" from a file browser: any path, into the clipboard.
    HashPath(PathBuf),
}
