//! Host-side collaborators the controller talks to.

use crate::digest::IntegrityResult;
use std::path::PathBuf;

/// Status indicator that reflects the controller's display state.
pub trait PresentationSink: Send + 'static {
    fn show(&mut self, result: &IntegrityResult);
    fn clear(&mut self);
}

pub trait Clipboard: Send + 'static {
    fn write(&mut self, text: &str);
}

pub trait EditorHost: Send + 'static {
    /// Path of the active text editor, if there is one and it has been saved.
    fn active_file_path(&self) -> Option<PathBuf>;
}
