//! Line protocol for `sri serve`.
//!
//! Input, one per line: `open [path]`, `save <path>`, `close <path>`,
//! `focus [path]`, `click`, `hash-active`, `hash <path>`,
//! `algorithm <sha256|sha512>`. A bare `open` is an unsaved buffer and a bare
//! `focus` is a non-editor item. A path is the rest of the line after one
//! separator, untrimmed. Output lines: `show <value>`, `clear`,
//! `copy <value>`.

use anyhow::{bail, Result};
use sri_core::controller::{ActiveItem, Clipboard, EditorEvent, EditorHost, FileContext, PresentationSink};
use sri_core::digest::{Algorithm, IntegrityResult};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Event(EditorEvent),
    SetAlgorithm(Algorithm),
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
///
/// The argument is everything after the single separator following the verb,
/// taken verbatim, so paths may start or end with spaces.
pub fn parse_line(line: &str) -> Result<Option<HostCommand>> {
    let line = line.strip_suffix('\r').unwrap_or(line).trim_start();
    if line.trim_end().is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, Some(rest).filter(|r| !r.trim().is_empty())),
        None => (line, None),
    };
    let path = || -> Result<PathBuf> {
        match arg {
            Some(p) => Ok(PathBuf::from(p)),
            None => bail!("{verb}: missing path"),
        }
    };
    let context = || FileContext::from(arg.map(PathBuf::from));

    let event = match verb {
        "open" => EditorEvent::FileOpened(context()),
        "save" => EditorEvent::FileSaved(FileContext::new(path()?)),
        "close" => EditorEvent::FileClosed(FileContext::new(path()?)),
        "focus" => match arg {
            Some(p) => EditorEvent::ActiveItemChanged(ActiveItem::Editor(FileContext::new(p))),
            None => EditorEvent::ActiveItemChanged(ActiveItem::Other),
        },
        "click" => EditorEvent::IndicatorClicked,
        "hash-active" => EditorEvent::HashActiveFile,
        "hash" => EditorEvent::HashPath(path()?),
        "algorithm" => match arg {
            Some(a) => return Ok(Some(HostCommand::SetAlgorithm(a.trim().parse()?))),
            None => bail!("algorithm: missing name"),
        },
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(HostCommand::Event(event)))
}

fn emit(line: std::fmt::Arguments<'_>) {
    let mut out = io::stdout().lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        tracing::warn!("stdout closed, dropping output line");
    }
}

/// Indicator rendered as `show`/`clear` lines on stdout.
pub struct StdoutIndicator;

impl PresentationSink for StdoutIndicator {
    fn show(&mut self, result: &IntegrityResult) {
        emit(format_args!("show {}", result));
    }

    fn clear(&mut self) {
        emit(format_args!("clear"));
    }
}

/// Clipboard rendered as `copy` lines on stdout.
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write(&mut self, text: &str) {
        emit(format_args!("copy {}", text));
    }
}

/// Tracks which file the shim's editor has in front, from the events it forwards.
#[derive(Debug, Clone, Default)]
pub struct ActiveFile(Arc<Mutex<Option<PathBuf>>>);

impl ActiveFile {
    pub fn observe(&self, event: &EditorEvent) {
        let mut active = self.0.lock().unwrap_or_else(|e| e.into_inner());
        match event {
            EditorEvent::FileOpened(ctx)
            | EditorEvent::ActiveItemChanged(ActiveItem::Editor(ctx)) => {
                *active = ctx.path().map(PathBuf::from);
            }
            EditorEvent::ActiveItemChanged(ActiveItem::Other) => *active = None,
            EditorEvent::FileClosed(ctx) if active.as_deref() == ctx.path() => *active = None,
            _ => {}
        }
    }

    /// Track `event`, then pin `HashActiveFile` to the file active at this
    /// point in the input. Later lines may already be tracked by the time the
    /// controller handles the event. `None` when no saved file is active.
    pub fn resolve(&self, event: EditorEvent) -> Option<EditorEvent> {
        self.observe(&event);
        match event {
            EditorEvent::HashActiveFile => self.active_file_path().map(EditorEvent::HashPath),
            other => Some(other),
        }
    }
}

impl EditorHost for ActiveFile {
    fn active_file_path(&self) -> Option<PathBuf> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> EditorEvent {
        match parse_line(line).unwrap() {
            Some(HostCommand::Event(e)) => e,
            other => panic!("expected event, got {:?}", other),
        }
    }

    #[test]
    fn parse_file_events() {
        assert_eq!(
            event("open /site/app.js"),
            EditorEvent::FileOpened(FileContext::new("/site/app.js"))
        );
        assert_eq!(event("open"), EditorEvent::FileOpened(FileContext::untitled()));
        assert_eq!(
            event("  save /site/my app.css\r"),
            EditorEvent::FileSaved(FileContext::new("/site/my app.css"))
        );
        assert_eq!(
            event("close /site/app.js"),
            EditorEvent::FileClosed(FileContext::new("/site/app.js"))
        );
    }

    #[test]
    fn parse_focus_and_commands() {
        assert_eq!(
            event("focus /b.css"),
            EditorEvent::ActiveItemChanged(ActiveItem::Editor(FileContext::new("/b.css")))
        );
        assert_eq!(event("focus"), EditorEvent::ActiveItemChanged(ActiveItem::Other));
        assert_eq!(event("click"), EditorEvent::IndicatorClicked);
        assert_eq!(event("hash-active"), EditorEvent::HashActiveFile);
        assert_eq!(
            event("hash /index.html"),
            EditorEvent::HashPath(PathBuf::from("/index.html"))
        );
    }

    #[test]
    fn parse_keeps_surrounding_spaces_in_paths() {
        assert_eq!(
            event("open  padded.js "),
            EditorEvent::FileOpened(FileContext::new(" padded.js "))
        );
        assert_eq!(
            event("hash /site/trailing.css  "),
            EditorEvent::HashPath(PathBuf::from("/site/trailing.css  "))
        );
        assert_eq!(event("open   "), EditorEvent::FileOpened(FileContext::untitled()));
        assert_eq!(event("click "), EditorEvent::IndicatorClicked);
    }

    #[test]
    fn parse_algorithm() {
        assert_eq!(
            parse_line("algorithm sha512").unwrap(),
            Some(HostCommand::SetAlgorithm(Algorithm::Sha512))
        );
        assert_eq!(
            parse_line("algorithm sha256 ").unwrap(),
            Some(HostCommand::SetAlgorithm(Algorithm::Sha256))
        );
        assert!(parse_line("algorithm md5").is_err());
        assert!(parse_line("algorithm").is_err());
    }

    #[test]
    fn parse_blank_comment_and_malformed() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# open /a.js").unwrap(), None);
        assert!(parse_line("save").is_err());
        assert!(parse_line("close").is_err());
        assert!(parse_line("hash").is_err());
        assert!(parse_line("explode /a.js").is_err());
    }

    #[test]
    fn active_file_follows_events() {
        let active = ActiveFile::default();
        assert_eq!(active.active_file_path(), None);

        active.observe(&event("open /a.js"));
        assert_eq!(active.active_file_path(), Some(PathBuf::from("/a.js")));

        active.observe(&event("focus /b.css"));
        active.observe(&event("close /a.js"));
        assert_eq!(active.active_file_path(), Some(PathBuf::from("/b.css")));

        active.observe(&event("close /b.css"));
        assert_eq!(active.active_file_path(), None);

        active.observe(&event("open /c.js"));
        active.observe(&event("focus"));
        assert_eq!(active.active_file_path(), None);
    }

    #[test]
    fn hash_active_is_pinned_when_read() {
        let active = ActiveFile::default();
        assert_eq!(active.resolve(event("hash-active")), None);

        assert_eq!(
            active.resolve(event("open /a.js")),
            Some(EditorEvent::FileOpened(FileContext::new("/a.js")))
        );
        let pinned = active.resolve(event("hash-active"));
        active.resolve(event("open /b.html"));
        assert_eq!(pinned, Some(EditorEvent::HashPath(PathBuf::from("/a.js"))));
        assert_eq!(active.active_file_path(), Some(PathBuf::from("/b.html")));

        assert_eq!(
            active.resolve(event("hash /c.css")),
            Some(EditorEvent::HashPath(PathBuf::from("/c.css")))
        );
    }
}
