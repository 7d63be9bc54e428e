//! Which files get an integrity value shown automatically.

use std::path::Path;

const ELIGIBLE_SUFFIXES: [&str; 2] = [".css", ".js"];

/// True iff `path` ends with `.css` or `.js` (case-sensitive).
///
/// Paths containing a line terminator never match; integrations written
/// against a single-line `^.*\.(css|js)$` pattern reject them the same way.
pub fn is_eligible(path: &Path) -> bool {
    let path = path.to_string_lossy();
    if path.contains(&['\n', '\r', '\u{2028}', '\u{2029}'][..]) {
        return false;
    }
    ELIGIBLE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}
