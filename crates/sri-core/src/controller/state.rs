//! Controller state as seen from outside: what is displayed and whether a
//! digest for the display is in flight.

use crate::digest::IntegrityResult;
use std::fmt;
use std::path::PathBuf;

/// What the status indicator shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Empty,
    Shown(IntegrityResult),
}

impl DisplayState {
    pub fn shown(&self) -> Option<&IntegrityResult> {
        match self {
            DisplayState::Shown(r) => Some(r),
            DisplayState::Empty => None,
        }
    }
}

/// Tag for one dispatched digest. Strictly increasing per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub(crate) u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No file context observed yet.
    #[default]
    Idle,
    /// A digest for this eligible path is in flight; the display keeps its
    /// previous value until it lands.
    Evaluating(PathBuf),
    Settled,
}

/// Published after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub phase: Phase,
    pub display: DisplayState,
    /// Digests dispatched and not yet reported back, display and clipboard alike.
    pub in_flight: usize,
    /// Host events processed so far, in the order they were sent.
    pub events_handled: u64,
}
