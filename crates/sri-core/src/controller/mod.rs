//! Eligibility & display controller.
//!
//! Decides, from editor lifecycle events, when to compute or clear the
//! integrity value shown in the status indicator, and copies values to the
//! clipboard on request. One tokio task owns all state; each digest runs as
//! its own task and reports back over a channel tagged with a [`RequestId`].
//! Only the newest display request may update the display, so a slow digest
//! for a file the user already left cannot overwrite a newer value.

mod event;
mod sink;
mod state;

pub use event::{ActiveItem, EditorEvent, FileContext};
pub use sink::{Clipboard, EditorHost, PresentationSink};
pub use state::{DisplayState, Phase, RequestId, Snapshot};

use crate::config::ConfigStore;
use crate::digest::IntegrityResult;
use crate::eligibility::is_eligible;
use crate::error::DigestError;
use crate::runner::DigestRunner;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

const EVENT_QUEUE: usize = 64;

/// Returned when sending to a controller whose loop has stopped.
#[derive(Debug, thiserror::Error)]
#[error("integrity controller is not running")]
pub struct ControllerClosed;

/// Where a finished digest goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Display,
    Clipboard,
}

struct Pending {
    request: RequestId,
    path: PathBuf,
}

struct Completion {
    request: RequestId,
    target: Target,
    path: PathBuf,
    outcome: Result<IntegrityResult, DigestError>,
}

pub struct Controller<R> {
    runner: Arc<R>,
    sink: Box<dyn PresentationSink>,
    clipboard: Box<dyn Clipboard>,
    config: Arc<dyn ConfigStore>,
    host: Box<dyn EditorHost>,
    display: DisplayState,
    pending: Option<Pending>,
    observed: bool,
    next_request: u64,
    in_flight: usize,
    events_handled: u64,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    state_tx: watch::Sender<Snapshot>,
}

impl<R: DigestRunner> Controller<R> {
    pub fn new(
        runner: R,
        sink: impl PresentationSink,
        clipboard: impl Clipboard,
        config: Arc<dyn ConfigStore>,
        host: impl EditorHost,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(Snapshot::default());
        Self {
            runner: Arc::new(runner),
            sink: Box::new(sink),
            clipboard: Box::new(clipboard),
            config,
            host: Box::new(host),
            display: DisplayState::Empty,
            pending: None,
            observed: false,
            next_request: 1,
            in_flight: 0,
            events_handled: 0,
            completions_tx,
            completions_rx,
            state_tx,
        }
    }

    /// Start the event loop on the current tokio runtime.
    pub fn activate(self) -> ControllerHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state = self.state_tx.subscribe();
        let task = tokio::spawn(self.run(events_rx, shutdown_rx));
        ControllerHandle {
            events: events_tx,
            state,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::Receiver<EditorEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::info!("integrity controller activated");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(done) = self.completions_rx.recv() => self.handle_completion(done),
            }
        }
        self.pending = None;
        self.set_empty();
        self.observed = false;
        self.publish();
        tracing::info!("integrity controller deactivated");
    }

    fn handle_event(&mut self, event: EditorEvent) {
        tracing::debug!(?event, "editor event");
        match event {
            EditorEvent::FileOpened(ctx) => self.evaluate(ctx.path()),
            EditorEvent::FileSaved(ctx) => self.evaluate(ctx.path()),
            EditorEvent::FileClosed(ctx) => self.on_closed(ctx.path()),
            EditorEvent::ActiveItemChanged(ActiveItem::Editor(ctx)) => self.evaluate(ctx.path()),
            EditorEvent::ActiveItemChanged(ActiveItem::Other) => {}
            EditorEvent::IndicatorClicked => self.copy_shown(),
            EditorEvent::HashActiveFile => match self.host.active_file_path() {
                Some(path) => {
                    self.dispatch(path, Target::Clipboard);
                }
                None => tracing::debug!("hash active file: no saved file is active"),
            },
            EditorEvent::HashPath(path) => {
                self.dispatch(path, Target::Clipboard);
            }
        }
        self.events_handled += 1;
        self.publish();
    }

    /// Decide what the display should show for a newly observed context.
    fn evaluate(&mut self, path: Option<&Path>) {
        self.observed = true;
        match path {
            Some(path) if is_eligible(path) => {
                let request = self.dispatch(path.to_path_buf(), Target::Display);
                if let Some(old) = self.pending.replace(Pending {
                    request,
                    path: path.to_path_buf(),
                }) {
                    tracing::debug!(superseded = %old.request, by = %request, "display request superseded");
                }
            }
            _ => {
                self.pending = None;
                self.set_empty();
            }
        }
    }

    // Clears even when the closed editor is not the active one.
    fn on_closed(&mut self, path: Option<&Path>) {
        let Some(path) = path.filter(|p| is_eligible(p)) else {
            return;
        };
        if self.pending.as_ref().is_some_and(|p| p.path == path) {
            self.pending = None;
        }
        self.set_empty();
    }

    fn copy_shown(&mut self) {
        if let DisplayState::Shown(result) = &self.display {
            self.clipboard.write(result.as_str());
            tracing::info!(value = %result, "copied integrity value");
        }
    }

    fn dispatch(&mut self, path: PathBuf, target: Target) -> RequestId {
        let request = RequestId(self.next_request);
        self.next_request += 1;
        self.in_flight += 1;

        let algorithm = self.config.algorithm();
        let limit = self.config.dispatch_timeout();
        tracing::debug!(%request, path = %path.display(), %algorithm, ?target, "dispatching digest");

        let runner = Arc::clone(&self.runner);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(limit, runner.run(path.clone(), algorithm)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(DigestError::TimedOut { after: limit }),
            };
            // Receiver lives as long as the controller; a send error means it is gone.
            let _ = tx.send(Completion {
                request,
                target,
                path,
                outcome,
            });
        });
        request
    }

    fn handle_completion(&mut self, done: Completion) {
        let Completion {
            request,
            target,
            path,
            outcome,
        } = done;
        self.in_flight = self.in_flight.saturating_sub(1);

        match target {
            Target::Clipboard => match outcome {
                Ok(result) => {
                    self.clipboard.write(result.as_str());
                    tracing::info!(%request, path = %path.display(), value = %result, "copied integrity value");
                }
                Err(e) => tracing::warn!(%request, path = %path.display(), "hash for clipboard failed: {}", e),
            },
            Target::Display => {
                if !self.pending.as_ref().is_some_and(|p| p.request == request) {
                    tracing::debug!(%request, path = %path.display(), "discarding superseded digest");
                    self.publish();
                    return;
                }
                self.pending = None;
                match outcome {
                    Ok(result) => {
                        self.sink.show(&result);
                        tracing::debug!(%request, path = %path.display(), value = %result, "showing integrity value");
                        self.display = DisplayState::Shown(result);
                    }
                    Err(e) => {
                        tracing::warn!(%request, path = %path.display(), "digest failed, display unchanged: {}", e)
                    }
                }
            }
        }
        self.publish();
    }

    fn set_empty(&mut self) {
        if self.display != DisplayState::Empty {
            self.display = DisplayState::Empty;
            self.sink.clear();
        }
    }

    fn snapshot(&self) -> Snapshot {
        let phase = match (&self.pending, self.observed) {
            (Some(p), _) => Phase::Evaluating(p.path.clone()),
            (None, true) => Phase::Settled,
            (None, false) => Phase::Idle,
        };
        Snapshot {
            phase,
            display: self.display.clone(),
            in_flight: self.in_flight,
            events_handled: self.events_handled,
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }
}

/// Running controller: send events in, watch state out.
pub struct ControllerHandle {
    events: mpsc::Sender<EditorEvent>,
    state: watch::Receiver<Snapshot>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub async fn send(&self, event: EditorEvent) -> Result<(), ControllerClosed> {
        self.events.send(event).await.map_err(|_| ControllerClosed)
    }

    /// Extra sender for hosts that deliver events from several tasks.
    pub fn sender(&self) -> mpsc::Sender<EditorEvent> {
        self.events.clone()
    }

    pub fn state(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Stop the event loop and clear the indicator. In-flight digests finish
    /// on their own and are dropped.
    pub async fn deactivate(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(());
        self.task.await?;
        Ok(())
    }
}
