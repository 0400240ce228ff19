//! The station loop: operator input, live remote events and the autoscan timer.

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::time::sleep_until;
use tracing::{debug, info, warn};

use drm_core::{AppliedScan, InputDecision, ManifestSession, MarkOutcome, ScanOutcome};
use drm_model::{ConsignmentCode, ScanEvent};
use drm_persistence::{StationCache, save_cache_async};

use crate::log::ScanLog;
use crate::sync::ScanSync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationCommand {
    /// The input field changed; goes through the autoscan gate.
    Input(String),
    /// Explicit submit (Enter).
    Submit(String),
    /// Manually mark the next item of a data row.
    Mark(usize),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationEvent {
    Scan(ScanOutcome),
    Mark(MarkOutcome),
    Remote(AppliedScan),
    PublishFailed { code: ConsignmentCode },
    SaveFailed { message: String },
}

/// Owns a session and processes one command or event at a time.
pub struct Station<L> {
    session: ManifestSession,
    sync: ScanSync<L>,
    cache_path: Option<PathBuf>,
}

impl<L: ScanLog> Station<L> {
    pub fn new(session: ManifestSession, sync: ScanSync<L>) -> Self {
        Self {
            session,
            sync,
            cache_path: None,
        }
    }

    /// Save the session to `path` whenever it changes.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn session(&self) -> &ManifestSession {
        &self.session
    }

    /// Run until `Shutdown` or until the command channel closes; returns the session.
    ///
    /// Subscribes to live events before replaying the backlog so nothing
    /// published in between is missed.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<StationCommand>,
        events: mpsc::Sender<StationEvent>,
    ) -> ManifestSession {
        let mut live = self.sync.subscribe();
        let mut live_open = true;
        if let Err(error) = self.sync.hydrate_backlog(&mut self.session).await {
            warn!(error = %error, "could not replay scan backlog");
        }
        info!(
            depot_id = %self.sync.depot_id(),
            origin_id = %self.sync.origin_id(),
            "station started"
        );
        loop {
            let deadline = self.session.autoscan_deadline();
            let wake = deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(StationCommand::Shutdown) => break,
                    Some(command) => self.handle_command(command, &events).await,
                },
                received = live.recv(), if live_open => match received {
                    Ok(event) => self.handle_live(&event, &events).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "live scan feed lagged; replaying backlog");
                        if let Err(error) = self.sync.hydrate_backlog(&mut self.session).await {
                            warn!(error = %error, "could not replay scan backlog");
                        }
                    }
                    Err(RecvError::Closed) => {
                        warn!("live scan feed closed");
                        live_open = false;
                    }
                },
                () = sleep_until(wake), if deadline.is_some() => {
                    if let Some(outcome) = self.session.poll_autoscan(Instant::now()) {
                        self.after_scan(outcome, &events).await;
                    }
                }
            }
            self.persist(&events).await;
        }
        self.persist(&events).await;
        info!(depot_id = %self.sync.depot_id(), "station stopped");
        self.session
    }

    async fn handle_command(&mut self, command: StationCommand, events: &mpsc::Sender<StationEvent>) {
        match command {
            StationCommand::Input(value) => {
                match self.session.on_input(&value, Instant::now()) {
                    InputDecision::Submit(value) => {
                        let outcome = self.session.handle_scan(&value);
                        self.after_scan(outcome, events).await;
                    }
                    InputDecision::Scheduled(deadline) => {
                        debug!(?deadline, "autoscan scheduled");
                    }
                    InputDecision::Wait => {}
                }
            }
            StationCommand::Submit(value) => {
                let outcome = self.session.handle_scan(&value);
                self.after_scan(outcome, events).await;
            }
            StationCommand::Mark(row) => {
                let outcome = self.session.mark_next_for_row(row);
                if let MarkOutcome::Marked(receipt) = &outcome
                    && !self.sync.publish(receipt).await
                {
                    emit(
                        events,
                        StationEvent::PublishFailed {
                            code: receipt.code.clone(),
                        },
                    )
                    .await;
                }
                emit(events, StationEvent::Mark(outcome)).await;
            }
            StationCommand::Shutdown => {}
        }
    }

    async fn after_scan(&mut self, outcome: ScanOutcome, events: &mpsc::Sender<StationEvent>) {
        if let ScanOutcome::Accepted(receipt) = &outcome
            && !self.sync.publish(receipt).await
        {
            emit(
                events,
                StationEvent::PublishFailed {
                    code: receipt.code.clone(),
                },
            )
            .await;
        }
        emit(events, StationEvent::Scan(outcome)).await;
    }

    async fn handle_live(&mut self, event: &ScanEvent, events: &mpsc::Sender<StationEvent>) {
        if let Some(applied) = self.sync.apply_remote(&mut self.session, event, true)
            && applied.added
        {
            emit(events, StationEvent::Remote(applied)).await;
        }
    }

    async fn persist(&mut self, events: &mpsc::Sender<StationEvent>) {
        let Some(path) = self.cache_path.clone() else {
            return;
        };
        if !self.session.take_dirty() {
            return;
        }
        let cache = StationCache::new(self.session.depot_id().clone(), self.session.snapshot());
        if let Err(error) = save_cache_async(cache, path).await {
            warn!(error = %error, "could not save station cache");
            emit(
                events,
                StationEvent::SaveFailed {
                    message: error.user_message(),
                },
            )
            .await;
        }
    }
}

async fn emit(events: &mpsc::Sender<StationEvent>, event: StationEvent) {
    if events.send(event).await.is_err() {
        debug!("station event receiver dropped");
    }
}
