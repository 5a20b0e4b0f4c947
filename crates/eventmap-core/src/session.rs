//! The map session: one async task that owns the view and talks to the
//! outside world.
//!
//! [`MapSession::run`] serializes every state change. It waits on user
//! commands, on completions of the background tasks it spawned (the event
//! load and event inserts), and on pulse phase changes, and it emits a fresh
//! [`RenderFrame`](eventmap_types::RenderFrame) after each.
//!
//! # Loads
//!
//! One load is in flight at most. Starting a new one aborts the previous
//! task and bumps a generation counter, so a result that slips through from
//! a superseded load is discarded. A failed load leaves an empty event set
//! and clears the loading flag; there is no automatic retry.
//!
//! # Filter persistence
//!
//! The saved filter is best effort and never holds up the loop. The startup
//! restore is bounded by [`PERSISTENCE_TIMEOUT`] and gives way to the first
//! command: a shutdown ends the session at once, and any other command means
//! the user has moved on, so the saved mode is skipped. Saves run on a
//! separate task that always writes the latest mode, each one bounded by the
//! same timeout.
//!
//! # Teardown
//!
//! On [`ViewCommand::Shutdown`] or when every command sender is gone the
//! session aborts the load, gives the save task one timeout to flush the
//! last mode, stops the pulse, and returns. No renderer call happens after
//! that.

use std::sync::Arc;
use std::time::Duration;

use eventmap_types::{BoundingBox, ClusterId, Event, EventId, FilterMode, NewEvent};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::error::Elapsed;
use tracing::{debug, info, warn};

use crate::coordinator::ViewCoordinator;
use crate::external::{
    EventStore, FilterPersistence, PersistenceError, Renderer, StoreError, ValidationError,
    validate_new_event,
};

/// Capacity of the internal completion channel.
const COMPLETION_BUFFER: usize = 16;

/// Upper bound on one filter persistence call.
pub const PERSISTENCE_TIMEOUT: Duration = Duration::from_secs(3);

/// A user input forwarded to the session.
#[derive(Debug)]
pub enum ViewCommand {
    /// Switch the filter mode.
    SetFilter(FilterMode),
    /// Report the camera after a move.
    SetCamera {
        /// Current zoom.
        zoom: f64,
        /// Visible bounds, if known.
        viewport: Option<BoundingBox>,
    },
    /// A cluster was clicked.
    OpenCluster(ClusterId),
    /// A standalone point was clicked.
    OpenPoint(EventId),
    /// A list row was clicked.
    OpenRow(EventId),
    /// Open the default list.
    OpenList,
    /// Close the list panel.
    CloseSheet,
    /// Flip the list panel between peek and full.
    ToggleSheet,
    /// Drop the highlight.
    ClearSelection,
    /// Reload events from the store.
    Reload,
    /// Insert a new event, then reload.
    CreateEvent {
        /// The submitted event.
        event: NewEvent,
        /// Receives the new id or the reason it was refused.
        reply: oneshot::Sender<Result<EventId, CreateError>>,
    },
    /// Stop the session.
    Shutdown,
}

/// Why an event could not be created.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// The submission failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The store refused or failed the insert.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session stopped before answering.
    #[error("map session is not running")]
    SessionClosed,
}

/// Results handed back by background tasks.
#[derive(Debug)]
enum Completion {
    Loaded {
        generation: u64,
        result: Result<Vec<Event>, StoreError>,
    },
    Created(EventId),
}

/// A running session.
#[derive(Debug)]
pub struct SessionHandle {
    /// Send commands here.
    pub commands: mpsc::Sender<ViewCommand>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Ask the session to stop and wait until it has.
    pub async fn shutdown(self) {
        if self.commands.send(ViewCommand::Shutdown).await.is_err() {
            debug!("Map session already stopped");
        }
        if let Err(e) = self.task.await {
            warn!(error = %e, "Map session task ended abnormally");
        }
    }
}

/// Owns the view coordinator and its collaborators.
pub struct MapSession<S, P, R> {
    coordinator: ViewCoordinator,
    store: Arc<S>,
    persistence: Arc<P>,
    renderer: Arc<R>,
    completions: mpsc::Sender<Completion>,
    completions_rx: Option<mpsc::Receiver<Completion>>,
    load: Option<JoinHandle<()>>,
    load_generation: u64,
    saves: Option<watch::Sender<Option<FilterMode>>>,
    saver: Option<JoinHandle<()>>,
}

impl<S, P, R> std::fmt::Debug for MapSession<S, P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("coordinator", &self.coordinator)
            .field("load_generation", &self.load_generation)
            .finish_non_exhaustive()
    }
}

impl<S, P, R> MapSession<S, P, R>
where
    S: EventStore,
    P: FilterPersistence,
    R: Renderer,
{
    /// Assemble a session. Nothing runs until [`run`](Self::run).
    pub fn new(
        coordinator: ViewCoordinator,
        store: Arc<S>,
        persistence: Arc<P>,
        renderer: Arc<R>,
    ) -> Self {
        let (completions, completions_rx) = mpsc::channel(COMPLETION_BUFFER);
        Self {
            coordinator,
            store,
            persistence,
            renderer,
            completions,
            completions_rx: Some(completions_rx),
            load: None,
            load_generation: 0,
            saves: None,
            saver: None,
        }
    }

    /// Run the session on its own task.
    pub fn spawn(self, buffer: usize) -> SessionHandle {
        let (commands, rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(self.run(rx));
        SessionHandle { commands, task }
    }

    /// Process commands until shutdown.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ViewCommand>) {
        let Some(mut completions) = self.completions_rx.take() else {
            warn!("Map session already ran");
            return;
        };
        let mut pulse = self.coordinator.selection().subscribe();

        let persistence = Arc::clone(&self.persistence);
        let restore = tokio::time::timeout(PERSISTENCE_TIMEOUT, persistence.load_saved_mode());
        let early = tokio::select! {
            restored = restore => {
                self.restore_filter(restored);
                None
            }
            command = commands.recv() => match command {
                Some(ViewCommand::Shutdown) | None => {
                    self.teardown().await;
                    return;
                }
                Some(command) => {
                    debug!("Command arrived before the saved filter, skipping restore");
                    Some(command)
                }
            },
        };

        let (saves, pending) = watch::channel(None);
        self.saves = Some(saves);
        self.saver = Some(tokio::spawn(save_filters(
            Arc::clone(&self.persistence),
            pending,
        )));
        self.start_load();
        self.emit();
        info!(filter = %self.coordinator.filter(), "Map session started");
        if let Some(command) = early {
            self.handle(command);
        }

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(ViewCommand::Shutdown) | None => break,
                        Some(command) => self.handle(command),
                    }
                }
                Some(done) = completions.recv() => self.complete(done),
                Ok(()) = pulse.changed() => self.emit(),
            }
        }

        self.teardown().await;
    }

    fn handle(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::SetFilter(mode) => {
                if self.coordinator.set_filter(mode) {
                    self.emit();
                    if let Some(saves) = &self.saves {
                        saves.send_replace(Some(mode));
                    }
                }
            }
            ViewCommand::SetCamera { zoom, viewport } => {
                self.coordinator.set_camera(zoom, viewport);
                self.emit();
            }
            ViewCommand::OpenCluster(id) => {
                if let Some(target) = self.coordinator.open_cluster(id) {
                    self.renderer.navigate(&target);
                }
                self.emit();
            }
            ViewCommand::OpenPoint(id) => {
                if let Some(popup) = self.coordinator.open_point(id) {
                    self.renderer.show_popup(&popup);
                }
                self.emit();
            }
            ViewCommand::OpenRow(id) => {
                if let Some(target) = self.coordinator.open_row(id) {
                    self.renderer.navigate(&target);
                }
                self.emit();
            }
            ViewCommand::OpenList => {
                self.coordinator.open_list();
                self.emit();
            }
            ViewCommand::CloseSheet => {
                self.coordinator.close_sheet();
                self.emit();
            }
            ViewCommand::ToggleSheet => {
                self.coordinator.toggle_sheet();
                self.emit();
            }
            ViewCommand::ClearSelection => {
                self.coordinator.clear_selection();
                self.emit();
            }
            ViewCommand::Reload => {
                self.start_load();
                self.emit();
            }
            ViewCommand::CreateEvent { event, reply } => self.create(event, reply),
            ViewCommand::Shutdown => {}
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Loaded { generation, result } => {
                if generation != self.load_generation {
                    debug!(generation, current = self.load_generation, "Discarding stale load");
                    return;
                }
                self.load = None;
                match result {
                    Ok(events) => {
                        info!(count = events.len(), "Events loaded");
                        self.coordinator.set_events(events);
                    }
                    Err(e) => {
                        warn!(error = %e, "Event load failed, showing no events");
                        self.coordinator.set_events(Vec::new());
                    }
                }
                self.emit();
            }
            Completion::Created(id) => {
                info!(event_id = %id, "Event created, reloading");
                self.start_load();
                self.emit();
            }
        }
    }

    fn restore_filter(
        &mut self,
        restored: Result<Result<Option<FilterMode>, PersistenceError>, Elapsed>,
    ) {
        let mode = match restored {
            Ok(Ok(Some(mode))) => mode,
            Ok(Ok(None)) => FilterMode::All,
            Ok(Err(e)) => {
                warn!(error = %e, "Saved filter unavailable, using all");
                FilterMode::All
            }
            Err(elapsed) => {
                warn!(error = %elapsed, "Saved filter timed out, using all");
                FilterMode::All
            }
        };
        self.coordinator.set_filter(mode);
    }

    fn start_load(&mut self) {
        if let Some(previous) = self.load.take() {
            previous.abort();
            debug!(generation = self.load_generation, "Superseded in-flight load");
        }
        self.load_generation = self.load_generation.saturating_add(1);
        let generation = self.load_generation;
        let store = Arc::clone(&self.store);
        let done = self.completions.clone();
        self.coordinator.set_loading(true);
        self.load = Some(tokio::spawn(async move {
            let result = store.load_all_events().await;
            if done
                .send(Completion::Loaded { generation, result })
                .await
                .is_err()
            {
                debug!(generation, "Session gone, load result dropped");
            }
        }));
        debug!(generation, "Event load started");
    }

    fn create(&self, event: NewEvent, reply: oneshot::Sender<Result<EventId, CreateError>>) {
        if let Err(e) = validate_new_event(&event) {
            debug!(error = %e, "Rejected event submission");
            if reply.send(Err(e.into())).is_err() {
                debug!("Create caller went away");
            }
            return;
        }
        let store = Arc::clone(&self.store);
        let done = self.completions.clone();
        tokio::spawn(async move {
            let result = store.create_event(event).await;
            let created = result.as_ref().ok().copied();
            if let Err(e) = &result {
                warn!(error = %e, "Event insert failed");
            }
            if reply.send(result.map_err(CreateError::from)).is_err() {
                debug!("Create caller went away");
            }
            if let Some(id) = created
                && done.send(Completion::Created(id)).await.is_err()
            {
                debug!("Session gone, skipping reload");
            }
        });
    }

    fn emit(&mut self) {
        let frame = self.coordinator.frame();
        self.renderer.render(&frame);
    }

    async fn teardown(&mut self) {
        if let Some(load) = self.load.take() {
            load.abort();
            // A cancelled join error is the expected outcome.
            let _ = load.await;
        }
        // Closing the channel lets the save task finish once the latest
        // mode is written.
        self.saves = None;
        if let Some(mut saver) = self.saver.take()
            && tokio::time::timeout(PERSISTENCE_TIMEOUT, &mut saver)
                .await
                .is_err()
        {
            warn!("Filter save still pending at shutdown, dropping it");
            saver.abort();
            let _ = saver.await;
        }
        self.coordinator.shutdown().await;
        info!("Map session stopped");
    }
}

/// Write each newly chosen mode, skipping any that were superseded while an
/// earlier write was in flight.
async fn save_filters<P: FilterPersistence>(
    persistence: Arc<P>,
    mut pending: watch::Receiver<Option<FilterMode>>,
) {
    while pending.changed().await.is_ok() {
        let Some(mode) = *pending.borrow_and_update() else {
            continue;
        };
        match tokio::time::timeout(PERSISTENCE_TIMEOUT, persistence.save_mode(mode)).await {
            Ok(Ok(())) => debug!(mode = %mode, "Filter mode saved"),
            Ok(Err(e)) => warn!(error = %e, mode = %mode, "Failed to save filter mode"),
            Err(elapsed) => warn!(error = %elapsed, mode = %mode, "Saving filter mode timed out"),
        }
    }
}
