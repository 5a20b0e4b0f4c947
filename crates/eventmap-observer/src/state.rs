//! Shared application state for the map API server.
//!
//! The server never touches the view directly. Writes go to the map session
//! as [`ViewCommand`]s over an `mpsc` channel; reads come from the
//! [`ViewFeed`], which the engine's renderer fills with every frame, popup,
//! and camera move the session produces.

use std::sync::Arc;
use std::time::Instant;

use eventmap_core::{Geocoder, ViewCommand};
use eventmap_types::{RenderFrame, ViewMessage};
use tokio::sync::{broadcast, mpsc, watch};

/// Capacity of the broadcast channel for view messages.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Fan-out of renderer output to HTTP and `WebSocket` clients.
///
/// Keeps the latest frame so late joiners and `GET /api/view` can be served
/// without waiting for the next change.
#[derive(Debug, Clone)]
pub struct ViewFeed {
    messages: broadcast::Sender<ViewMessage>,
    latest: Arc<watch::Sender<Option<Arc<RenderFrame>>>>,
}

impl ViewFeed {
    /// An empty feed with no frame yet.
    pub fn new() -> Self {
        let (messages, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (latest, _) = watch::channel(None);
        Self {
            messages,
            latest: Arc::new(latest),
        }
    }

    /// Subscribe to every message published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewMessage> {
        self.messages.subscribe()
    }

    /// The most recent frame, if any was published.
    pub fn latest(&self) -> Option<Arc<RenderFrame>> {
        self.latest.borrow().clone()
    }

    /// Publish a message to all connected clients.
    ///
    /// Frames also replace the cached latest frame. Returns the number of
    /// subscribers that received the message; 0 when nobody is listening.
    pub fn publish(&self, message: ViewMessage) -> usize {
        if let ViewMessage::Frame(frame) = &message {
            self.latest.send_replace(Some(Arc::clone(frame)));
        }
        // send fails only when there are no receivers.
        self.messages.send(message).unwrap_or(0)
    }
}

impl Default for ViewFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState<G> {
    /// Command channel into the map session.
    pub commands: mpsc::Sender<ViewCommand>,
    /// Renderer output.
    pub feed: ViewFeed,
    /// Reverse geocoder used for submissions without an address.
    pub geocoder: G,
    /// When the server state was created.
    pub started_at: Instant,
}

impl<G: Geocoder> AppState<G> {
    /// Assemble the state.
    pub fn new(commands: mpsc::Sender<ViewCommand>, feed: ViewFeed, geocoder: G) -> Self {
        Self {
            commands,
            feed,
            geocoder,
            started_at: Instant::now(),
        }
    }
}
