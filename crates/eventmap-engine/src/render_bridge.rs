//! Renderer that feeds the map API server.
//!
//! Every frame, popup, and camera move the session produces is published
//! on the observer's [`ViewFeed`], from where it reaches `WebSocket`
//! clients and `GET /api/view`.

use std::sync::Arc;

use eventmap_core::Renderer;
use eventmap_observer::ViewFeed;
use eventmap_types::{CameraTarget, PointPopup, RenderFrame, ViewMessage};
use tracing::trace;

/// [`Renderer`] that publishes to a [`ViewFeed`].
#[derive(Debug, Clone)]
pub struct BroadcastRenderer {
    feed: ViewFeed,
}

impl BroadcastRenderer {
    /// Publish onto `feed`.
    pub const fn new(feed: ViewFeed) -> Self {
        Self { feed }
    }
}

impl Renderer for BroadcastRenderer {
    fn render(&self, frame: &RenderFrame) {
        let generation = frame.generation;
        let receivers = self
            .feed
            .publish(ViewMessage::Frame(Arc::new(frame.clone())));
        trace!(generation, receivers, "Frame published");
    }

    fn show_popup(&self, popup: &PointPopup) {
        let receivers = self.feed.publish(ViewMessage::Popup(popup.clone()));
        trace!(event_id = %popup.id, receivers, "Popup published");
    }

    fn navigate(&self, target: &CameraTarget) {
        let receivers = self.feed.publish(ViewMessage::Navigate(*target));
        trace!(zoom = target.zoom, receivers, "Camera move published");
    }
}
