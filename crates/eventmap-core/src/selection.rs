//! Highlighted-event state and the pulse animation timer.
//!
//! At most one event is selected. While the selection resolves to a visible
//! standalone point the controller runs a pulse task that alternates the
//! ring magnitude between two values and publishes it on a `watch` channel.
//!
//! # Timer lifecycle
//!
//! - One timer at most. Switching the selection while pulsing keeps it.
//! - Clearing the selection or losing visibility aborts it.
//! - [`SelectionController::shutdown`] aborts and awaits it.
//! - Dropping the controller aborts a live timer.

use std::sync::Arc;
use std::time::Duration;

use eventmap_types::EventId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Pulse magnitudes and cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseSettings {
    /// Magnitude on the expanded phase (published first).
    pub high: f64,
    /// Magnitude on the contracted phase.
    pub low: f64,
    /// Time between phase flips.
    pub interval: Duration,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            high: 13.0,
            low: 11.0,
            interval: Duration::from_millis(650),
        }
    }
}

/// Owns the selected event id and its pulse timer.
#[derive(Debug)]
pub struct SelectionController {
    selected: Option<EventId>,
    visible: bool,
    settings: PulseSettings,
    phase: Arc<watch::Sender<Option<f64>>>,
    timer: Option<JoinHandle<()>>,
    pulse_starts: u64,
}

impl SelectionController {
    /// Create a controller with nothing selected.
    pub fn new(settings: PulseSettings) -> Self {
        let (phase, _) = watch::channel(None);
        Self {
            selected: None,
            visible: false,
            settings,
            phase: Arc::new(phase),
            timer: None,
            pulse_starts: 0,
        }
    }

    /// Highlight `id`. A running pulse keeps running.
    pub const fn select(&mut self, id: EventId) {
        self.selected = Some(id);
    }

    /// Remove the highlight and stop the pulse.
    pub fn clear(&mut self) {
        self.selected = None;
        self.stop_pulse();
    }

    /// Whether `id` is the highlighted event.
    pub fn is_selected(&self, id: EventId) -> bool {
        self.selected == Some(id)
    }

    /// The highlighted event, if any.
    pub const fn selected(&self) -> Option<EventId> {
        self.selected
    }

    /// Report whether the selection currently resolves to a visible
    /// standalone point, starting or stopping the pulse to match.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible && self.selected.is_some() {
            self.start_pulse();
        } else {
            self.stop_pulse();
        }
    }

    /// Whether the selection was last reported visible.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a pulse timer is live.
    pub fn is_pulsing(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// The current pulse magnitude, present while pulsing.
    pub fn pulse(&self) -> Option<f64> {
        *self.phase.borrow()
    }

    /// Subscribe to pulse magnitude changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<f64>> {
        self.phase.subscribe()
    }

    /// Number of pulse timers started over the controller's life.
    pub const fn pulse_starts(&self) -> u64 {
        self.pulse_starts
    }

    /// Stop the pulse and wait for its task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            // A cancelled join error is the expected outcome.
            let _ = timer.await;
        }
        self.phase.send_replace(None);
    }

    fn start_pulse(&mut self) {
        if self.is_pulsing() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, selection pulse not started");
            return;
        };
        let phase = Arc::clone(&self.phase);
        let settings = self.settings;
        self.timer = Some(runtime.spawn(run_pulse(phase, settings)));
        self.pulse_starts = self.pulse_starts.saturating_add(1);
        debug!(selected = ?self.selected, "Selection pulse started");
    }

    fn stop_pulse(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Selection pulse stopped");
        }
        self.phase.send_if_modified(|value| value.take().is_some());
    }
}

impl Drop for SelectionController {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

async fn run_pulse(phase: Arc<watch::Sender<Option<f64>>>, settings: PulseSettings) {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut high = true;
    loop {
        ticker.tick().await;
        let magnitude = if high { settings.high } else { settings.low };
        phase.send_replace(Some(magnitude));
        high = !high;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    fn controller() -> SelectionController {
        SelectionController::new(PulseSettings::default())
    }

    #[test]
    fn select_and_clear() {
        let mut selection = controller();
        let id = EventId::new();
        assert_eq!(selection.selected(), None);
        selection.select(id);
        assert!(selection.is_selected(id));
        selection.clear();
        assert_eq!(selection.selected(), None);
        assert!(!selection.is_selected(id));
    }

    #[test]
    fn pulse_needs_a_runtime() {
        let mut selection = controller();
        selection.select(EventId::new());
        selection.set_visible(true);
        assert!(!selection.is_pulsing());
        assert_eq!(selection.pulse_starts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pulse_alternates_magnitudes() {
        let mut selection = controller();
        let mut rx = selection.subscribe();
        selection.select(EventId::new());
        selection.set_visible(true);
        assert!(selection.is_pulsing());

        let started = Instant::now();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(13.0));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(11.0));
        assert!(started.elapsed() >= Duration::from_millis(650));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(13.0));
        assert!(started.elapsed() >= Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn switching_selection_keeps_one_timer() {
        let mut selection = controller();
        selection.select(EventId::new());
        selection.set_visible(true);
        let second = EventId::new();
        selection.select(second);
        selection.set_visible(true);
        assert!(selection.is_selected(second));
        assert!(selection.is_pulsing());
        assert_eq!(selection.pulse_starts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_stops_pulse() {
        let mut selection = controller();
        selection.select(EventId::new());
        selection.set_visible(true);
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(selection.pulse().is_some());

        selection.clear();
        assert!(!selection.is_pulsing());
        assert_eq!(selection.pulse(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn invisibility_stops_pulse_and_visibility_restarts_it() {
        let mut selection = controller();
        selection.select(EventId::new());
        selection.set_visible(true);
        selection.set_visible(false);
        assert!(!selection.is_pulsing());
        selection.set_visible(true);
        assert!(selection.is_pulsing());
        assert_eq!(selection.pulse_starts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn visible_without_selection_does_not_pulse() {
        let mut selection = controller();
        selection.set_visible(true);
        assert!(!selection.is_pulsing());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_awaits_timer() {
        let mut selection = controller();
        selection.select(EventId::new());
        selection.set_visible(true);
        selection.shutdown().await;
        assert!(!selection.is_pulsing());
        assert_eq!(selection.pulse(), None);
    }
}
