//! Activity monitoring.
//!
//! The monitor is a passive recorder: it translates the host's stream of raw
//! input events into a single `last_activity` timestamp and derived
//! "is the user active?" reads. It performs no allocation and no async work,
//! so it is safe to drive from an input-event dispatch path at arbitrary
//! frequency.
//!
//! Window blur is deliberately not activity: it never refreshes the
//! timestamp. The tracker consumes blur separately to close the session
//! proactively.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Kind of a qualifying input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Keystroke,
    PointerClick,
    PointerMove,
    Scroll,
    TouchStart,
}

/// Signals the host feeds into the engine runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "signal")]
pub enum HostSignal {
    /// A qualifying input event.
    Activity { kind: ActivityKind },
    /// The application window gained focus. Counts as activity.
    WindowFocus,
    /// The application window lost focus. Not activity; closes the session.
    WindowBlur,
}

/// The seam between the engine and host-specific event plumbing.
///
/// The host (native client, browser shim, or a simulated harness) implements
/// this to deliver activity pulses and focus/blur signals. The runtime
/// subscribes exactly once; dropping the sender side detaches the listener.
pub trait ActivityEventSource {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<HostSignal>;
}

/// An [`ActivityEventSource`] driven by explicit sends.
///
/// Used by tests and the CLI simulator; a real host would wrap its own input
/// dispatch the same way.
pub struct ScriptedEventSource {
    receiver: Option<mpsc::UnboundedReceiver<HostSignal>>,
}

impl ScriptedEventSource {
    /// Create a source plus the sender used to script signals into it.
    pub fn channel() -> (mpsc::UnboundedSender<HostSignal>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { receiver: Some(rx) })
    }
}

impl ActivityEventSource for ScriptedEventSource {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<HostSignal> {
        self.receiver
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1)
    }
}

/// Records activity timestamps and answers activity queries.
///
/// All operations are O(1), infallible and take `now` explicitly so callers
/// control the clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityMonitor {
    last_activity: Option<DateTime<Utc>>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an activity pulse. Idempotent within the same instant.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
    }

    /// Timestamp of the most recent pulse, if any.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// Time elapsed since the last pulse. `None` before the first pulse.
    pub fn time_since_last_activity(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_activity.map(|last| now - last)
    }

    /// Whether a pulse was recorded within the last `grace_secs` seconds.
    pub fn is_active(&self, now: DateTime<Utc>, grace_secs: i64) -> bool {
        self.time_since_last_activity(now)
            .map(|gap| gap < Duration::seconds(grace_secs))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn no_activity_before_first_pulse() {
        let monitor = ActivityMonitor::new();
        assert!(monitor.last_activity().is_none());
        assert!(monitor.time_since_last_activity(t0()).is_none());
        assert!(!monitor.is_active(t0(), 8));
    }

    #[test]
    fn record_refreshes_timestamp() {
        let mut monitor = ActivityMonitor::new();
        monitor.record(t0());
        let later = t0() + Duration::seconds(30);
        monitor.record(later);
        assert_eq!(monitor.last_activity(), Some(later));
        assert_eq!(
            monitor.time_since_last_activity(later + Duration::seconds(4)),
            Some(Duration::seconds(4))
        );
    }

    #[test]
    fn record_is_idempotent_within_same_instant() {
        let mut monitor = ActivityMonitor::new();
        monitor.record(t0());
        let snapshot = monitor.clone();
        monitor.record(t0());
        monitor.record(t0());
        assert_eq!(monitor.last_activity(), snapshot.last_activity());
    }

    #[test]
    fn is_active_respects_grace_boundary() {
        let mut monitor = ActivityMonitor::new();
        monitor.record(t0());
        assert!(monitor.is_active(t0() + Duration::seconds(7), 8));
        // A gap of exactly the grace period is no longer active.
        assert!(!monitor.is_active(t0() + Duration::seconds(8), 8));
    }

    #[test]
    fn scripted_source_delivers_signals() {
        let (tx, mut source) = ScriptedEventSource::channel();
        let mut rx = source.subscribe();
        tx.send(HostSignal::Activity {
            kind: ActivityKind::Keystroke,
        })
        .unwrap();
        tx.send(HostSignal::WindowBlur).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            HostSignal::Activity {
                kind: ActivityKind::Keystroke
            }
        );
        assert_eq!(rx.try_recv().unwrap(), HostSignal::WindowBlur);
    }
}
