//! Focus session lifecycle.
//!
//! The tracker is a two-state machine:
//!
//! ```text
//! Idle -> Active      on the first activity pulse
//! Active -> Active    on break-accepted (start_time resets, counters keep)
//! Active -> Idle      after a 5-minute inactivity gap, or on window blur
//! ```
//!
//! At most one session is ever active; a new session can only be created
//! from `Idle`, so the single-active-session invariant holds by
//! construction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::policy;

/// A continuous period of tracked activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: Uuid,
    /// Start of the current focus stretch. Reset whenever a break is accepted.
    pub start_time: DateTime<Utc>,
    /// Set when the session is closed by inactivity or blur.
    pub end_time: Option<DateTime<Utc>>,
    /// Cumulative breaks accepted within this session's lifetime.
    pub breaks_taken: u32,
    /// Cumulative break duration in milliseconds.
    pub total_break_ms: u64,
}

impl FocusSession {
    fn begin(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: now,
            end_time: None,
            breaks_taken: 0,
            total_break_ms: 0,
        }
    }

    /// Whole minutes of the current focus stretch.
    pub fn duration_minutes(&self, now: DateTime<Utc>) -> i64 {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).num_minutes().max(0)
    }
}

/// Why a session was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// No activity for the full close grace period.
    InactivityGap,
    /// The host window lost focus.
    WindowBlur,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TrackerState {
    Idle,
    Active(FocusSession),
}

/// Owns the lifecycle of at most one active [`FocusSession`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSessionTracker {
    state: TrackerState,
}

impl Default for FocusSessionTracker {
    fn default() -> Self {
        Self {
            state: TrackerState::Idle,
        }
    }
}

impl FocusSessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle an activity pulse. Returns the new session when one is created.
    pub fn on_activity(&mut self, now: DateTime<Utc>) -> Option<&FocusSession> {
        if matches!(self.state, TrackerState::Active(_)) {
            return None;
        }
        self.state = TrackerState::Active(FocusSession::begin(now));
        self.active_session()
    }

    /// Close the active session once the inactivity gap reaches the grace
    /// period. Returns the closed session.
    pub fn close_if_inactive(
        &mut self,
        now: DateTime<Utc>,
        time_since_activity: Option<Duration>,
    ) -> Option<FocusSession> {
        let gap = time_since_activity?;
        if gap < Duration::seconds(policy::SESSION_CLOSE_GRACE_SECS) {
            return None;
        }
        self.close(now)
    }

    /// Close the active session unconditionally (window blur, teardown).
    /// Idle is a no-op.
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<FocusSession> {
        match std::mem::replace(&mut self.state, TrackerState::Idle) {
            TrackerState::Active(mut session) => {
                session.end_time = Some(now.max(session.start_time));
                Some(session)
            }
            TrackerState::Idle => None,
        }
    }

    /// Apply an accepted break: restart the focus clock while preserving the
    /// cumulative counters. Idle is a no-op.
    pub fn apply_break(&mut self, now: DateTime<Utc>, break_ms: u64) -> Option<&FocusSession> {
        match &mut self.state {
            TrackerState::Active(session) => {
                session.start_time = now;
                session.breaks_taken += 1;
                session.total_break_ms += break_ms;
                Some(session)
            }
            TrackerState::Idle => None,
        }
    }

    pub fn active_session(&self) -> Option<&FocusSession> {
        match &self.state {
            TrackerState::Active(session) => Some(session),
            TrackerState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TrackerState::Active(_))
    }
}
