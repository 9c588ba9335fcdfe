//! Engine event surface.
//!
//! Every externally visible state change produces an [`Event`]. The host
//! subscribes to the stream for telemetry and optional display; the
//! presenter additionally receives full [`crate::Suggestion`] payloads on
//! their own channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::CloseReason;
use crate::suggestion::{BreakKind, IntensityLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A focus session opened on the first activity pulse after Idle.
    SessionStarted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    /// The active session was closed by inactivity or window blur.
    SessionClosed {
        session_id: Uuid,
        duration_minutes: i64,
        breaks_taken: u32,
        reason: CloseReason,
        at: DateTime<Utc>,
    },
    /// A suggestion was emitted to the presenter.
    BreakSuggested {
        suggestion_id: Uuid,
        intensity: IntensityLevel,
        focus_duration_minutes: i64,
        at: DateTime<Utc>,
    },
    /// The user took a break.
    BreakTaken {
        duration_minutes: u32,
        kind: BreakKind,
        at: DateTime<Utc>,
    },
    /// The user snoozed a suggestion.
    BreakSnoozed {
        remaining_focus_minutes: i64,
        snoozed_until: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The user dismissed a suggestion. Only the generic cooldown applies
    /// before the next one.
    SuggestionDismissed {
        suggestion_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Periodic read-only snapshot for optional display.
    StatsSnapshot {
        duration_minutes: i64,
        is_active: bool,
        breaks_taken: u32,
        at: DateTime<Utc>,
    },
}
