//! Break suggestion engine.
//!
//! The engine is a wall-clock-free state machine in the same style as a
//! tick-driven timer: it has no internal threads and no internal clock, and
//! the caller passes `now` into every operation. The hosted runtime drives
//! it with a 1-second inactivity poll and a 10-second evaluation tick; tests
//! drive it by stepping `now` directly.
//!
//! Evaluation gates, in order (any failure is a silent no-op):
//!
//! 1. suggestions enabled and a session is active
//! 2. the inactivity gap is inside the natural-pause window (8 s .. 5 min)
//! 3. no active snooze
//! 4. the 2-minute cooldown since the last suggestion has elapsed
//!
//! Only then does the threshold table run and a [`Suggestion`] get emitted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::ActivityMonitor;
use crate::config::{policy, EngineConfig};
use crate::events::Event;
use crate::session::{CloseReason, FocusSession, FocusSessionTracker};
use crate::suggestion::{select_tier, BreakKind, Suggestion, SuggestionDecision};

/// Read-only snapshot for optional display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStats {
    pub duration_minutes: i64,
    pub is_active: bool,
    pub breaks_taken: u32,
}

/// Decides when to surface a break suggestion.
///
/// Owns the activity monitor and the session tracker; all mutation happens
/// synchronously inside tick or decision handlers, so no locking is needed
/// in the single-user case.
#[derive(Debug, Clone)]
pub struct BreakSuggestionEngine {
    config: EngineConfig,
    monitor: ActivityMonitor,
    tracker: FocusSessionTracker,
    snoozed_until: Option<DateTime<Utc>>,
    last_suggestion_at: Option<DateTime<Utc>>,
    /// Id of the one suggestion awaiting a presenter decision.
    pending_suggestion: Option<Uuid>,
}

impl BreakSuggestionEngine {
    /// Create an engine. The config is normalized: out-of-range thresholds
    /// are clamped to defaults, never rejected.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.normalized(),
            monitor: ActivityMonitor::new(),
            tracker: FocusSessionTracker::new(),
            snoozed_until: None,
            last_suggestion_at: None,
            pending_suggestion: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn active_session(&self) -> Option<&FocusSession> {
        self.tracker.active_session()
    }

    // ── Host inputs ──────────────────────────────────────────────────

    /// Record an activity pulse. Opens a session when Idle. Infallible.
    pub fn record_activity(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.monitor.record(now);
        self.tracker
            .on_activity(now)
            .map(|session| Event::SessionStarted {
                session_id: session.id,
                at: now,
            })
    }

    /// Window focus counts as a qualifying input event.
    pub fn window_focus(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.record_activity(now)
    }

    /// Window blur closes the active session proactively. Idle is a no-op.
    /// Blur is not activity, so the monitor timestamp is left alone.
    pub fn window_blur(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.close_session(now, CloseReason::WindowBlur)
    }

    // ── Periodic ticks ───────────────────────────────────────────────

    /// The 1-second poll: close the session after a sustained inactivity gap.
    pub fn poll_inactivity(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let gap = self.monitor.time_since_last_activity(now);
        let closed = self.tracker.close_if_inactive(now, gap)?;
        Some(self.emit_closed(closed, CloseReason::InactivityGap, now))
    }

    /// The 10-second tick: run the evaluation gates and the threshold table.
    ///
    /// Emitting a suggestion starts the cooldown and replaces any still
    /// undecided suggestion, whose id becomes stale.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Option<Suggestion> {
        if !self.config.enabled {
            return None;
        }
        let session = self.tracker.active_session()?;

        // Natural break point: not mid-keystroke, not already closed.
        let gap = self.monitor.time_since_last_activity(now)?;
        if gap < Duration::seconds(policy::NATURAL_PAUSE_MIN_SECS)
            || gap >= Duration::seconds(policy::SESSION_CLOSE_GRACE_SECS)
        {
            return None;
        }

        if let Some(until) = self.snoozed_until {
            if now < until {
                return None;
            }
        }
        if let Some(last) = self.last_suggestion_at {
            if now - last < Duration::seconds(policy::SUGGESTION_COOLDOWN_SECS) {
                return None;
            }
        }

        let duration_minutes = session.duration_minutes(now);
        let tier = select_tier(duration_minutes, self.config.first_break_threshold_minutes)?;
        let suggestion = Suggestion::build(
            tier,
            duration_minutes,
            self.config.max_intensity,
            &self.config.user_name,
            now,
        );
        self.last_suggestion_at = Some(now);
        self.pending_suggestion = Some(suggestion.id);
        Some(suggestion)
    }

    // ── Presenter decisions ──────────────────────────────────────────

    /// Apply the presenter's decision on a suggestion.
    ///
    /// Decisions quoting a stale id (already decided, replaced, or from a
    /// closed session) are ignored, so a late callback can never mutate
    /// state it no longer owns.
    pub fn decide(
        &mut self,
        suggestion_id: Uuid,
        decision: SuggestionDecision,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        if self.pending_suggestion != Some(suggestion_id) {
            return None;
        }
        self.pending_suggestion = None;

        match decision {
            SuggestionDecision::Snooze => {
                let snoozed_until = now + Duration::seconds(policy::SNOOZE_SECS);
                self.snoozed_until = Some(snoozed_until);
                let remaining_focus_minutes = self
                    .tracker
                    .active_session()
                    .map(|s| s.duration_minutes(now))
                    .unwrap_or(0);
                Some(Event::BreakSnoozed {
                    remaining_focus_minutes,
                    snoozed_until,
                    at: now,
                })
            }
            SuggestionDecision::TakeBreak { duration_minutes } => {
                // A pending suggestion implies an active session, so this
                // cannot be a no-op.
                let _ = self
                    .tracker
                    .apply_break(now, u64::from(duration_minutes) * 60_000);
                Some(Event::BreakTaken {
                    duration_minutes,
                    kind: BreakKind::Suggested,
                    at: now,
                })
            }
            SuggestionDecision::Dismiss => Some(Event::SuggestionDismissed {
                suggestion_id,
                at: now,
            }),
        }
    }

    /// Record a break the user took on their own, without a suggestion.
    /// Idle is a no-op.
    pub fn record_manual_break(
        &mut self,
        now: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Option<Event> {
        self.tracker
            .apply_break(now, u64::from(duration_minutes) * 60_000)?;
        Some(Event::BreakTaken {
            duration_minutes,
            kind: BreakKind::Manual,
            at: now,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stats(&self, now: DateTime<Utc>) -> EngineStats {
        match self.tracker.active_session() {
            Some(session) => EngineStats {
                duration_minutes: session.duration_minutes(now),
                is_active: true,
                breaks_taken: session.breaks_taken,
            },
            None => EngineStats::default(),
        }
    }

    pub fn stats_snapshot(&self, now: DateTime<Utc>) -> Event {
        let stats = self.stats(now);
        Event::StatsSnapshot {
            duration_minutes: stats.duration_minutes,
            is_active: stats.is_active,
            breaks_taken: stats.breaks_taken,
            at: now,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn close_session(&mut self, now: DateTime<Utc>, reason: CloseReason) -> Option<Event> {
        let closed = self.tracker.close(now)?;
        Some(self.emit_closed(closed, reason, now))
    }

    fn emit_closed(&mut self, closed: FocusSession, reason: CloseReason, now: DateTime<Utc>) -> Event {
        // The session is gone; any undecided suggestion with it.
        self.pending_suggestion = None;
        Event::SessionClosed {
            session_id: closed.id,
            duration_minutes: closed.duration_minutes(now),
            breaks_taken: closed.breaks_taken,
            reason,
            at: now,
        }
    }
}
