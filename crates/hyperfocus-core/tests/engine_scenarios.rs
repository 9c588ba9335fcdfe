//! Integration tests for the break suggestion engine.
//!
//! Each scenario drives a full engine through explicit `now` stepping, the
//! same way the hosted runtime drives it with real ticks: activity pulses,
//! 1-second inactivity polls and 10-second evaluations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hyperfocus_core::{
    BreakSuggestionEngine, CloseReason, EngineConfig, Event, IntensityLevel, SuggestionDecision,
};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

/// Pulse every 5 seconds from `from` through `until` inclusive.
fn focus_between(engine: &mut BreakSuggestionEngine, from: DateTime<Utc>, until: DateTime<Utc>) {
    let mut now = from;
    while now <= until {
        engine.record_activity(now);
        now += Duration::seconds(5);
    }
}

/// Run evaluation ticks every 10 s over a window, collecting emissions.
fn evaluate_between(
    engine: &mut BreakSuggestionEngine,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, hyperfocus_core::Suggestion)> {
    let mut out = Vec::new();
    let mut now = from;
    while now <= until {
        if let Some(s) = engine.evaluate(now) {
            out.push((now, s));
        }
        now += Duration::seconds(10);
    }
    out
}

#[test]
fn scenario_a_gentle_suggestion_at_natural_pause() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    let last_pulse = base() + Duration::minutes(30);
    focus_between(&mut engine, base(), last_pulse);

    // 9 seconds of pause: inside the natural break window, session open.
    let now = last_pulse + Duration::seconds(9);
    assert!(engine.poll_inactivity(now).is_none());

    let suggestion = engine.evaluate(now).expect("gentle suggestion");
    assert_eq!(suggestion.intensity, IntensityLevel::Gentle);
    assert_eq!(suggestion.focus_duration_minutes, 30);
}

#[test]
fn scenario_b_snooze_suppresses_until_window_ends() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    let last_pulse = base() + Duration::minutes(30);
    focus_between(&mut engine, base(), last_pulse);

    let snooze_at = last_pulse + Duration::seconds(10);
    let suggestion = engine.evaluate(snooze_at).unwrap();
    let event = engine.decide(suggestion.id, SuggestionDecision::Snooze, snooze_at);
    assert!(matches!(event, Some(Event::BreakSnoozed { .. })));

    // The pause persists. Evaluate every 10 s until the snooze window ends:
    // nothing may fire before snooze_at + 5 min, and the session itself
    // closes 5 minutes after the last pulse anyway.
    let emitted = evaluate_between(
        &mut engine,
        snooze_at + Duration::seconds(10),
        snooze_at + Duration::minutes(5) - Duration::seconds(1),
    );
    assert!(emitted.is_empty());
}

#[test]
fn scenario_c_inactivity_closes_session_and_silences_engine() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    let start = base() + Duration::minutes(10);
    engine.record_activity(start);
    assert!(engine.stats(start).is_active);

    // 1-second polls; nothing closes before the 5-minute grace.
    let mut now = start;
    let mut closed = None;
    while now < start + Duration::minutes(6) {
        now += Duration::seconds(1);
        if let Some(event) = engine.poll_inactivity(now) {
            closed = Some((now, event));
            break;
        }
    }

    let (closed_at, event) = closed.expect("session closed by poll");
    assert_eq!(closed_at, start + Duration::minutes(5));
    match event {
        Event::SessionClosed { reason, at, .. } => {
            assert_eq!(reason, CloseReason::InactivityGap);
            assert_eq!(at, closed_at);
        }
        other => panic!("expected SessionClosed, got {other:?}"),
    }

    // No active session: evaluation stays silent from here on.
    let emitted = evaluate_between(
        &mut engine,
        closed_at,
        closed_at + Duration::minutes(10),
    );
    assert!(emitted.is_empty());
    assert!(!engine.stats(closed_at).is_active);
}

#[test]
fn scenario_d_max_intensity_caps_strong_tiers() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig {
        max_intensity: IntensityLevel::Moderate,
        ..Default::default()
    });

    let last_pulse = base() + Duration::minutes(95);
    focus_between(&mut engine, base(), last_pulse);

    let suggestion = engine
        .evaluate(last_pulse + Duration::seconds(10))
        .expect("suggestion at 95 minutes");
    assert_eq!(suggestion.intensity, IntensityLevel::Moderate);
    assert_eq!(suggestion.focus_duration_minutes, 95);
}

#[test]
fn scenario_e_cooldown_blocks_suggestions_90_seconds_apart() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    let last_pulse = base() + Duration::minutes(50);
    focus_between(&mut engine, base(), last_pulse);

    let first_at = last_pulse + Duration::seconds(10);
    assert!(engine.evaluate(first_at).is_some());

    // All other conditions hold 90 seconds later; cooldown alone blocks it.
    let second_at = first_at + Duration::seconds(90);
    assert!(engine.evaluate(second_at).is_none());
}

#[test]
fn dismiss_falls_back_to_plain_cooldown() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    let last_pulse = base() + Duration::minutes(40);
    focus_between(&mut engine, base(), last_pulse);

    let first_at = last_pulse + Duration::seconds(10);
    let suggestion = engine.evaluate(first_at).unwrap();
    let event = engine.decide(suggestion.id, SuggestionDecision::Dismiss, first_at);
    assert!(matches!(event, Some(Event::SuggestionDismissed { .. })));

    // Unlike snooze, only the 2-minute cooldown applies. The pause is still
    // under 5 minutes at the probe, so the session is open.
    let again_at = first_at + Duration::minutes(2) + Duration::seconds(10);
    assert!(engine.evaluate(again_at).is_some());
}

#[test]
fn take_break_round_trip_updates_stats() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    let last_pulse = base() + Duration::minutes(40);
    focus_between(&mut engine, base(), last_pulse);

    let at = last_pulse + Duration::seconds(10);
    let before = engine.stats(at);
    let suggestion = engine.evaluate(at).unwrap();
    engine.decide(
        suggestion.id,
        SuggestionDecision::TakeBreak {
            duration_minutes: 10,
        },
        at,
    );

    let after = engine.stats(at);
    assert_eq!(after.duration_minutes, 0);
    assert_eq!(after.breaks_taken, before.breaks_taken + 1);
    assert_eq!(
        engine.active_session().unwrap().total_break_ms,
        10 * 60 * 1000
    );
}

#[test]
fn duplicate_pulses_within_a_millisecond_keep_session_identity() {
    let mut engine = BreakSuggestionEngine::new(EngineConfig::default());

    engine.record_activity(base());
    let id = engine.active_session().unwrap().id;
    engine.record_activity(base());
    engine.record_activity(base());
    assert_eq!(engine.active_session().unwrap().id, id);
}

proptest! {
    /// Below the first threshold no suggestion is ever produced, for any
    /// configuration.
    #[test]
    fn no_suggestion_below_first_threshold(
        threshold in 1u32..=180,
        below in 0i64..180,
    ) {
        prop_assume!(below < i64::from(threshold));
        let mut engine = BreakSuggestionEngine::new(EngineConfig {
            first_break_threshold_minutes: threshold,
            ..Default::default()
        });

        let last_pulse = base() + Duration::minutes(below);
        focus_between(&mut engine, base(), last_pulse);
        prop_assert!(engine.evaluate(last_pulse + Duration::seconds(10)).is_none());
    }

    /// At or past 90 minutes the raw tier is strong; the emitted intensity
    /// equals min(strong, max_intensity).
    #[test]
    fn ninety_minutes_selects_strong_then_caps(
        duration in 90i64..=300,
        max_idx in 0u8..3,
    ) {
        let max = match max_idx {
            0 => IntensityLevel::Gentle,
            1 => IntensityLevel::Moderate,
            _ => IntensityLevel::Strong,
        };
        let tier = hyperfocus_core::suggestion::select_tier(duration, 30).unwrap();
        prop_assert_eq!(tier.intensity(), IntensityLevel::Strong);

        let suggestion = hyperfocus_core::Suggestion::build(
            tier,
            duration,
            max,
            "",
            Utc::now(),
        );
        prop_assert_eq!(suggestion.intensity, IntensityLevel::Strong.min(max));
    }
}
