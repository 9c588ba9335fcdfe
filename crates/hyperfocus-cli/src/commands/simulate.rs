//! Deterministic engine simulation.
//!
//! Replays an activity trace through the engine with a virtual clock,
//! stepping one second at a time: every second runs the inactivity poll,
//! every tenth second runs the evaluation tick, exactly like the hosted
//! runtime but without waiting on real timers. Emitted events are printed
//! as JSON lines.

use chrono::{Duration, TimeZone, Utc};
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

use hyperfocus_core::{
    BreakSuggestionEngine, EngineConfig, Event, HostSignal, SuggestionDecision,
};

#[derive(Args)]
pub struct SimulateArgs {
    /// Simulated wall time in minutes
    #[arg(long, default_value_t = 100)]
    pub minutes: u32,

    /// Seconds between synthetic input pulses while active
    #[arg(long, default_value_t = 5)]
    pub pulse_secs: u32,

    /// Idle tail of each 2-minute activity cycle, in seconds. Must be long
    /// enough (>= 18) for a 10-second evaluation tick to land inside the
    /// natural-pause window.
    #[arg(long, default_value_t = 20)]
    pub pause_secs: u32,

    /// Decision applied to every suggestion: ignore, snooze, dismiss or take:<minutes>
    #[arg(long, default_value = "ignore")]
    pub decision: String,

    /// Replay a JSON trace file (array of {at_secs, signal, ...}) instead of
    /// the synthetic pattern
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Override the configured first-break threshold
    #[arg(long)]
    pub first_threshold: Option<u32>,

    /// Override the configured maximum intensity (gentle, moderate, strong)
    #[arg(long)]
    pub max_intensity: Option<String>,
}

/// One step of a replayed trace.
#[derive(Debug, Clone, Deserialize)]
struct TraceStep {
    /// Offset from the start of the simulation, in seconds.
    at_secs: i64,
    #[serde(flatten)]
    signal: HostSignal,
}

enum DecisionPolicy {
    Ignore,
    Snooze,
    Dismiss,
    Take(u32),
}

impl DecisionPolicy {
    fn parse(text: &str) -> Result<Self, String> {
        match text {
            "ignore" => Ok(DecisionPolicy::Ignore),
            "snooze" => Ok(DecisionPolicy::Snooze),
            "dismiss" => Ok(DecisionPolicy::Dismiss),
            other => match other.strip_prefix("take:") {
                Some(minutes) => minutes
                    .parse()
                    .map(DecisionPolicy::Take)
                    .map_err(|_| format!("invalid break duration in '{other}'")),
                None => Err(format!(
                    "invalid decision '{other}' (expected ignore, snooze, dismiss or take:<minutes>)"
                )),
            },
        }
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EngineConfig::load();
    if let Some(threshold) = args.first_threshold {
        config.first_break_threshold_minutes = threshold;
    }
    if let Some(ref text) = args.max_intensity {
        config.max_intensity = text
            .parse()
            .map_err(|_| format!("invalid intensity '{text}'"))?;
    }
    let policy = DecisionPolicy::parse(&args.decision)?;

    let steps = match &args.trace {
        Some(path) => load_trace(path)?,
        None => synthetic_trace(&args),
    };
    let total_secs = steps
        .last()
        .map(|step| step.at_secs)
        .unwrap_or(0)
        .max(i64::from(args.minutes) * 60);

    let base = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let mut engine = BreakSuggestionEngine::new(config);
    let mut steps = steps.into_iter().peekable();

    for t in 0..=total_secs {
        let now = base + Duration::seconds(t);

        while steps.peek().map(|step| step.at_secs <= t).unwrap_or(false) {
            let step = steps.next().unwrap();
            let event = match step.signal {
                HostSignal::Activity { .. } => engine.record_activity(now),
                HostSignal::WindowFocus => engine.window_focus(now),
                HostSignal::WindowBlur => engine.window_blur(now),
            };
            print_event(event.as_ref())?;
        }

        print_event(engine.poll_inactivity(now).as_ref())?;

        if t % 10 == 0 {
            if let Some(suggestion) = engine.evaluate(now) {
                print_event(Some(&Event::BreakSuggested {
                    suggestion_id: suggestion.id,
                    intensity: suggestion.intensity,
                    focus_duration_minutes: suggestion.focus_duration_minutes,
                    at: now,
                }))?;
                let decision = match policy {
                    DecisionPolicy::Ignore => None,
                    DecisionPolicy::Snooze => Some(SuggestionDecision::Snooze),
                    DecisionPolicy::Dismiss => Some(SuggestionDecision::Dismiss),
                    DecisionPolicy::Take(duration_minutes) => {
                        Some(SuggestionDecision::TakeBreak { duration_minutes })
                    }
                };
                if let Some(decision) = decision {
                    print_event(engine.decide(suggestion.id, decision, now).as_ref())?;
                }
            }
        }
    }

    let end = base + Duration::seconds(total_secs);
    print_event(Some(&engine.stats_snapshot(end)))?;
    Ok(())
}

fn print_event(event: Option<&Event>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = event {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn load_trace(path: &PathBuf) -> Result<Vec<TraceStep>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let mut steps: Vec<TraceStep> = serde_json::from_str(&text)?;
    steps.sort_by_key(|step| step.at_secs);
    Ok(steps)
}

/// Keystroke pulses on a 2-minute cycle with an idle tail, so evaluation
/// ticks regularly land inside the natural-pause window.
fn synthetic_trace(args: &SimulateArgs) -> Vec<TraceStep> {
    const CYCLE_SECS: i64 = 120;
    let pulse = i64::from(args.pulse_secs.max(1));
    let pause = i64::from(args.pause_secs).clamp(0, CYCLE_SECS - 1);
    let total = i64::from(args.minutes) * 60;

    let mut steps = Vec::new();
    for t in 0..total {
        if t % CYCLE_SECS < CYCLE_SECS - pause && t % pulse == 0 {
            steps.push(TraceStep {
                at_secs: t,
                signal: HostSignal::Activity {
                    kind: hyperfocus_core::ActivityKind::Keystroke,
                },
            });
        }
    }
    steps
}
