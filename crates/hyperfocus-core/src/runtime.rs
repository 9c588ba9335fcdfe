//! Hosted engine runtime.
//!
//! One tokio task per user owns a [`BreakSuggestionEngine`] exclusively and
//! drives it with two periodic processes: the 1-second inactivity poll and
//! the 10-second evaluation tick. Host signals and presenter decisions
//! arrive on channels and are applied inside the same task, so state is
//! never shared mutably and no locks exist.
//!
//! Ticks use `MissedTickBehavior::Delay`: an evaluation always completes
//! before the next tick of the same kind is scheduled.

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use uuid::Uuid;

use crate::activity::{ActivityEventSource, HostSignal};
use crate::config::{policy, EngineConfig};
use crate::engine::{BreakSuggestionEngine, EngineStats};
use crate::events::Event;
use crate::suggestion::{Suggestion, SuggestionDecision};

#[derive(Debug)]
enum Command {
    Decision {
        suggestion_id: Uuid,
        decision: SuggestionDecision,
    },
    ManualBreak {
        duration_minutes: u32,
    },
    Shutdown,
}

/// Either output stream of a running engine, merged.
#[derive(Debug)]
pub enum EngineOutput {
    Event(Event),
    Suggestion(Suggestion),
}

/// Cloneable command surface of a running engine.
///
/// Lets a host feed decisions from one task while another consumes the
/// output streams through the [`EngineHandle`].
#[derive(Clone)]
pub struct EngineClient {
    commands: mpsc::UnboundedSender<Command>,
}

impl EngineClient {
    /// Report the presenter's decision on a suggestion. Late or duplicate
    /// decisions are no-ops.
    pub fn decide(&self, suggestion_id: Uuid, decision: SuggestionDecision) {
        let _ = self.commands.send(Command::Decision {
            suggestion_id,
            decision,
        });
    }

    /// Report a break the user took without a suggestion.
    pub fn record_manual_break(&self, duration_minutes: u32) {
        let _ = self
            .commands
            .send(Command::ManualBreak { duration_minutes });
    }

    /// Ask the engine task to stop. Does not wait for it.
    pub fn stop(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

/// Handle to a spawned engine task.
///
/// Dropping the handle (or calling [`shutdown`](EngineHandle::shutdown))
/// stops both periodic processes and invalidates any in-flight suggestion;
/// decisions sent afterwards are silently dropped.
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<Event>,
    suggestions: mpsc::UnboundedReceiver<Suggestion>,
    stats: watch::Receiver<EngineStats>,
    join: JoinHandle<()>,
}

impl EngineHandle {
    /// Cloneable command surface for use from other tasks.
    pub fn client(&self) -> EngineClient {
        EngineClient {
            commands: self.commands.clone(),
        }
    }

    /// Report the presenter's decision on a suggestion. Late or duplicate
    /// decisions are no-ops.
    pub fn decide(&self, suggestion_id: Uuid, decision: SuggestionDecision) {
        let _ = self.commands.send(Command::Decision {
            suggestion_id,
            decision,
        });
    }

    /// Report a break the user took without a suggestion.
    pub fn record_manual_break(&self, duration_minutes: u32) {
        let _ = self
            .commands
            .send(Command::ManualBreak { duration_minutes });
    }

    /// Next engine event. `None` once the task has shut down.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Next suggestion for the presenter. `None` once the task has shut down.
    pub async fn next_suggestion(&mut self) -> Option<Suggestion> {
        self.suggestions.recv().await
    }

    /// Next output from either stream, for hosts that consume both in one
    /// loop. `None` once the task has shut down.
    pub async fn next(&mut self) -> Option<EngineOutput> {
        tokio::select! {
            event = self.events.recv() => event.map(EngineOutput::Event),
            suggestion = self.suggestions.recv() => suggestion.map(EngineOutput::Suggestion),
        }
    }

    /// Latest stats snapshot, refreshed by the inactivity poll.
    pub fn stats(&self) -> EngineStats {
        *self.stats.borrow()
    }

    /// Stop the engine task and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        let _ = self.join.await;
    }
}

/// Spawn the engine task for one user.
///
/// The source is subscribed exactly once; if it closes its stream, the
/// runtime treats that as teardown.
pub fn spawn(config: EngineConfig, source: &mut dyn ActivityEventSource) -> EngineHandle {
    let signals = source.subscribe();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (suggestion_tx, suggestion_rx) = mpsc::unbounded_channel();
    let (stats_tx, stats_rx) = watch::channel(EngineStats::default());

    let engine = BreakSuggestionEngine::new(config);
    let join = tokio::spawn(run_loop(
        engine,
        signals,
        command_rx,
        event_tx,
        suggestion_tx,
        stats_tx,
    ));

    EngineHandle {
        commands: command_tx,
        events: event_rx,
        suggestions: suggestion_rx,
        stats: stats_rx,
        join,
    }
}

async fn run_loop(
    mut engine: BreakSuggestionEngine,
    mut signals: mpsc::UnboundedReceiver<HostSignal>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<Event>,
    suggestions: mpsc::UnboundedSender<Suggestion>,
    stats: watch::Sender<EngineStats>,
) {
    let mut poll = interval(Duration::from_secs(policy::INACTIVITY_POLL_SECS));
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut eval = interval(Duration::from_secs(policy::EVALUATION_TICK_SECS));
    eval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let now = Utc::now();
                if let Some(event) = engine.poll_inactivity(now) {
                    let _ = events.send(event);
                }
                let _ = stats.send(engine.stats(now));
            }
            _ = eval.tick() => {
                let now = Utc::now();
                if let Some(suggestion) = engine.evaluate(now) {
                    let _ = events.send(Event::BreakSuggested {
                        suggestion_id: suggestion.id,
                        intensity: suggestion.intensity,
                        focus_duration_minutes: suggestion.focus_duration_minutes,
                        at: now,
                    });
                    let _ = suggestions.send(suggestion);
                }
            }
            signal = signals.recv() => {
                let now = Utc::now();
                let event = match signal {
                    Some(HostSignal::Activity { .. }) => engine.record_activity(now),
                    Some(HostSignal::WindowFocus) => engine.window_focus(now),
                    Some(HostSignal::WindowBlur) => engine.window_blur(now),
                    // Listener detached by the host: tear down.
                    None => break,
                };
                if let Some(event) = event {
                    let _ = events.send(event);
                }
            }
            command = commands.recv() => {
                let now = Utc::now();
                let event = match command {
                    Some(Command::Decision { suggestion_id, decision }) => {
                        engine.decide(suggestion_id, decision, now)
                    }
                    Some(Command::ManualBreak { duration_minutes }) => {
                        engine.record_manual_break(now, duration_minutes)
                    }
                    Some(Command::Shutdown) | None => break,
                };
                if let Some(event) = event {
                    let _ = events.send(event);
                }
            }
        }
    }
}
