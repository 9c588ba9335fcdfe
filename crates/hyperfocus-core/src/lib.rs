//! # Hyperfocus Core Library
//!
//! This library implements the hyperfocus-protection engine: a background
//! process that observes user activity, maintains a continuous focus
//! session, and decides when to surface a break suggestion without
//! interrupting active work.
//!
//! ## Architecture
//!
//! - **Activity monitor**: a passive recorder translating raw input events
//!   into a single "last active" timestamp
//! - **Session tracker**: a two-state machine (Idle / Active) owning at most
//!   one open focus session
//! - **Suggestion engine**: a tick-driven evaluator applying the natural
//!   pause window, snooze and cooldown gates, and the escalation ladder
//! - **Runtime**: one tokio task per user driving the engine with a
//!   1-second inactivity poll and a 10-second evaluation tick
//!
//! The engine core is wall-clock-free: every operation takes `now`
//! explicitly, so tests step time deterministically instead of waiting on
//! real timers. Presentation of suggestions is the host's concern; the
//! engine only emits [`Suggestion`] payloads and [`Event`]s.
//!
//! ## Key Components
//!
//! - [`BreakSuggestionEngine`]: the decision state machine
//! - [`FocusSessionTracker`]: session lifecycle
//! - [`ActivityMonitor`]: activity recording
//! - [`EngineConfig`]: user-tunable thresholds, TOML-backed
//! - [`runtime::spawn`]: hosted per-user engine task

pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod runtime;
pub mod session;
pub mod suggestion;

pub use activity::{
    ActivityEventSource, ActivityKind, ActivityMonitor, HostSignal, ScriptedEventSource,
};
pub use config::{policy, EngineConfig};
pub use engine::{BreakSuggestionEngine, EngineStats};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use runtime::{spawn, EngineClient, EngineHandle, EngineOutput};
pub use session::{CloseReason, FocusSession, FocusSessionTracker};
pub use suggestion::{BreakKind, IntensityLevel, Suggestion, SuggestionDecision, ThresholdTier};
