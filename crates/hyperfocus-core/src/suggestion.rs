//! Break suggestion intensity ladder and message text.
//!
//! Intensity selection is a descending first-match over the session
//! duration; the selected intensity is then capped to the configured
//! maximum. `IntensityLevel` derives `Ord` so the cap is literally
//! `selected.min(max)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// How insistent a suggestion's framing is. Ordinal: gentle < moderate < strong.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Gentle,
    Moderate,
    Strong,
}

impl std::fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntensityLevel::Gentle => write!(f, "gentle"),
            IntensityLevel::Moderate => write!(f, "moderate"),
            IntensityLevel::Strong => write!(f, "strong"),
        }
    }
}

impl FromStr for IntensityLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gentle" => Ok(IntensityLevel::Gentle),
            "moderate" => Ok(IntensityLevel::Moderate),
            "strong" => Ok(IntensityLevel::Strong),
            _ => Err(()),
        }
    }
}

/// A row of the escalation table, matched by descending threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdTier {
    /// >= first-break threshold (default 30 min).
    Gentle,
    /// >= 45 min.
    Moderate,
    /// >= 60 min. "Your brain needs care" framing.
    BrainCare,
    /// >= 90 min. Wellbeing framing.
    Wellbeing,
}

impl ThresholdTier {
    /// Raw intensity of this tier, before capping.
    pub fn intensity(self) -> IntensityLevel {
        match self {
            ThresholdTier::Gentle => IntensityLevel::Gentle,
            ThresholdTier::Moderate => IntensityLevel::Moderate,
            ThresholdTier::BrainCare | ThresholdTier::Wellbeing => IntensityLevel::Strong,
        }
    }
}

/// Select the tier for a session duration, or `None` below the first
/// threshold. First match wins, checked from the longest duration down.
///
/// The first-break threshold is a floor for the whole table: no suggestion
/// fires below it even when a fixed tier would otherwise match.
pub fn select_tier(duration_minutes: i64, first_threshold_minutes: u32) -> Option<ThresholdTier> {
    if duration_minutes < i64::from(first_threshold_minutes) {
        return None;
    }
    if duration_minutes >= 90 {
        Some(ThresholdTier::Wellbeing)
    } else if duration_minutes >= 60 {
        Some(ThresholdTier::BrainCare)
    } else if duration_minutes >= 45 {
        Some(ThresholdTier::Moderate)
    } else {
        Some(ThresholdTier::Gentle)
    }
}

/// A break suggestion handed to the presenter.
///
/// Consumed exactly once: the presenter reports back take-break, snooze or
/// dismiss, quoting the `id`, and the suggestion is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub intensity: IntensityLevel,
    /// Session duration at evaluation time, whole minutes.
    pub focus_duration_minutes: i64,
    pub title: String,
    pub message: String,
    pub subtitle: Option<String>,
    pub snooze_label: String,
    pub break_label: String,
    pub created_at: DateTime<Utc>,
}

impl Suggestion {
    /// Build the suggestion for a tier, with intensity capped to `max`.
    ///
    /// `user_name` only personalizes text; an empty name falls back to
    /// neutral phrasing.
    pub fn build(
        tier: ThresholdTier,
        duration_minutes: i64,
        max_intensity: IntensityLevel,
        user_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let name = user_name.trim();
        let (title, message, subtitle) = match tier {
            ThresholdTier::Gentle => (
                "Time for a quick break?".to_string(),
                if name.is_empty() {
                    format!("You've been focused for {duration_minutes} minutes. A short pause keeps the momentum going.")
                } else {
                    format!("{name}, you've been focused for {duration_minutes} minutes. A short pause keeps the momentum going.")
                },
                None,
            ),
            ThresholdTier::Moderate => (
                "You've earned a break".to_string(),
                format!("{duration_minutes} minutes of deep focus. Stretch your legs for a bit?"),
                Some("Your focus will still be here when you get back.".to_string()),
            ),
            ThresholdTier::BrainCare => (
                "Your brain needs some care".to_string(),
                if name.is_empty() {
                    format!("You've been at it for {duration_minutes} minutes straight. Step away for a few minutes.")
                } else {
                    format!("{name}, you've been at it for {duration_minutes} minutes straight. Step away for a few minutes.")
                },
                Some("Even a five minute walk resets your attention.".to_string()),
            ),
            ThresholdTier::Wellbeing => (
                "Please take a real break".to_string(),
                if name.is_empty() {
                    format!("{duration_minutes} minutes without a proper pause. Your wellbeing matters more than this task.")
                } else {
                    format!("{duration_minutes} minutes without a proper pause, {name}. Your wellbeing matters more than this task.")
                },
                Some("Water, daylight, movement. Any of them helps.".to_string()),
            ),
        };

        Self {
            id: Uuid::new_v4(),
            intensity: tier.intensity().min(max_intensity),
            focus_duration_minutes: duration_minutes,
            title,
            message,
            subtitle,
            snooze_label: "In 5 minutes".to_string(),
            break_label: "Take a break".to_string(),
            created_at: now,
        }
    }
}

/// The presenter's verdict on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum SuggestionDecision {
    TakeBreak { duration_minutes: u32 },
    Snooze,
    Dismiss,
}

/// Telemetry discriminator for taken breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Accepted from a suggestion.
    Suggested,
    /// Reported by the host without a pending suggestion.
    Manual,
}
