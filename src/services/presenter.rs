use std::fmt;

use serde::{Deserialize, Serialize};

/// Score the gauge treats as full.
pub const GAUGE_MAX_SCORE: f64 = 10.0;

// Highest threshold first; a score equal to a threshold takes that bucket.
const ADVISORY_LADDER: [(f64, &str); 9] = [
    (9.5, "Take a long vacation ASAP, bro!"),
    (9.0, "You desperately need a holiday!"),
    (8.0, "Bunk a few days and recharge!"),
    (7.0, "High stress alert! Time to slow down."),
    (6.0, "Stress is building up. Take breaks!"),
    (5.0, "Moderate stress. Stay mindful."),
    (4.0, "Slight stress. You're doing okay!"),
    (3.0, "Low stress. Keep it up!"),
    (2.0, "Very relaxed! Great balance!"),
];

const ZEN_MESSAGE: &str = "🌟 Zen mode activated! Perfect harmony!";

// Face shown beside the score, on its own coarser ladder.
const MOOD_LADDER: [(f64, &str); 3] = [(8.0, "😰"), (6.0, "😟"), (4.0, "😐")];

const CALM_MOOD: &str = "😊";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StressTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl StressTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            StressTier::Critical
        } else if score >= 7.0 {
            StressTier::High
        } else if score >= 4.0 {
            StressTier::Moderate
        } else {
            StressTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressTier::Low => "low",
            StressTier::Moderate => "moderate",
            StressTier::High => "high",
            StressTier::Critical => "critical",
        }
    }

    pub fn style(&self) -> TierStyle {
        match self {
            StressTier::Critical => TierStyle {
                gradient_from: "#fecaca",
                gradient_to: "#dc2626",
                foreground: "white",
            },
            StressTier::High => TierStyle {
                gradient_from: "#fee2e2",
                gradient_to: "#fecaca",
                foreground: "#991b1b",
            },
            StressTier::Moderate => TierStyle {
                gradient_from: "#fef3c7",
                gradient_to: "#fde68a",
                foreground: "#92400e",
            },
            StressTier::Low => TierStyle {
                gradient_from: "#d1fae5",
                gradient_to: "#a7f3d0",
                foreground: "#065f46",
            },
        }
    }
}

impl fmt::Display for StressTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierStyle {
    pub gradient_from: &'static str,
    pub gradient_to: &'static str,
    pub foreground: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StressPresentation {
    pub score: f64,
    pub message: &'static str,
    pub mood: &'static str,
    pub tier: StressTier,
    pub style: TierStyle,
    pub gauge_fill: f64,
}

pub fn advisory_message(score: f64) -> &'static str {
    ADVISORY_LADDER
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, message)| *message)
        .unwrap_or(ZEN_MESSAGE)
}

pub fn mood_indicator(score: f64) -> &'static str {
    MOOD_LADDER
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, mood)| *mood)
        .unwrap_or(CALM_MOOD)
}

/// Fraction of the gauge to fill. Clamped for drawing only.
pub fn gauge_fill(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    (score / GAUGE_MAX_SCORE).clamp(0.0, 1.0)
}

pub fn present(score: f64) -> StressPresentation {
    let tier = StressTier::from_score(score);
    StressPresentation {
        score,
        message: advisory_message(score),
        mood: mood_indicator(score),
        tier,
        style: tier.style(),
        gauge_fill: gauge_fill(score),
    }
}
