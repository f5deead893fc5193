use std::fmt::Write as _;

use crate::commands::prediction::PredictionOutcome;
use crate::commands::CommandError;
use crate::models::form::FormField;
use crate::models::prediction::HealthStatus;
use crate::services::form_service::FormSnapshot;
use crate::services::presenter::StressPresentation;

pub const GAUGE_WIDTH: usize = 20;

pub fn render_gauge(fill: f64, width: usize) -> String {
    let filled = ((fill.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn render_presentation(presentation: &StressPresentation) -> String {
    format!(
        "Stress level: {:.1} / 10 {} {} {}\n{}\n",
        presentation.score,
        presentation.mood,
        render_gauge(presentation.gauge_fill, GAUGE_WIDTH),
        presentation.tier.as_str().to_uppercase(),
        presentation.message
    )
}

pub fn render_outcome(outcome: &PredictionOutcome) -> String {
    render_presentation(&outcome.presentation)
}

pub fn render_error(error: &CommandError) -> String {
    error_line(&error.message)
}

fn error_line(message: &str) -> String {
    format!("Error: {message}\n")
}

pub fn render_form(snapshot: &FormSnapshot) -> String {
    let mut out = String::new();
    for field in FormField::ALL {
        let value = snapshot.values.get(field);
        let shown = if value.is_empty() { "<empty>" } else { value };
        let _ = writeln!(out, "  {:<14} {:<34} {}", field.as_str(), field.label(), shown);
    }

    let state = if snapshot.is_loading {
        "predicting"
    } else if snapshot.is_valid {
        "ready to submit"
    } else {
        "incomplete"
    };
    let _ = writeln!(out, "  status: {state}");

    if let Some(presentation) = &snapshot.presentation {
        out.push_str(&render_presentation(presentation));
    }
    if let Some(error) = &snapshot.error {
        out.push_str(&error_line(&error.message));
    }
    out
}

pub fn render_health(status: &HealthStatus) -> String {
    format!(
        "Service status: {} (model loaded: {}, scaler loaded: {})\n",
        status.status,
        yes_no(status.model_loaded),
        yes_no(status.scaler_loaded)
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
