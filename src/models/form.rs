use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AppError;

pub const DEFAULT_DEADLINES: &str = "5";
pub const DEFAULT_PRODUCTIVITY: &str = "50";

const MAX_DAILY_HOURS: f64 = 24.0;
const DEADLINES_RANGE: (f64, f64) = (1.0, 10.0);
const PRODUCTIVITY_RANGE: (f64, f64) = (10.0, 100.0);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    WorkHours,
    Deadlines,
    SleepHours,
    Productivity,
    WorkType,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::WorkHours,
        FormField::Deadlines,
        FormField::SleepHours,
        FormField::Productivity,
        FormField::WorkType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::WorkHours => "workHours",
            FormField::Deadlines => "deadlines",
            FormField::SleepHours => "sleepHours",
            FormField::Productivity => "productivity",
            FormField::WorkType => "workType",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::WorkHours => "Working hours per day",
            FormField::Deadlines => "Deadlines per week (1-10)",
            FormField::SleepHours => "Sleeping hours per day",
            FormField::Productivity => "Productivity metric (10-100%)",
            FormField::WorkType => "Work type (remote, hybrid, onsite)",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FormField {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "workhours" => Ok(FormField::WorkHours),
            "deadlines" => Ok(FormField::Deadlines),
            "sleephours" => Ok(FormField::SleepHours),
            "productivity" => Ok(FormField::Productivity),
            "worktype" => Ok(FormField::WorkType),
            _ => Err(format!("unknown form field: {}", value.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Remote => "remote",
            WorkType::Hybrid => "hybrid",
            WorkType::Onsite => "onsite",
        }
    }

    /// Category code the prediction model was trained on.
    pub fn code(&self) -> u8 {
        match self {
            WorkType::Remote => 0,
            WorkType::Hybrid => 1,
            WorkType::Onsite => 2,
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "remote" => Ok(WorkType::Remote),
            "1" | "hybrid" => Ok(WorkType::Hybrid),
            "2" | "onsite" => Ok(WorkType::Onsite),
            other => Err(format!("unsupported work type: {other}")),
        }
    }
}

/// Raw, unvalidated form contents as typed by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub work_hours: String,
    pub deadlines: String,
    pub sleep_hours: String,
    pub productivity: String,
    pub work_type: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            work_hours: String::new(),
            deadlines: DEFAULT_DEADLINES.to_string(),
            sleep_hours: String::new(),
            productivity: DEFAULT_PRODUCTIVITY.to_string(),
            work_type: String::new(),
        }
    }
}

impl FormValues {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::WorkHours => &self.work_hours,
            FormField::Deadlines => &self.deadlines,
            FormField::SleepHours => &self.sleep_hours,
            FormField::Productivity => &self.productivity,
            FormField::WorkType => &self.work_type,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::WorkHours => self.work_hours = value,
            FormField::Deadlines => self.deadlines = value,
            FormField::SleepHours => self.sleep_hours = value,
            FormField::Productivity => self.productivity = value,
            FormField::WorkType => self.work_type = value,
        }
    }

    pub fn is_valid(&self) -> bool {
        FormInput::try_from(self).is_ok()
    }
}

/// Validated form input, ready to be turned into a feature vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub work_hours: f64,
    pub deadlines: u8,
    pub sleep_hours: f64,
    pub productivity: u8,
    pub work_type: WorkType,
}

impl TryFrom<&FormValues> for FormInput {
    type Error = AppError;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        let work_hours = parse_hours(FormField::WorkHours, &values.work_hours)?;
        let deadlines = parse_whole(FormField::Deadlines, &values.deadlines, DEADLINES_RANGE)?;
        let sleep_hours = parse_hours(FormField::SleepHours, &values.sleep_hours)?;
        let productivity = parse_whole(
            FormField::Productivity,
            &values.productivity,
            PRODUCTIVITY_RANGE,
        )?;

        let raw_work_type = values.work_type.trim();
        if raw_work_type.is_empty() {
            return Err(required(FormField::WorkType));
        }
        let work_type = WorkType::try_from(raw_work_type)
            .map_err(|message| AppError::field_validation(FormField::WorkType.as_str(), message))?;

        Ok(Self {
            work_hours,
            deadlines,
            sleep_hours,
            productivity,
            work_type,
        })
    }
}

fn required(field: FormField) -> AppError {
    AppError::field_validation(field.as_str(), format!("{field} is required"))
}

fn parse_number(field: FormField, raw: &str) -> Result<f64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(required(field));
    }

    let value: f64 = trimmed.parse().map_err(|_| {
        AppError::field_validation(field.as_str(), format!("{field} must be a number"))
    })?;

    // "NaN" and "inf" parse successfully as f64
    if !value.is_finite() {
        return Err(AppError::field_validation(
            field.as_str(),
            format!("{field} must be a finite number"),
        ));
    }

    Ok(value)
}

fn parse_hours(field: FormField, raw: &str) -> Result<f64, AppError> {
    let value = parse_number(field, raw)?;
    if !(0.0..=MAX_DAILY_HOURS).contains(&value) {
        return Err(AppError::field_validation(
            field.as_str(),
            format!("{field} must be between 0 and 24"),
        ));
    }
    Ok(value)
}

fn parse_whole(field: FormField, raw: &str, (min, max): (f64, f64)) -> Result<u8, AppError> {
    let value = parse_number(field, raw)?;
    if value.fract() != 0.0 {
        return Err(AppError::field_validation(
            field.as_str(),
            format!("{field} must be a whole number"),
        ));
    }
    if !(min..=max).contains(&value) {
        return Err(AppError::field_validation(
            field.as_str(),
            format!("{field} must be between {min} and {max}"),
        ));
    }
    Ok(value as u8)
}

/// Model features in the fixed order
/// `[work_hours, deadlines, sleep_hours, productivity, work_type]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; 5]);

impl FeatureVector {
    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

// Whole numbers go out as JSON integers so the body reads `[8,5,7,50,0]`.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in &self.0 {
            if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
                seq.serialize_element(&(*value as i64))?;
            } else {
                seq.serialize_element(value)?;
            }
        }
        seq.end()
    }
}
