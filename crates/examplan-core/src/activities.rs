//! Daily activity profile collected in the third wizard step.
//!
//! The profile is a fixed-shape record. Edits go through [`ActivityField`]
//! so an unknown field name or a value of the wrong kind is rejected at the
//! boundary instead of being merged in silently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepWindow {
    pub bedtime: String,
    pub wake_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub does: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meals {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

/// Self-reported habits that shape the generated plan.
///
/// Serialized with camelCase keys; this JSON is embedded verbatim in the
/// generation prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivityProfile {
    pub is_religious_observer: bool,
    pub hobbies: String,
    pub sleep: SleepWindow,
    pub exercise: Exercise,
    pub meals: Meals,
    pub other_commitments: String,
}

/// Editable leaf fields of [`DailyActivityProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityField {
    ReligiousObserver,
    Hobbies,
    Bedtime,
    WakeTime,
    Exercise,
    Breakfast,
    Lunch,
    Dinner,
    OtherCommitments,
}

/// A raw form value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityValue {
    Text(String),
    Flag(bool),
}

impl ActivityField {
    pub const ALL: [ActivityField; 9] = [
        Self::ReligiousObserver,
        Self::Hobbies,
        Self::Bedtime,
        Self::WakeTime,
        Self::Exercise,
        Self::Breakfast,
        Self::Lunch,
        Self::Dinner,
        Self::OtherCommitments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReligiousObserver => "religious-observer",
            Self::Hobbies => "hobbies",
            Self::Bedtime => "bedtime",
            Self::WakeTime => "wake-time",
            Self::Exercise => "exercise",
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::OtherCommitments => "other-commitments",
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Self::ReligiousObserver | Self::Exercise)
    }

    /// Interpret free text typed for this field. Flags accept
    /// `true/false/yes/no/1/0`.
    pub fn parse_value(&self, raw: &str) -> Result<ActivityValue, ValidationError> {
        if !self.is_flag() {
            return Ok(ActivityValue::Text(raw.to_string()));
        }
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(ActivityValue::Flag(true)),
            "false" | "no" | "n" | "0" => Ok(ActivityValue::Flag(false)),
            _ => Err(ValidationError::WrongValueKind {
                field: self.as_str().to_string(),
                expected: "a yes/no flag",
            }),
        }
    }
}

impl fmt::Display for ActivityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

impl DailyActivityProfile {
    /// Merge one field. Text fields take any string, flags take any bool.
    pub fn set_field(
        &mut self,
        field: ActivityField,
        value: ActivityValue,
    ) -> Result<(), ValidationError> {
        match (field, value) {
            (ActivityField::ReligiousObserver, ActivityValue::Flag(v)) => {
                self.is_religious_observer = v
            }
            (ActivityField::Exercise, ActivityValue::Flag(v)) => self.exercise.does = v,
            (ActivityField::Hobbies, ActivityValue::Text(v)) => self.hobbies = v,
            (ActivityField::Bedtime, ActivityValue::Text(v)) => self.sleep.bedtime = v,
            (ActivityField::WakeTime, ActivityValue::Text(v)) => self.sleep.wake_time = v,
            (ActivityField::Breakfast, ActivityValue::Text(v)) => self.meals.breakfast = v,
            (ActivityField::Lunch, ActivityValue::Text(v)) => self.meals.lunch = v,
            (ActivityField::Dinner, ActivityValue::Text(v)) => self.meals.dinner = v,
            (ActivityField::OtherCommitments, ActivityValue::Text(v)) => {
                self.other_commitments = v
            }
            (field, _) => {
                return Err(ValidationError::WrongValueKind {
                    field: field.as_str().to_string(),
                    expected: if field.is_flag() {
                        "a yes/no flag"
                    } else {
                        "text"
                    },
                })
            }
        }
        Ok(())
    }
}
