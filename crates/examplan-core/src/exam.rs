//! Exam records extracted from a schedule image, and the per-subject
//! confidence ratings collected in the review step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// One exam as reported by the model.
///
/// Fields default to empty strings: the extraction prompt tells the model to
/// drop incomplete entries, and nothing is re-checked locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamEntry {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: String,
}

impl ExamEntry {
    pub fn new(
        subject: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            date: date.into(),
            time: time.into(),
            duration: duration.into(),
        }
    }
}

/// Top-level shape of an extraction response: `{"exams": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSchedule {
    pub exams: Vec<ExamEntry>,
}

/// Self-rated mastery of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ConfidenceLevel {
    pub const ALL: [ConfidenceLevel; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::InvalidConfidence(s.to_string())),
        }
    }
}

/// Subject name -> confidence level.
///
/// Keys always mirror the subjects of the current exam list. Serializes as a
/// plain JSON object, e.g. `{"Calculus":"medium"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidenceMap(BTreeMap<String, ConfidenceLevel>);

impl ConfidenceMap {
    /// Every subject on the list starts at `medium`. Duplicate subjects
    /// collapse into one entry.
    pub fn from_exams(exams: &[ExamEntry]) -> Self {
        Self(
            exams
                .iter()
                .map(|exam| (exam.subject.clone(), ConfidenceLevel::default()))
                .collect(),
        )
    }

    pub fn get(&self, subject: &str) -> Option<ConfidenceLevel> {
        self.0.get(subject).copied()
    }

    /// Update an existing subject. Subjects not on the list are rejected so
    /// the keys stay in step with the exams.
    pub fn set(&mut self, subject: &str, level: ConfidenceLevel) -> Result<(), ValidationError> {
        match self.0.get_mut(subject) {
            Some(slot) => {
                *slot = level;
                Ok(())
            }
            None => Err(ValidationError::UnknownSubject(subject.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ConfidenceLevel)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Subjects rated `low`, the ones the plan should prioritise.
    pub fn weakest(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, level)| *level == ConfidenceLevel::Low)
            .map(|(subject, _)| subject)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exams(subjects: &[&str]) -> Vec<ExamEntry> {
        subjects
            .iter()
            .map(|s| ExamEntry::new(*s, "Dec 10", "9am", "2h"))
            .collect()
    }

    #[test]
    fn from_exams_defaults_every_subject_to_medium() {
        let map = ConfidenceMap::from_exams(&exams(&["Calculus", "Physics", "History"]));
        assert_eq!(map.len(), 3);
        assert!(map.iter().all(|(_, level)| level == ConfidenceLevel::Medium));
    }

    #[test]
    fn duplicate_subjects_collapse() {
        let map = ConfidenceMap::from_exams(&exams(&["Calculus", "Calculus"]));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn set_rejects_unknown_subject() {
        let mut map = ConfidenceMap::from_exams(&exams(&["Calculus"]));
        map.set("Calculus", ConfidenceLevel::Low).unwrap();
        assert_eq!(map.get("Calculus"), Some(ConfidenceLevel::Low));
        assert!(matches!(
            map.set("Chemistry", ConfidenceLevel::High),
            Err(ValidationError::UnknownSubject(_))
        ));
        assert_eq!(map.weakest(), vec!["Calculus"]);
    }

    #[test]
    fn confidence_level_parses_case_insensitively() {
        assert_eq!("LOW".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Low);
        assert_eq!(" high ".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::High);
        assert!("very high".parse::<ConfidenceLevel>().is_err());
    }

    #[test]
    fn confidence_map_serializes_as_plain_object() {
        let map = ConfidenceMap::from_exams(&exams(&["Calculus"]));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"Calculus":"medium"}"#);
    }
}
