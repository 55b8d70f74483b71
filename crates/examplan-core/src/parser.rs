//! Decoding of raw model output.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::exam::{ExamEntry, ExamSchedule};

/// One titled block of a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSection {
    pub title: String,
    pub items: Vec<String>,
}

/// Remove a surrounding Markdown code fence, if any.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` openers and a closing
/// ```` ``` ````; surrounding whitespace goes too.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode an extraction response into its exam list.
///
/// # Errors
///
/// Returns [`CoreError::Parse`] if the unfenced text is not JSON or has no
/// `exams` array.
pub fn parse_extraction_response(raw: &str) -> Result<Vec<ExamEntry>> {
    let body = strip_code_fence(raw);
    let schedule: ExamSchedule =
        serde_json::from_str(body).map_err(|e| CoreError::Parse(e.to_string()))?;
    tracing::debug!(exams = schedule.exams.len(), "parsed extraction response");
    Ok(schedule.exams)
}

/// Split a plan into sections at blank lines. The first line of a section is
/// its title; the remaining lines, trimmed, are its items.
pub fn partition_schedule(text: &str) -> Vec<ScheduleSection> {
    let mut sections = Vec::new();
    let mut current: Option<ScheduleSection> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            continue;
        }
        match current.as_mut() {
            Some(section) => section.items.push(line.trim().to_string()),
            None => {
                current = Some(ScheduleSection {
                    title: line.trim().to_string(),
                    items: Vec::new(),
                })
            }
        }
    }
    sections.extend(current);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_fenced_response() {
        let raw = "```json\n{\"exams\":[{\"subject\":\"Calculus\",\"date\":\"Dec 10\",\"time\":\"9am\",\"duration\":\"2h\"}]}\n```";
        let exams = parse_extraction_response(raw).unwrap();
        assert_eq!(
            exams,
            vec![ExamEntry::new("Calculus", "Dec 10", "9am", "2h")]
        );
    }

    #[test]
    fn parses_bare_json_with_whitespace() {
        let raw = "\n  {\"exams\": []}  \n";
        assert!(parse_extraction_response(raw).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_extraction_response("not json").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn rejects_json_without_exams_key() {
        let err = parse_extraction_response(r#"{"schedule": []}"#).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn missing_entry_fields_default_to_empty() {
        let exams = parse_extraction_response(r#"{"exams":[{"subject":"Art"}]}"#).unwrap();
        assert_eq!(exams[0].subject, "Art");
        assert_eq!(exams[0].duration, "");
    }

    #[test]
    fn partitions_sections_on_blank_lines() {
        let sections =
            partition_schedule("Morning\nStudy Math\nStudy Physics\n\nAfternoon\nRest");
        assert_eq!(
            sections,
            vec![
                ScheduleSection {
                    title: "Morning".into(),
                    items: vec!["Study Math".into(), "Study Physics".into()],
                },
                ScheduleSection {
                    title: "Afternoon".into(),
                    items: vec!["Rest".into()],
                },
            ]
        );
    }

    #[test]
    fn title_only_section_has_no_items() {
        let sections = partition_schedule("Evening\n\n\n\nNight\n   - sleep  ");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].items.is_empty());
        assert_eq!(sections[1].items, vec!["- sleep"]);
    }

    #[test]
    fn empty_text_has_no_sections() {
        assert!(partition_schedule("").is_empty());
        assert!(partition_schedule("\n\n").is_empty());
    }

    fn entry() -> impl Strategy<Value = ExamEntry> {
        ("[A-Za-z ]{1,20}", "[A-Za-z0-9 ]{1,10}", "[0-9:apm ]{1,8}", "[0-9hm ]{1,5}")
            .prop_map(|(s, d, t, u)| ExamEntry::new(s, d, t, u))
    }

    proptest! {
        #[test]
        fn fenced_or_padded_payloads_decode_to_the_same_exams(
            exams in proptest::collection::vec(entry(), 0..6),
            fenced in any::<bool>(),
            pad in "[ \n\t]{0,4}",
        ) {
            let json = serde_json::to_string(&ExamSchedule { exams: exams.clone() }).unwrap();
            let raw = if fenced {
                format!("{pad}```json\n{json}\n```{pad}")
            } else {
                format!("{pad}{json}{pad}")
            };
            prop_assert_eq!(parse_extraction_response(&raw).unwrap(), exams);
        }
    }
}
