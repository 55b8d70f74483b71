//! Prompt text sent to the model.

use crate::activities::DailyActivityProfile;
use crate::exam::ConfidenceMap;

const EXTRACTION_PROMPT: &str = indoc::indoc! {r#"
    Extract the following information from this exam schedule image
    - Exam subject(s)
    - Date of each exam
    - Time of each exam
    - Duration of each exam

    Respond in a strict JSON format:
    {
      "exams": [
        {
          "subject": "",
          "date": "",
          "time": "",
          "duration": ""
        }
      ]
    }

    If an exam doesn't have each of these components don't put it in to array.
"#};

/// Fixed instruction sent alongside the schedule image.
pub fn extraction_prompt() -> &'static str {
    EXTRACTION_PROMPT
}

/// Build the plan request from everything collected in steps 2 and 3.
///
/// `observance_times` is always interpolated; the flag beside it tells the
/// model whether to use it.
pub fn generation_prompt(
    confidence: &ConfidenceMap,
    activities: &DailyActivityProfile,
    observance_times: &str,
) -> String {
    // Both types serialize infallibly (string keys, plain fields).
    let confidence_json = serde_json::to_string(confidence).unwrap_or_else(|_| "{}".into());
    let activities_json = serde_json::to_string(activities).unwrap_or_else(|_| "{}".into());

    format!(
        "Generate a highly personalized study schedule based on the following details. \
         Confidence levels for each course: {confidence_json} \
         Daily activities: {activities_json} \
         Include time for prayer if the student is a religious observer. \
         Religious observer: {observer}. \
         Prayer time windows: {observance_times}. \
         Study schedule guidelines: \
         1. Prioritize subjects with low confidence \
         2. Respect daily commitments and sleep schedule \
         3. Include breaks and buffer time \
         4. Optimize study sessions based on personal activities \
         5. Provide a structured daily plan leading up to exams \
         6. Use effective study scheduling practices from research \
         7. Talk briefly about a study method for the respective subject, in brackets beside the item in the schedule. \
         Put it in easy to read text format, with blank lines between sections and each section starting with its title line, \
         and return just the schedule for a single day. Without a title or footnotes.",
        observer = activities.is_religious_observer,
    )
}
