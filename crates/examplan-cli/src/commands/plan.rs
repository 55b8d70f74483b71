use chrono::NaiveDate;
use clap::Args;
use examplan_core::{ActivityField, ActivityValue, ConfidenceLevel, Config};
use std::path::PathBuf;

use super::{build_wizard, print_exams, print_sections, CmdResult};

#[derive(Args)]
pub struct PlanArgs {
    /// Exam timetable image (PNG or JPEG)
    #[arg(long)]
    image: PathBuf,
    /// Confidence for a subject, e.g. "Calculus=low" (repeatable)
    #[arg(long = "confidence", value_name = "SUBJECT=LEVEL")]
    confidence: Vec<String>,
    /// Reserve daily prayer windows in the plan
    #[arg(long)]
    religious_observer: bool,
    #[arg(long, value_name = "HH:MM")]
    bedtime: Option<String>,
    #[arg(long, value_name = "HH:MM")]
    wake_time: Option<String>,
    /// Include exercise in the day
    #[arg(long)]
    exercise: bool,
    #[arg(long, value_name = "TIME")]
    breakfast: Option<String>,
    #[arg(long, value_name = "TIME")]
    lunch: Option<String>,
    #[arg(long, value_name = "TIME")]
    dinner: Option<String>,
    #[arg(long)]
    hobbies: Option<String>,
    /// Work, classes or other fixed commitments
    #[arg(long)]
    commitments: Option<String>,
    /// Date used for prayer windows (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl PlanArgs {
    fn activity_values(&self) -> Vec<(ActivityField, ActivityValue)> {
        let mut values = vec![
            (
                ActivityField::ReligiousObserver,
                ActivityValue::Flag(self.religious_observer),
            ),
            (ActivityField::Exercise, ActivityValue::Flag(self.exercise)),
        ];
        let texts = [
            (ActivityField::Bedtime, &self.bedtime),
            (ActivityField::WakeTime, &self.wake_time),
            (ActivityField::Breakfast, &self.breakfast),
            (ActivityField::Lunch, &self.lunch),
            (ActivityField::Dinner, &self.dinner),
            (ActivityField::Hobbies, &self.hobbies),
            (ActivityField::OtherCommitments, &self.commitments),
        ];
        for (field, text) in texts {
            if let Some(text) = text {
                values.push((field, ActivityValue::Text(text.clone())));
            }
        }
        values
    }
}

fn parse_confidence(raw: &str) -> Result<(&str, ConfidenceLevel), Box<dyn std::error::Error>> {
    let (subject, level) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected SUBJECT=LEVEL, got '{raw}'"))?;
    Ok((subject.trim(), level.trim().parse()?))
}

pub async fn run(args: PlanArgs) -> CmdResult {
    let mut wizard = build_wizard(Config::load_or_default());
    if let Some(date) = args.date {
        wizard = wizard.with_plan_date(date);
    }

    wizard.upload_file(&args.image).await?;
    for raw in &args.confidence {
        let (subject, level) = parse_confidence(raw)?;
        wizard.set_confidence(subject, level)?;
    }

    wizard.next().await?;
    for (field, value) in args.activity_values() {
        wizard.set_activity_field(field, value)?;
    }
    wizard.next().await?;

    let sections = wizard.sections();
    if args.json {
        let output = serde_json::json!({
            "exams": wizard.exams(),
            "confidence": wizard.confidence(),
            "activities": wizard.activities(),
            "schedule": wizard.schedule(),
            "sections": sections,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_exams(wizard.exams().unwrap_or_default());
        println!();
        print_sections(&sections);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_pairs_split_on_last_equals() {
        let (subject, level) = parse_confidence("Linear Algebra = High").unwrap();
        assert_eq!(subject, "Linear Algebra");
        assert_eq!(level, ConfidenceLevel::High);
        assert!(parse_confidence("Calculus").is_err());
        assert!(parse_confidence("Calculus=unsure").is_err());
    }
}
