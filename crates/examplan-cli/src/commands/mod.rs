pub mod config;
pub mod extract;
pub mod interactive;
pub mod observance;
pub mod plan;

use examplan_core::{Config, ExamEntry, GeminiClient, ScheduleSection, Wizard};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Wizard wired to the configured model and observance settings.
pub fn build_wizard(config: Config) -> Wizard<GeminiClient> {
    Wizard::new(GeminiClient::new(config.model), config.observance)
        .with_upload_limit(config.upload.max_bytes)
}

pub fn print_exams(exams: &[ExamEntry]) {
    if exams.is_empty() {
        println!("no exams found");
        return;
    }
    for exam in exams {
        println!(
            "{:<24} {:<12} {:<10} {}",
            exam.subject, exam.date, exam.time, exam.duration
        );
    }
}

pub fn print_sections(sections: &[ScheduleSection]) {
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", section.title);
        for item in &section.items {
            println!("  - {item}");
        }
    }
}
