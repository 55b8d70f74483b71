use clap::Args;
use examplan_core::Config;
use std::path::PathBuf;

use super::{build_wizard, print_exams, CmdResult};

#[derive(Args)]
pub struct ExtractArgs {
    /// Exam timetable image (PNG or JPEG)
    #[arg(long)]
    image: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ExtractArgs) -> CmdResult {
    let mut wizard = build_wizard(Config::load_or_default());
    wizard.upload_file(&args.image).await?;

    let exams = wizard.exams().unwrap_or_default();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "exams": exams }))?
        );
    } else {
        print_exams(exams);
    }
    Ok(())
}
