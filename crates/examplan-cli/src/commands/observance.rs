use chrono::{Local, NaiveDate};
use clap::Args;
use examplan_core::{Config, PrayerTimes};

use super::CmdResult;

#[derive(Args)]
pub struct ObservanceArgs {
    /// Date to compute (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ObservanceArgs) -> CmdResult {
    let config = Config::load_or_default().observance;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let times = PrayerTimes::compute(date, &config);
    let windows = times.windows(config.window_minutes);

    if args.json {
        let output = serde_json::json!({ "times": times, "windows": windows });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Prayer windows for {date} ({:.4}, {:.4})", config.latitude, config.longitude);
    if windows.is_empty() {
        println!("  none: the sun never reaches the required angles");
    }
    for window in &windows {
        println!(
            "  {:<8} {}-{}",
            window.prayer.to_string(),
            window.start.format("%H:%M"),
            window.end.format("%H:%M")
        );
    }
    if let Some(sunrise) = times.sunrise {
        println!("  sunrise  {}", sunrise.format("%H:%M"));
    }
    Ok(())
}
