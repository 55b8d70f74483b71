//! Line-based wizard session.

use examplan_core::{ActivityField, ConfidenceLevel, Config, GeminiClient, Wizard, WizardStep};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::{build_wizard, print_exams, print_sections, CmdResult};

const HELP: &str = "\
commands:
  upload PATH                 extract exams from a PNG/JPEG timetable
  next | prev                 move between steps
  confidence SUBJECT LEVEL    rate a subject low/medium/high
  set FIELD VALUE             fill a daily activity field
  show                        print the current step
  save                        save the generated plan
  restart                     start over
  help | quit";

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Upload(PathBuf),
    Next,
    Previous,
    Confidence(String, ConfidenceLevel),
    Set(ActivityField, String),
    Show,
    Save,
    Restart,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<ReplCommand, Box<dyn std::error::Error>> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let cmd = match word.to_ascii_lowercase().as_str() {
        "" => ReplCommand::Empty,
        "upload" if !rest.is_empty() => ReplCommand::Upload(PathBuf::from(rest)),
        "upload" => return Err("usage: upload PATH".into()),
        "next" | "n" => ReplCommand::Next,
        "prev" | "back" | "p" => ReplCommand::Previous,
        "confidence" => {
            // Subjects may contain spaces; the level is the last word.
            let (subject, level) = rest
                .rsplit_once(char::is_whitespace)
                .ok_or("usage: confidence SUBJECT LEVEL")?;
            ReplCommand::Confidence(subject.trim().to_string(), level.parse()?)
        }
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set FIELD VALUE")?;
            ReplCommand::Set(field.parse()?, value.trim().to_string())
        }
        "show" => ReplCommand::Show,
        "save" => ReplCommand::Save,
        "restart" => ReplCommand::Restart,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')").into()),
    };
    Ok(cmd)
}

fn show(wizard: &Wizard<GeminiClient>) {
    let step = wizard.step();
    println!("Step {}/4: {}", step.number(), step.title());
    if let Some(message) = wizard.last_error() {
        println!("  ! {message}");
    }
    match step {
        WizardStep::Upload => println!("  upload a PNG or JPEG of your exam timetable"),
        WizardStep::Review => {
            print_exams(wizard.exams().unwrap_or_default());
            for (subject, level) in wizard.confidence().iter() {
                println!("  confidence {subject}: {level}");
            }
        }
        WizardStep::Activities => {
            let profile = wizard.activities();
            println!("  religious-observer: {}", profile.is_religious_observer);
            println!("  bedtime: {}", profile.sleep.bedtime);
            println!("  wake-time: {}", profile.sleep.wake_time);
            println!("  exercise: {}", profile.exercise.does);
            println!("  breakfast: {}", profile.meals.breakfast);
            println!("  lunch: {}", profile.meals.lunch);
            println!("  dinner: {}", profile.meals.dinner);
            println!("  hobbies: {}", profile.hobbies);
            println!("  other-commitments: {}", profile.other_commitments);
        }
        WizardStep::Generate => print_sections(&wizard.sections()),
    }
}

async fn execute(wizard: &mut Wizard<GeminiClient>, cmd: ReplCommand) -> CmdResult {
    match cmd {
        ReplCommand::Upload(path) => {
            wizard.upload_file(&path).await?;
            show(wizard);
        }
        ReplCommand::Next => {
            wizard.next().await?;
            show(wizard);
        }
        ReplCommand::Previous => {
            wizard.previous();
            show(wizard);
        }
        ReplCommand::Confidence(subject, level) => wizard.set_confidence(&subject, level)?,
        ReplCommand::Set(field, raw) => {
            let value = field.parse_value(&raw)?;
            wizard.set_activity_field(field, value)?;
        }
        ReplCommand::Show => {
            if wizard.step() == WizardStep::Generate {
                wizard.ensure_schedule().await?;
            }
            show(wizard);
        }
        ReplCommand::Save => println!("{}", wizard.save_schedule()),
        ReplCommand::Restart => {
            wizard.restart();
            show(wizard);
        }
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Quit | ReplCommand::Empty => {}
    }
    Ok(())
}

pub async fn run() -> CmdResult {
    let mut wizard = build_wizard(Config::load_or_default());
    show(&wizard);
    println!("type 'help' for commands");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("[{}] > ", wizard.step().number());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let cmd = match parse_line(&line) {
            Ok(ReplCommand::Quit) => break,
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };
        if let Err(e) = execute(&mut wizard, cmd).await {
            eprintln!("error: {e}");
        }
    }
    Ok(())
}
