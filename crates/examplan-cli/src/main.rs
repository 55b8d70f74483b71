use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "examplan", version, about = "Turn an exam timetable photo into a study plan")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract exams from an image and generate a one-day study plan
    Plan(commands::plan::PlanArgs),
    /// Extract the exam list from a timetable image
    Extract(commands::extract::ExtractArgs),
    /// Show prayer time windows for a date
    Observance(commands::observance::ObservanceArgs),
    /// Step through the planning wizard interactively
    Interactive,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args).await,
        Commands::Extract(args) => commands::extract::run(args).await,
        Commands::Observance(args) => commands::observance::run(args),
        Commands::Interactive => commands::interactive::run().await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "examplan", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
