use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "replan-cli", version, about = "Replan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one candidate slot against a day's events
    Check(commands::check::CheckArgs),
    /// Find the next unrestricted slot of a given duration
    Slot(commands::slot::SlotArgs),
    /// Run the batch scheduler over a set of planned tasks
    Plan(commands::plan::PlanArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Slot(args) => commands::slot::run(args),
        Commands::Plan(args) => commands::plan::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
