use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "foreplan-cli", version, about = "Foreplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Risk evaluation
    Evaluate {
        #[command(subcommand)]
        action: commands::evaluate::EvaluateAction,
    },
    /// Adaptive metric weights
    Weights {
        #[command(subcommand)]
        action: commands::weights::WeightsAction,
    },
    /// Authentication management for integrations
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Project { action } => commands::project::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Evaluate { action } => commands::evaluate::run(action),
        Commands::Weights { action } => commands::weights::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
