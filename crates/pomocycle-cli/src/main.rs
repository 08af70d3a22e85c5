use clap::{Parser, Subcommand};

mod commands;
mod logging;

use logging::LogFormat;

#[derive(Parser)]
#[command(name = "pomocycle", version, about = "Pomocycle work/break timer")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Human, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session, reading commands from stdin
    Run {
        /// Command to issue as soon as the session is up
        #[arg(long, value_enum)]
        start: Option<commands::session::StartAction>,
        /// Print every transition event as JSON
        #[arg(long)]
        events: bool,
    },
    /// Print the persisted session state as JSON
    Status,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, cli.verbose);

    let result = match cli.command {
        Commands::Run { start, events } => commands::session::run(start, events).await,
        Commands::Status => commands::session::status().await,
        Commands::Config { action } => commands::config::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
