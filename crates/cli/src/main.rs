//! DocChat CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive chat or single-message mode (default)
//! - `onboard`: Write the default config
//! - `status`: Show configuration and stored context
//! - `doctor`: Diagnose configuration and storage health
//! - `context`: Inspect or clear the stored document context

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "docchat",
    about = "DocChat — chat with an LLM grounded in your own documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Initialize configuration
    Onboard,

    /// Show configuration and stored context
    Status,

    /// Diagnose system health
    Doctor,

    /// Manage the stored document context
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
}

#[derive(Subcommand)]
enum ContextAction {
    /// Print the stored document names and size
    Show,
    /// Delete the stored document context
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Chat { message: None }) {
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Context { action } => match action {
            ContextAction::Show => commands::context::show().await?,
            ContextAction::Clear => commands::context::clear().await?,
        },
    }

    Ok(())
}
