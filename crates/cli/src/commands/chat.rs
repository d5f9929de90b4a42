//! `docchat chat`: interactive or single-message chat mode.

use docchat_config::AppConfig;
use docchat_core::message::{Message, Sender, SessionId};
use docchat_engine::{ChatEngine, IgnoreReason, TurnOutcome};
use docchat_storage::FileStore;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::repl::{HELP, ReplCommand};
use super::upload;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = Arc::new(FileStore::open(config.storage_path()));
    let engine = ChatEngine::from_config(&config, store);
    engine
        .start()
        .await
        .map_err(|e| format!("Failed to read stored context: {e}"))?;

    let result = match message {
        Some(text) => single(&engine, &text).await,
        None => interactive(&engine, &config).await,
    };
    engine.shutdown();
    result
}

async fn single(engine: &ChatEngine, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(error) = engine.error() {
        return Err(error.into());
    }

    eprint!("  Thinking...");
    let outcome = engine.submit(text).await;
    eprint!("\r              \r");

    match outcome {
        TurnOutcome::Replied(reply) => {
            println!("{}", reply.text);
            Ok(())
        }
        TurnOutcome::Failed { error, .. } => Err(error.into()),
        TurnOutcome::Ignored(reason) => Err(format!("Message not sent: {reason:?}").into()),
        TurnOutcome::Discarded => Err("The session was replaced before a reply arrived".into()),
    }
}

/// Prints transcript entries the user has not seen yet.
#[derive(Default)]
struct Transcript {
    session: Option<SessionId>,
    shown: usize,
}

impl Transcript {
    fn render(&mut self, engine: &ChatEngine) {
        let session = engine.session_id();
        if session.is_some() && session != self.session {
            self.session = session;
            self.shown = 0;
            println!();
        }

        let messages = engine.messages();
        for message in messages.iter().skip(self.shown) {
            print_message(message);
        }
        self.shown = messages.len();
    }
}

fn print_message(message: &Message) {
    match message.sender {
        // The user already sees what they typed.
        Sender::User => {}
        Sender::Bot if message.is_context_notification => {
            println!("  [context] {}", message.text);
            println!();
        }
        Sender::Bot => {
            for line in message.text.lines() {
                println!("  Assistant > {line}");
            }
            println!();
        }
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

async fn interactive(
    engine: &ChatEngine,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          DocChat — Interactive Mode          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", docchat_providers::resolve_model(config));
    println!("  Store:     {}", config.storage_path().display());
    println!();
    println!("  Type your message and press Enter, /help for commands.");

    let mut transcript = Transcript::default();
    transcript.render(engine);
    if let Some(error) = engine.error() {
        eprintln!("  [Error] {error}");
        eprintln!("  Fix the configuration and type /retry.");
        println!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let command = ReplCommand::parse(&line);
        if command.requires_admin() && !engine.is_authorized() {
            eprintln!("  Administrator login required.\n");
            prompt()?;
            continue;
        }

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}\n"),
            ReplCommand::Invalid(text) => eprintln!("  {text}\n"),
            ReplCommand::Login(candidate) => {
                debug!("Login attempt from the REPL");
                if engine.authorize(&candidate) {
                    println!("  Logged in as administrator.");
                } else if let Some(error) = engine.auth_error() {
                    eprintln!("  {error}\n");
                }
            }
            ReplCommand::Logout => {
                engine.deauthorize();
                println!("  Logged out.");
            }
            ReplCommand::Upload(paths) => match upload::read_documents(&paths) {
                Ok(upload) => {
                    if let Err(e) = engine.apply_context(upload.content, upload.names).await {
                        warn!(error = %e, "Upload could not be saved");
                        eprintln!("  [Error] Could not save documents: {e}\n");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Upload rejected");
                    eprintln!("  [Error] {e}\n");
                }
            },
            ReplCommand::Clear => {
                if let Err(e) = engine.clear_context().await {
                    warn!(error = %e, "Context could not be cleared");
                    eprintln!("  [Error] Could not clear documents: {e}\n");
                }
            }
            ReplCommand::Context => match engine.document_context() {
                Some(context) => println!(
                    "  Active documents: {} ({} bytes)\n",
                    context.names_joined(),
                    context.content().len()
                ),
                None => println!("  No document context is active.\n"),
            },
            ReplCommand::Retry => {
                if !engine.retry_session() {
                    if let Some(error) = engine.error() {
                        warn!(error = %error, "Session retry failed");
                        eprintln!("  [Error] {error}\n");
                    }
                }
            }
            ReplCommand::Message(text) => {
                eprint!("  ...");
                let outcome = tokio::select! {
                    outcome = engine.submit(&text) => Some(outcome),
                    _ = tokio::signal::ctrl_c() => None,
                };
                eprint!("\r     \r");

                match outcome {
                    Some(TurnOutcome::Failed { error, .. }) => {
                        warn!(error = %error, "Turn failed");
                        transcript.render(engine);
                        eprintln!("  [Error] {error}\n");
                    }
                    Some(TurnOutcome::Ignored(IgnoreReason::NoSession)) => {
                        eprintln!("  No chat session. Fix the configuration and type /retry.\n");
                    }
                    None => debug!("Turn cancelled from the keyboard"),
                    _ => {}
                }
            }
        }

        transcript.render(engine);
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}
