//! Terminal front end for colloquy.
//!
//! Reads intents from stdin, applies them through the session controller,
//! and prints the result. Replies are awaited on spawned tasks so input
//! keeps flowing while the responder works.

mod command;
mod config;
mod render;

use colloquy_ai::CannedResponder;
use colloquy_conversation::{ConversationStore, FileStorage};
use colloquy_session::{EXAMPLE_PROMPTS, SessionController};
use command::{Command, HELP};
use config::CliConfig;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type Controller = SessionController<FileStorage, CannedResponder>;

#[tokio::main]
async fn main() {
    let config = CliConfig::from_env().expect("failed to load configuration");

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage =
        FileStorage::open(&config.data_dir).expect("failed to open conversation storage");
    tracing::info!(data_dir = %config.data_dir.display(), "opened conversation storage");

    let responder = CannedResponder::new(&config.responder.canned());
    let controller = Arc::new(
        SessionController::new(ConversationStore::new(storage), responder)
            .with_reply_timeout(config.responder.timeout()),
    );

    greet(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };

        if !handle(&controller, Command::parse(&line)).await {
            break;
        }
    }

    let pending = controller.pending_replies();
    if pending > 0 {
        tracing::info!(pending, "exiting with replies still outstanding");
    }
}

fn greet(controller: &Controller) {
    let snapshot = controller.snapshot();
    match snapshot.active() {
        Some(conversation) => print!("{}", render::conversation(conversation, false)),
        None => {
            println!("How can I help you today?");
            print!("{}", render::examples(EXAMPLE_PROMPTS));
        }
    }
    println!("Type /help for commands.");
}

/// Applies one command. Returns false when the user asked to quit.
async fn handle(controller: &Arc<Controller>, command: Command) -> bool {
    match command {
        Command::Send(text) => {
            let fresh = controller.snapshot().active_id.is_none();
            spawn_exchange(controller, text, fresh);
        }
        Command::New(Some(seed)) => spawn_exchange(controller, seed, true),
        Command::New(None) => {
            let snapshot = controller.new_conversation(None).await;
            show_active(controller, &snapshot);
        }
        Command::List => {
            let snapshot = controller.snapshot();
            print!("{}", render::list(&snapshot, |id| controller.is_loading(id)));
        }
        Command::Select(target) => {
            if let Some(id) = resolve(controller, &target) {
                let snapshot = controller.select_conversation(&id);
                show_active(controller, &snapshot);
            }
        }
        Command::Rename { target, title } => {
            if let Some(id) = resolve(controller, &target) {
                let snapshot = controller.rename_conversation(&id, &title);
                if let Some(conversation) = snapshot.find(&id) {
                    println!("Renamed to \"{}\".", conversation.title);
                }
            }
        }
        Command::Delete(target) => {
            if let Some(id) = resolve(controller, &target) {
                let snapshot = controller.delete_conversation(&id);
                println!("Deleted.");
                show_active(controller, &snapshot);
            }
        }
        Command::Examples => print!("{}", render::examples(EXAMPLE_PROMPTS)),
        Command::Try(n) => match EXAMPLE_PROMPTS.get(n - 1) {
            Some(prompt) => spawn_exchange(controller, (*prompt).to_string(), true),
            None => println!("There are only {} examples.", EXAMPLE_PROMPTS.len()),
        },
        Command::Show => show_active(controller, &controller.snapshot()),
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
        Command::Invalid(hint) => println!("{hint}"),
        Command::Empty => {}
    }
    true
}

fn resolve(controller: &Controller, target: &str) -> Option<colloquy_core::ConversationId> {
    let resolved = render::resolve_target(&controller.snapshot(), target);
    if resolved.is_none() {
        println!("No conversation '{target}'. Use /list to see them.");
    }
    resolved
}

fn show_active(controller: &Controller, snapshot: &colloquy_conversation::Snapshot) {
    match snapshot.active() {
        Some(conversation) => print!(
            "{}",
            render::conversation(conversation, controller.is_loading(&conversation.id))
        ),
        None => println!("No conversation selected."),
    }
}

/// Sends `text` on a spawned task and prints the transcript once the reply
/// lands. With `fresh`, a new conversation is started for it.
fn spawn_exchange(controller: &Arc<Controller>, text: String, fresh: bool) {
    let controller = Arc::clone(controller);
    let target = if fresh {
        None
    } else {
        controller.snapshot().active_id
    };

    tokio::spawn(async move {
        let snapshot = if fresh {
            controller.new_conversation(Some(&text)).await
        } else {
            controller.send_message(&text).await
        };

        let shown = target
            .as_ref()
            .and_then(|id| snapshot.find(id))
            .or_else(|| snapshot.active());
        if let Some(conversation) = shown {
            print!(
                "{}",
                render::conversation(conversation, controller.is_loading(&conversation.id))
            );
        }
    });
}
