use std::str::FromStr;
use std::sync::Arc;

use clap::ValueEnum;
use pomocycle_core::storage;
use pomocycle_core::{
    LogNotifier, Notifier, SessionController, SessionHandle, SessionRuntime, TomlStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

/// Prints notices on stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn show(&self, message: &str) {
        println!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartAction {
    Work,
    ShortBreak,
    LongBreak,
    Reset,
}

/// One line typed into a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Start(StartAction),
    Stop,
    Set { key: String, value: String },
    Status,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let input = match words.next().unwrap_or_default() {
            "work" | "start" => Input::Start(StartAction::Work),
            "break" | "short" => Input::Start(StartAction::ShortBreak),
            "long" => Input::Start(StartAction::LongBreak),
            "reset" => Input::Start(StartAction::Reset),
            "stop" => Input::Stop,
            "status" => Input::Status,
            "help" | "?" => Input::Help,
            "quit" | "exit" => Input::Quit,
            "set" => match (words.next(), words.next()) {
                (Some(key), Some(value)) => Input::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                },
                _ => return Err("usage: set <key> <value>".to_string()),
            },
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(input)
    }
}

const HELP: &str = "commands: work, stop, break, long, reset, set <key> <value>, status, quit";

fn apply(handle: &SessionHandle, action: StartAction) {
    match action {
        StartAction::Work => handle.start_work(),
        StartAction::ShortBreak => handle.start_short_break(),
        StartAction::LongBreak => handle.start_long_break(),
        StartAction::Reset => handle.reset_cycle(),
    }
}

pub async fn run(
    start: Option<StartAction>,
    show_events: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(TomlStore::open_default()?);
    tracing::info!(path = %store.path().display(), "using config");
    let controller = SessionController::load(store, Arc::new(StdoutNotifier)).await;
    let handle = SessionRuntime::spawn(controller);

    if show_events {
        let mut events = handle.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(json) => println!("{json}"),
                        Err(e) => tracing::warn!(error = %e, "failed to encode event"),
                    },
                    Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "event output lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    if let Some(action) = start {
        apply(&handle, action);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Start(action)) => apply(&handle, action),
                    Ok(Input::Stop) => handle.stop_work(),
                    Ok(Input::Set { key, value }) => match handle.update_setting(&key, &value).await {
                        Ok(()) => println!("ok"),
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Ok(Input::Status) => {
                        let snapshot = handle.snapshot().await?;
                        println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    }
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(Input::Quit) => break,
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    handle.shutdown().await;
    Ok(())
}

pub async fn status() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(TomlStore::open_default()?);
    let config = storage::load_or_default(store.as_ref()).await;
    let controller = SessionController::new(config, store, Arc::new(LogNotifier));
    let out = serde_json::json!({
        "config": controller.config(),
        "phase": controller.phase(),
        "snapshot": controller.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
