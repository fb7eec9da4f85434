//! Terminal front end for playing the card over stdin/stdout.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use super::effects::Effects;
use super::session::CardSession;
use super::stage::Stage;
use crate::notifier::ResponseValue;

/// How long `quit` waits for an in-flight answer before exiting.
const QUIT_GRACE: Duration = Duration::from_secs(5);

/// A line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Answer(ResponseValue),
    StartOver,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "open" => Some(Self::Open),
            "yes" | "y" => Some(Self::Answer(ResponseValue::Yes)),
            "no" | "n" => Some(Self::Answer(ResponseValue::No)),
            "again" | "start over" => Some(Self::StartOver),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Text view for a stage.
pub fn render_view(stage: Stage, effects: &Effects) -> String {
    match stage {
        Stage::Envelope => "💌  A letter for you. Press Enter to open it.".to_string(),
        Stage::Opening => {
            let glyphs: String = effects.burst.iter().map(|b| b.glyph).collect();
            format!("✉️   Opening... {glyphs}")
        }
        Stage::Card => "💝  Will you be my Valentine?  [yes / no]".to_string(),
        Stage::Yes => format!(
            "🎉  YES! {} confetti, {} hearts. I'll be counting every second. 💕",
            effects.confetti.len(),
            effects.floating_hearts.len()
        ),
        Stage::No => format!(
            "🥀  That's okay. {} petals fall softly.  [again / quit]",
            effects.petals.len()
        ),
    }
}

/// Run the card until stdin closes or the player quits.
pub async fn run(session: Arc<CardSession>) -> std::io::Result<()> {
    let mut rx = session.subscribe();
    let render_session = Arc::clone(&session);
    let renderer = tokio::spawn(async move {
        let first = *rx.borrow_and_update();
        println!("{}", render_view(first, &render_session.effects().await));
        while rx.changed().await.is_ok() {
            let stage = *rx.borrow_and_update();
            let effects = render_session.effects().await;
            println!("{}", render_view(stage, &effects));
        }
    });

    let mut in_flight: Option<JoinHandle<()>> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        };

        match Command::parse(&line) {
            Some(Command::Open) => {
                session.open_envelope().await;
            }
            Some(Command::Answer(response)) => {
                if let Some(handle) = session.respond(response).await {
                    in_flight = Some(handle);
                }
            }
            Some(Command::StartOver) => {
                session.start_over().await;
            }
            Some(Command::Quit) => break,
            None => eprintln!("Try: Enter, yes, no, again, quit"),
        }
    }

    if let Some(handle) = in_flight {
        if tokio::time::timeout(QUIT_GRACE, handle).await.is_err() {
            tracing::warn!("Answer still in flight at exit; it may be lost");
        }
    }
    renderer.abort();
    Ok(())
}
