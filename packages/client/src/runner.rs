//! Terminal client loop with reconnection.

use std::time::Duration;

use atelier_server::domain::{Participant, ProjectId};
use tokio::sync::{broadcast::error::RecvError, mpsc};

use crate::{
    command::{HELP, Input, parse_input},
    domain::should_attempt_reconnect,
    error::ClientError,
    formatter::MessageFormatter,
    session::{CollaborationSession, SessionEvent},
    ui::{redisplay_prompt, spawn_readline},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Terminal client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub project_id: ProjectId,
    pub participant: Participant,
}

/// Run the terminal client until the user quits.
///
/// Reconnects automatically on disconnection (max 5 attempts with 5 second
/// interval) and rejoins the configured project.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let prompt = format!("{}@{}> ", config.participant.name, config.project_id);
    let mut input_rx = spawn_readline(prompt.clone());
    let mut attempt = 0;

    loop {
        tracing::info!(
            "Connecting to {} as '{}' (attempt {}/{})",
            config.url,
            config.participant.name,
            attempt + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let error = match run_client_session(&config, &prompt, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => e,
        };

        // 一度つながった後の切断は試行回数を数え直す
        if matches!(error, ClientError::ConnectionLost) {
            attempt = 0;
        }

        if !should_attempt_reconnect(&error, attempt, MAX_RECONNECT_ATTEMPTS) {
            return Err(error);
        }

        attempt += 1;
        tracing::warn!(
            "{}. Reconnecting in {}s (attempt {}/{})",
            error,
            RECONNECT_INTERVAL.as_secs(),
            attempt,
            MAX_RECONNECT_ATTEMPTS
        );
        tokio::time::sleep(RECONNECT_INTERVAL).await;
    }
}

/// One connection's lifetime. `Ok` means the user quit.
async fn run_client_session(
    config: &ClientConfig,
    prompt: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let session = CollaborationSession::new(config.url.clone());
    let mut events = session.subscribe();
    session
        .join(&config.project_id, &config.participant)
        .await?;

    println!(
        "\nYou are '{}' in project '{}'. Type messages and press Enter to chat, /help for commands.\n",
        config.participant.name, config.project_id
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::Message(message)) => {
                    let mirror = session.snapshot().await;
                    if let Some(formatted) = MessageFormatter::format_server_message(&message, &mirror) {
                        print!("{}", formatted);
                        redisplay_prompt(prompt);
                    }
                }
                Ok(SessionEvent::Disconnected) | Err(RecvError::Closed) => {
                    return Err(ClientError::ConnectionLost);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} notifications", skipped);
                }
            },
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Ctrl+C / Ctrl+D
                    session.leave(&config.project_id).await;
                    session.disconnect().await;
                    return Ok(());
                };
                match parse_input(&line) {
                    Ok(Input::Quit) => {
                        session.leave(&config.project_id).await;
                        session.disconnect().await;
                        return Ok(());
                    }
                    Ok(input) => execute(&session, &config.project_id, input).await,
                    Err(e) => println!("{}\n{}", e, HELP),
                }
                redisplay_prompt(prompt);
            }
        }
    }
}

async fn execute(session: &CollaborationSession, project_id: &ProjectId, input: Input) {
    match input {
        Input::Chat(text) => session.emit_chat(&text).await,
        Input::Cursor { x, y } => session.emit_cursor(x, y).await,
        Input::Tool(tool) => session.emit_tool_select(&tool).await,
        Input::Select(element_id) => session.emit_element_select(element_id.as_deref()).await,
        Input::View {
            zoom_level,
            view_mode,
        } => session.emit_view_change(zoom_level, &view_mode).await,
        Input::Design {
            update_type,
            update_data,
        } => session.emit_design_update(&update_type, update_data).await,
        Input::Who => print!("{}", MessageFormatter::format_who(&session.snapshot().await)),
        Input::State => print!("{}", MessageFormatter::format_state(&session.snapshot().await)),
        Input::Leave => {
            session.leave(project_id).await;
            println!("Left project '{}'. Type /quit to exit.", project_id);
        }
        Input::Help => println!("{}", HELP),
        Input::Quit => {}
    }
}
