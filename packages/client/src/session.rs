//! Collaboration session facade.
//!
//! Owns one WebSocket connection to the collaboration server. Outbound
//! requests are queued on an unbounded channel and written by a writer task;
//! inbound frames are applied to the [`MirroredState`] by a reader task and then
//! re-published to subscribers as [`SessionEvent`]s.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use atelier_server::{
    domain::{Participant, ProjectId},
    infrastructure::dto::{
        conversion::ClientCommand,
        websocket::{
            ChatDataDto, ClientMessage, CollaborationMessageDto, CursorDto, MemberDto,
            ParticipantDto, ServerMessage, SharedStateDto,
        },
    },
};
use futures_util::{SinkExt, StreamExt};
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{error::ClientError, mirror::MirroredState};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Notification published after an inbound frame has been applied to the mirror
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Message(ServerMessage),
    Disconnected,
}

pub struct CollaborationSession {
    url: String,
    mirror: Arc<Mutex<MirroredState>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    events: broadcast::Sender<SessionEvent>,
    writer: Mutex<Option<JoinHandle<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl CollaborationSession {
    /// Create a session for the server at `url` (e.g. `ws://127.0.0.1:8080/ws`).
    ///
    /// No connection is opened until [`connect`](Self::connect) or
    /// [`join`](Self::join) is called.
    pub fn new(url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            url: url.into(),
            mirror: Arc::new(Mutex::new(MirroredState::default())),
            outbound: Mutex::new(None),
            events,
            writer: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    /// Subscribe to inbound notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Open the connection, or reuse the current one
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut outbound = self.outbound.lock().await;
        if outbound.as_ref().is_some_and(|tx| !tx.is_closed())
            && self.mirror.lock().await.is_connected()
        {
            return Ok(());
        }

        let (ws_stream, _) = connect_async(&self.url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        tracing::info!("Connected to collaboration server at {}", self.url);

        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        self.mirror.lock().await.mark_connected();

        // Writer: drains the outbound queue; closes the socket once the queue is dropped
        let writer = tokio::spawn(async move {
            while let Some(json) = rx.recv().await {
                if let Err(e) = write.send(Message::text(json)).await {
                    tracing::warn!("Failed to send message: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        let mirror = self.mirror.clone();
        let events = self.events.clone();
        let reader = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let server_message = match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(server_message) => server_message,
                            Err(e) => {
                                tracing::warn!("Ignoring unparsable server frame: {}", e);
                                continue;
                            }
                        };
                        if mirror.lock().await.apply(&server_message) {
                            let _ = events.send(SessionEvent::Message(server_message));
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            mirror.lock().await.mark_disconnected();
            let _ = events.send(SessionEvent::Disconnected);
        });

        *outbound = Some(tx);
        if let Some(previous) = self.writer.lock().await.replace(writer) {
            previous.abort();
        }
        if let Some(previous) = self.reader.lock().await.replace(reader) {
            previous.abort();
        }

        Ok(())
    }

    /// Close the connection after flushing queued messages. The mirror is
    /// marked disconnected once the server acknowledges the close.
    pub async fn disconnect(&self) {
        self.outbound.lock().await.take();
        if let Some(writer) = self.writer.lock().await.take() {
            if tokio::time::timeout(CLOSE_TIMEOUT, writer).await.is_err() {
                tracing::warn!("Timed out flushing outbound messages");
            }
        }
    }

    /// Join `project_id` as `participant`, connecting first if needed
    pub async fn join(
        &self,
        project_id: &ProjectId,
        participant: &Participant,
    ) -> Result<(), ClientError> {
        self.connect().await?;
        self.mirror.lock().await.begin_join(project_id.as_str());
        self.send(&ClientMessage::JoinProject {
            project_id: project_id.as_str().to_string(),
            participant: ParticipantDto::from(participant),
        })
        .await
    }

    /// Leave `project_id`. Further fan-out for it is no longer applied.
    pub async fn leave(&self, project_id: &ProjectId) {
        if !self.mirror.lock().await.leave(project_id.as_str()) {
            tracing::debug!("Not joined to '{}', nothing to leave", project_id);
            return;
        }
        self.fire(ClientMessage::LeaveProject {
            project_id: project_id.as_str().to_string(),
        })
        .await;
    }

    pub async fn emit_cursor(&self, x: f64, y: f64) {
        let Some(project_id) = self.joined_project().await else {
            return;
        };
        self.fire(ClientMessage::CursorMove { project_id, x, y })
            .await;
    }

    pub async fn emit_tool_select(&self, tool: &str) {
        let Some(project_id) = self.joined_project().await else {
            return;
        };
        let message = ClientMessage::ToolSelect {
            project_id,
            tool: tool.to_string(),
        };
        if self.is_valid(&message) {
            self.mirror.lock().await.apply_local_tool(tool);
            self.fire(message).await;
        }
    }

    /// `None` clears the shared selection
    pub async fn emit_element_select(&self, element_id: Option<&str>) {
        let Some(project_id) = self.joined_project().await else {
            return;
        };
        let message = ClientMessage::ElementSelect {
            project_id,
            element_id: element_id.map(str::to_string),
        };
        if self.is_valid(&message) {
            self.mirror.lock().await.apply_local_element(element_id);
            self.fire(message).await;
        }
    }

    pub async fn emit_view_change(&self, zoom_level: f64, view_mode: &str) {
        let Some(project_id) = self.joined_project().await else {
            return;
        };
        let message = ClientMessage::ViewChange {
            project_id,
            zoom_level,
            view_mode: view_mode.to_string(),
        };
        if self.is_valid(&message) {
            self.mirror
                .lock()
                .await
                .apply_local_view(zoom_level, view_mode);
            self.fire(message).await;
        }
    }

    /// The message shows up in the transcript when the server echoes it back
    pub async fn emit_chat(&self, text: &str) {
        let Some(project_id) = self.joined_project().await else {
            return;
        };
        self.fire(ClientMessage::ChatMessage {
            project_id,
            message: text.to_string(),
            participant: None,
        })
        .await;
    }

    pub async fn emit_design_update(&self, update_type: &str, update_data: serde_json::Value) {
        let Some(project_id) = self.joined_project().await else {
            return;
        };
        self.fire(ClientMessage::DesignUpdate {
            project_id,
            update_type: update_type.to_string(),
            update_data,
        })
        .await;
    }

    pub async fn is_connected(&self) -> bool {
        self.mirror.lock().await.is_connected()
    }

    pub async fn connection_id(&self) -> Option<String> {
        self.mirror.lock().await.connection_id().map(str::to_string)
    }

    pub async fn project_id(&self) -> Option<String> {
        self.mirror.lock().await.project_id().map(str::to_string)
    }

    pub async fn participants(&self) -> Vec<MemberDto> {
        self.mirror.lock().await.participants().to_vec()
    }

    pub async fn active_tools(&self) -> Vec<String> {
        self.mirror.lock().await.active_tools().to_vec()
    }

    pub async fn cursors(&self) -> BTreeMap<String, CursorDto> {
        self.mirror.lock().await.cursors().clone()
    }

    pub async fn shared_state(&self) -> SharedStateDto {
        self.mirror.lock().await.shared_state().clone()
    }

    pub async fn events(&self) -> Vec<CollaborationMessageDto> {
        self.mirror.lock().await.events().to_vec()
    }

    pub async fn chat_transcript(&self) -> Vec<ChatDataDto> {
        self.mirror.lock().await.chat_transcript()
    }

    /// Copy of the whole mirror
    pub async fn snapshot(&self) -> MirroredState {
        self.mirror.lock().await.clone()
    }

    async fn joined_project(&self) -> Option<String> {
        let project_id = self.project_id().await;
        if project_id.is_none() {
            tracing::debug!("Not joined to any project; dropping emit");
        }
        project_id
    }

    /// Same boundary validation the server applies
    fn is_valid(&self, message: &ClientMessage) -> bool {
        match ClientCommand::try_from(message.clone()) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Dropping invalid emit: {}", e);
                false
            }
        }
    }

    /// Fire-and-forget send
    async fn fire(&self, message: ClientMessage) {
        if !self.is_valid(&message) {
            return;
        }
        if let Err(e) = self.send(&message).await {
            tracing::warn!("Failed to send message: {}", e);
        }
    }

    async fn send(&self, message: &ClientMessage) -> Result<(), ClientError> {
        let json = serde_json::to_string(message)?;
        let outbound = self.outbound.lock().await;
        match outbound.as_ref() {
            Some(tx) => tx.send(json).map_err(|_| ClientError::NotConnected),
            None => Err(ClientError::NotConnected),
        }
    }
}

impl Drop for CollaborationSession {
    fn drop(&mut self) {
        for task in [self.writer.get_mut().take(), self.reader.get_mut().take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}
