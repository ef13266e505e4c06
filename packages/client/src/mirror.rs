//! Local mirror of the joined room.
//!
//! The mirror owns no authoritative state. It is rebuilt from the `room_state`
//! snapshot on join and then kept current by applying fan-out events.
//!
//! Own `tool-selected` / `element-selected` / `view-changed` emits are applied
//! optimistically when they are sent. Broadcasts originated by this connection
//! never overwrite them; only events from other connections reconcile the
//! mirror. Chat is not applied optimistically and appears once, when the
//! server echo arrives.

use std::collections::BTreeMap;

use atelier_server::infrastructure::dto::websocket::{
    ChatDataDto, CollaborationMessageDto, CursorDto, EventDataDto, MemberDto, ServerMessage,
    SharedStateDto,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirroredState {
    connected: bool,
    connection_id: Option<String>,
    project_id: Option<String>,
    participants: Vec<MemberDto>,
    active_tools: Vec<String>,
    cursors: BTreeMap<String, CursorDto>,
    shared_state: SharedStateDto,
    /// 受信したイベント（受信順）
    events: Vec<CollaborationMessageDto>,
}

impl MirroredState {
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn participants(&self) -> &[MemberDto] {
        &self.participants
    }

    pub fn active_tools(&self) -> &[String] {
        &self.active_tools
    }

    pub fn cursors(&self) -> &BTreeMap<String, CursorDto> {
        &self.cursors
    }

    pub fn shared_state(&self) -> &SharedStateDto {
        &self.shared_state
    }

    pub fn events(&self) -> &[CollaborationMessageDto] {
        &self.events
    }

    /// Chat transcript derived from the event log
    pub fn chat_transcript(&self) -> Vec<ChatDataDto> {
        self.events
            .iter()
            .filter_map(|message| match &message.event {
                EventDataDto::ChatMessage(chat) => Some(chat.clone()),
                _ => None,
            })
            .collect()
    }

    /// Display name of the member behind a connection id
    pub fn display_name_of(&self, connection_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|member| member.connection_id == connection_id)
            .map(|member| member.participant.name.as_str())
    }

    pub fn mark_connected(&mut self) {
        self.connected = true;
    }

    /// 接続が切れた。Room の状態は次の `room_state` まで空にする
    pub fn mark_disconnected(&mut self) {
        self.connected = false;
        self.connection_id = None;
        self.clear_room();
    }

    /// Start mirroring `project_id`.
    ///
    /// Switching to a different project discards the previous room and its
    /// event log. Rejoining the same project keeps both.
    pub fn begin_join(&mut self, project_id: &str) {
        if self.project_id.as_deref() != Some(project_id) {
            self.clear_room();
            self.events.clear();
        }
        self.project_id = Some(project_id.to_string());
    }

    /// Stop mirroring `project_id`. Returns `false` if it was not the joined project.
    pub fn leave(&mut self, project_id: &str) -> bool {
        if self.project_id.as_deref() != Some(project_id) {
            return false;
        }
        self.project_id = None;
        self.clear_room();
        true
    }

    pub fn apply_local_tool(&mut self, tool: &str) {
        self.add_tool(tool);
    }

    pub fn apply_local_element(&mut self, element_id: Option<&str>) {
        self.shared_state.selected_element = element_id.map(str::to_string);
    }

    pub fn apply_local_view(&mut self, zoom_level: f64, view_mode: &str) {
        self.shared_state.zoom_level = zoom_level;
        self.shared_state.view_mode = view_mode.to_string();
    }

    /// Apply a server message. Returns `false` if the message was ignored.
    pub fn apply(&mut self, message: &ServerMessage) -> bool {
        match message {
            ServerMessage::Connected { connection_id } => {
                self.connection_id = Some(connection_id.clone());
                true
            }
            ServerMessage::RoomState(state) => {
                if self.project_id.as_deref() != Some(state.project_id.as_str()) {
                    return false;
                }
                self.participants = state.participants.clone();
                self.active_tools = state.active_tools.clone();
                self.cursors = state.cursors.clone();
                self.shared_state = state.shared_state.clone();
                true
            }
            ServerMessage::CollaborationMessage(event) => {
                if self.project_id.as_deref() != Some(event.project_id.as_str()) {
                    return false;
                }
                self.apply_event(event);
                self.events.push(event.clone());
                true
            }
        }
    }

    fn apply_event(&mut self, message: &CollaborationMessageDto) {
        let from_self = self.connection_id.as_deref() == Some(message.origin_connection_id.as_str());

        match &message.event {
            EventDataDto::ParticipantJoined(member) => {
                if !self
                    .participants
                    .iter()
                    .any(|m| m.connection_id == member.connection_id)
                {
                    self.participants.push(member.clone());
                }
            }
            EventDataDto::ParticipantLeft(member) => {
                self.participants
                    .retain(|m| m.connection_id != member.connection_id);
                self.cursors.remove(&member.connection_id);
            }
            EventDataDto::CursorMoved(cursor) => {
                if !from_self {
                    self.cursors
                        .insert(message.origin_connection_id.clone(), *cursor);
                }
            }
            EventDataDto::ToolSelected { tool } => {
                if !from_self {
                    self.add_tool(tool);
                }
            }
            EventDataDto::ElementSelected { element_id } => {
                if !from_self {
                    self.shared_state.selected_element = element_id.clone();
                }
            }
            EventDataDto::ViewChanged {
                zoom_level,
                view_mode,
            } => {
                if !from_self {
                    self.shared_state.zoom_level = *zoom_level;
                    self.shared_state.view_mode = view_mode.clone();
                }
            }
            // 状態は持たない（イベントログにのみ残る）
            EventDataDto::ChatMessage(_) | EventDataDto::DesignUpdate { .. } => {}
        }
    }

    fn add_tool(&mut self, tool: &str) {
        if !self.active_tools.iter().any(|t| t == tool) {
            self.active_tools.push(tool.to_string());
        }
    }

    fn clear_room(&mut self) {
        self.participants.clear();
        self.active_tools.clear();
        self.cursors.clear();
        self.shared_state = SharedStateDto::default();
    }
}
