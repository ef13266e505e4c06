//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `type`. Field names are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Participant identity as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// One connection's entry in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub connection_id: String,
    pub participant: ParticipantDto,
    pub joined_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorDto {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedStateDto {
    pub selected_element: Option<String>,
    pub zoom_level: f64,
    pub view_mode: String,
}

impl Default for SharedStateDto {
    fn default() -> Self {
        Self {
            selected_element: None,
            zoom_level: 1.0,
            view_mode: "2d".to_string(),
        }
    }
}

/// Client → server messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinProject {
        project_id: String,
        participant: ParticipantDto,
    },
    LeaveProject {
        project_id: String,
    },
    CursorMove {
        project_id: String,
        x: f64,
        y: f64,
    },
    ToolSelect {
        project_id: String,
        tool: String,
    },
    ElementSelect {
        project_id: String,
        element_id: Option<String>,
    },
    ViewChange {
        project_id: String,
        zoom_level: f64,
        view_mode: String,
    },
    ChatMessage {
        project_id: String,
        message: String,
        /// Informational only; the server uses the room roster entry.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant: Option<ParticipantDto>,
    },
    DesignUpdate {
        project_id: String,
        update_type: String,
        #[serde(default)]
        update_data: serde_json::Value,
    },
}

/// Chat payload (`data` of a `chat-message` event)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatDataDto {
    pub sender: ParticipantDto,
    pub text: String,
    pub timestamp: i64,
}

/// Kind-specific payload of a `collaboration_message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum EventDataDto {
    ParticipantJoined(MemberDto),
    ParticipantLeft(MemberDto),
    CursorMoved(CursorDto),
    ToolSelected { tool: String },
    ElementSelected { element_id: Option<String> },
    ViewChanged { zoom_level: f64, view_mode: String },
    ChatMessage(ChatDataDto),
    DesignUpdate {
        update_type: String,
        update_data: serde_json::Value,
    },
}

/// Fan-out event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationMessageDto {
    pub project_id: String,
    pub origin_connection_id: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub event: EventDataDto,
}

/// Room snapshot sent to the joining connection only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub project_id: String,
    pub participants: Vec<MemberDto>,
    pub active_tools: Vec<String>,
    pub cursors: BTreeMap<String, CursorDto>,
    pub shared_state: SharedStateDto,
}

/// Server → client messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected {
        #[serde(rename = "connectionId")]
        connection_id: String,
    },
    RoomState(RoomStateDto),
    CollaborationMessage(CollaborationMessageDto),
}
