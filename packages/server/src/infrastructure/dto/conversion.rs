//! Conversion logic between DTOs and domain entities.
//!
//! Inbound conversions validate: anything that does not produce a valid
//! domain value is a malformed payload and is reported as `ValueObjectError`.

use atelier_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    AvatarRef, ChatText, ClientEvent, CollaborationEvent, ConnectionId, CursorPosition,
    DisplayName, ElementId, EventPayload, Member, OutboundMessage, Participant, ParticipantId,
    ProjectId, Role, Room, SharedViewState, ToolName, UpdateType, ValueObjectError, ViewMode,
    ZoomLevel,
};
use crate::infrastructure::dto::{
    http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    websocket as dto,
};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::ParticipantDto> for Participant {
    type Error = ValueObjectError;

    fn try_from(dto: dto::ParticipantDto) -> Result<Self, Self::Error> {
        Ok(Participant::new(
            ParticipantId::new(dto.id)?,
            DisplayName::new(dto.name)?,
            Role::try_from(dto.role.as_str())?,
            dto.avatar
                .filter(|avatar| !avatar.trim().is_empty())
                .map(AvatarRef::new)
                .transpose()?,
        ))
    }
}

/// A validated inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Join {
        project_id: ProjectId,
        participant: Participant,
    },
    Leave {
        project_id: ProjectId,
    },
    Event {
        project_id: ProjectId,
        event: ClientEvent,
    },
}

impl TryFrom<dto::ClientMessage> for ClientCommand {
    type Error = ValueObjectError;

    fn try_from(message: dto::ClientMessage) -> Result<Self, Self::Error> {
        let command = match message {
            dto::ClientMessage::JoinProject {
                project_id,
                participant,
            } => ClientCommand::Join {
                project_id: ProjectId::new(project_id)?,
                participant: participant.try_into()?,
            },
            dto::ClientMessage::LeaveProject { project_id } => ClientCommand::Leave {
                project_id: ProjectId::new(project_id)?,
            },
            dto::ClientMessage::CursorMove { project_id, x, y } => ClientCommand::Event {
                project_id: ProjectId::new(project_id)?,
                event: ClientEvent::CursorMove(CursorPosition::new(x, y)?),
            },
            dto::ClientMessage::ToolSelect { project_id, tool } => ClientCommand::Event {
                project_id: ProjectId::new(project_id)?,
                event: ClientEvent::ToolSelect(ToolName::new(tool)?),
            },
            dto::ClientMessage::ElementSelect {
                project_id,
                element_id,
            } => ClientCommand::Event {
                project_id: ProjectId::new(project_id)?,
                event: ClientEvent::ElementSelect(element_id.map(ElementId::new).transpose()?),
            },
            dto::ClientMessage::ViewChange {
                project_id,
                zoom_level,
                view_mode,
            } => ClientCommand::Event {
                project_id: ProjectId::new(project_id)?,
                event: ClientEvent::ViewChange {
                    zoom_level: ZoomLevel::new(zoom_level)?,
                    view_mode: ViewMode::try_from(view_mode.as_str())?,
                },
            },
            dto::ClientMessage::ChatMessage {
                project_id,
                message,
                participant: _,
            } => ClientCommand::Event {
                project_id: ProjectId::new(project_id)?,
                event: ClientEvent::Chat(ChatText::new(message)?),
            },
            dto::ClientMessage::DesignUpdate {
                project_id,
                update_type,
                update_data,
            } => ClientCommand::Event {
                project_id: ProjectId::new(project_id)?,
                event: ClientEvent::DesignUpdate {
                    update_type: UpdateType::new(update_type)?,
                    update_data,
                },
            },
        };
        Ok(command)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Participant> for dto::ParticipantDto {
    fn from(model: &Participant) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            name: model.name.as_str().to_string(),
            role: model.role.as_str().to_string(),
            avatar: model.avatar.as_ref().map(|a| a.as_str().to_string()),
        }
    }
}

impl From<&Member> for dto::MemberDto {
    fn from(model: &Member) -> Self {
        Self {
            connection_id: model.connection_id.as_str().to_string(),
            participant: (&model.participant).into(),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<&SharedViewState> for dto::SharedStateDto {
    fn from(model: &SharedViewState) -> Self {
        Self {
            selected_element: model
                .selected_element
                .as_ref()
                .map(|e| e.as_str().to_string()),
            zoom_level: model.zoom_level.value(),
            view_mode: model.view_mode.as_str().to_string(),
        }
    }
}

impl From<&EventPayload> for dto::EventDataDto {
    fn from(model: &EventPayload) -> Self {
        match model {
            EventPayload::ParticipantJoined(member) => Self::ParticipantJoined(member.into()),
            EventPayload::ParticipantLeft(member) => Self::ParticipantLeft(member.into()),
            EventPayload::CursorMoved(position) => Self::CursorMoved(dto::CursorDto {
                x: position.x(),
                y: position.y(),
            }),
            EventPayload::ToolSelected(tool) => Self::ToolSelected {
                tool: tool.as_str().to_string(),
            },
            EventPayload::ElementSelected(element) => Self::ElementSelected {
                element_id: element.as_ref().map(|e| e.as_str().to_string()),
            },
            EventPayload::ViewChanged {
                zoom_level,
                view_mode,
            } => Self::ViewChanged {
                zoom_level: zoom_level.value(),
                view_mode: view_mode.as_str().to_string(),
            },
            EventPayload::ChatMessage(chat) => Self::ChatMessage(dto::ChatDataDto {
                sender: (&chat.sender).into(),
                text: chat.text.as_str().to_string(),
                timestamp: chat.timestamp.value(),
            }),
            EventPayload::DesignUpdate {
                update_type,
                update_data,
            } => Self::DesignUpdate {
                update_type: update_type.as_str().to_string(),
                update_data: update_data.clone(),
            },
        }
    }
}

impl From<&CollaborationEvent> for dto::CollaborationMessageDto {
    fn from(model: &CollaborationEvent) -> Self {
        Self {
            project_id: model.project_id.as_str().to_string(),
            origin_connection_id: model.origin.as_str().to_string(),
            timestamp: model.timestamp.value(),
            event: (&model.payload).into(),
        }
    }
}

impl From<&Room> for dto::RoomStateDto {
    fn from(model: &Room) -> Self {
        Self {
            project_id: model.project_id.as_str().to_string(),
            participants: model.members.iter().map(Into::into).collect(),
            active_tools: model
                .active_tools
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            cursors: model
                .cursors
                .iter()
                .map(|(connection, position)| {
                    (
                        connection.as_str().to_string(),
                        dto::CursorDto {
                            x: position.x(),
                            y: position.y(),
                        },
                    )
                })
                .collect(),
            shared_state: (&model.shared_state).into(),
        }
    }
}

impl From<&ConnectionId> for dto::ServerMessage {
    fn from(model: &ConnectionId) -> Self {
        Self::Connected {
            connection_id: model.as_str().to_string(),
        }
    }
}

impl From<&OutboundMessage> for dto::ServerMessage {
    fn from(model: &OutboundMessage) -> Self {
        match model {
            OutboundMessage::Connected(connection_id) => connection_id.into(),
            OutboundMessage::RoomState(room) => Self::RoomState(room.into()),
            OutboundMessage::Event(event) => Self::CollaborationMessage(event.into()),
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(model: &Room) -> Self {
        Self {
            project_id: model.project_id.as_str().to_string(),
            participants: model
                .members
                .iter()
                .map(|m| m.participant.name.as_str().to_string())
                .collect(),
            active_tools: model
                .active_tools
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(model: &Room) -> Self {
        let state: dto::RoomStateDto = model.into();
        Self {
            project_id: state.project_id,
            participants: model
                .members
                .iter()
                .map(|m| MemberDetailDto {
                    connection_id: m.connection_id.as_str().to_string(),
                    participant: (&m.participant).into(),
                    joined_at: timestamp_to_rfc3339(m.joined_at.value()),
                })
                .collect(),
            active_tools: state.active_tools,
            cursors: state.cursors,
            shared_state: state.shared_state,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}
