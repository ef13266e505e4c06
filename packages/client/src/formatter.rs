//! Message formatting utilities for client display.

use atelier_server::infrastructure::dto::websocket::{
    CollaborationMessageDto, EventDataDto, MemberDto, ServerMessage,
};
use atelier_shared::time::{timestamp_to_local_clock, timestamp_to_rfc3339};

use crate::mirror::MirroredState;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format an inbound server message against the mirror it was applied to.
    ///
    /// Returns `None` for messages that are not worth printing.
    pub fn format_server_message(message: &ServerMessage, mirror: &MirroredState) -> Option<String> {
        match message {
            ServerMessage::Connected { .. } => None,
            ServerMessage::RoomState(_) => Some(Self::format_who(mirror)),
            ServerMessage::CollaborationMessage(event) => Self::format_event(event, mirror),
        }
    }

    /// Participant list, marking this connection with "(me)"
    pub fn format_who(mirror: &MirroredState) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!(
            "Project {}, participants:\n",
            mirror.project_id().unwrap_or("-")
        ));

        if mirror.participants().is_empty() {
            output.push_str("(No participants)\n");
        } else {
            for member in mirror.participants() {
                output.push_str(&Self::format_member_line(member, mirror.connection_id()));
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Shared view state, active tools and cursors
    pub fn format_state(mirror: &MirroredState) -> String {
        let state = mirror.shared_state();
        let mut output = String::new();
        output.push_str(&format!("\n{}\n", RULE));
        output.push_str(&format!(
            "view: {} x{}  selected: {}\n",
            state.view_mode,
            state.zoom_level,
            state.selected_element.as_deref().unwrap_or("(none)")
        ));
        let tools = if mirror.active_tools().is_empty() {
            "(none)".to_string()
        } else {
            mirror.active_tools().join(", ")
        };
        output.push_str(&format!("tools: {}\n", tools));
        for (connection_id, cursor) in mirror.cursors() {
            let name = mirror.display_name_of(connection_id).unwrap_or(connection_id);
            output.push_str(&format!("cursor {}: ({}, {})\n", name, cursor.x, cursor.y));
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }

    fn format_member_line(member: &MemberDto, me: Option<&str>) -> String {
        let me_suffix = if Some(member.connection_id.as_str()) == me {
            " (me)"
        } else {
            ""
        };
        format!(
            "{} [{}]{} - joined at {}\n",
            member.participant.name,
            member.participant.role,
            me_suffix,
            timestamp_to_rfc3339(member.joined_at)
        )
    }

    fn format_event(message: &CollaborationMessageDto, mirror: &MirroredState) -> Option<String> {
        let origin = mirror
            .display_name_of(&message.origin_connection_id)
            .unwrap_or(&message.origin_connection_id);
        let at = timestamp_to_local_clock(message.timestamp);

        let line = match &message.event {
            EventDataDto::ParticipantJoined(member) => {
                format!("+ {} joined at {}", member.participant.name, at)
            }
            EventDataDto::ParticipantLeft(member) => {
                format!("- {} left at {}", member.participant.name, at)
            }
            // カーソル移動は頻度が高いので表示しない
            EventDataDto::CursorMoved(_) => return None,
            EventDataDto::ToolSelected { tool } => format!("* {} selected tool '{}'", origin, tool),
            EventDataDto::ElementSelected { element_id } => match element_id {
                Some(element_id) => format!("* {} selected element '{}'", origin, element_id),
                None => format!("* {} cleared the selection", origin),
            },
            EventDataDto::ViewChanged {
                zoom_level,
                view_mode,
            } => format!("* {} changed the view to {} x{}", origin, view_mode, zoom_level),
            EventDataDto::ChatMessage(chat) => {
                return Some(format!(
                    "\n\n------------------------------------------------------------\n\
                     @{}: {}\n\
                     sent at {}\n\
                     ------------------------------------------------------------\n",
                    chat.sender.name,
                    chat.text,
                    timestamp_to_local_clock(chat.timestamp)
                ));
            }
            EventDataDto::DesignUpdate {
                update_type,
                update_data,
            } => format!("* {} design update '{}': {}", origin, update_type, update_data),
        };

        Some(format!("\n{}\n", line))
    }
}
