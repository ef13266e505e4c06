//! HTTP API response DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::websocket::{CursorDto, ParticipantDto, SharedStateDto};

/// Room summary for `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub project_id: String,
    /// Display names in join order
    pub participants: Vec<String>,
    pub active_tools: Vec<String>,
    pub created_at: String,
}

/// One connection's entry for `GET /api/rooms/{project_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailDto {
    pub connection_id: String,
    pub participant: ParticipantDto,
    pub joined_at: String,
}

/// Room detail for `GET /api/rooms/{project_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub project_id: String,
    pub participants: Vec<MemberDetailDto>,
    pub active_tools: Vec<String>,
    pub cursors: BTreeMap<String, CursorDto>,
    pub shared_state: SharedStateDto,
    pub created_at: String,
}
