//! UseCase: Room 詳細取得

use std::sync::Arc;

use crate::domain::{ProjectId, RepositoryError, Room, RoomRepository};

use super::error::GetRoomDetailError;

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// プロジェクト ID で Room のスナップショットを取得
    pub async fn execute(&self, project_id: String) -> Result<Room, GetRoomDetailError> {
        let project_id =
            ProjectId::new(project_id).map_err(|_| GetRoomDetailError::InvalidProjectId)?;

        self.repository
            .snapshot(&project_id)
            .await
            .map_err(|e| match e {
                // 削除と競合した Room は存在しないものとして扱う
                RepositoryError::RoomNotFound(_) | RepositoryError::RoomClosed(_) => {
                    GetRoomDetailError::RoomNotFound
                }
            })
    }
}
