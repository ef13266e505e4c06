//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `HashMap<ProjectId, SharedRoom>` をインメモリ DB として使用します。
//!
//! マップ全体のロックは Room の取得・作成・削除の間だけ保持し、
//! Room ごとの変更は各 Room のロックで直列化します。異なる Room の処理は並行に進みます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ProjectId, RepositoryError, Room, RoomRepository, SharedRoom, Timestamp};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<ProjectId, SharedRoom>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_or_create(&self, project_id: &ProjectId, now: Timestamp) -> SharedRoom {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(project_id.clone())
            .or_insert_with(|| {
                tracing::info!("Room '{}' created", project_id);
                Arc::new(Mutex::new(Room::new(project_id.clone(), now)))
            })
            .clone()
    }

    async fn get(&self, project_id: &ProjectId) -> Option<SharedRoom> {
        let rooms = self.rooms.lock().await;
        rooms.get(project_id).cloned()
    }

    async fn remove(&self, project_id: &ProjectId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(shared) = rooms.get(project_id).cloned() else {
            return false;
        };

        let mut room = shared.lock().await;
        if !room.is_empty() {
            return false;
        }
        room.close();
        rooms.remove(project_id);
        tracing::info!("Room '{}' removed (no participants left)", project_id);
        true
    }

    async fn snapshot(&self, project_id: &ProjectId) -> Result<Room, RepositoryError> {
        let shared = self
            .get(project_id)
            .await
            .ok_or_else(|| RepositoryError::RoomNotFound(project_id.to_string()))?;
        let room = shared.lock().await;
        if room.is_closed() {
            return Err(RepositoryError::RoomClosed(project_id.to_string()));
        }
        Ok(room.clone())
    }

    async fn list(&self) -> Vec<Room> {
        let handles: Vec<SharedRoom> = {
            let rooms = self.rooms.lock().await;
            rooms.values().cloned().collect()
        };

        let mut snapshots = Vec::with_capacity(handles.len());
        for shared in handles {
            let room = shared.lock().await;
            if !room.is_closed() {
                snapshots.push(room.clone());
            }
        }
        snapshots.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        snapshots
    }

    async fn count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, DisplayName, Member, Participant, ParticipantId, Role};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - get_or_create の遅延作成と同一ハンドルの返却
    // - remove が空の Room だけを削除し close 済みにすること
    // - snapshot / list の読み取り
    //
    // 【なぜこのテストが必要か】
    // - Room の生成と破棄の境界で状態が失われたり、古い Room が残ったりしないことを保証する
    // ========================================

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id.to_string()).unwrap()
    }

    fn member(connection: &str) -> Member {
        Member::new(
            ConnectionId::new(connection.to_string()).unwrap(),
            Participant::new(
                ParticipantId::new("alice".to_string()).unwrap(),
                DisplayName::new("Alice".to_string()).unwrap(),
                Role::Client,
                None,
            ),
            Timestamp::new(1),
        )
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_room() {
        // テスト項目: 同じプロジェクトに対しては同じ Room が返される
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();

        // when (操作):
        let first = repo.get_or_create(&project("P1"), Timestamp::new(10)).await;
        let second = repo.get_or_create(&project("P1"), Timestamp::new(20)).await;

        // then (期待する結果):
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.created_at, Timestamp::new(10));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        // テスト項目: get は Room を作成しない
        let repo = InMemoryRoomRepository::new();
        assert!(repo.get(&project("P1")).await.is_none());
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_only_empty_room() {
        // テスト項目: 参加者がいる Room は削除されない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let shared = repo.get_or_create(&project("P1"), Timestamp::new(0)).await;
        shared.lock().await.add_member(member("c1"));

        // when (操作):
        let removed = repo.remove(&project("P1")).await;

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(repo.count().await, 1);
        assert!(!shared.lock().await.is_closed());
    }

    #[tokio::test]
    async fn test_remove_empty_room_closes_handle() {
        // テスト項目: 空の Room は削除され、保持中のハンドルも close 済みになる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let shared = repo.get_or_create(&project("P1"), Timestamp::new(0)).await;

        // when (操作):
        let removed = repo.remove(&project("P1")).await;

        // then (期待する結果):
        assert!(removed);
        assert!(shared.lock().await.is_closed());
        assert!(repo.get(&project("P1")).await.is_none());

        // 再作成された Room は別物
        let fresh = repo.get_or_create(&project("P1"), Timestamp::new(5)).await;
        assert!(!Arc::ptr_eq(&shared, &fresh));
        assert!(!fresh.lock().await.is_closed());
    }

    #[tokio::test]
    async fn test_snapshot_of_closed_room_is_rejected() {
        // テスト項目: close 済みの Room はスナップショットを返さない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let shared = repo.get_or_create(&project("P1"), Timestamp::new(0)).await;
        shared.lock().await.close();

        // when (操作):
        let result = repo.snapshot(&project("P1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::RoomClosed("P1".to_string())));
    }

    #[tokio::test]
    async fn test_remove_nonexistent_room_is_noop() {
        // テスト項目: 存在しない Room の削除は何もしない
        let repo = InMemoryRoomRepository::new();
        assert!(!repo.remove(&project("ghost")).await);
    }

    #[tokio::test]
    async fn test_snapshot_and_list() {
        // テスト項目: スナップショットと一覧が取得できる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        repo.get_or_create(&project("P2"), Timestamp::new(0)).await;
        repo.get_or_create(&project("P1"), Timestamp::new(0)).await;

        // when (操作):
        let listed = repo.list().await;
        let missing = repo.snapshot(&project("P3")).await;

        // then (期待する結果):
        let ids: Vec<&str> = listed.iter().map(|r| r.project_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
        assert_eq!(missing, Err(RepositoryError::RoomNotFound("P3".to_string())));
        assert!(repo.snapshot(&project("P1")).await.is_ok());
    }
}
