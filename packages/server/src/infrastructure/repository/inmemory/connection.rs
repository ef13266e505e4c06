//! InMemory ConnectionRegistry 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, ProjectId, RegistryError};

/// インメモリ ConnectionRegistry 実装
///
/// Key: 接続 ID / Value: 対応付いているプロジェクト（未参加なら `None`）
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Option<ProjectId>>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self) -> ConnectionId {
        let mut connections = self.connections.lock().await;
        let connection_id = loop {
            let candidate = ConnectionId::generate();
            if !connections.contains_key(&candidate) {
                break candidate;
            }
        };
        connections.insert(connection_id.clone(), None);
        tracing::debug!("Connection '{}' registered", connection_id);
        connection_id
    }

    async fn associate(
        &self,
        connection_id: &ConnectionId,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectId>, RegistryError> {
        let mut connections = self.connections.lock().await;
        let slot = connections
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::NotRegistered(connection_id.to_string()))?;

        match slot.replace(project_id.clone()) {
            Some(previous) if &previous != project_id => Ok(Some(previous)),
            _ => Ok(None),
        }
    }

    async fn project_of(&self, connection_id: &ConnectionId) -> Option<ProjectId> {
        let connections = self.connections.lock().await;
        connections.get(connection_id).cloned().flatten()
    }

    async fn dissociate(&self, connection_id: &ConnectionId) -> Option<ProjectId> {
        let mut connections = self.connections.lock().await;
        connections.get_mut(connection_id)?.take()
    }

    async fn deregister(&self, connection_id: &ConnectionId) -> Option<ProjectId> {
        let mut connections = self.connections.lock().await;
        let project = connections.remove(connection_id).flatten();
        tracing::debug!("Connection '{}' deregistered", connection_id);
        project
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_issues_unique_ids() {
        // テスト項目: 接続ごとに一意な ID が払い出される
        let registry = InMemoryConnectionRegistry::new();
        let a = registry.register().await;
        let b = registry.register().await;
        assert_ne!(a, b);
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_associate_is_idempotent_for_same_project() {
        // テスト項目: 同じプロジェクトへの再対応付けは前のプロジェクトを返さない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let conn = registry.register().await;

        // when (操作):
        let first = registry.associate(&conn, &project("P1")).await;
        let second = registry.associate(&conn, &project("P1")).await;

        // then (期待する結果):
        assert_eq!(first, Ok(None));
        assert_eq!(second, Ok(None));
        assert_eq!(registry.project_of(&conn).await, Some(project("P1")));
    }

    #[tokio::test]
    async fn test_associate_to_other_project_returns_previous() {
        // テスト項目: 別プロジェクトへの対応付けは直前のプロジェクトを返す
        let registry = InMemoryConnectionRegistry::new();
        let conn = registry.register().await;
        registry.associate(&conn, &project("P1")).await.unwrap();

        let previous = registry.associate(&conn, &project("P2")).await;

        assert_eq!(previous, Ok(Some(project("P1"))));
        assert_eq!(registry.project_of(&conn).await, Some(project("P2")));
    }

    #[tokio::test]
    async fn test_associate_unregistered_connection_fails() {
        // テスト項目: 未登録の接続は対応付けできない
        let registry = InMemoryConnectionRegistry::new();
        let ghost = ConnectionId::new("ghost".to_string()).unwrap();

        let result = registry.associate(&ghost, &project("P1")).await;

        assert_eq!(result, Err(RegistryError::NotRegistered("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_dissociate_and_deregister() {
        // テスト項目: 解除・削除は対応付いていたプロジェクトを返し、2 回目は何もしない
        // given (前提条件):
        let registry = InMemoryConnectionRegistry::new();
        let conn = registry.register().await;
        registry.associate(&conn, &project("P1")).await.unwrap();

        // when / then:
        assert_eq!(registry.dissociate(&conn).await, Some(project("P1")));
        assert_eq!(registry.dissociate(&conn).await, None);
        assert_eq!(registry.count().await, 1);

        registry.associate(&conn, &project("P2")).await.unwrap();
        assert_eq!(registry.deregister(&conn).await, Some(project("P2")));
        assert_eq!(registry.deregister(&conn).await, None);
        assert_eq!(registry.count().await, 0);
    }
}
