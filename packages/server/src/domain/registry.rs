//! ConnectionRegistry trait 定義
//!
//! 「誰が接続しているか」の唯一の情報源。接続ごとに高々 1 つのプロジェクトを対応付けます。
//! Room の状態は変更しません。切断時の Room 後始末は呼び出し側 UseCase が
//! 戻り値のプロジェクトを Presence に渡して行います。

use async_trait::async_trait;

use super::{ConnectionId, ProjectId, RegistryError};

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 新しい接続を登録し、一意な接続 ID を払い出す
    async fn register(&self) -> ConnectionId;

    /// 接続をプロジェクトに対応付ける
    ///
    /// 同じプロジェクトへの再対応付けは何もしない。
    ///
    /// # Returns
    ///
    /// 別のプロジェクトに対応付いていた場合、その直前のプロジェクト
    async fn associate(
        &self,
        connection_id: &ConnectionId,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectId>, RegistryError>;

    /// 接続が対応付いているプロジェクト
    async fn project_of(&self, connection_id: &ConnectionId) -> Option<ProjectId>;

    /// 対応付けを解除（未対応付けなら何もしない）
    ///
    /// # Returns
    ///
    /// 解除したプロジェクト
    async fn dissociate(&self, connection_id: &ConnectionId) -> Option<ProjectId>;

    /// 接続を削除（対応付けも解除される）
    ///
    /// # Returns
    ///
    /// 削除時に対応付いていたプロジェクト
    async fn deregister(&self, connection_id: &ConnectionId) -> Option<ProjectId>;

    /// 登録済みの接続数
    async fn count(&self) -> usize;
}
