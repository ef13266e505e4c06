//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//! 将来クラスタ構成で共有ストアに差し替える場合も、UseCase 層は変更不要です。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ProjectId, RepositoryError, Room, Timestamp};

/// Room ごとのロック付きハンドル
///
/// 変更とファンアウトはこのロックを保持したまま行う。
/// ロック順序は常に「Store のマップ → Room」。
pub type SharedRoom = Arc<Mutex<Room>>;

/// Room Store
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を取得し、なければ既定の共有状態で作成
    async fn get_or_create(&self, project_id: &ProjectId, now: Timestamp) -> SharedRoom;

    /// 作成せずに Room を取得
    async fn get(&self, project_id: &ProjectId) -> Option<SharedRoom>;

    /// 参加者が 0 人の Room を削除し、close 済みにする
    ///
    /// 参加者が残っている場合や Room が存在しない場合は何もしない。
    ///
    /// # Returns
    ///
    /// 削除した場合 `true`
    async fn remove(&self, project_id: &ProjectId) -> bool;

    /// Room のスナップショットを取得
    async fn snapshot(&self, project_id: &ProjectId) -> Result<Room, RepositoryError>;

    /// 全 Room のスナップショット（project_id 順）
    async fn list(&self) -> Vec<Room>;

    /// 存在する Room の数
    async fn count(&self) -> usize;
}
