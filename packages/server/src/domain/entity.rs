//! Entities
//!
//! `Room` は 1 プロジェクト分の共有セッション状態を保持するドメインモデル。
//! 排他制御は持たない。呼び出し側（Repository が返す `SharedRoom`）のロックの下で操作される。

use std::collections::BTreeMap;

use super::{
    event::{ChatMessage, ClientEvent, EventPayload, FanOut},
    value_object::{
        AvatarRef, ConnectionId, CursorPosition, DisplayName, ElementId, ParticipantId, ProjectId,
        Role, Timestamp, ToolName, ViewMode, ZoomLevel,
    },
};

/// 参加者の識別情報スナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: DisplayName,
    pub role: Role,
    pub avatar: Option<AvatarRef>,
}

impl Participant {
    pub fn new(id: ParticipantId, name: DisplayName, role: Role, avatar: Option<AvatarRef>) -> Self {
        Self {
            id,
            name,
            role,
            avatar,
        }
    }
}

/// Room 内の 1 接続分のエントリ
///
/// 同じ論理ユーザーでも接続が異なれば別エントリになる（接続 ID でのみ一意）。
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub participant: Participant,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(connection_id: ConnectionId, participant: Participant, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            participant,
            joined_at,
        }
    }
}

/// Room 全体で共有される表示状態
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SharedViewState {
    pub selected_element: Option<ElementId>,
    pub zoom_level: ZoomLevel,
    pub view_mode: ViewMode,
}

/// プロジェクトごとのコラボレーションルーム
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub project_id: ProjectId,
    pub created_at: Timestamp,
    /// 参加順
    pub members: Vec<Member>,
    /// 使用されたツール（初回使用順、削除されない）
    pub active_tools: Vec<ToolName>,
    pub cursors: BTreeMap<ConnectionId, CursorPosition>,
    pub shared_state: SharedViewState,
    closed: bool,
}

impl Room {
    /// 既定の共有状態（zoom 1, 2d, 選択なし）で Room を作成
    pub fn new(project_id: ProjectId, created_at: Timestamp) -> Self {
        Self {
            project_id,
            created_at,
            members: Vec::new(),
            active_tools: Vec::new(),
            cursors: BTreeMap::new(),
            shared_state: SharedViewState::default(),
            closed: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| &m.connection_id == connection_id)
    }

    pub fn has_member(&self, connection_id: &ConnectionId) -> bool {
        self.member(connection_id).is_some()
    }

    /// 参加者を追加
    ///
    /// 同じ接続 ID のエントリが既にあれば何もしない（既存の識別情報を維持）。
    ///
    /// # Returns
    ///
    /// 新規に追加された場合 `true`
    pub fn add_member(&mut self, member: Member) -> bool {
        if self.has_member(&member.connection_id) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// 接続 ID に一致する参加者とそのカーソル位置を削除
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection_id)?;
        self.cursors.remove(connection_id);
        Some(self.members.remove(index))
    }

    /// 参加中の全接続 ID（参加順）
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.members
            .iter()
            .map(|m| m.connection_id.clone())
            .collect()
    }

    /// ファンアウト先を決定
    pub fn fan_out_targets(&self, origin: &ConnectionId, fan_out: FanOut) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|m| match fan_out {
                FanOut::All => true,
                FanOut::Others => &m.connection_id != origin,
            })
            .map(|m| m.connection_id.clone())
            .collect()
    }

    /// 参加者からのイベントを Room に適用し、ファンアウトするペイロードを返す
    ///
    /// 送信元が参加者でなければ何も変更せず `None` を返す。
    pub fn apply(
        &mut self,
        origin: &ConnectionId,
        event: ClientEvent,
        now: Timestamp,
    ) -> Option<EventPayload> {
        let sender = self.member(origin)?.participant.clone();

        let payload = match event {
            ClientEvent::CursorMove(position) => {
                self.cursors.insert(origin.clone(), position);
                EventPayload::CursorMoved(position)
            }
            ClientEvent::ToolSelect(tool) => {
                if !self.active_tools.contains(&tool) {
                    self.active_tools.push(tool.clone());
                }
                EventPayload::ToolSelected(tool)
            }
            ClientEvent::ElementSelect(element) => {
                self.shared_state.selected_element = element.clone();
                EventPayload::ElementSelected(element)
            }
            ClientEvent::ViewChange {
                zoom_level,
                view_mode,
            } => {
                self.shared_state.zoom_level = zoom_level;
                self.shared_state.view_mode = view_mode;
                EventPayload::ViewChanged {
                    zoom_level,
                    view_mode,
                }
            }
            ClientEvent::Chat(text) => EventPayload::ChatMessage(ChatMessage {
                sender,
                text,
                timestamp: now,
            }),
            ClientEvent::DesignUpdate {
                update_type,
                update_data,
            } => EventPayload::DesignUpdate {
                update_type,
                update_data,
            },
        };

        Some(payload)
    }

    /// Store から取り除かれたことを記録
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Store から取り除かれた Room か
    ///
    /// 取り除かれる前にハンドルを取得していた操作はこれを見て処理を打ち切る。
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id.to_string()).unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn member(connection: &str, user: &str) -> Member {
        Member::new(
            conn(connection),
            Participant::new(
                ParticipantId::new(user.to_string()).unwrap(),
                DisplayName::new(user.to_uppercase()).unwrap(),
                Role::Designer,
                None,
            ),
            Timestamp::new(1000),
        )
    }

    fn room_with(members: &[(&str, &str)]) -> Room {
        let mut room = Room::new(project("P1"), Timestamp::new(0));
        for (c, u) in members {
            room.add_member(member(c, u));
        }
        room
    }

    #[test]
    fn test_new_room_has_default_shared_state() {
        // テスト項目: 新しい Room は既定の共有状態を持つ
        // given / when:
        let room = Room::new(project("P1"), Timestamp::new(0));

        // then (期待する結果):
        assert!(room.is_empty());
        assert!(room.active_tools.is_empty());
        assert!(room.cursors.is_empty());
        assert_eq!(room.shared_state.zoom_level.value(), 1.0);
        assert_eq!(room.shared_state.view_mode, ViewMode::TwoD);
        assert_eq!(room.shared_state.selected_element, None);
        assert!(!room.is_closed());
    }

    #[test]
    fn test_add_member_is_idempotent_per_connection() {
        // テスト項目: 同じ接続 ID での再追加は重複しない
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice")]);

        // when (操作):
        let added = room.add_member(member("c1", "alice"));

        // then (期待する結果):
        assert!(!added);
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_same_user_from_two_connections_gets_two_entries() {
        // テスト項目: 同じユーザーでも接続が異なれば別エントリになる
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice")]);

        // when (操作):
        let added = room.add_member(member("c2", "alice"));

        // then (期待する結果):
        assert!(added);
        assert_eq!(room.member_count(), 2);
    }

    #[test]
    fn test_remove_member_drops_cursor() {
        // テスト項目: 参加者削除時にカーソル位置も削除される
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice"), ("c2", "bob")]);
        room.apply(
            &conn("c1"),
            ClientEvent::CursorMove(CursorPosition::new(1.0, 2.0).unwrap()),
            Timestamp::new(5),
        );

        // when (操作):
        let removed = room.remove_member(&conn("c1"));

        // then (期待する結果):
        assert_eq!(removed.map(|m| m.participant.id.into_string()), Some("alice".to_string()));
        assert!(!room.cursors.contains_key(&conn("c1")));
        assert_eq!(room.connection_ids(), vec![conn("c2")]);
    }

    #[test]
    fn test_remove_unknown_member_is_noop() {
        // テスト項目: 存在しない接続の削除は何もしない
        let mut room = room_with(&[("c1", "alice")]);
        assert_eq!(room.remove_member(&conn("zzz")), None);
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_fan_out_targets() {
        // テスト項目: Others は送信元を除き、All は送信元を含む
        // given (前提条件):
        let room = room_with(&[("c1", "alice"), ("c2", "bob"), ("c3", "carol")]);

        // when (操作):
        let others = room.fan_out_targets(&conn("c1"), FanOut::Others);
        let all = room.fan_out_targets(&conn("c1"), FanOut::All);

        // then (期待する結果):
        assert_eq!(others, vec![conn("c2"), conn("c3")]);
        assert_eq!(all, vec![conn("c1"), conn("c2"), conn("c3")]);
    }

    #[test]
    fn test_tool_select_never_removes_tools() {
        // テスト項目: ツール集合は単調増加し、重複しない
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice")]);
        let pen = ToolName::new("pen".to_string()).unwrap();
        let measure = ToolName::new("measure".to_string()).unwrap();

        // when (操作):
        for tool in [pen.clone(), measure.clone(), pen.clone()] {
            room.apply(&conn("c1"), ClientEvent::ToolSelect(tool), Timestamp::new(1));
        }

        // then (期待する結果):
        assert_eq!(room.active_tools, vec![pen, measure]);
    }

    #[test]
    fn test_view_change_and_element_select_overwrite_shared_state() {
        // テスト項目: view-changed と element-selected が共有状態を上書きする
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice")]);
        let sofa = ElementId::new("sofa-1".to_string()).unwrap();

        // when (操作):
        room.apply(
            &conn("c1"),
            ClientEvent::ViewChange {
                zoom_level: ZoomLevel::new(2.0).unwrap(),
                view_mode: ViewMode::ThreeD,
            },
            Timestamp::new(1),
        );
        room.apply(&conn("c1"), ClientEvent::ElementSelect(Some(sofa.clone())), Timestamp::new(2));

        // then (期待する結果):
        assert_eq!(room.shared_state.zoom_level.value(), 2.0);
        assert_eq!(room.shared_state.view_mode, ViewMode::ThreeD);
        assert_eq!(room.shared_state.selected_element, Some(sofa));

        // 選択解除
        room.apply(&conn("c1"), ClientEvent::ElementSelect(None), Timestamp::new(3));
        assert_eq!(room.shared_state.selected_element, None);
    }

    #[test]
    fn test_chat_uses_roster_identity_and_mutates_nothing() {
        // テスト項目: チャットは Room の参加者情報を送信者とし、状態は変更しない
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice")]);
        let before = room.clone();
        let text = crate::domain::ChatText::new("hi".to_string()).unwrap();

        // when (操作):
        let payload = room.apply(&conn("c1"), ClientEvent::Chat(text), Timestamp::new(42));

        // then (期待する結果):
        match payload {
            Some(EventPayload::ChatMessage(chat)) => {
                assert_eq!(chat.sender.id.as_str(), "alice");
                assert_eq!(chat.text.as_str(), "hi");
                assert_eq!(chat.timestamp, Timestamp::new(42));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
        assert_eq!(room, before);
    }

    #[test]
    fn test_apply_from_non_member_is_rejected() {
        // テスト項目: 参加していない接続のイベントは適用されない
        // given (前提条件):
        let mut room = room_with(&[("c1", "alice")]);

        // when (操作):
        let payload = room.apply(
            &conn("stranger"),
            ClientEvent::CursorMove(CursorPosition::new(1.0, 1.0).unwrap()),
            Timestamp::new(1),
        );

        // then (期待する結果):
        assert!(payload.is_none());
        assert!(room.cursors.is_empty());
    }
}
