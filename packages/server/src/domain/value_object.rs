//! Value Objects
//!
//! 識別子や境界値を検証済みの newtype として表現します。
//! 生成は `new` / `TryFrom` 経由でのみ行い、検証に失敗した値は存在できません。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

const PROJECT_ID_MAX_LEN: usize = 128;
const PARTICIPANT_ID_MAX_LEN: usize = 128;
const DISPLAY_NAME_MAX_LEN: usize = 64;
const AVATAR_REF_MAX_LEN: usize = 2048;
const TOOL_NAME_MAX_LEN: usize = 64;
const ELEMENT_ID_MAX_LEN: usize = 256;
const CHAT_TEXT_MAX_LEN: usize = 2000;
const UPDATE_TYPE_MAX_LEN: usize = 64;

fn validate_text(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(ValueObjectError::TooLong {
            field,
            max: max_len,
            actual: len,
        });
    }
    Ok(())
}

/// 文字列ベースの Value Object を定義するマクロ
macro_rules! text_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_text($field, &value, $max)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_value_object!(
    /// プロジェクト識別子（Room のキー）
    ProjectId,
    "projectId",
    PROJECT_ID_MAX_LEN
);

text_value_object!(
    /// 論理ユーザーの識別子。同じユーザーが複数接続から参加できる
    ParticipantId,
    "participant.id",
    PARTICIPANT_ID_MAX_LEN
);

text_value_object!(
    /// 表示名
    DisplayName,
    "participant.name",
    DISPLAY_NAME_MAX_LEN
);

text_value_object!(
    /// アバター画像への参照（URL など）
    AvatarRef,
    "participant.avatar",
    AVATAR_REF_MAX_LEN
);

text_value_object!(
    /// ツール名（"pen", "measure" など）
    ToolName,
    "tool",
    TOOL_NAME_MAX_LEN
);

text_value_object!(
    /// 選択中の要素への参照
    ElementId,
    "elementId",
    ELEMENT_ID_MAX_LEN
);

text_value_object!(
    /// チャット本文
    ChatText,
    "message",
    CHAT_TEXT_MAX_LEN
);

text_value_object!(
    /// design-update の種別（opaque）
    UpdateType,
    "updateType",
    UPDATE_TYPE_MAX_LEN
);

/// 接続識別子
///
/// Connection Registry が接続ごとに払い出す。同じ論理ユーザーでも接続ごとに別の値になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい一意な ConnectionId を生成（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("connectionId"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 参加者のロール（閉じた集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Designer,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Designer => "designer",
            Role::Administrator => "administrator",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "client" => Ok(Role::Client),
            "designer" => Ok(Role::Designer),
            "administrator" => Ok(Role::Administrator),
            other => Err(ValueObjectError::UnknownVariant {
                field: "participant.role",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 表示モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    TwoD,
    ThreeD,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::TwoD => "2d",
            ViewMode::ThreeD => "3d",
        }
    }
}

impl TryFrom<&str> for ViewMode {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "2d" => Ok(ViewMode::TwoD),
            "3d" => Ok(ViewMode::ThreeD),
            other => Err(ValueObjectError::UnknownVariant {
                field: "viewMode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ズーム倍率（有限かつ正の実数）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel(f64);

impl ZoomLevel {
    pub fn new(value: f64) -> Result<Self, ValueObjectError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValueObjectError::OutOfRange {
                field: "zoomLevel",
                value,
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(1.0)
    }
}

/// カーソル位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPosition {
    x: f64,
    y: f64,
}

impl CursorPosition {
    pub fn new(x: f64, y: f64) -> Result<Self, ValueObjectError> {
        if !x.is_finite() {
            return Err(ValueObjectError::OutOfRange { field: "x", value: x });
        }
        if !y.is_finite() {
            return Err(ValueObjectError::OutOfRange { field: "y", value: y });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// Unix epoch ミリ秒（UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
