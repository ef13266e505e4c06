//! Terminal input parsing.
//!
//! Plain lines are chat. Lines starting with `/` are commands.

use crate::error::ClientError;

pub const HELP: &str = "\
Commands:
  /cursor <x> <y>          move your cursor
  /tool <name>             select a tool
  /select <id>|none        select an element (none clears)
  /view <zoom> <2d|3d>     change the shared view
  /design <type> [json]    send a design update
  /who                     list participants
  /state                   show the shared room state
  /leave                   leave the project
  /quit                    leave and exit
Anything else is sent as chat.";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Chat(String),
    Cursor { x: f64, y: f64 },
    Tool(String),
    Select(Option<String>),
    View { zoom_level: f64, view_mode: String },
    Design {
        update_type: String,
        update_data: serde_json::Value,
    },
    Who,
    State,
    Leave,
    Quit,
    Help,
}

pub fn parse_input(line: &str) -> Result<Input, ClientError> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Input::Chat(line.to_string()));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match (name, args.as_slice()) {
        ("cursor", [x, y]) => Ok(Input::Cursor {
            x: parse_number(x)?,
            y: parse_number(y)?,
        }),
        ("tool", [tool]) => Ok(Input::Tool(tool.to_string())),
        ("select", ["none"]) => Ok(Input::Select(None)),
        ("select", [element_id]) => Ok(Input::Select(Some(element_id.to_string()))),
        ("view", [zoom_level, view_mode]) => Ok(Input::View {
            zoom_level: parse_number(zoom_level)?,
            view_mode: view_mode.to_string(),
        }),
        ("design", [update_type, ..]) => {
            let data = rest[update_type.len()..].trim();
            let update_data = if data.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(data)
                    .map_err(|e| ClientError::InvalidCommand(format!("design data: {}", e)))?
            };
            Ok(Input::Design {
                update_type: update_type.to_string(),
                update_data,
            })
        }
        ("who", []) => Ok(Input::Who),
        ("state", []) => Ok(Input::State),
        ("leave", []) => Ok(Input::Leave),
        ("quit", []) | ("exit", []) => Ok(Input::Quit),
        ("help", []) => Ok(Input::Help),
        _ => Err(ClientError::InvalidCommand(line.to_string())),
    }
}

fn parse_number(value: &str) -> Result<f64, ClientError> {
    value
        .parse::<f64>()
        .map_err(|_| ClientError::InvalidCommand(format!("not a number: {}", value)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_line_is_chat() {
        // テスト項目: スラッシュで始まらない行はチャットになる
        assert_eq!(
            parse_input("hello world").unwrap(),
            Input::Chat("hello world".to_string())
        );
    }

    #[test]
    fn test_parse_cursor() {
        // テスト項目: /cursor は 2 つの数値を受け取る
        assert_eq!(
            parse_input("/cursor 10 -2.5").unwrap(),
            Input::Cursor { x: 10.0, y: -2.5 }
        );
        assert!(parse_input("/cursor 10").is_err());
        assert!(parse_input("/cursor a b").is_err());
    }

    #[test]
    fn test_parse_select_none_clears() {
        // テスト項目: /select none は選択解除になる
        assert_eq!(parse_input("/select none").unwrap(), Input::Select(None));
        assert_eq!(
            parse_input("/select wall-3").unwrap(),
            Input::Select(Some("wall-3".to_string()))
        );
    }

    #[test]
    fn test_parse_view() {
        // テスト項目: /view はズーム倍率と表示モードを受け取る
        assert_eq!(
            parse_input("/view 2 3d").unwrap(),
            Input::View {
                zoom_level: 2.0,
                view_mode: "3d".to_string()
            }
        );
    }

    #[test]
    fn test_parse_design_with_json() {
        // テスト項目: /design の残りは JSON として解釈される
        // given (前提条件):
        let line = r#"/design move {"id": "door-1", "dx": 4}"#;

        // when (操作):
        let input = parse_input(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            input,
            Input::Design {
                update_type: "move".to_string(),
                update_data: json!({"id": "door-1", "dx": 4}),
            }
        );
    }

    #[test]
    fn test_parse_design_rejects_bad_json() {
        // テスト項目: /design の JSON が不正な場合はエラー
        assert!(parse_input("/design move {oops").is_err());
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        // テスト項目: 未知のコマンドはエラー
        assert!(matches!(
            parse_input("/dance"),
            Err(ClientError::InvalidCommand(_))
        ));
        assert_eq!(parse_input("/quit").unwrap(), Input::Quit);
    }
}
