use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    pub data: Value,
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn ok(data: Value, meta: ResponseMeta) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: None,
            hints: Vec::new(),
            data,
            meta,
        }
    }

    pub fn error(message: String, meta: ResponseMeta) -> Self {
        Self {
            status: CommandStatus::Error,
            hints: classify_error(&message),
            message: Some(message),
            data: Value::Null,
            meta,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct Hint {
    #[serde(rename = "type")]
    pub kind: HintKind,
    pub text: String,
}

#[derive(Debug, Serialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    Action,
    Warn,
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_classes: Option<usize>,
}

pub fn classify_error(message: &str) -> Vec<Hint> {
    let mut hints = Vec::new();

    if message.contains("is not a directory") {
        hints.push(Hint {
            kind: HintKind::Action,
            text: "Pass the project directory with --root.".to_string(),
        });
    }

    if message.contains("Invalid configuration") || message.contains("invalid glob") {
        hints.push(Hint {
            kind: HintKind::Action,
            text: "Fix classmap.toml at the project root, or delete it to use the defaults."
                .to_string(),
        });
    }

    if message.contains("not listed as a markup, stylesheet or script language") {
        hints.push(Hint {
            kind: HintKind::Warn,
            text: "Add the file extension to html_languages, css_languages or javascript_languages in classmap.toml.".to_string(),
        });
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_hints() {
        let response = CommandResponse::error(
            "Discovery failed: /tmp/gone is not a directory".to_string(),
            ResponseMeta::default(),
        );
        assert!(response.is_error());
        assert_eq!(response.hints.len(), 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["hints"][0]["type"], "action");
        assert!(json["meta"].as_object().unwrap().is_empty());
    }
}
