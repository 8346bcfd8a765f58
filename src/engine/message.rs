use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
    User,
}

/// Which input affordance the renderer should offer after a bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Date,
    Rating,
    YesNo,
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_kind: Option<InputKind>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub calendar: bool,
}

/// A bot message as the engine produces it: no id or timestamp yet, plus the
/// delay to wait after the previous reply before revealing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub options: Option<Vec<String>>,
    pub input_kind: Option<InputKind>,
    pub calendar: bool,
    pub delay: Duration,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            options: None,
            input_kind: None,
            calendar: false,
            delay: Duration::ZERO,
        }
    }

    pub fn with_options(mut self, options: &[String]) -> Self {
        if !options.is_empty() {
            self.options = Some(options.to_vec());
        }
        self
    }

    pub fn expecting(mut self, kind: InputKind) -> Self {
        self.input_kind = Some(kind);
        self
    }

    pub fn with_calendar(mut self) -> Self {
        self.input_kind = Some(InputKind::Date);
        self.calendar = true;
        self
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_builder() {
        let reply = Reply::text("Pick one")
            .with_options(&["A".to_string(), "B".to_string()])
            .after(Duration::from_millis(5));
        assert_eq!(reply.options.as_ref().map(Vec::len), Some(2));
        assert_eq!(reply.delay, Duration::from_millis(5));
        assert!(!reply.calendar);
    }

    #[test]
    fn test_empty_options_stay_none() {
        let reply = Reply::text("Free text").with_options(&[]);
        assert!(reply.options.is_none());
    }

    #[test]
    fn test_calendar_implies_date_input() {
        let reply = Reply::text("When were you born?").with_calendar();
        assert_eq!(reply.input_kind, Some(InputKind::Date));
        assert!(reply.calendar);
    }

    #[test]
    fn test_message_json_omits_empty_fields() {
        let message = Message {
            id: 7,
            text: "hello".to_string(),
            sender: Sender::User,
            timestamp: Local::now(),
            options: None,
            input_kind: None,
            calendar: false,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["sender"], "user");
        assert!(json.get("options").is_none());
        assert!(json.get("calendar").is_none());
        assert!(json.get("inputKind").is_none());
    }
}
