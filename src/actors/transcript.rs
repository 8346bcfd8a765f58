use crate::engine::message::{InputKind, Message as ChatMessage, Sender};
use actix::prelude::*;
use colored::*;
use std::io::Write;
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[derive(Message)]
#[rtype(result = "()")]
pub struct Render(pub ChatMessage);

/// Asks the renderer to flush whatever it buffered. Used as a barrier by
/// callers that need every earlier `Render` to be written.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Flush;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Terminal,
    JsonLines,
}

enum Sink {
    Stdout,
    #[cfg(test)]
    Buffer(Arc<Mutex<Vec<String>>>),
}

pub struct TranscriptRenderer {
    mode: RenderMode,
    sink: Sink,
}

impl TranscriptRenderer {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            sink: Sink::Stdout,
        }
    }

    /// A renderer that keeps lines in memory instead of printing them.
    #[cfg(test)]
    pub fn capturing(mode: RenderMode) -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let renderer = Self {
            mode,
            sink: Sink::Buffer(lines.clone()),
        };
        (renderer, lines)
    }

    fn write(&self, text: String) {
        match &self.sink {
            Sink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", text).and_then(|_| stdout.flush()) {
                    log::error!("Failed to write transcript line: {}", e);
                }
            }
            #[cfg(test)]
            Sink::Buffer(lines) => match lines.lock() {
                Ok(mut lines) => lines.push(text),
                Err(e) => log::error!("Transcript buffer poisoned: {}", e),
            },
        }
    }
}

impl Actor for TranscriptRenderer {
    type Context = Context<Self>;
}

impl Handler<Render> for TranscriptRenderer {
    type Result = ();

    fn handle(&mut self, msg: Render, _ctx: &mut Context<Self>) {
        let text = match self.mode {
            RenderMode::Terminal => format_terminal(&msg.0),
            RenderMode::JsonLines => match format_json(&msg.0) {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Could not serialise message {}: {}", msg.0.id, e);
                    return;
                }
            },
        };
        self.write(text);
    }
}

impl Handler<Flush> for TranscriptRenderer {
    type Result = ();

    fn handle(&mut self, _msg: Flush, _ctx: &mut Context<Self>) {
        if let Sink::Stdout = self.sink {
            let _ = std::io::stdout().flush();
        }
    }
}

pub fn format_json(message: &ChatMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Human-readable rendering: speaker, text, numbered options and a hint for
/// non-choice inputs.
pub fn format_terminal(message: &ChatMessage) -> String {
    let time = message.timestamp.format("%H:%M:%S").to_string();
    let mut out = match message.sender {
        Sender::Bot => format!("{} {} {}", time.dimmed(), "bot ›".cyan().bold(), message.text),
        Sender::User => format!("{} {} {}", time.dimmed(), "you ›".green().bold(), message.text),
    };

    if let Some(options) = &message.options {
        for (i, option) in options.iter().enumerate() {
            out.push_str(&format!("\n    {} {}", format!("{}.", i + 1).yellow(), option));
        }
    }

    let hint = match message.input_kind {
        Some(InputKind::Date) => Some("date of birth: YYYY-MM-DD, DD/MM/YYYY or DD-MM-YYYY"),
        Some(InputKind::Rating) => Some("1-5"),
        Some(InputKind::Text) if message.options.is_none() => Some("free text"),
        _ => None,
    };
    if let Some(hint) = hint {
        out.push_str(&format!("\n    {}", format!("({})", hint).dimmed()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn message(options: Option<Vec<String>>, input_kind: Option<InputKind>) -> ChatMessage {
        ChatMessage {
            id: 7,
            text: "Pick one".to_string(),
            sender: Sender::Bot,
            timestamp: Local::now(),
            options,
            input_kind,
            calendar: false,
        }
    }

    #[test]
    fn test_terminal_numbers_options() {
        colored::control::set_override(false);
        let text = format_terminal(&message(Some(vec!["Yes".to_string(), "No".to_string()]), None));
        assert!(text.contains("bot › Pick one"));
        assert!(text.contains("\n    1. Yes\n    2. No"));
    }

    #[test]
    fn test_terminal_hints() {
        colored::control::set_override(false);
        assert!(format_terminal(&message(None, Some(InputKind::Rating))).ends_with("(1-5)"));
        assert!(format_terminal(&message(None, Some(InputKind::Date))).contains("DD/MM/YYYY"));
        assert!(!format_terminal(&message(None, None)).contains('('));
    }

    #[test]
    fn test_json_line_shape() {
        let line = format_json(&message(Some(vec!["A".to_string()]), Some(InputKind::YesNo))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["sender"], "bot");
        assert_eq!(value["inputKind"], "yes_no");
        assert_eq!(value["options"][0], "A");
        assert!(value.get("calendar").is_none());
    }

    #[actix_rt::test]
    async fn test_renderer_writes_in_arrival_order() {
        let (renderer, lines) = TranscriptRenderer::capturing(RenderMode::JsonLines);
        let addr = renderer.start();
        for id in 1..=3 {
            let mut msg = message(None, None);
            msg.id = id;
            addr.send(Render(msg)).await.unwrap();
        }
        addr.send(Flush).await.unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"id\":1"));
        assert!(lines[2].contains("\"id\":3"));
    }
}
