use crate::engine::message::{InputKind, Message, Reply, Sender};
use crate::engine::record::UserRecord;
use crate::engine::runner::{DialogEngine, Reset, Step};
use crate::engine::state::ConversationState;
use chrono::{DateTime, Local, TimeDelta};
use std::time::Duration;
use uuid::Uuid;

/// A message ready to show, and how long to wait after the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub delay: Duration,
    pub message: Message,
}

/// One conversation. Owns everything that changes while the user talks; the
/// engine and its script are shared and read-only.
pub struct Session {
    id: Uuid,
    engine: DialogEngine,
    state: ConversationState,
    record: UserRecord,
    transcript: Vec<Message>,
    next_id: u64,
    expected_input: Option<InputKind>,
}

impl Session {
    pub fn new(engine: DialogEngine) -> Self {
        Session {
            id: Uuid::new_v4(),
            engine,
            state: ConversationState::Initial,
            record: UserRecord::default(),
            transcript: Vec::new(),
            next_id: 1,
            expected_input: None,
        }
    }

    /// Greeting and menu. Only the first call produces anything.
    pub fn open(&mut self) -> Vec<Delivery> {
        if !self.transcript.is_empty() {
            return Vec::new();
        }
        log::debug!("[{}] session opened", self.short_id());
        let replies = self.engine.opening();
        self.emit(replies)
    }

    pub fn submit(&mut self, input: &str) -> Vec<Delivery> {
        let text = input.trim();
        if !text.is_empty() {
            let message = Message {
                id: self.take_id(),
                text: text.to_string(),
                sender: Sender::User,
                timestamp: Local::now(),
                options: None,
                input_kind: None,
                calendar: false,
            };
            self.transcript.push(message);
        }

        let step = self
            .engine
            .advance(self.state, &self.record, input, Local::now().date_naive());
        self.apply(step)
    }

    pub fn restart(&mut self) -> Vec<Delivery> {
        let step = self.engine.restart();
        self.apply(step)
    }

    pub fn back_to_menu(&mut self) -> Vec<Delivery> {
        let step = self.engine.back_to_menu();
        self.apply(step)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Input affordance asked for by the latest bot message.
    pub fn expected_input(&self) -> Option<InputKind> {
        self.expected_input
    }

    /// Options of the latest bot message, if it offered any.
    pub fn current_options(&self) -> Option<&[String]> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Bot)
            .and_then(|m| m.options.as_deref())
    }

    fn apply(&mut self, step: Step) -> Vec<Delivery> {
        match step.reset {
            Some(Reset::Restart) => {
                if self.record.is_empty() {
                    log::info!("[{}] restarting conversation", self.short_id());
                } else {
                    log::info!("[{}] restarting conversation, discarding collected details", self.short_id());
                }
                self.transcript.clear();
                self.expected_input = None;
            }
            Some(Reset::Menu) => {
                log::info!("[{}] back to menu", self.short_id());
                self.expected_input = None;
            }
            None => {}
        }

        if step.state != self.state {
            log::debug!("[{}] {} -> {}", self.short_id(), self.state, step.state);
        }
        self.state = step.state;
        self.record = step.record;
        self.emit(step.replies)
    }

    fn emit(&mut self, replies: Vec<Reply>) -> Vec<Delivery> {
        let now = Local::now();
        let mut elapsed = Duration::ZERO;
        let mut deliveries = Vec::with_capacity(replies.len());

        for reply in replies {
            elapsed += reply.delay;
            let message = Message {
                id: self.take_id(),
                text: reply.text,
                sender: Sender::Bot,
                timestamp: reveal_time(now, elapsed),
                options: reply.options,
                input_kind: reply.input_kind,
                calendar: reply.calendar,
            };
            self.expected_input = message.input_kind;
            self.transcript.push(message.clone());
            deliveries.push(Delivery {
                delay: reply.delay,
                message,
            });
        }
        deliveries
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

fn reveal_time(now: DateTime<Local>, elapsed: Duration) -> DateTime<Local> {
    match TimeDelta::from_std(elapsed) {
        Ok(delta) => now + delta,
        Err(_) => now,
    }
}
