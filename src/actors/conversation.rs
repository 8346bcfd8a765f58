use crate::actors::transcript::Render;
use crate::engine::message::{InputKind, Message as ChatMessage};
use crate::engine::session::{Delivery, Session};
use crate::engine::state::ConversationState;
use actix::prelude::*;

/// Delivers the greeting and menu. Resolves to the number of messages sent.
#[derive(Message)]
#[rtype(result = "usize")]
pub struct Open;

#[derive(Message)]
#[rtype(result = "usize")]
pub struct SubmitInput(pub String);

#[derive(Message)]
#[rtype(result = "usize")]
pub struct Restart;

#[derive(Message)]
#[rtype(result = "usize")]
pub struct BackToMenu;

#[derive(Message)]
#[rtype(result = "Vec<ChatMessage>")]
pub struct GetTranscript;

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub state: ConversationState,
    pub expected_input: Option<InputKind>,
    pub options: Option<Vec<String>>,
}

impl Status {
    pub fn is_finished(&self) -> bool {
        self.state == ConversationState::ConversationEnd
    }
}

#[derive(Message)]
#[rtype(result = "Status")]
pub struct GetStatus;

/// Owns one session. Each request's replies are delivered in full, delays
/// included, before the mailbox hands over the next request.
pub struct ConversationActor {
    session: Session,
    output: Recipient<Render>,
    paced: bool,
}

impl ConversationActor {
    pub fn new(session: Session, output: Recipient<Render>) -> Self {
        Self {
            session,
            output,
            paced: true,
        }
    }

    /// Skip the reply delays. Order is unaffected.
    pub fn without_delays(mut self) -> Self {
        self.paced = false;
        self
    }

    fn deliver(&self, deliveries: Vec<Delivery>) -> AtomicResponse<Self, usize> {
        let output = self.output.clone();
        let paced = self.paced;

        AtomicResponse::new(Box::pin(
            async move {
                let count = deliveries.len();
                for delivery in deliveries {
                    if paced && !delivery.delay.is_zero() {
                        actix_rt::time::sleep(delivery.delay).await;
                    }
                    if let Err(e) = output.send(Render(delivery.message)).await {
                        log::error!("Mailbox error delivering message to renderer: {}", e);
                    }
                }
                count
            }
            .into_actor(self),
        ))
    }
}

impl Actor for ConversationActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        log::debug!("Conversation {} started", self.session.id());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        log::debug!(
            "Conversation {} stopped in {} after {} messages",
            self.session.id(),
            self.session.state(),
            self.session.transcript().len()
        );
    }
}

impl Handler<Open> for ConversationActor {
    type Result = AtomicResponse<Self, usize>;

    fn handle(&mut self, _msg: Open, _ctx: &mut Self::Context) -> Self::Result {
        let deliveries = self.session.open();
        self.deliver(deliveries)
    }
}

impl Handler<SubmitInput> for ConversationActor {
    type Result = AtomicResponse<Self, usize>;

    fn handle(&mut self, msg: SubmitInput, _ctx: &mut Self::Context) -> Self::Result {
        let deliveries = self.session.submit(&msg.0);
        self.deliver(deliveries)
    }
}

impl Handler<Restart> for ConversationActor {
    type Result = AtomicResponse<Self, usize>;

    fn handle(&mut self, _msg: Restart, _ctx: &mut Self::Context) -> Self::Result {
        let deliveries = self.session.restart();
        self.deliver(deliveries)
    }
}

impl Handler<BackToMenu> for ConversationActor {
    type Result = AtomicResponse<Self, usize>;

    fn handle(&mut self, _msg: BackToMenu, _ctx: &mut Self::Context) -> Self::Result {
        let deliveries = self.session.back_to_menu();
        self.deliver(deliveries)
    }
}

impl Handler<GetTranscript> for ConversationActor {
    type Result = MessageResult<GetTranscript>;

    fn handle(&mut self, _msg: GetTranscript, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.session.transcript().to_vec())
    }
}

impl Handler<GetStatus> for ConversationActor {
    type Result = MessageResult<GetStatus>;

    fn handle(&mut self, _msg: GetStatus, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(Status {
            state: self.session.state(),
            expected_input: self.session.expected_input(),
            options: self.session.current_options().map(<[String]>::to_vec),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Timing;
    use crate::engine::runner::DialogEngine;
    use crate::script::Locale;
    use crate::script::parser::ScriptRegistry;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Records what reaches it, with arrival times.
    struct Collector {
        seen: Arc<Mutex<Vec<(Instant, ChatMessage)>>>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<Render> for Collector {
        type Result = ();

        fn handle(&mut self, msg: Render, _ctx: &mut Context<Self>) {
            self.seen.lock().unwrap().push((Instant::now(), msg.0));
        }
    }

    fn start(timing: Timing) -> (Addr<ConversationActor>, Arc<Mutex<Vec<(Instant, ChatMessage)>>>) {
        let script = ScriptRegistry::bundled().unwrap().get(Locale::En).unwrap();
        let session = Session::new(DialogEngine::new(script, timing));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let collector = Collector { seen: seen.clone() }.start();
        let addr = ConversationActor::new(session, collector.recipient()).start();
        (addr, seen)
    }

    #[actix_rt::test]
    async fn test_open_delivers_greeting_and_menu() {
        let (addr, seen) = start(Timing::immediate());
        assert_eq!(addr.send(Open).await.unwrap(), 2);
        assert_eq!(addr.send(Open).await.unwrap(), 0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].1.options.as_ref().map(Vec::len), Some(5));
    }

    #[actix_rt::test]
    async fn test_delayed_replies_arrive_in_order_before_next_input() {
        let (addr, seen) = start(Timing::from_millis(10, 30));
        addr.send(Open).await.unwrap();
        addr.send(SubmitInput("2".to_string())).await.unwrap();
        addr.send(SubmitInput("1".to_string())).await.unwrap();

        // Both sent without waiting: the second must not overtake the survey reveal.
        let goodbye = addr.send(SubmitInput("Yes, thank you".to_string()));
        let rating = addr.send(SubmitInput("4".to_string()));
        assert_eq!(goodbye.await.unwrap(), 3);
        assert_eq!(rating.await.unwrap(), 1);

        let seen = seen.lock().unwrap();
        let ids: Vec<u64> = seen.iter().map(|(_, m)| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);

        let tail: Vec<&(Instant, ChatMessage)> = seen.iter().rev().take(4).collect();
        let (resolved_at, resolved) = tail[0];
        let (first_at, goodbye) = tail[3];
        assert!(goodbye.text.contains("Goodbye"));
        assert!(resolved.text.contains("resolved"));
        assert!(resolved_at.duration_since(*first_at) >= Duration::from_millis(60));
    }

    #[actix_rt::test]
    async fn test_status_and_transcript() {
        let (addr, _seen) = start(Timing::immediate());
        addr.send(Open).await.unwrap();
        addr.send(SubmitInput("Urgent Assistance".to_string())).await.unwrap();

        let status = addr.send(GetStatus).await.unwrap();
        assert_eq!(status.state, ConversationState::UrgentAuthEmail);
        assert_eq!(status.expected_input, Some(InputKind::Text));
        assert!(!status.is_finished());

        let transcript = addr.send(GetTranscript).await.unwrap();
        assert_eq!(transcript.len(), 4);
    }

    #[actix_rt::test]
    async fn test_status_reports_finished_conversation() {
        let (addr, _seen) = start(Timing::immediate());
        addr.send(Open).await.unwrap();
        for input in ["5", "contact", "skip"] {
            addr.send(SubmitInput(input.to_string())).await.unwrap();
        }

        let status = addr.send(GetStatus).await.unwrap();
        assert!(status.is_finished());
        assert_eq!(status.options, Some(vec!["Restart".to_string()]));

        addr.send(SubmitInput("Restart".to_string())).await.unwrap();
        assert!(!addr.send(GetStatus).await.unwrap().is_finished());
    }

    #[actix_rt::test]
    async fn test_restart_and_menu_requests() {
        let (addr, _seen) = start(Timing::immediate());
        addr.send(Open).await.unwrap();
        addr.send(SubmitInput("3".to_string())).await.unwrap();

        assert_eq!(addr.send(BackToMenu).await.unwrap(), 2);
        assert_eq!(addr.send(GetTranscript).await.unwrap().len(), 6);

        assert_eq!(addr.send(Restart).await.unwrap(), 2);
        assert_eq!(addr.send(GetTranscript).await.unwrap().len(), 2);
        assert_eq!(addr.send(GetStatus).await.unwrap().state, ConversationState::Initial);
    }

    #[actix_rt::test]
    async fn test_without_delays_still_orders() {
        let script = ScriptRegistry::bundled().unwrap().get(Locale::En).unwrap();
        let session = Session::new(DialogEngine::new(script, Timing::from_millis(5_000, 5_000)));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let collector = Collector { seen: seen.clone() }.start();
        let addr = ConversationActor::new(session, collector.recipient())
            .without_delays()
            .start();

        let started = Instant::now();
        addr.send(Open).await.unwrap();
        addr.send(SubmitInput("4".to_string())).await.unwrap();
        addr.send(SubmitInput("1".to_string())).await.unwrap();
        addr.send(SubmitInput("yes".to_string())).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(seen.lock().unwrap().len(), 2 + 1 + 2 + 3);
    }
}
