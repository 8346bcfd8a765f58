pub mod matcher;
pub mod message;
pub mod record;
pub mod runner;
pub mod session;
pub mod state;
pub mod table;
pub mod validate;


use std::time::Duration;

/// Pauses the engine asks for between replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Between "sending" and "sent" in the urgent email flow.
    pub send_delay: Duration,
    /// Before each staged survey message after goodbye.
    pub reveal_delay: Duration,
}

impl Timing {
    pub fn from_millis(send_delay_ms: u64, reveal_delay_ms: u64) -> Self {
        Timing {
            send_delay: Duration::from_millis(send_delay_ms),
            reveal_delay: Duration::from_millis(reveal_delay_ms),
        }
    }

    pub fn immediate() -> Self {
        Timing::from_millis(0, 0)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::from_millis(1000, 800)
    }
}
