pub mod conversation;
pub mod transcript;
