pub mod embedded_messages;
pub mod poll_manager;
