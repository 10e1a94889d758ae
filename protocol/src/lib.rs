mod conversation_id;
pub use conversation_id::ConversationId;
pub mod send_event;
