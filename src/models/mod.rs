mod conversation;
mod message;
mod tool;

pub use conversation::{Conversation, MAX_HISTORY_PAIRS};
pub use message::Message;
pub use tool::{FunctionCall, ToolCall};
