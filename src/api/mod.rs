pub mod client;
pub mod models;
pub mod response;
pub mod streaming;

pub use client::{ChatTransport, HttpChatTransport};
pub use models::RequestBody;
pub use response::{extract_content, parse_tool_calls};
