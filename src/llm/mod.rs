pub mod bounded;
pub mod json;
pub mod traits;
pub mod types;

pub use bounded::{BoundedReply, chat_within};
pub use json::{extract_json_object, parse_strict_json};
pub use traits::ChatClient;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, FinishReason, MessageRole, ToolCallRequest, ToolSpec,
};
