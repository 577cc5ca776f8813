use serde::{Deserialize, Serialize};

/// Request body for proxying one message to the engine.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Request body for explicitly saving a conversation turn.
#[derive(Debug, Deserialize)]
pub struct SaveChatRequest {
    pub message: String,
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct SaveChatResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeleteChatResponse {
    pub message: &'static str,
}
