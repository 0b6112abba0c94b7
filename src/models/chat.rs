use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request. Message not found.";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Pulls the `message` string out of an arbitrary JSON body. Anything
    /// other than an object with a string `message` yields `None`.
    pub fn from_json(body: &JsonValue) -> Option<Self> {
        body.get("message")
            .and_then(JsonValue::as_str)
            .map(|message| Self { message: message.to_string() })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
