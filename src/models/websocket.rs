use serde::{ Serialize, Deserialize };

#[derive(Serialize, Deserialize, Debug)]
pub struct ClientMessage {
    pub message: String,
}

/// Avatar expression sent along with each reply.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Happy,
    Sad,
    Neutral,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServerMessage {
    pub text: String,
    pub expression: Expression,
    pub timestamp: i64,
}
