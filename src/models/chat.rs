// src/models/chat.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A billable conversation between a creator and a customer.
///
/// Status moves `active -> ended` exactly once; `ended_at`, `total_minutes`
/// and `total_cost_eur` are written only on that transition and are
/// immutable afterwards. Sessions are never deleted.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: i32,
    pub creator_id: i32,
    pub customer_id: i32,
    pub status: String,
    pub rate_eur_per_min: Decimal,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_minutes: Option<i64>,
    pub total_cost_eur: Option<Decimal>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ChatSession {
    pub fn is_ended(&self) -> bool {
        self.status == "ended"
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i32,
    pub chat_id: i32,
    pub sender_id: i32,
    pub content: String,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct StartChatRequest {
    pub creator_id: i32,
    pub customer_id: i32,
}

#[derive(Debug, Serialize)]
pub struct StartChatResponse {
    pub chat_id: i32,
    pub chat: ChatSession,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: i32,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message_id: i32,
}
