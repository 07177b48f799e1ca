// src/models/payment.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Immutable ledger entry. `amount_eur` is positive for a credit to the
/// user and negative for a debit. Settlements produce two entries per chat,
/// equal in magnitude and opposite in sign.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i32,
    pub user_id: i32,
    pub kind: String, // topup or settlement
    pub amount_eur: Decimal,
    pub chat_id: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub user_id: i32,
    pub amount_eur: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TopUpResponse {
    pub wallet_eur: Decimal,
}
