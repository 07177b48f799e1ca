// src/handlers/chats.rs
use crate::error::AppError;
use crate::models::chat::{
    ChatSession, Message, SendMessageRequest, SendMessageResponse, StartChatRequest,
    StartChatResponse,
};
use crate::models::user::User;
use crate::services::settlement;
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::{get, post, Router},
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn chat_routes() -> Router {
    Router::new()
        .route("/chats", post(start_chat))
        .route("/chats/:id/messages", get(list_messages))
        .route("/chats/:id/messages", post(send_message))
        .route("/chats/:id/end", post(end_chat))
}

async fn start_chat(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<StartChatRequest>,
) -> Result<Json<StartChatResponse>, AppError> {
    let creator =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND role = 'creator'")
            .bind(payload.creator_id)
            .fetch_optional(&state.db_pool)
            .await?;
    let customer =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND role = 'customer'")
            .bind(payload.customer_id)
            .fetch_optional(&state.db_pool)
            .await?;

    let (Some(creator), Some(_customer)) = (creator, customer) else {
        return Err(AppError::InvalidInput(
            "Invalid creator or customer".to_string(),
        ));
    };

    // Snapshot the creator's rate so later profile edits don't change the
    // billing of a running chat.
    let rate = creator.rate_eur_per_min.unwrap_or(Decimal::ZERO);

    let chat = sqlx::query_as::<_, ChatSession>(
        "INSERT INTO chats (creator_id, customer_id, status, rate_eur_per_min, started_at, created_at, updated_at) \
         VALUES ($1, $2, 'active', $3, NOW(), NOW(), NOW()) \
         RETURNING *",
    )
    .bind(payload.creator_id)
    .bind(payload.customer_id)
    .bind(rate)
    .fetch_one(&state.db_pool)
    .await?;

    tracing::info!(
        chat_id = chat.id,
        creator_id = chat.creator_id,
        customer_id = chat.customer_id,
        rate = %chat.rate_eur_per_min,
        "chat started"
    );

    Ok(Json(StartChatResponse {
        chat_id: chat.id,
        chat,
    }))
}

async fn list_messages(
    Extension(state): Extension<Arc<AppState>>,
    Path(chat_id): Path<i32>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE chat_id = $1 ORDER BY sent_at",
    )
    .bind(chat_id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(messages))
}

async fn send_message(
    Extension(state): Extension<Arc<AppState>>,
    Path(chat_id): Path<i32>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let chat = sqlx::query_as::<_, (i32,)>("SELECT id FROM chats WHERE id = $1")
        .bind(chat_id)
        .fetch_optional(&state.db_pool)
        .await?;

    if chat.is_none() {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    let message = sqlx::query_as::<_, (i32,)>(
        "INSERT INTO messages (chat_id, sender_id, content, sent_at) \
         VALUES ($1, $2, $3, NOW()) \
         RETURNING id",
    )
    .bind(chat_id)
    .bind(payload.sender_id)
    .bind(&payload.content)
    .fetch_one(&state.db_pool)
    .await?;

    Ok(Json(SendMessageResponse {
        message_id: message.0,
    }))
}

/// End a chat and settle it: debit the customer, credit the creator, record
/// the two ledger entries.
///
/// The transition is a conditional update that only matches while the chat
/// is still active, so of two concurrent end calls exactly one performs the
/// settlement; the other observes the already-ended chat and returns the
/// stored result. Calling end on an ended chat is a no-op.
async fn end_chat(
    Extension(state): Extension<Arc<AppState>>,
    Path(chat_id): Path<i32>,
) -> Result<Json<ChatSession>, AppError> {
    let chat = sqlx::query_as::<_, ChatSession>("SELECT * FROM chats WHERE id = $1")
        .bind(chat_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

    if chat.is_ended() {
        return Ok(Json(chat));
    }

    let creator = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(chat.creator_id)
        .fetch_optional(&state.db_pool)
        .await?;
    let customer = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(chat.customer_id)
        .fetch_optional(&state.db_pool)
        .await?;

    let (Some(creator), Some(customer)) = (creator, customer) else {
        return Err(AppError::InvalidInput(
            "Creator or customer not found".to_string(),
        ));
    };

    let now = Utc::now();
    let settled = settlement::settle(chat.started_at, chat.rate_eur_per_min, now);

    let mut tx = state.db_pool.begin().await?;

    // Claim the active -> ended transition. No match means another caller
    // already settled this chat.
    let ended = sqlx::query_as::<_, ChatSession>(
        "UPDATE chats \
         SET status = 'ended', ended_at = $2, total_minutes = $3, total_cost_eur = $4, updated_at = NOW() \
         WHERE id = $1 AND status = 'active' \
         RETURNING *",
    )
    .bind(chat_id)
    .bind(now)
    .bind(settled.minutes)
    .bind(settled.cost_eur)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(ended) = ended else {
        tx.rollback().await?;
        let chat = sqlx::query_as::<_, ChatSession>("SELECT * FROM chats WHERE id = $1")
            .bind(chat_id)
            .fetch_one(&state.db_pool)
            .await?;
        return Ok(Json(chat));
    };

    // Only the transition winner applies the wallet deltas. Debt is
    // permitted: the customer balance may go negative.
    sqlx::query(
        "UPDATE users SET wallet_eur = round(wallet_eur - $2, 2), updated_at = NOW() WHERE id = $1",
    )
    .bind(customer.id)
    .bind(settled.cost_eur)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE users SET wallet_eur = round(wallet_eur + $2, 2), updated_at = NOW() WHERE id = $1",
    )
    .bind(creator.id)
    .bind(settled.cost_eur)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO payments (user_id, kind, amount_eur, chat_id, created_at) \
         VALUES ($1, 'settlement', $2, $3, NOW())",
    )
    .bind(customer.id)
    .bind(-settled.cost_eur)
    .bind(chat_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO payments (user_id, kind, amount_eur, chat_id, created_at) \
         VALUES ($1, 'settlement', $2, $3, NOW())",
    )
    .bind(creator.id)
    .bind(settled.cost_eur)
    .bind(chat_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        chat_id = chat_id,
        minutes = settled.minutes,
        cost = %settled.cost_eur,
        "chat settled"
    );

    Ok(Json(ended))
}
