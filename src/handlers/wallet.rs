// src/handlers/wallet.rs
use crate::error::AppError;
use crate::models::payment::{TopUpRequest, TopUpResponse};
use crate::AppState;
use axum::{
    extract::Extension,
    response::Json,
    routing::{post, Router},
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn wallet_routes() -> Router {
    Router::new().route("/wallet/topup", post(wallet_topup))
}

async fn wallet_topup(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TopUpRequest>,
) -> Result<Json<TopUpResponse>, AppError> {
    if payload.amount_eur <= Decimal::ZERO {
        return Err(AppError::InvalidInput("Amount must be positive".to_string()));
    }

    let mut tx = state.db_pool.begin().await?;

    // In-database increment so concurrent top-ups cannot lose an update.
    let wallet = sqlx::query_as::<_, (Decimal,)>(
        "UPDATE users SET wallet_eur = round(wallet_eur + $2, 2), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING wallet_eur",
    )
    .bind(payload.user_id)
    .bind(payload.amount_eur)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    sqlx::query(
        "INSERT INTO payments (user_id, kind, amount_eur, created_at) \
         VALUES ($1, 'topup', $2, NOW())",
    )
    .bind(payload.user_id)
    .bind(payload.amount_eur)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = payload.user_id,
        amount = %payload.amount_eur,
        "wallet topped up"
    );

    Ok(Json(TopUpResponse { wallet_eur: wallet.0 }))
}
