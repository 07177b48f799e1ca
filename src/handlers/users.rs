// src/handlers/users.rs
use crate::error::AppError;
use crate::models::user::{SignupRequest, SignupResponse, User};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::{get, post, Router},
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn user_routes() -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/creators", get(list_creators))
}

async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    if payload.role != "creator" && payload.role != "customer" {
        return Err(AppError::InvalidInput(
            "role must be 'creator' or 'customer'".to_string(),
        ));
    }

    let rate = match payload.role.as_str() {
        "creator" => match payload.rate_eur_per_min {
            Some(rate) if rate >= Decimal::ZERO => Some(rate),
            _ => {
                return Err(AppError::InvalidInput(
                    "Creators must specify a non-negative rate_eur_per_min".to_string(),
                ));
            }
        },
        // Customers never carry a rate, even if one was sent.
        _ => None,
    };

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, role, rate_eur_per_min, wallet_eur, bio, avatar_url, created_at, updated_at) \
         VALUES ($1, $2, $3, 0, $4, $5, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.role)
    .bind(rate)
    .bind(&payload.bio)
    .bind(&payload.avatar_url)
    .fetch_one(&state.db_pool)
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "user created");

    Ok(Json(SignupResponse {
        user_id: user.id,
        user,
    }))
}

async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

async fn list_creators(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AppError> {
    let creators =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = 'creator' ORDER BY id")
            .fetch_all(&state.db_pool)
            .await?;

    Ok(Json(creators))
}
