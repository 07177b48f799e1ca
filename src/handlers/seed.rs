// src/handlers/seed.rs
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::Extension,
    response::Json,
    routing::{post, Router},
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub fn seed_routes() -> Router {
    Router::new().route("/seed", post(seed_demo_data))
}

/// Insert demo creators and restaurants. Idempotent: if creators already
/// exist the seed is skipped entirely.
async fn seed_demo_data(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let creators = sqlx::query_as::<_, (i64,)>(
        "SELECT COUNT(*) FROM users WHERE role = 'creator'",
    )
    .fetch_one(&state.db_pool)
    .await?;

    if creators.0 > 0 {
        return Ok(Json(serde_json::json!({
            "message": "Seed data already exists"
        })));
    }

    let sample_creators: [(&str, Decimal, &str, &str); 3] = [
        (
            "Sophie",
            Decimal::new(120, 2),
            "Career coach and tech mentor",
            "https://images.unsplash.com/photo-1544005313-94ddf0286df2",
        ),
        (
            "Liam",
            Decimal::new(90, 2),
            "Fitness and wellbeing chat",
            "https://images.unsplash.com/photo-1500648767791-00dcc994a43e",
        ),
        (
            "Olivia",
            Decimal::new(150, 2),
            "Relationship advice and support",
            "https://images.unsplash.com/photo-1547425260-76bcadfb4f2c",
        ),
    ];

    let mut tx = state.db_pool.begin().await?;

    for (name, rate, bio, avatar_url) in sample_creators {
        sqlx::query(
            "INSERT INTO users (name, role, rate_eur_per_min, wallet_eur, bio, avatar_url, created_at, updated_at) \
             VALUES ($1, 'creator', $2, 0, $3, $4, NOW(), NOW())",
        )
        .bind(name)
        .bind(rate)
        .bind(bio)
        .bind(avatar_url)
        .execute(&mut *tx)
        .await?;
    }

    let sample_restaurants: [(&str, &str, &[(&str, Decimal)]); 2] = [
        (
            "Bella Napoli",
            "italian",
            &[
                ("Margherita", Decimal::new(850, 2)),
                ("Diavola", Decimal::new(1000, 2)),
            ],
        ),
        (
            "Saigon Street",
            "vietnamese",
            &[
                ("Pho Bo", Decimal::new(1120, 2)),
                ("Summer Rolls", Decimal::new(580, 2)),
            ],
        ),
    ];

    for (name, cuisine, menu) in sample_restaurants {
        let restaurant = sqlx::query_as::<_, (i32,)>(
            "INSERT INTO restaurants (name, cuisine, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) \
             RETURNING id",
        )
        .bind(name)
        .bind(cuisine)
        .fetch_one(&mut *tx)
        .await?;

        for (item_name, price) in menu.iter().copied() {
            sqlx::query(
                "INSERT INTO menu_items (restaurant_id, name, price_eur, available, created_at, updated_at) \
                 VALUES ($1, $2, $3, TRUE, NOW(), NOW())",
            )
            .bind(restaurant.0)
            .bind(item_name)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!("demo creators and restaurants seeded");

    Ok(Json(serde_json::json!({
        "message": "Creators seeded"
    })))
}
