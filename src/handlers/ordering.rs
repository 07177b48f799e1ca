// src/handlers/ordering.rs
use crate::error::AppError;
use crate::models::ordering::{
    is_terminal_order_status, is_valid_order_status, AddMenuItemRequest, CreateRestaurantRequest,
    MenuItem, Order, OrderDetail, OrderItem, PlaceOrderRequest, PlaceOrderResponse, Restaurant,
    UpdateOrderStatusRequest,
};
use crate::services::ordering::order_total;
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::{get, post, Router},
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

pub fn ordering_routes() -> Router {
    Router::new()
        .route("/restaurants", post(create_restaurant))
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/:id", get(get_restaurant))
        .route("/restaurants/:id/menu", post(add_menu_item))
        .route("/restaurants/:id/menu", get(list_menu))
        .route("/orders", post(place_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", post(update_order_status))
        .route("/users/:id/orders", get(list_user_orders))
}

async fn create_restaurant(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<Json<Restaurant>, AppError> {
    if payload.name.trim().is_empty() || payload.cuisine.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "name and cuisine are required".to_string(),
        ));
    }

    let restaurant = sqlx::query_as::<_, Restaurant>(
        "INSERT INTO restaurants (name, cuisine, description, created_at, updated_at) \
         VALUES ($1, $2, $3, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.cuisine)
    .bind(&payload.description)
    .fetch_one(&state.db_pool)
    .await?;

    tracing::info!(restaurant_id = restaurant.id, "restaurant created");

    Ok(Json(restaurant))
}

async fn list_restaurants(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    let restaurants = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY id")
        .fetch_all(&state.db_pool)
        .await?;

    Ok(Json(restaurants))
}

async fn get_restaurant(
    Extension(state): Extension<Arc<AppState>>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<Restaurant>, AppError> {
    let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
        .bind(restaurant_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

    Ok(Json(restaurant))
}

async fn add_menu_item(
    Extension(state): Extension<Arc<AppState>>,
    Path(restaurant_id): Path<i32>,
    Json(payload): Json<AddMenuItemRequest>,
) -> Result<Json<MenuItem>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()));
    }
    if payload.price_eur < Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "price_eur must be non-negative".to_string(),
        ));
    }

    let restaurant = sqlx::query_as::<_, (i32,)>("SELECT id FROM restaurants WHERE id = $1")
        .bind(restaurant_id)
        .fetch_optional(&state.db_pool)
        .await?;

    if restaurant.is_none() {
        return Err(AppError::NotFound("Restaurant not found".to_string()));
    }

    let item = sqlx::query_as::<_, MenuItem>(
        "INSERT INTO menu_items (restaurant_id, name, price_eur, available, created_at, updated_at) \
         VALUES ($1, $2, $3, TRUE, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(restaurant_id)
    .bind(&payload.name)
    .bind(payload.price_eur)
    .fetch_one(&state.db_pool)
    .await?;

    Ok(Json(item))
}

async fn list_menu(
    Extension(state): Extension<Arc<AppState>>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    let restaurant = sqlx::query_as::<_, (i32,)>("SELECT id FROM restaurants WHERE id = $1")
        .bind(restaurant_id)
        .fetch_optional(&state.db_pool)
        .await?;

    if restaurant.is_none() {
        return Err(AppError::NotFound("Restaurant not found".to_string()));
    }

    let items = sqlx::query_as::<_, MenuItem>(
        "SELECT * FROM menu_items WHERE restaurant_id = $1 ORDER BY id",
    )
    .bind(restaurant_id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(items))
}

async fn place_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::InvalidInput(
            "order must contain at least one item".to_string(),
        ));
    }
    if payload.items.iter().any(|line| line.quantity < 1) {
        return Err(AppError::InvalidInput(
            "item quantities must be at least 1".to_string(),
        ));
    }

    let customer = sqlx::query_as::<_, (i32,)>(
        "SELECT id FROM users WHERE id = $1 AND role = 'customer'",
    )
    .bind(payload.customer_id)
    .fetch_optional(&state.db_pool)
    .await?;

    if customer.is_none() {
        return Err(AppError::NotFound("Customer not found".to_string()));
    }

    let restaurant = sqlx::query_as::<_, (i32,)>("SELECT id FROM restaurants WHERE id = $1")
        .bind(payload.restaurant_id)
        .fetch_optional(&state.db_pool)
        .await?;

    if restaurant.is_none() {
        return Err(AppError::NotFound("Restaurant not found".to_string()));
    }

    let item_ids: Vec<i32> = payload.items.iter().map(|line| line.menu_item_id).collect();
    let menu_items = sqlx::query_as::<_, MenuItem>(
        "SELECT * FROM menu_items WHERE id = ANY($1) AND restaurant_id = $2",
    )
    .bind(&item_ids)
    .bind(payload.restaurant_id)
    .fetch_all(&state.db_pool)
    .await?;

    let by_id: HashMap<i32, &MenuItem> = menu_items.iter().map(|item| (item.id, item)).collect();

    let mut lines: Vec<(Decimal, i64)> = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let Some(item) = by_id.get(&line.menu_item_id) else {
            return Err(AppError::InvalidInput(format!(
                "menu item {} does not belong to this restaurant",
                line.menu_item_id
            )));
        };
        if !item.available {
            return Err(AppError::InvalidInput(format!(
                "menu item '{}' is not available",
                item.name
            )));
        }
        lines.push((item.price_eur, line.quantity));
    }

    let total = order_total(&lines);

    let mut tx = state.db_pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (customer_id, restaurant_id, status, total_eur, created_at, updated_at) \
         VALUES ($1, $2, 'placed', $3, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(payload.customer_id)
    .bind(payload.restaurant_id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        // Unit price snapshot, so menu edits never reprice a placed order.
        let price = by_id[&line.menu_item_id].price_eur;
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (order_id, menu_item_id, quantity, price_eur) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(order.id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .bind(price)
        .fetch_one(&mut *tx)
        .await?;
        items.push(item);
    }

    tx.commit().await?;

    tracing::info!(
        order_id = order.id,
        customer_id = order.customer_id,
        total = %order.total_eur,
        "order placed"
    );

    Ok(Json(PlaceOrderResponse {
        order_id: order.id,
        order: OrderDetail { order, items },
    }))
}

async fn get_order(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderDetail>, AppError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(OrderDetail { order, items }))
}

async fn update_order_status(
    Extension(state): Extension<Arc<AppState>>,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, AppError> {
    if !is_valid_order_status(&payload.status) {
        return Err(AppError::InvalidInput(format!(
            "status must be one of: {}",
            crate::models::ordering::ORDER_STATUSES.join(", ")
        )));
    }

    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if is_terminal_order_status(&order.status) {
        return Err(AppError::InvalidInput(format!(
            "order is already {}",
            order.status
        )));
    }

    let updated = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(&payload.status)
    .fetch_one(&state.db_pool)
    .await?;

    tracing::info!(order_id = order_id, status = %updated.status, "order status updated");

    Ok(Json(updated))
}

async fn list_user_orders(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Order>>, AppError> {
    let user = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db_pool)
        .await?;

    if user.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(orders))
}
