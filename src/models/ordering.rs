// src/models/ordering.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ORDER_STATUSES: [&str; 4] = ["placed", "accepted", "delivered", "cancelled"];

pub fn is_valid_order_status(status: &str) -> bool {
    ORDER_STATUSES.contains(&status)
}

/// Delivered and cancelled orders cannot change status again.
pub fn is_terminal_order_status(status: &str) -> bool {
    status == "delivered" || status == "cancelled"
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub cuisine: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: i32,
    pub restaurant_id: i32,
    pub name: String,
    pub price_eur: Decimal,
    pub available: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    pub restaurant_id: i32,
    pub status: String,
    pub total_eur: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i64,
    pub price_eur: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub cuisine: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMenuItemRequest {
    pub name: String,
    pub price_eur: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub menu_item_id: i32,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_id: i32,
    pub restaurant_id: i32,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub order_id: i32,
    pub order: OrderDetail,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_validation() {
        assert!(is_valid_order_status("placed"));
        assert!(is_valid_order_status("cancelled"));
        assert!(!is_valid_order_status("shipped"));
        assert!(!is_valid_order_status(""));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal_order_status("delivered"));
        assert!(is_terminal_order_status("cancelled"));
        assert!(!is_terminal_order_status("placed"));
        assert!(!is_terminal_order_status("accepted"));
    }
}
