use std::sync::Arc;

use canteen::{
    domain::OrderStatus,
    gateway::{InMemoryGateway, StoreGateway},
    models::Order,
};
use chrono::Utc;
use uuid::Uuid;

fn pending_order(user_id: Uuid) -> Order {
    Order {
        id: Uuid::new_v4(),
        user_id,
        total_amount: 120.0,
        status: OrderStatus::Pending.as_str().to_string(),
        payment_status: "completed".to_string(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn status_advances_forward_only() {
    let gateway = Arc::new(InMemoryGateway::new());
    let order = pending_order(Uuid::new_v4());
    gateway.insert_order(order.clone()).await.unwrap();

    assert!(gateway.advance_order_status(order.id, OrderStatus::Processing).await.unwrap());
    assert!(gateway.advance_order_status(order.id, OrderStatus::Ready).await.unwrap());

    // Backward moves are rejected without touching the row
    assert!(!gateway.advance_order_status(order.id, OrderStatus::Pending).await.unwrap());
    assert_eq!(gateway.orders()[0].status, "ready");

    assert!(gateway.advance_order_status(order.id, OrderStatus::Completed).await.unwrap());
    assert_eq!(gateway.orders()[0].status, "completed");
}

#[tokio::test]
async fn cancelled_orders_stay_cancelled() {
    let gateway = Arc::new(InMemoryGateway::new());
    let order = pending_order(Uuid::new_v4());
    gateway.insert_order(order.clone()).await.unwrap();

    assert!(gateway.advance_order_status(order.id, OrderStatus::Cancelled).await.unwrap());
    assert!(!gateway.advance_order_status(order.id, OrderStatus::Processing).await.unwrap());
    assert_eq!(gateway.orders()[0].status, "cancelled");
}

#[tokio::test]
async fn staff_see_every_users_orders_students_only_their_own() {
    let gateway = Arc::new(InMemoryGateway::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let staff = Uuid::new_v4();

    gateway.insert_order(pending_order(alice)).await.unwrap();
    gateway.insert_order(pending_order(bob)).await.unwrap();
    gateway.insert_order(pending_order(bob)).await.unwrap();

    // Staff need the full list to work the fulfillment queue
    let all = gateway.orders_for_user(staff, true, 1, 10).await.unwrap();
    assert_eq!(all.len(), 3);

    let alices = gateway.orders_for_user(alice, false, 1, 10).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].order.user_id, alice);

    let bobs = gateway.orders_for_user(bob, false, 1, 10).await.unwrap();
    assert_eq!(bobs.len(), 2);
}

#[tokio::test]
async fn unknown_order_reports_no_advance() {
    let gateway = Arc::new(InMemoryGateway::new());
    assert!(!gateway.advance_order_status(Uuid::new_v4(), OrderStatus::Processing).await.unwrap());
}
