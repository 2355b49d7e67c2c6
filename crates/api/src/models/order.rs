//! Customer order and its line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{Meta, OrderId, OrderStatus, ProductId, UserId};

use crate::store::Entity;

/// A customer order.
///
/// `totalAmount` is derived at creation time from the line-item snapshots
/// and never recomputed afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(flatten)]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl Entity for Order {
    const TABLE: &'static str = "orders";
    const KIND: &'static str = "ORDER";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

/// One order line.
///
/// `unitPrice` and `productName` are snapshots of the product at
/// order-creation time; `subtotal` is `quantity * unitPrice` at that moment.
/// None of them track later catalog changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(flatten)]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl Entity for OrderItem {
    const TABLE: &'static str = "order_items";
    const KIND: &'static str = "ORDER_ITEM";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let order = Order {
            user_id: Some(UserId::new("U1")),
            total_amount: Some(Decimal::new(5997, 2)),
            status: Some(OrderStatus::Pending),
            items: vec![OrderItem {
                product_id: Some(ProductId::new("P1")),
                quantity: Some(3),
                unit_price: Some(Decimal::new(1999, 2)),
                subtotal: Some(Decimal::new(5997, 2)),
                product_name: Some("Anvil".into()),
                ..OrderItem::default()
            }],
            ..Order::default()
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["userId"], "U1");
        assert_eq!(value["totalAmount"], "59.97");
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["items"][0]["productName"], "Anvil");
        assert_eq!(value["items"][0]["subtotal"], "59.97");
    }
}
