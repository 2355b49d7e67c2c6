//! Order assembly and retrieval.
//!
//! Order creation validates each line against the live catalog, snapshots
//! unit price and product name into the items, and derives the order total.
//! Stock is validated but not decremented here; fulfillment owns the actual
//! stock movement.

use chrono::Utc;
use rust_decimal::Decimal;

use orchard_core::{OrderId, OrderStatus};

use crate::error::{ApiError, Result};
use crate::models::{Order, OrderItem, Product};
use crate::services::products::find_required;
use crate::store::{KeyValueStore, Repository, scan_where};

pub struct OrderService<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    const fn orders(&self) -> Repository<'a, Order> {
        Repository::new(self.store)
    }

    const fn items(&self) -> Repository<'a, OrderItem> {
        Repository::new(self.store)
    }

    /// Assemble and persist an order: validate every line, snapshot prices,
    /// derive the total, persist the order and then its items under the
    /// generated order id.
    ///
    /// # Errors
    ///
    /// Validation failure listing every violated rule; nothing is persisted
    /// in that case.
    pub async fn create(&self, request: Order, actor: &str) -> Result<Order> {
        let mut errors = Vec::new();
        if request.user_id.is_none() {
            errors.push("User ID is required".to_owned());
        }
        if request.items.is_empty() {
            errors.push("Order must contain at least one item".to_owned());
        }
        if request
            .shipping_address
            .as_deref()
            .is_none_or(|a| a.trim().is_empty())
        {
            errors.push("Shipping address is required".to_owned());
        }

        let mut lines: Vec<(OrderItem, Product)> = Vec::with_capacity(request.items.len());
        for item in request.items {
            if !item.quantity.is_some_and(|q| q > 0) {
                errors.push("Item quantity must be greater than zero".to_owned());
                continue;
            }
            let product_id = item
                .product_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            match find_required(self.store, &product_id).await {
                Ok(product) => {
                    if product.has_stock(item.quantity.unwrap_or(0)) {
                        lines.push((item, product));
                    } else {
                        let name = product.name.as_deref().unwrap_or(&product_id);
                        errors.push(format!("Insufficient stock for product: {name}"));
                    }
                }
                Err(e) => errors.push(e.to_string()),
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors.join(", ")));
        }

        let mut order = Order {
            user_id: request.user_id,
            status: Some(OrderStatus::Pending),
            shipping_address: request.shipping_address,
            billing_address: request.billing_address,
            payment_method: request.payment_method,
            order_date: Some(Utc::now()),
            ..Order::default()
        };

        let mut total = Decimal::ZERO;
        let mut items = Vec::with_capacity(lines.len());
        for (mut item, product) in lines {
            let quantity = item.quantity.unwrap_or(0);
            let unit_price = product.price.unwrap_or(Decimal::ZERO);
            let subtotal = unit_price * Decimal::from(quantity);
            item.unit_price = Some(unit_price);
            item.subtotal = Some(subtotal);
            item.product_name = product.name.clone();
            total += subtotal;
            items.push(item);
        }
        order.total_amount = Some(total);

        self.orders().save(&mut order, actor).await?;
        let order_id = order.meta.id.clone().unwrap_or_default();
        for item in &mut items {
            item.order_id = Some(OrderId::new(order_id.clone()));
            self.items().save(item, actor).await?;
        }
        order.items = items;
        Ok(order)
    }

    /// Fetch an order with its line items attached.
    ///
    /// # Errors
    ///
    /// `NotFound` when the order does not exist.
    pub async fn get(&self, id: &str) -> Result<Order> {
        let mut order = self
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Order not found: {id}")))?;
        order.items = self.items_for(id).await?;
        Ok(order)
    }

    /// Every order placed by a user, items attached.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_user_orders(&self, user_id: &str) -> Result<Vec<Order>> {
        let repo = self.orders();
        let mut orders = scan_where(&repo, |o: &Order| {
            o.user_id.as_ref().is_some_and(|u| u.as_str() == user_id)
        })
        .await?;
        for order in &mut orders {
            let id = order.meta.id.clone().unwrap_or_default();
            order.items = self.items_for(&id).await?;
        }
        Ok(orders)
    }

    /// Move an order to a new status. Transitions are unguarded.
    ///
    /// # Errors
    ///
    /// `NotFound` when the order does not exist, or a conflict when a
    /// concurrent write won.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        actor: &str,
    ) -> Result<Order> {
        let mut order = self
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Order not found: {id}")))?;
        order.status = Some(status);
        self.orders().save(&mut order, actor).await?;
        order.items = self.items_for(id).await?;
        Ok(order)
    }

    async fn items_for(&self, order_id: &str) -> Result<Vec<OrderItem>> {
        let repo = self.items();
        let items = scan_where(&repo, |item: &OrderItem| {
            item.order_id.as_ref().is_some_and(|o| o.as_str() == order_id)
        })
        .await?;
        Ok(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orchard_core::{ProductCategory, ProductId, UserId};

    use crate::blob::MemoryBlobStore;
    use crate::services::ProductService;
    use crate::store::{Entity, MemoryStore};

    use super::*;

    async fn seed_product(store: &MemoryStore, name: &str, cents: i64, stock: i32) -> String {
        let blobs = MemoryBlobStore::new();
        let created = ProductService::new(store, &blobs)
            .create(
                Product {
                    name: Some(name.into()),
                    price: Some(Decimal::new(cents, 2)),
                    stock_quantity: Some(stock),
                    category: Some(ProductCategory::Home),
                    ..Product::default()
                },
                "system",
            )
            .await
            .unwrap();
        created.meta.id.unwrap()
    }

    fn line(product_id: &str, quantity: i32) -> OrderItem {
        OrderItem {
            product_id: Some(ProductId::new(product_id)),
            quantity: Some(quantity),
            ..OrderItem::default()
        }
    }

    fn request(product_id: &str, quantity: i32) -> Order {
        Order {
            user_id: Some(UserId::new("U1")),
            shipping_address: Some("1 Main St".into()),
            items: vec![line(product_id, quantity)],
            ..Order::default()
        }
    }

    #[tokio::test]
    async fn test_create_snapshots_prices_and_totals() {
        let store = MemoryStore::new();
        let product_id = seed_product(&store, "Anvil", 1999, 5).await;
        let service = OrderService::new(&store);

        let order = service.create(request(&product_id, 3), "system").await.unwrap();

        assert_eq!(order.total_amount, Some(Decimal::new(5997, 2)));
        assert_eq!(order.status, Some(OrderStatus::Pending));
        assert_eq!(order.items.len(), 1);
        let item = &order.items[0];
        assert_eq!(item.subtotal, Some(Decimal::new(5997, 2)));
        assert_eq!(item.unit_price, Some(Decimal::new(1999, 2)));
        assert_eq!(item.product_name.as_deref(), Some("Anvil"));
        assert_eq!(
            item.order_id.as_ref().map(ToString::to_string),
            order.meta.id
        );
    }

    #[tokio::test]
    async fn test_total_survives_later_price_change() {
        let store = MemoryStore::new();
        let product_id = seed_product(&store, "Anvil", 1999, 5).await;
        let service = OrderService::new(&store);

        let order = service.create(request(&product_id, 3), "system").await.unwrap();
        let order_id = order.meta.id.clone().unwrap();

        let blobs = MemoryBlobStore::new();
        ProductService::new(&store, &blobs)
            .update(
                &product_id,
                Product {
                    price: Some(Decimal::new(99_99, 2)),
                    ..Product::default()
                },
                "system",
            )
            .await
            .unwrap();

        let reloaded = service.get(&order_id).await.unwrap();
        assert_eq!(reloaded.total_amount, Some(Decimal::new(5997, 2)));
        assert_eq!(reloaded.items[0].unit_price, Some(Decimal::new(1999, 2)));
    }

    #[tokio::test]
    async fn test_create_does_not_decrement_stock() {
        let store = MemoryStore::new();
        let product_id = seed_product(&store, "Anvil", 1999, 5).await;
        let service = OrderService::new(&store);

        service.create(request(&product_id, 3), "system").await.unwrap();

        let blobs = MemoryBlobStore::new();
        let product = ProductService::new(&store, &blobs)
            .get(&product_id)
            .await
            .unwrap();
        assert_eq!(product.stock_quantity, Some(5));
    }

    #[tokio::test]
    async fn test_insufficient_stock_persists_nothing() {
        let store = MemoryStore::new();
        let good = seed_product(&store, "Anvil", 1999, 5).await;
        let bad = seed_product(&store, "Hammer", 999, 1).await;
        let service = OrderService::new(&store);

        let mut req = request(&good, 2);
        req.items.push(line(&bad, 4));
        let err = service.create(req, "system").await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(msg) if msg == "Insufficient stock for product: Hammer"));
        assert!(store.len(Order::TABLE).await == 0);
        assert!(store.len(OrderItem::TABLE).await == 0);
    }

    #[tokio::test]
    async fn test_create_accumulates_validation_errors() {
        let store = MemoryStore::new();
        let service = OrderService::new(&store);

        let err = service.create(Order::default(), "system").await.unwrap_err();
        let ApiError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            msg,
            "User ID is required, Order must contain at least one item, \
             Shipping address is required"
        );
    }

    #[tokio::test]
    async fn test_missing_product_is_reported_per_line() {
        let store = MemoryStore::new();
        let service = OrderService::new(&store);

        let err = service
            .create(request("ghost", 1), "system")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Product not found: ghost"));
    }

    #[tokio::test]
    async fn test_get_user_orders_filters_by_user() {
        let store = MemoryStore::new();
        let product_id = seed_product(&store, "Anvil", 1999, 50).await;
        let service = OrderService::new(&store);

        service.create(request(&product_id, 1), "system").await.unwrap();
        let mut other = request(&product_id, 2);
        other.user_id = Some(UserId::new("U2"));
        service.create(other, "system").await.unwrap();

        let orders = service.get_user_orders("U1").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_is_unguarded() {
        let store = MemoryStore::new();
        let product_id = seed_product(&store, "Anvil", 1999, 5).await;
        let service = OrderService::new(&store);

        let order = service.create(request(&product_id, 1), "system").await.unwrap();
        let id = order.meta.id.clone().unwrap();

        let delivered = service
            .update_status(&id, OrderStatus::Delivered, "system")
            .await
            .unwrap();
        assert_eq!(delivered.status, Some(OrderStatus::Delivered));

        // Backwards transitions are allowed too.
        let pending = service
            .update_status(&id, OrderStatus::Pending, "system")
            .await
            .unwrap();
        assert_eq!(pending.status, Some(OrderStatus::Pending));
    }
}
