//! Warehouse inventory operations.
//!
//! Every mutation is a read-modify-write cycle against one row; the store
//! gives no cross-row transactions, so each record's invariants are
//! self-contained. Failed checks leave the stored record untouched.

use orchard_core::InventoryStatus;

use crate::error::{ApiError, Result};
use crate::models::Inventory;
use crate::store::{KeyValueStore, Repository, scan_first, scan_where};

const DEFAULT_REORDER_POINT: i32 = 10;
const DEFAULT_REORDER_QUANTITY: i32 = 50;

pub struct InventoryService<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    const fn repo(&self) -> Repository<'a, Inventory> {
        Repository::new(self.store)
    }

    /// Create an inventory record with reorder defaults and derived fields
    /// filled in.
    ///
    /// # Errors
    ///
    /// Validation failure listing every missing or invalid field.
    pub async fn create(&self, mut inventory: Inventory, actor: &str) -> Result<Inventory> {
        let mut errors = Vec::new();
        if inventory.product_id.is_none() {
            errors.push("Product ID is required");
        }
        if !inventory.quantity.is_some_and(|q| q >= 0) {
            errors.push("Quantity cannot be negative");
        }
        if inventory
            .warehouse_location
            .as_deref()
            .is_none_or(|l| l.trim().is_empty())
        {
            errors.push("Warehouse location is required");
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors.join(", ")));
        }

        if inventory.reserved_quantity.is_none() {
            inventory.reserved_quantity = Some(0);
        }
        if inventory.reorder_point.is_none() {
            inventory.reorder_point = Some(DEFAULT_REORDER_POINT);
        }
        if inventory.reorder_quantity.is_none() {
            inventory.reorder_quantity = Some(DEFAULT_REORDER_QUANTITY);
        }
        inventory.reconcile();

        self.repo().save(&mut inventory, actor).await?;
        Ok(inventory)
    }

    /// Fetch an inventory record by id.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record does not exist.
    pub async fn get(&self, id: &str) -> Result<Inventory> {
        self.repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Inventory not found: {id}")))
    }

    /// Fetch the inventory record tracking a product.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record tracks the product.
    pub async fn get_by_product(&self, product_id: &str) -> Result<Inventory> {
        let repo = self.repo();
        scan_first(&repo, |inv: &Inventory| {
            inv.product_id.as_ref().is_some_and(|p| p.as_str() == product_id)
        })
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Inventory not found for product: {product_id}")))
    }

    /// Every record currently at LOW_STOCK.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn low_stock(&self) -> Result<Vec<Inventory>> {
        let repo = self.repo();
        let hits = scan_where(&repo, |inv: &Inventory| {
            inv.status == Some(InventoryStatus::LowStock)
        })
        .await?;
        Ok(hits)
    }

    /// Apply a signed stock delta. The new total re-derives both available
    /// quantity and status.
    ///
    /// # Errors
    ///
    /// Validation failure when the delta would drive quantity negative.
    pub async fn update_stock(&self, id: &str, delta: i32, actor: &str) -> Result<Inventory> {
        let mut inventory = self.get(id).await?;
        let new_quantity = inventory
            .quantity
            .unwrap_or(0)
            .checked_add(delta)
            .filter(|q| *q >= 0)
            .ok_or_else(|| ApiError::Validation("Insufficient stock available".to_owned()))?;
        inventory.set_quantity(new_quantity);
        self.repo().save(&mut inventory, actor).await?;
        Ok(inventory)
    }

    /// Place a soft hold on available stock. Reservations change only the
    /// available quantity, never the stock status.
    ///
    /// # Errors
    ///
    /// Validation failure for a non-positive quantity or one exceeding the
    /// available quantity.
    pub async fn reserve_stock(&self, id: &str, quantity: i32, actor: &str) -> Result<Inventory> {
        if quantity <= 0 {
            return Err(ApiError::Validation("Quantity must be positive".to_owned()));
        }
        let mut inventory = self.get(id).await?;
        if quantity > inventory.available_quantity() {
            return Err(ApiError::Validation(
                "Insufficient stock available for reservation".to_owned(),
            ));
        }
        inventory.set_reserved_quantity(inventory.reserved_quantity.unwrap_or(0) + quantity);
        self.repo().save(&mut inventory, actor).await?;
        Ok(inventory)
    }

    /// Release part of the reserved quantity back to available.
    ///
    /// # Errors
    ///
    /// Validation failure for a non-positive quantity or one exceeding the
    /// reserved quantity.
    pub async fn release_stock(&self, id: &str, quantity: i32, actor: &str) -> Result<Inventory> {
        if quantity <= 0 {
            return Err(ApiError::Validation("Quantity must be positive".to_owned()));
        }
        let mut inventory = self.get(id).await?;
        if quantity > inventory.reserved_quantity.unwrap_or(0) {
            return Err(ApiError::Validation(
                "Cannot release more items than are reserved".to_owned(),
            ));
        }
        inventory.set_reserved_quantity(inventory.reserved_quantity.unwrap_or(0) - quantity);
        self.repo().save(&mut inventory, actor).await?;
        Ok(inventory)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orchard_core::ProductId;

    use crate::store::MemoryStore;

    use super::*;

    fn record(quantity: i32) -> Inventory {
        Inventory {
            product_id: Some(ProductId::new("P1")),
            quantity: Some(quantity),
            warehouse_location: Some("WH-EAST".into()),
            ..Inventory::default()
        }
    }

    async fn create(store: &MemoryStore, inventory: Inventory) -> Inventory {
        InventoryService::new(store)
            .create(inventory, "system")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_derives() {
        let store = MemoryStore::new();
        let created = create(&store, record(20)).await;

        assert_eq!(created.reserved_quantity, Some(0));
        assert_eq!(created.reorder_point, Some(10));
        assert_eq!(created.reorder_quantity, Some(50));
        assert_eq!(created.available_quantity, Some(20));
        assert_eq!(created.status, Some(InventoryStatus::InStock));
    }

    #[tokio::test]
    async fn test_quantity_at_default_reorder_point_is_low_stock() {
        let store = MemoryStore::new();
        let created = create(&store, record(10)).await;

        // 10 <= the defaulted reorder point of 10.
        assert_eq!(created.reorder_point, Some(10));
        assert_eq!(created.status, Some(InventoryStatus::LowStock));
    }

    #[tokio::test]
    async fn test_create_accumulates_validation_errors() {
        let store = MemoryStore::new();
        let service = InventoryService::new(&store);

        let err = service
            .create(Inventory::default(), "system")
            .await
            .unwrap_err();
        let ApiError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            msg,
            "Product ID is required, Quantity cannot be negative, Warehouse location is required"
        );
    }

    #[tokio::test]
    async fn test_reserve_then_overrelease_leaves_state_unchanged() {
        let store = MemoryStore::new();
        let created = create(&store, record(10)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        let reserved = service.reserve_stock(&id, 4, "system").await.unwrap();
        assert_eq!(reserved.reserved_quantity, Some(4));
        assert_eq!(reserved.available_quantity, Some(6));

        let err = service.release_stock(&id, 5, "system").await.unwrap_err();
        assert!(
            matches!(err, ApiError::Validation(msg) if msg == "Cannot release more items than are reserved")
        );

        let after = service.get(&id).await.unwrap();
        assert_eq!(after.reserved_quantity, Some(4));
        assert_eq!(after.available_quantity, Some(6));
    }

    #[tokio::test]
    async fn test_reserve_beyond_available_fails() {
        let store = MemoryStore::new();
        let created = create(&store, record(3)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        let err = service.reserve_stock(&id, 4, "system").await.unwrap_err();
        assert!(
            matches!(err, ApiError::Validation(msg) if msg == "Insufficient stock available for reservation")
        );
        assert_eq!(service.get(&id).await.unwrap().reserved_quantity, Some(0));
    }

    #[tokio::test]
    async fn test_reservation_does_not_change_status() {
        let store = MemoryStore::new();
        let created = create(&store, record(20)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        // 20 - 15 leaves 5 available, below the reorder point of 10, but the
        // status tracks total quantity only.
        let after = service.reserve_stock(&id, 15, "system").await.unwrap();
        assert_eq!(after.available_quantity, Some(5));
        assert_eq!(after.status, Some(InventoryStatus::InStock));
    }

    #[tokio::test]
    async fn test_update_stock_crosses_reorder_threshold() {
        let store = MemoryStore::new();
        let mut low = record(3);
        low.reorder_point = Some(5);
        let created = create(&store, low).await;
        assert_eq!(created.status, Some(InventoryStatus::LowStock));

        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);
        let after = service.update_stock(&id, 10, "system").await.unwrap();

        assert_eq!(after.quantity, Some(13));
        assert_eq!(after.status, Some(InventoryStatus::InStock));
        assert_eq!(after.available_quantity, Some(13));
    }

    #[tokio::test]
    async fn test_update_stock_rejects_negative_result() {
        let store = MemoryStore::new();
        let created = create(&store, record(2)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        let err = service.update_stock(&id, -3, "system").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Insufficient stock available"));
        assert_eq!(service.get(&id).await.unwrap().quantity, Some(2));
    }

    #[tokio::test]
    async fn test_update_stock_rejects_overflowing_delta() {
        let store = MemoryStore::new();
        let created = create(&store, record(2)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        let err = service
            .update_stock(&id, i32::MAX, "system")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Insufficient stock available"));
        assert_eq!(service.get(&id).await.unwrap().quantity, Some(2));
    }

    #[tokio::test]
    async fn test_update_stock_to_zero_is_out_of_stock() {
        let store = MemoryStore::new();
        let created = create(&store, record(2)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        let after = service.update_stock(&id, -2, "system").await.unwrap();
        assert_eq!(after.status, Some(InventoryStatus::OutOfStock));
        assert_eq!(after.available_quantity, Some(0));
    }

    #[tokio::test]
    async fn test_low_stock_and_by_product_lookups() {
        let store = MemoryStore::new();
        let mut low = record(3);
        low.reorder_point = Some(5);
        create(&store, low).await;
        let mut ok = record(50);
        ok.product_id = Some(ProductId::new("P2"));
        create(&store, ok).await;

        let service = InventoryService::new(&store);
        let low_stock = service.low_stock().await.unwrap();
        assert_eq!(low_stock.len(), 1);

        let by_product = service.get_by_product("P2").await.unwrap();
        assert_eq!(by_product.quantity, Some(50));

        let err = service.get_by_product("P9").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_available_always_quantity_minus_reserved() {
        let store = MemoryStore::new();
        let created = create(&store, record(10)).await;
        let id = created.meta.id.clone().unwrap();
        let service = InventoryService::new(&store);

        service.reserve_stock(&id, 3, "system").await.unwrap();
        service.update_stock(&id, 5, "system").await.unwrap();
        service.release_stock(&id, 1, "system").await.unwrap();
        let after = service.reserve_stock(&id, 2, "system").await.unwrap();

        let quantity = after.quantity.unwrap();
        let reserved = after.reserved_quantity.unwrap();
        assert_eq!(after.available_quantity, Some(quantity - reserved));
        assert_eq!((quantity, reserved), (15, 4));
    }
}
