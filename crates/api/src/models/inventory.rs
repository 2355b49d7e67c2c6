//! Warehouse inventory record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use orchard_core::{InventoryStatus, Meta, ProductId};

use crate::store::Entity;

/// Warehouse inventory for one product (1:1 by convention, not enforced by
/// the store).
///
/// `availableQuantity` and `status` are derived. The derivations are
/// asymmetric on purpose: quantity changes re-derive both, reservation
/// changes re-derive only the available quantity. Mutate through
/// [`set_quantity`](Self::set_quantity) and
/// [`set_reserved_quantity`](Self::set_reserved_quantity) to keep that
/// bookkeeping straight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(flatten)]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_point: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InventoryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Inventory {
    /// Set the total quantity, re-deriving available quantity and status.
    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = Some(quantity);
        self.recompute_available();
        self.derive_status();
    }

    /// Set the reserved quantity, re-deriving available quantity only.
    /// Reservations never change the stock status.
    pub fn set_reserved_quantity(&mut self, reserved: i32) {
        self.reserved_quantity = Some(reserved);
        self.recompute_available();
    }

    /// Quantity still open for new reservations.
    #[must_use]
    pub fn available_quantity(&self) -> i32 {
        self.available_quantity
            .unwrap_or_else(|| self.quantity.unwrap_or(0) - self.reserved_quantity.unwrap_or(0))
    }

    /// Recompute every derived field. Used once on create, where the record
    /// arrives straight from the wire.
    pub fn reconcile(&mut self) {
        self.recompute_available();
        self.derive_status();
    }

    fn recompute_available(&mut self) {
        if let Some(quantity) = self.quantity {
            self.available_quantity = Some(quantity - self.reserved_quantity.unwrap_or(0));
        }
    }

    fn derive_status(&mut self) {
        self.status = Some(match self.quantity {
            None | Some(0) => InventoryStatus::OutOfStock,
            Some(q) if self.reorder_point.is_some_and(|p| q <= p) => InventoryStatus::LowStock,
            Some(_) => InventoryStatus::InStock,
        });
    }
}

impl Entity for Inventory {
    const TABLE: &'static str = "inventory";
    const KIND: &'static str = "INVENTORY";

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

    fn inventory(quantity: i32, reserved: i32, reorder_point: i32) -> Inventory {
        let mut record = Inventory {
            product_id: Some(ProductId::new("P1")),
            quantity: Some(quantity),
            reserved_quantity: Some(reserved),
            reorder_point: Some(reorder_point),
            warehouse_location: Some("A-01".into()),
            ..Inventory::default()
        };
        record.reconcile();
        record
    }

    #[test]
    fn test_available_is_quantity_minus_reserved() {
        let record = inventory(10, 4, 5);
        assert_eq!(record.available_quantity(), 6);
    }

    #[test]
    fn test_status_derivation_thresholds() {
        assert_eq!(
            inventory(0, 0, 5).status,
            Some(InventoryStatus::OutOfStock)
        );
        assert_eq!(inventory(3, 0, 5).status, Some(InventoryStatus::LowStock));
        assert_eq!(inventory(5, 0, 5).status, Some(InventoryStatus::LowStock));
        assert_eq!(inventory(6, 0, 5).status, Some(InventoryStatus::InStock));
    }

    #[test]
    fn test_no_reorder_point_means_in_stock_when_positive() {
        let mut record = Inventory {
            quantity: Some(1),
            ..Inventory::default()
        };
        record.reconcile();
        assert_eq!(record.status, Some(InventoryStatus::InStock));
    }

    #[test]
    fn test_quantity_change_rederives_status() {
        let mut record = inventory(3, 0, 5);
        assert_eq!(record.status, Some(InventoryStatus::LowStock));

        record.set_quantity(13);
        assert_eq!(record.status, Some(InventoryStatus::InStock));
        assert_eq!(record.available_quantity(), 13);
    }

    #[test]
    fn test_reservation_change_keeps_status() {
        let mut record = inventory(10, 0, 5);
        assert_eq!(record.status, Some(InventoryStatus::InStock));

        // Reserving everything leaves zero available but the status is
        // driven by total quantity only.
        record.set_reserved_quantity(10);
        assert_eq!(record.available_quantity(), 0);
        assert_eq!(record.status, Some(InventoryStatus::InStock));
    }
}
