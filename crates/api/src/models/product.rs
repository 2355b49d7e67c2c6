//! Catalog product.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{Meta, ProductCategory, ProductStatus};

use crate::store::Entity;

/// A catalog product.
///
/// `stockQuantity` here is the catalog-facing stock counter, tracked in
/// parallel with the warehouse [`Inventory`](super::Inventory) record; the
/// two are independently updated quantities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_in_kg: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl Product {
    /// Re-derive the stock-driven status before a write.
    ///
    /// Zero stock forces `OUT_OF_STOCK`; a restocked `OUT_OF_STOCK` product
    /// goes back to `ACTIVE`. Other statuses (DRAFT, DISCONTINUED) are left
    /// alone.
    pub fn reconcile_status(&mut self) {
        match self.stock_quantity {
            Some(0) => self.status = Some(ProductStatus::OutOfStock),
            Some(q) if q > 0 && self.status == Some(ProductStatus::OutOfStock) => {
                self.status = Some(ProductStatus::Active);
            }
            _ => {}
        }
    }

    /// Whether `quantity` units can be taken from catalog stock.
    #[must_use]
    pub fn has_stock(&self, quantity: i32) -> bool {
        self.stock_quantity.is_some_and(|q| q >= quantity)
    }
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const KIND: &'static str = "PRODUCT";

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}
