//! Catalog product operations, including image upload.

use rust_decimal::Decimal;
use uuid::Uuid;

use orchard_core::ProductStatus;

use crate::blob::BlobStore;
use crate::error::{ApiError, Result};
use crate::models::Product;
use crate::store::{KeyValueStore, Repository, scan_where};

/// Largest accepted image upload, in bytes.
const MAX_IMAGE_BYTES: usize = 5_000_000;

/// Look up a product that a business rule requires to exist.
///
/// A missing product here is a broken reference in the caller's input, so it
/// surfaces as a validation failure rather than a 404.
pub(crate) async fn find_required(
    store: &dyn KeyValueStore,
    id: &str,
) -> Result<Product> {
    Repository::<Product>::new(store)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::Validation(format!("Product not found: {id}")))
}

pub struct ProductService<'a> {
    store: &'a dyn KeyValueStore,
    blobs: &'a dyn BlobStore,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore, blobs: &'a dyn BlobStore) -> Self {
        Self { store, blobs }
    }

    const fn repo(&self) -> Repository<'a, Product> {
        Repository::new(self.store)
    }

    /// Create a product. New products start ACTIVE unless zero stock forces
    /// them OUT_OF_STOCK.
    ///
    /// # Errors
    ///
    /// Validation failure with every violated rule, or a wrapped store
    /// failure.
    pub async fn create(&self, mut product: Product, actor: &str) -> Result<Product> {
        validate(&product)?;

        product.status = Some(ProductStatus::Active);
        product.reconcile_status();
        self.repo()
            .save(&mut product, actor)
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to create product: {e}")))?;
        Ok(product)
    }

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Validation failure when the product does not exist.
    pub async fn get(&self, id: &str) -> Result<Product> {
        find_required(self.store, id).await
    }

    /// Products priced within `[min, max]`, bounds inclusive.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn find_by_price_range(&self, min: Decimal, max: Decimal) -> Result<Vec<Product>> {
        let repo = self.repo();
        let hits = scan_where(&repo, |p: &Product| {
            p.price.is_some_and(|price| price >= min && price <= max)
        })
        .await?;
        Ok(hits)
    }

    /// Partial update: every provided field replaces the stored one, the
    /// merged record is re-validated, and the stock-driven status is
    /// re-derived.
    ///
    /// # Errors
    ///
    /// Validation failure, or a conflict when a concurrent write won.
    pub async fn update(&self, id: &str, patch: Product, actor: &str) -> Result<Product> {
        let mut product = find_required(self.store, id).await?;

        if patch.name.is_some() {
            product.name = patch.name;
        }
        if patch.description.is_some() {
            product.description = patch.description;
        }
        if patch.price.is_some() {
            product.price = patch.price;
        }
        if patch.stock_quantity.is_some() {
            product.stock_quantity = patch.stock_quantity;
        }
        if patch.category.is_some() {
            product.category = patch.category;
        }
        if patch.status.is_some() {
            product.status = patch.status;
        }
        if !patch.tags.is_empty() {
            product.tags = patch.tags;
        }
        if !patch.attributes.is_empty() {
            product.attributes = patch.attributes;
        }
        if patch.weight_in_kg.is_some() {
            product.weight_in_kg = patch.weight_in_kg;
        }
        if patch.release_date.is_some() {
            product.release_date = patch.release_date;
        }
        if patch.featured.is_some() {
            product.featured = patch.featured;
        }

        validate(&product)?;
        product.reconcile_status();
        self.repo().save(&mut product, actor).await?;
        Ok(product)
    }

    /// Delete a product and, best-effort, its image blob.
    ///
    /// # Errors
    ///
    /// Validation failure when the product does not exist.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let product = find_required(self.store, id).await?;
        if let Some(key) = &product.image_url {
            self.delete_blob(key).await;
        }
        self.repo().delete(id).await?;
        Ok(())
    }

    /// Store an uploaded image and point the product at it. Returns the new
    /// blob key. Any previous image is deleted best-effort.
    ///
    /// # Errors
    ///
    /// Validation failure for a missing, oversized, or non-image file, or
    /// when the blob write fails.
    pub async fn upload_image(
        &self,
        id: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
        actor: &str,
    ) -> Result<String> {
        if bytes.is_empty() {
            return Err(ApiError::Validation("Image file is required".to_owned()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::Validation(
                "Image file size must be less than 5MB".to_owned(),
            ));
        }
        if !content_type.starts_with("image/") {
            return Err(ApiError::Validation("File must be an image".to_owned()));
        }

        let mut product = find_required(self.store, id).await?;

        let key = format!("products/{id}/{}-{filename}", Uuid::new_v4());
        self.blobs
            .put(&key, content_type, bytes)
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to upload image: {e}")))?;

        if let Some(old) = product.image_url.replace(key.clone()) {
            self.delete_blob(&old).await;
        }
        self.repo().save(&mut product, actor).await?;
        Ok(key)
    }

    async fn delete_blob(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            tracing::error!(key, error = %e, "Failed to delete image blob");
        }
    }
}

fn validate(product: &Product) -> Result<()> {
    let mut errors = Vec::new();
    if product.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        errors.push("Product name is required");
    }
    if !product.price.is_some_and(|p| p > Decimal::ZERO) {
        errors.push("Product price must be greater than zero");
    }
    if !product.stock_quantity.is_some_and(|q| q >= 0) {
        errors.push("Stock quantity cannot be negative");
    }
    if product.category.is_none() {
        errors.push("Product category is required");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors.join(", ")))
    }
}
