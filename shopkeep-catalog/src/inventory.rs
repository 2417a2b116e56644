use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use crate::product::{Product, ProductError};

/// Keyed product store. Keys are product ids; iteration order is stable
/// (sorted by id) so listings and the persisted document are deterministic.
#[derive(Debug, Default)]
pub struct Inventory {
    products: BTreeMap<String, Product>,
}

/// Store-level errors surfaced to the presentation layer
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Duplicate product id: {0}")]
    DuplicateId(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
}

impl From<ProductError> for InventoryError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InsufficientStock {
                requested,
                available,
            } => InventoryError::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            products: BTreeMap::new(),
        }
    }

    /// Insert a new product. Nothing is mutated when the id is taken.
    pub fn add(&mut self, product: Product) -> Result<(), InventoryError> {
        if self.products.contains_key(&product.product_id) {
            return Err(InventoryError::DuplicateId(product.product_id));
        }

        self.products.insert(product.product_id.clone(), product);
        Ok(())
    }

    /// Remove a product. Absent ids are a no-op.
    pub fn remove(&mut self, product_id: &str) -> Option<Product> {
        self.products.remove(product_id)
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Insert or replace, keyed by the product's own id. Returns the
    /// replaced product, if any.
    pub fn upsert(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.product_id.clone(), product)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products in iteration order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Display line for every product, recomputed on each call.
    pub fn list_all(&self) -> impl Iterator<Item = String> + '_ {
        self.products.values().map(|p| p.to_string())
    }

    /// Case-insensitive substring match on product names.
    pub fn search_by_name(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        self.products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Case-insensitive exact match on the variant discriminator.
    pub fn search_by_type(&self, type_name: &str) -> Vec<&Product> {
        self.products
            .values()
            .filter(|p| p.kind.type_name().eq_ignore_ascii_case(type_name))
            .collect()
    }

    pub fn sell(&mut self, product_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| InventoryError::UnknownProduct(product_id.to_string()))?;

        product.sell(quantity)?;
        Ok(())
    }

    pub fn restock(&mut self, product_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| InventoryError::UnknownProduct(product_id.to_string()))?;

        product.restock(quantity);
        Ok(())
    }

    /// Total value of stock on hand across the store.
    pub fn total_value(&self) -> f64 {
        self.products.values().map(Product::total_value).sum()
    }

    /// Prune expired groceries, returning how many were removed.
    pub fn remove_expired(&mut self) -> usize {
        self.remove_expired_as_of(Utc::now().date_naive())
    }

    /// Prune groceries expired as of an explicit reference date.
    pub fn remove_expired_as_of(&mut self, today: NaiveDate) -> usize {
        let initial_count = self.products.len();
        self.products
            .retain(|_, product| !product.is_expired_at(today));

        initial_count - self.products.len()
    }
}
