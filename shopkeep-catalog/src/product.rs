use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Variant-specific payload. The `type` tag plus the flattened fields of
/// the owning [`Product`] form one flat persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductKind {
    Electronics { brand: String, warranty_years: u32 },
    Grocery { expiry_date: NaiveDate },
    Clothing { size: String, material: String },
}

impl ProductKind {
    /// Discriminator string as it appears in persisted records.
    pub fn type_name(&self) -> &'static str {
        match self {
            ProductKind::Electronics { .. } => "Electronics",
            ProductKind::Grocery { .. } => "Grocery",
            ProductKind::Clothing { .. } => "Clothing",
        }
    }
}

/// One stocked item in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity_in_stock: u32,
    #[serde(flatten)]
    pub kind: ProductKind,
}

/// Product-level stock errors
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
}

impl Product {
    pub fn electronics(
        product_id: String,
        name: String,
        price: f64,
        quantity_in_stock: u32,
        brand: String,
        warranty_years: u32,
    ) -> Self {
        Self {
            product_id,
            name,
            price,
            quantity_in_stock,
            kind: ProductKind::Electronics {
                brand,
                warranty_years,
            },
        }
    }

    pub fn grocery(
        product_id: String,
        name: String,
        price: f64,
        quantity_in_stock: u32,
        expiry_date: NaiveDate,
    ) -> Self {
        Self {
            product_id,
            name,
            price,
            quantity_in_stock,
            kind: ProductKind::Grocery { expiry_date },
        }
    }

    pub fn clothing(
        product_id: String,
        name: String,
        price: f64,
        quantity_in_stock: u32,
        size: String,
        material: String,
    ) -> Self {
        Self {
            product_id,
            name,
            price,
            quantity_in_stock,
            kind: ProductKind::Clothing { size, material },
        }
    }

    /// Add stock. No upper bound beyond the integer limit.
    pub fn restock(&mut self, amount: u32) {
        self.quantity_in_stock = self.quantity_in_stock.saturating_add(amount);
    }

    /// Remove stock. The whole sale is rejected when not enough is on hand.
    pub fn sell(&mut self, quantity: u32) -> Result<(), ProductError> {
        if quantity > self.quantity_in_stock {
            return Err(ProductError::InsufficientStock {
                requested: quantity,
                available: self.quantity_in_stock,
            });
        }

        self.quantity_in_stock -= quantity;
        Ok(())
    }

    /// Value of the stock on hand
    pub fn total_value(&self) -> f64 {
        self.price * self.quantity_in_stock as f64
    }

    /// Check if a grocery's expiry date has passed. Always false for
    /// non-grocery products.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().date_naive())
    }

    /// Expiry check against an explicit reference date. Expiring today does
    /// not count as expired.
    pub fn is_expired_at(&self, today: NaiveDate) -> bool {
        match &self.kind {
            ProductKind::Grocery { expiry_date } => *expiry_date < today,
            _ => false,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProductKind::Electronics {
                brand,
                warranty_years,
            } => write!(
                f,
                "Electronics: {}, Brand: {}, Warranty: {} years, Stock: {}",
                self.name, brand, warranty_years, self.quantity_in_stock
            ),
            ProductKind::Grocery { expiry_date } => write!(
                f,
                "Grocery: {}, Expiry: {}, Stock: {}",
                self.name, expiry_date, self.quantity_in_stock
            ),
            ProductKind::Clothing { size, material } => write!(
                f,
                "Clothing: {}, Size: {}, Material: {}, Stock: {}",
                self.name, size, material, self.quantity_in_stock
            ),
        }
    }
}
