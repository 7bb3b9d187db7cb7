use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::ProductId;

/// Catalog entity: a stocked product.
///
/// Plain record semantics: the id is assigned at creation and immutable,
/// every other field is overwritten wholesale by updates and batch
/// reconciliation. Construct through [`Product::new`] (or
/// [`ProductDraft::into_product`]) so the field invariants hold for every
/// instance that reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display label, non-empty after trimming.
    pub name: String,
    /// Quantity on hand, never negative.
    pub stock: i64,
    /// Price per unit in minor currency units (e.g. cents).
    pub price_cents: u64,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        stock: i64,
        price_cents: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        validate_fields(&name, stock)?;
        Ok(Self {
            id,
            name,
            stock,
            price_cents,
        })
    }

    /// Total value of the units on hand, in minor currency units.
    pub fn stock_value(&self) -> u64 {
        self.stock as u64 * self.price_cents
    }
}

/// Externally supplied candidate state for a product.
///
/// Used both by single-item create/update paths and as one entry of a
/// reconciliation batch. `id: None` means "assign a fresh id on insert";
/// a draft carrying an id targets the stored row with that id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub name: String,
    pub stock: i64,
    pub price_cents: u64,
}

impl ProductDraft {
    pub fn new(id: Option<ProductId>, name: impl Into<String>, stock: i64, price_cents: u64) -> Self {
        Self {
            id,
            name: name.into(),
            stock,
            price_cents,
        }
    }

    /// Check the field invariants without consuming the draft.
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, self.stock)
    }

    /// Materialize the draft against a concrete id.
    ///
    /// Fails with [`DomainError::Validation`] when the draft carries an id
    /// that disagrees with `id`.
    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        if let Some(own) = self.id {
            if own != id {
                return Err(DomainError::validation(format!(
                    "draft id {own} does not match target id {id}"
                )));
            }
        }
        Product::new(id, self.name, self.stock, self.price_cents)
    }
}

fn validate_fields(name: &str, stock: i64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("product name must not be empty"));
    }
    if stock < 0 {
        return Err(DomainError::validation(format!(
            "stock must not be negative (got {stock})"
        )));
    }
    Ok(())
}
