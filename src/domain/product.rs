use std::fmt;
use std::num::{IntErrorKind, ParseIntError};

use crate::error::ValidationError;

/// Largest quantity a product can carry; the add form stores it in a 16-bit column.
pub const MAX_QUANTITY: u32 = 32_767;

/// Identifier assigned by the store when a product is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product on the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
        }
    }
}

/// Payload for inserting a product. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub quantity: u32,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// Checks the invariant every persisted product holds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankFields);
        }
        if self.quantity < 1 {
            return Err(ValidationError::NonPositiveQuantity(i64::from(self.quantity)));
        }
        if self.quantity > MAX_QUANTITY {
            return Err(ValidationError::QuantityTooLarge(self.quantity.to_string()));
        }
        Ok(())
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            quantity: self.quantity,
        }
    }
}

/// Raw text of the two add-dialog fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub quantity: String,
}

impl ProductForm {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }

    /// Validates the form and turns it into an insertable product.
    ///
    /// Blank fields are checked first so an empty dialog always reports the
    /// same notice, whatever the quantity text would have parsed to.
    pub fn parse(&self) -> Result<NewProduct, ValidationError> {
        let name = self.name.trim();
        let quantity = self.quantity.trim();
        if name.is_empty() || quantity.is_empty() {
            return Err(ValidationError::BlankFields);
        }

        let value: i64 = quantity.parse().map_err(|e: ParseIntError| match e.kind() {
            IntErrorKind::PosOverflow => ValidationError::QuantityTooLarge(quantity.to_string()),
            // Clamped; anything this low is rejected the same way.
            IntErrorKind::NegOverflow => ValidationError::NonPositiveQuantity(i64::MIN),
            _ => ValidationError::InvalidQuantity(quantity.to_string()),
        })?;
        if value < 1 {
            return Err(ValidationError::NonPositiveQuantity(value));
        }
        let quantity = u32::try_from(value)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or_else(|| ValidationError::QuantityTooLarge(quantity.to_string()))?;

        let product = NewProduct::new(name, quantity);
        product.validate()?;
        Ok(product)
    }
}
