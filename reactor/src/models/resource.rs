//! Resource tokens
//!
//! The facility never looks inside the fuel it handles. A resource is an
//! amount-bearing token with either a recipe tag (material) or a commodity
//! label (generic). Quantities are mass in kg.

use serde::{Deserialize, Serialize};

/// Quantity tolerance used for every fuel comparison in the crate.
///
/// Guards against floating round-off when batches are fractional.
pub const EPS: f64 = 1e-6;

/// A unit of fuel-bearing material tagged with a composition recipe
///
/// # Example
/// ```
/// use batch_reactor_core_rs::Material;
///
/// let fuel = Material::new("uox_fresh", 25.0);
/// assert_eq!(fuel.quantity(), 25.0);
/// assert_eq!(fuel.recipe(), "uox_fresh");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Composition tag (opaque to the facility)
    recipe: String,

    /// Mass in kg
    quantity: f64,
}

impl Material {
    /// Create a new material unit
    ///
    /// # Panics
    /// Panics if quantity is negative or not finite
    pub fn new(recipe: impl Into<String>, quantity: f64) -> Self {
        assert!(
            quantity.is_finite() && quantity >= 0.0,
            "material quantity must be finite and non-negative"
        );
        Self {
            recipe: recipe.into(),
            quantity,
        }
    }

    pub fn recipe(&self) -> &str {
        &self.recipe
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Split `amount` off this unit, returning it as a new unit
    ///
    /// The caller guarantees `amount <= self.quantity()`.
    pub(crate) fn extract(&mut self, amount: f64) -> Material {
        let taken = amount.min(self.quantity);
        self.quantity -= taken;
        Material {
            recipe: self.recipe.clone(),
            quantity: taken,
        }
    }
}

/// A commodity amount with no composition, used for offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericResource {
    /// Unit of measure (always "kg" for fuel)
    pub units: String,

    /// Commodity the amount is denominated in
    pub commodity: String,

    /// Amount in `units`
    pub quantity: f64,
}

/// Resource token attached to a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resource {
    Material(Material),
    Generic(GenericResource),
}

impl Resource {
    pub fn quantity(&self) -> f64 {
        match self {
            Resource::Material(m) => m.quantity(),
            Resource::Generic(g) => g.quantity,
        }
    }
}
