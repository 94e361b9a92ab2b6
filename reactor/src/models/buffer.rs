//! Fuel buffer model
//!
//! A buffer is an ordered pool of material units with an optional capacity.
//! The facility owns three of them (pre-core, in-core, post-core) and moves
//! fuel between them with [`move_fuel`] and [`move_all`].
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: `quantity() <= capacity() + EPS` at all times
//! 2. **Atomicity**: a failed push or pop leaves the buffer untouched
//! 3. **Conservation**: `pop_quantity(x)` returns units summing to `x`

use crate::models::resource::{Material, EPS};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur during buffer operations
#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    #[error("Capacity exceeded: requested {requested}, space available {available}")]
    CapacityExceeded { requested: f64, available: f64 },

    #[error("Insufficient quantity: requested {requested}, available {available}")]
    InsufficientQuantity { requested: f64, available: f64 },

    #[error("Quantity must be non-negative, got {0}")]
    NegativeQuantity(f64),

    #[error("Quantity must be a finite number, got {0}")]
    InvalidQuantity(f64),
}

/// The three inventories of a batch reactor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    /// Fresh fuel delivered but not yet loaded
    PreCore,
    /// The core itself
    InCore,
    /// Discharged fuel awaiting pickup
    PostCore,
}

impl BufferKind {
    pub const fn name(self) -> &'static str {
        match self {
            BufferKind::PreCore => "pre-core",
            BufferKind::InCore => "in-core",
            BufferKind::PostCore => "post-core",
        }
    }
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capacity-bounded or unbounded pool of material units
///
/// Units are withdrawn oldest first.
///
/// # Example
/// ```
/// use batch_reactor_core_rs::{FuelBuffer, Material};
///
/// let mut buffer = FuelBuffer::with_capacity(100.0);
/// buffer.push(Material::new("uox_fresh", 60.0)).unwrap();
/// buffer.push(Material::new("uox_fresh", 40.0)).unwrap();
/// assert!(buffer.push(Material::new("uox_fresh", 1.0)).is_err());
///
/// let taken = buffer.pop_quantity(70.0).unwrap();
/// assert_eq!(taken.len(), 2); // 60 whole + 10 split off the second unit
/// assert!((buffer.quantity() - 30.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuelBuffer {
    units: VecDeque<Material>,

    /// None = unbounded
    capacity: Option<f64>,
}

impl FuelBuffer {
    /// Create an unbounded buffer
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Create a buffer holding at most `capacity` kg
    ///
    /// # Panics
    /// Panics if capacity is negative
    pub fn with_capacity(capacity: f64) -> Self {
        assert!(capacity >= 0.0, "capacity must be non-negative");
        Self {
            units: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    /// Total mass held (kg)
    pub fn quantity(&self) -> f64 {
        self.units.iter().map(Material::quantity).sum()
    }

    /// Capacity in kg, `None` when unbounded
    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// Remaining room before the capacity is hit
    ///
    /// Unbounded buffers report `f64::INFINITY`.
    pub fn space(&self) -> f64 {
        match self.capacity {
            Some(capacity) => (capacity - self.quantity()).max(0.0),
            None => f64::INFINITY,
        }
    }

    /// True when the buffer holds no mass (within tolerance)
    pub fn is_empty(&self) -> bool {
        self.quantity() < EPS
    }

    /// Number of discrete units held
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> impl Iterator<Item = &Material> {
        self.units.iter()
    }

    /// Bound the buffer to `capacity`
    ///
    /// Fails if the buffer already holds more than that.
    pub fn set_capacity(&mut self, capacity: f64) -> Result<(), BufferError> {
        check_amount(capacity)?;
        let held = self.quantity();
        if held > capacity + EPS {
            return Err(BufferError::CapacityExceeded {
                requested: held,
                available: capacity,
            });
        }
        self.capacity = Some(capacity);
        Ok(())
    }

    /// Add one unit
    pub fn push(&mut self, unit: Material) -> Result<(), BufferError> {
        self.check_room(unit.quantity())?;
        self.units.push_back(unit);
        Ok(())
    }

    /// Add several units, all or none
    pub fn push_all(&mut self, units: Vec<Material>) -> Result<(), BufferError> {
        let total: f64 = units.iter().map(Material::quantity).sum();
        self.check_room(total)?;
        self.units.extend(units);
        Ok(())
    }

    /// Put units back at the front, keeping their order
    ///
    /// Used to undo a withdrawal whose transfer failed, so no capacity check
    /// is made.
    pub(crate) fn restore(&mut self, units: Vec<Material>) {
        for unit in units.into_iter().rev() {
            self.units.push_front(unit);
        }
    }

    /// Remove units totaling exactly `amount`, oldest first
    ///
    /// The last unit touched is split when it holds more than is still
    /// needed. Requests within `EPS` of the held quantity drain the buffer.
    ///
    /// # Errors
    /// - `InvalidQuantity` if amount is NaN or infinite
    /// - `NegativeQuantity` if amount < 0
    /// - `InsufficientQuantity` if amount exceeds what is held; the buffer
    ///   is not modified
    pub fn pop_quantity(&mut self, amount: f64) -> Result<Vec<Material>, BufferError> {
        check_amount(amount)?;
        let available = self.quantity();
        if amount > available + EPS {
            return Err(BufferError::InsufficientQuantity {
                requested: amount,
                available,
            });
        }

        let mut remaining = amount.min(available);
        let mut taken = Vec::new();
        while remaining > 0.0 {
            let Some(front) = self.units.front_mut() else {
                break;
            };
            if front.quantity() <= remaining + EPS {
                remaining = (remaining - front.quantity()).max(0.0);
                if let Some(unit) = self.units.pop_front() {
                    taken.push(unit);
                }
            } else {
                taken.push(front.extract(remaining));
                remaining = 0.0;
            }
        }
        Ok(taken)
    }

    fn check_room(&self, amount: f64) -> Result<(), BufferError> {
        check_amount(amount)?;
        let available = self.space();
        if amount > available + EPS {
            return Err(BufferError::CapacityExceeded {
                requested: amount,
                available,
            });
        }
        Ok(())
    }
}

fn check_amount(amount: f64) -> Result<(), BufferError> {
    if !amount.is_finite() {
        return Err(BufferError::InvalidQuantity(amount));
    }
    if amount < 0.0 {
        return Err(BufferError::NegativeQuantity(amount));
    }
    Ok(())
}

/// Move `amount` from `source` to `destination`, retagging every unit
///
/// Each withdrawn unit is replaced by a new unit of the same quantity
/// carrying `recipe`. The destination's room is checked before the source is
/// touched, so a failed move changes neither buffer.
///
/// Returns the mass moved.
pub fn move_fuel(
    source: &mut FuelBuffer,
    destination: &mut FuelBuffer,
    amount: f64,
    recipe: &str,
) -> Result<f64, BufferError> {
    destination.check_room(amount)?;
    let withdrawn = source.pop_quantity(amount)?;
    let retagged: Vec<Material> = withdrawn
        .into_iter()
        .map(|unit| Material::new(recipe, unit.quantity()))
        .collect();
    let moved = retagged.iter().map(Material::quantity).sum();
    destination.push_all(retagged)?;
    Ok(moved)
}

/// Move the entire contents of `source`; no-op when it is empty
pub fn move_all(
    source: &mut FuelBuffer,
    destination: &mut FuelBuffer,
    recipe: &str,
) -> Result<f64, BufferError> {
    if source.is_empty() {
        return Ok(0.0);
    }
    let amount = source.quantity();
    move_fuel(source, destination, amount, recipe)
}
