//! Commodity production registry
//!
//! Tracks which commodities a facility produces and at what capacity and
//! cost. The reactor registers one entry from its configuration; capacity
//! planners outside the facility read it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Production capacity and unit cost of one commodity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionInfo {
    /// Output per step
    pub capacity: f64,

    /// Cost per unit produced
    pub cost: f64,
}

impl Default for ProductionInfo {
    fn default() -> Self {
        Self {
            capacity: 0.0,
            cost: 0.0,
        }
    }
}

/// Commodities produced by a facility
///
/// # Example
/// ```
/// use batch_reactor_core_rs::models::production::CommodityProducer;
///
/// let mut producer = CommodityProducer::new();
/// producer.add_commodity("power");
/// producer.set_capacity("power", 1000.0);
/// producer.set_cost("power", 3.5);
///
/// assert!(producer.produces("power"));
/// assert_eq!(producer.capacity("power"), Some(1000.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommodityProducer {
    commodities: BTreeMap<String, ProductionInfo>,
}

impl CommodityProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commodity with zero capacity and cost
    ///
    /// Registering an existing commodity keeps its current values.
    pub fn add_commodity(&mut self, commodity: impl Into<String>) {
        self.commodities.entry(commodity.into()).or_default();
    }

    pub fn set_capacity(&mut self, commodity: &str, capacity: f64) {
        self.commodities
            .entry(commodity.to_string())
            .or_default()
            .capacity = capacity;
    }

    pub fn set_cost(&mut self, commodity: &str, cost: f64) {
        self.commodities
            .entry(commodity.to_string())
            .or_default()
            .cost = cost;
    }

    pub fn produces(&self, commodity: &str) -> bool {
        self.commodities.contains_key(commodity)
    }

    pub fn capacity(&self, commodity: &str) -> Option<f64> {
        self.commodities.get(commodity).map(|info| info.capacity)
    }

    pub fn cost(&self, commodity: &str) -> Option<f64> {
        self.commodities.get(commodity).map(|info| info.cost)
    }

    /// Commodity names in sorted order
    pub fn commodities(&self) -> impl Iterator<Item = &str> {
        self.commodities.keys().map(String::as_str)
    }

    /// Replace this registry's contents with a copy of `source`
    pub fn copy_from(&mut self, source: &CommodityProducer) {
        self.commodities = source.commodities.clone();
    }
}
