//! Facility configuration
//!
//! Parameters are read once before the facility enters the simulation.
//! Field names follow the facility input schema (`fuel_input`,
//! `incommodity`, `cyclelength`, ...).
//!
//! # Example
//!
//! ```rust
//! use batch_reactor_core_rs::ReactorConfig;
//!
//! let json = r#"{
//!     "fuel_input": { "incommodity": "fresh_uox", "inrecipe": "uox_fresh" },
//!     "fuel_output": { "outcommodity": "spent_uox", "outrecipe": "uox_spent" },
//!     "cyclelength": 18,
//!     "coreloading": 120.0,
//!     "batchespercore": 3,
//!     "commodity_production": { "commodity": "power", "capacity": 1000.0, "cost": 1.0 }
//! }"#;
//!
//! let config = ReactorConfig::from_json(json).unwrap();
//! assert_eq!(config.batch_size(), 40.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or applying a configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Cycle length must be positive, got {0}")]
    NonPositiveCycleLength(i64),

    #[error("Core loading must be positive and finite, got {0}")]
    NonPositiveCoreLoading(f64),

    #[error("Batches per core must be positive, got {0}")]
    NonPositiveBatches(i64),

    #[error("Required field '{0}' is empty")]
    MissingField(&'static str),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Facility is already in the simulation and cannot be reconfigured")]
    AlreadyInSimulation,
}

/// Intake side: what the facility buys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelInput {
    pub incommodity: String,
    pub inrecipe: String,
}

/// Discharge side: what the facility sells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelOutput {
    pub outcommodity: String,
    pub outrecipe: String,
}

/// Produced commodity with its capacity and cost
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommodityProduction {
    pub commodity: String,
    pub capacity: f64,
    pub cost: f64,
}

/// Complete batch reactor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorConfig {
    pub fuel_input: FuelInput,

    pub fuel_output: FuelOutput,

    /// Steps in one operating cycle
    pub cyclelength: i64,

    /// Mass of a full core (kg)
    pub coreloading: f64,

    /// Equal batches making up a core
    pub batchespercore: i64,

    pub commodity_production: CommodityProduction,

    /// Steps the facility operates after entering the simulation (None = forever)
    #[serde(default)]
    pub lifetime: Option<usize>,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            fuel_input: FuelInput::default(),
            fuel_output: FuelOutput::default(),
            cyclelength: 1,
            coreloading: 1.0,
            batchespercore: 1,
            commodity_production: CommodityProduction::default(),
            lifetime: None,
        }
    }
}

impl ReactorConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ReactorConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every required parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fuel_input.incommodity.is_empty() {
            return Err(ConfigError::MissingField("incommodity"));
        }
        if self.fuel_input.inrecipe.is_empty() {
            return Err(ConfigError::MissingField("inrecipe"));
        }
        if self.fuel_output.outcommodity.is_empty() {
            return Err(ConfigError::MissingField("outcommodity"));
        }
        if self.fuel_output.outrecipe.is_empty() {
            return Err(ConfigError::MissingField("outrecipe"));
        }
        if self.commodity_production.commodity.is_empty() {
            return Err(ConfigError::MissingField("commodity"));
        }
        if self.cyclelength <= 0 {
            return Err(ConfigError::NonPositiveCycleLength(self.cyclelength));
        }
        if !(self.coreloading.is_finite() && self.coreloading > 0.0) {
            return Err(ConfigError::NonPositiveCoreLoading(self.coreloading));
        }
        if self.batchespercore <= 0 {
            return Err(ConfigError::NonPositiveBatches(self.batchespercore));
        }
        Ok(())
    }

    /// Mass of one batch (kg)
    pub fn batch_size(&self) -> f64 {
        self.coreloading / self.batchespercore as f64
    }
}
