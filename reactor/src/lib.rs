//! Batch Reactor Core - Rust Engine
//!
//! A batch-refuelled reactor facility for discrete-event fuel-cycle
//! simulations. The host drives it with two callbacks per step; the facility
//! trades fuel through commodity markets it never clears itself.
//!
//! # Architecture
//!
//! - **config**: Facility parameters and validation
//! - **models**: Domain types (FuelBuffer, Material, Transaction, events)
//! - **market**: Outbound gateway and message envelope
//! - **reactor**: Phase state machine and step callbacks
//!
//! # Critical Invariants
//!
//! 1. The in-core buffer never holds more than `core_loading`
//! 2. Phase changes only inside `tick` / `tock` / `enter_simulation`
//! 3. Orders are executed at the tock after they arrive, never sooner

// Module declarations
pub mod config;
pub mod market;
pub mod models;
pub mod reactor;

// Re-exports for convenience
pub use config::{CommodityProduction, ConfigError, FuelInput, FuelOutput, ReactorConfig};
pub use market::{Delivery, MarketError, MarketGateway, Message, Outbox};
pub use models::{
    buffer::{move_all, move_fuel, BufferError, BufferKind, FuelBuffer},
    event::{EventLog, ReactorEvent},
    production::{CommodityProducer, ProductionInfo},
    resource::{GenericResource, Material, Resource, EPS},
    transaction::{Transaction, TransactionKind},
};
pub use reactor::{BatchReactor, Phase, ReactorError};
