//! Domain models for the batch reactor

pub mod buffer;
pub mod event;
pub mod production;
pub mod resource;
pub mod transaction;

// Re-exports
pub use buffer::{move_all, move_fuel, BufferError, BufferKind, FuelBuffer};
pub use event::{EventLog, ReactorEvent};
pub use production::{CommodityProducer, ProductionInfo};
pub use resource::{GenericResource, Material, Resource, EPS};
pub use transaction::{Transaction, TransactionKind};
