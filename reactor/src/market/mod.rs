//! Market interaction
//!
//! The facility never clears trades itself. It talks to the outside through
//! a [`MarketGateway`]:
//!
//! ```text
//! tick   → send(Message{request|offer})     to the market for the commodity
//! later  ← receive_order(Message{order})    market matched one of our offers
//! tock   → deliver(order, manifest)         fuel handed to the requester
//! ```
//!
//! Fuel bought by the facility arrives the other way round: the supplier's
//! host calls `deposit_resource` on the reactor.
//!
//! [`Outbox`] is a gateway that simply records everything, for hosts that
//! resolve trades between steps.

use crate::models::resource::Material;
use crate::models::transaction::Transaction;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while talking to markets
#[derive(Debug, Error, PartialEq)]
pub enum MarketError {
    #[error("No market registered for commodity '{commodity}'")]
    NoMarket { commodity: String },

    #[error("Market rejected message: {0}")]
    Rejected(String),
}

/// Envelope carrying a transaction between a facility and a market
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Unique message identifier (UUID)
    pub id: String,

    pub sender: String,

    pub recipient: String,

    pub transaction: Transaction,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        transaction: Transaction,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            recipient: recipient.into(),
            transaction,
        }
    }
}

/// Outbound side of the market protocol
///
/// Implementations must not call back into the facility; replies arrive on
/// a later step through `receive_order` / `deposit_resource`.
pub trait MarketGateway {
    /// Name of the market that clears `commodity`
    fn market_for(&self, commodity: &str) -> Option<String>;

    /// Dispatch a request or offer
    fn send(&mut self, message: Message) -> Result<(), MarketError>;

    /// Hand fuel withdrawn for an executed order to its requester
    ///
    /// On error the facility keeps the fuel and retries the order at its
    /// next tock.
    fn deliver(
        &mut self,
        order: &Transaction,
        manifest: Vec<Material>,
    ) -> Result<(), MarketError>;
}

/// Fuel handed over for an executed order
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub order: Transaction,
    pub manifest: Vec<Material>,
}

impl Delivery {
    pub fn quantity(&self) -> f64 {
        self.manifest.iter().map(Material::quantity).sum()
    }
}

/// Recording gateway
///
/// # Example
/// ```
/// use batch_reactor_core_rs::market::{MarketGateway, Outbox};
///
/// let outbox = Outbox::new().with_market("fresh_uox", "UOX_MARKET");
/// assert_eq!(outbox.market_for("fresh_uox").as_deref(), Some("UOX_MARKET"));
/// assert_eq!(outbox.market_for("mox"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    markets: HashMap<String, String>,
    messages: Vec<Message>,
    deliveries: Vec<Delivery>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `commodity` to the market named `market` (builder pattern)
    pub fn with_market(mut self, commodity: impl Into<String>, market: impl Into<String>) -> Self {
        self.markets.insert(commodity.into(), market.into());
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Drain recorded messages
    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Drain recorded deliveries
    pub fn take_deliveries(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries)
    }
}

impl MarketGateway for Outbox {
    fn market_for(&self, commodity: &str) -> Option<String> {
        self.markets.get(commodity).cloned()
    }

    fn send(&mut self, message: Message) -> Result<(), MarketError> {
        self.messages.push(message);
        Ok(())
    }

    fn deliver(
        &mut self,
        order: &Transaction,
        manifest: Vec<Material>,
    ) -> Result<(), MarketError> {
        self.deliveries.push(Delivery {
            order: order.clone(),
            manifest,
        });
        Ok(())
    }
}
