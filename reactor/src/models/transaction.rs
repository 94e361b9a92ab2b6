//! Transaction model
//!
//! Represents one side of a commodity trade as the facility sees it.
//! Each transaction has:
//! - Kind (Request = facility wants the commodity, Offer = facility has it)
//! - Commodity name and a resource token sized to the amount traded
//! - Minimum fill fraction (always 1.0, all-or-nothing) and price (always 0)
//! - Supplier and requester identities; the issuer fills its own side and the
//!   market fills the other when it matches
//!
//! Price discovery belongs to the market, not the facility.

use crate::models::resource::Resource;
use serde::{Deserialize, Serialize};

/// Which side of the market a transaction was issued from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Issuer seeks the commodity (fuel in)
    Request,

    /// Issuer supplies the commodity (fuel out)
    Offer,
}

impl TransactionKind {
    pub const fn name(self) -> &'static str {
        match self {
            TransactionKind::Request => "request",
            TransactionKind::Offer => "offer",
        }
    }
}

/// A request or offer for a commodity
///
/// # Example
/// ```
/// use batch_reactor_core_rs::{Material, Resource, Transaction, TransactionKind};
///
/// let request = Transaction::new(
///     "REACTOR_1",
///     TransactionKind::Request,
///     "fresh_uox",
///     Resource::Material(Material::new("uox_fresh", 30.0)),
/// );
/// assert_eq!(request.requester_id(), Some("REACTOR_1"));
/// assert_eq!(request.supplier_id(), None);
///
/// let order = request.matched_with("ENRICHMENT_1");
/// assert_eq!(order.supplier_id(), Some("ENRICHMENT_1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (UUID)
    id: String,

    kind: TransactionKind,

    commodity: String,

    /// Fraction of the amount that must be filled (1.0 = all-or-nothing)
    min_frac: f64,

    price: f64,

    /// Token carrying the traded amount
    resource: Resource,

    supplier_id: Option<String>,

    requester_id: Option<String>,
}

impl Transaction {
    /// Create a transaction issued by `issuer_id`
    ///
    /// The issuer becomes the requester of a `Request` or the supplier of an
    /// `Offer`.
    pub fn new(
        issuer_id: impl Into<String>,
        kind: TransactionKind,
        commodity: impl Into<String>,
        resource: Resource,
    ) -> Self {
        let issuer_id = issuer_id.into();
        let (supplier_id, requester_id) = match kind {
            TransactionKind::Request => (None, Some(issuer_id)),
            TransactionKind::Offer => (Some(issuer_id), None),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            commodity: commodity.into(),
            min_frac: 1.0,
            price: 0.0,
            resource,
            supplier_id,
            requester_id,
        }
    }

    /// Fill the open side of the trade with `counterparty_id`
    ///
    /// This is what a market does when it pairs a request with an offer.
    pub fn matched_with(&self, counterparty_id: impl Into<String>) -> Transaction {
        let mut order = self.clone();
        match self.kind {
            TransactionKind::Request => order.supplier_id = Some(counterparty_id.into()),
            TransactionKind::Offer => order.requester_id = Some(counterparty_id.into()),
        }
        order
    }

    /// Replace the resource token, e.g. when a market fills less than offered
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn commodity(&self) -> &str {
        &self.commodity
    }

    pub fn min_frac(&self) -> f64 {
        self.min_frac
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Amount traded (kg)
    pub fn quantity(&self) -> f64 {
        self.resource.quantity()
    }

    pub fn supplier_id(&self) -> Option<&str> {
        self.supplier_id.as_deref()
    }

    pub fn requester_id(&self) -> Option<&str> {
        self.requester_id.as_deref()
    }

    /// Check whether `facility_id` is the recorded supplier
    pub fn is_supplier(&self, facility_id: &str) -> bool {
        self.supplier_id() == Some(facility_id)
    }

    /// Check whether `facility_id` is the recorded requester
    pub fn is_requester(&self, facility_id: &str) -> bool {
        self.requester_id() == Some(facility_id)
    }
}
