//! Batch Reactor Engine
//!
//! A reactor that is refuelled one batch at a time. Fuel flows through three
//! inventories:
//!
//! ```text
//! market -deposit-> pre-core -load-> in-core -offload-> post-core -order-> market
//! ```
//!
//! # Step protocol
//!
//! The host calls, once per step and in this order:
//!
//! ```text
//! tick(t):
//! 1. Force End if the lifetime is reached
//! 2. Phase action (offload a batch / request fuel / offload the core)
//! 3. Offer everything in post-core
//!
//! tock(t):
//! 1. Execute queued orders (FIFO)
//! 2. Phase action (load core / advance cycle timer / decommission)
//! ```
//!
//! # Example
//!
//! ```rust
//! use batch_reactor_core_rs::{BatchReactor, Phase, ReactorConfig};
//! use batch_reactor_core_rs::market::Outbox;
//!
//! let config = ReactorConfig::from_json(r#"{
//!     "fuel_input": { "incommodity": "fresh_uox", "inrecipe": "uox_fresh" },
//!     "fuel_output": { "outcommodity": "spent_uox", "outrecipe": "uox_spent" },
//!     "cyclelength": 3,
//!     "coreloading": 90.0,
//!     "batchespercore": 3,
//!     "commodity_production": { "commodity": "power", "capacity": 1000.0, "cost": 1.0 }
//! }"#).unwrap();
//!
//! let mut reactor = BatchReactor::from_config("REACTOR_1", &config).unwrap();
//! reactor.enter_simulation(0).unwrap();
//!
//! let mut outbox = Outbox::new()
//!     .with_market("fresh_uox", "UOX_MARKET")
//!     .with_market("spent_uox", "SPENT_MARKET");
//!
//! reactor.tick(0, &mut outbox).unwrap();
//! let request = &outbox.messages()[0].transaction;
//! assert_eq!(request.quantity(), 90.0);
//! assert_eq!(reactor.phase(), Phase::Begin);
//! ```

use crate::config::{ConfigError, ReactorConfig};
use crate::market::{MarketError, MarketGateway, Message};
use crate::models::buffer::{move_all, move_fuel, BufferKind, FuelBuffer};
use crate::models::event::{EventLog, ReactorEvent};
use crate::models::production::CommodityProducer;
use crate::models::resource::{GenericResource, Material, Resource, EPS};
use crate::models::transaction::{Transaction, TransactionKind};
use crate::reactor::{Phase, ReactorError};
use std::collections::VecDeque;
use tracing::{debug, info, trace, warn};

/// A batch-refuelled reactor facility
///
/// Owns its three fuel buffers, the order queue and the phase state machine.
/// Nothing outside this type changes `phase`.
#[derive(Debug, Clone)]
pub struct BatchReactor {
    /// Facility identifier, used as counterparty name in trades
    id: String,

    // Configured parameters
    cycle_length: usize,
    batches_per_core: usize,
    core_loading: f64,
    in_commodity: String,
    in_recipe: String,
    out_commodity: String,
    out_recipe: String,
    lifetime: Option<usize>,
    producer: CommodityProducer,

    // Runtime state
    phase: Phase,
    cycle_timer: usize,
    build_time: Option<usize>,
    /// Step of the latest callback, stamps asynchronous arrivals
    current_time: usize,
    decommissioned: bool,

    /// Fresh fuel awaiting load (unbounded)
    pre_core: FuelBuffer,

    /// The core, bounded to `core_loading` once in the simulation
    in_core: FuelBuffer,

    /// Discharged fuel awaiting pickup (unbounded)
    post_core: FuelBuffer,

    /// Matched orders, executed at the next tock in arrival order
    orders_waiting: VecDeque<Message>,

    events: EventLog,
}

impl BatchReactor {
    /// Create an unconfigured reactor
    ///
    /// Defaults: cycle length 1, core loading 1, one batch, no commodities,
    /// unbounded buffers, phase `Init`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cycle_length: 1,
            batches_per_core: 1,
            core_loading: 1.0,
            in_commodity: String::new(),
            in_recipe: String::new(),
            out_commodity: String::new(),
            out_recipe: String::new(),
            lifetime: None,
            producer: CommodityProducer::new(),
            phase: Phase::Init,
            cycle_timer: 1,
            build_time: None,
            current_time: 0,
            decommissioned: false,
            pre_core: FuelBuffer::unlimited(),
            in_core: FuelBuffer::unlimited(),
            post_core: FuelBuffer::unlimited(),
            orders_waiting: VecDeque::new(),
            events: EventLog::new(),
        }
    }

    /// Create and configure a reactor in one step
    pub fn from_config(
        id: impl Into<String>,
        config: &ReactorConfig,
    ) -> Result<Self, ReactorError> {
        let mut reactor = Self::new(id);
        reactor.configure(config)?;
        Ok(reactor)
    }

    /// Create a new reactor with the same parameters as `source`
    ///
    /// Only configuration is copied; inventories, phase and history start
    /// fresh.
    pub fn from_prototype(id: impl Into<String>, source: &BatchReactor) -> Self {
        let mut reactor = Self::new(id);
        reactor.cycle_length = source.cycle_length;
        reactor.core_loading = source.core_loading;
        reactor.batches_per_core = source.batches_per_core;
        reactor.in_commodity = source.in_commodity.clone();
        reactor.out_commodity = source.out_commodity.clone();
        reactor.in_recipe = source.in_recipe.clone();
        reactor.out_recipe = source.out_recipe.clone();
        reactor.lifetime = source.lifetime;
        reactor.producer.copy_from(&source.producer);
        reactor
    }

    /// Apply a configuration
    ///
    /// Only allowed before the facility enters the simulation.
    pub fn configure(&mut self, config: &ReactorConfig) -> Result<(), ConfigError> {
        if self.phase != Phase::Init {
            return Err(ConfigError::AlreadyInSimulation);
        }
        config.validate()?;

        self.in_commodity = config.fuel_input.incommodity.clone();
        self.in_recipe = config.fuel_input.inrecipe.clone();
        self.out_commodity = config.fuel_output.outcommodity.clone();
        self.out_recipe = config.fuel_output.outrecipe.clone();
        // validate() guarantees these are positive
        self.cycle_length = config.cyclelength as usize;
        self.core_loading = config.coreloading;
        self.batches_per_core = config.batchespercore as usize;
        self.lifetime = config.lifetime;

        let production = &config.commodity_production;
        self.producer.add_commodity(production.commodity.clone());
        self.producer
            .set_capacity(&production.commodity, production.capacity);
        self.producer.set_cost(&production.commodity, production.cost);
        Ok(())
    }

    /// Enter the simulation at step `time`
    ///
    /// Bounds the core to `core_loading`, records the build time, resets the
    /// cycle timer and moves to `Begin`.
    pub fn enter_simulation(&mut self, time: usize) -> Result<(), ReactorError> {
        if self.phase != Phase::Init {
            return Err(ConfigError::AlreadyInSimulation.into());
        }

        self.in_core.set_capacity(self.core_loading)?;
        self.build_time = Some(time);
        self.current_time = time;
        self.cycle_timer = 1;
        self.events.log(ReactorEvent::EnteredSimulation {
            time,
            core_loading: self.core_loading,
        });
        self.set_phase(Phase::Begin, time);

        debug!(
            reactor = %self.id,
            core_loading = self.core_loading,
            in_core_capacity = ?self.in_core.capacity(),
            cycle_timer = self.cycle_timer,
            phase = %self.phase,
            "batch reactor entering the simulation"
        );
        Ok(())
    }

    // ========================================================================
    // Step callbacks
    // ========================================================================

    /// First callback of a step: requests, discharges and offers
    pub fn tick(
        &mut self,
        time: usize,
        gateway: &mut dyn MarketGateway,
    ) -> Result<(), ReactorError> {
        self.ensure_active()?;
        self.current_time = time;
        info!(reactor = %self.id, time, phase = %self.phase, "tick");

        if self.lifetime_reached(time) && self.phase != Phase::End {
            self.set_phase(Phase::End, time);
        }

        match self.phase {
            Phase::Init | Phase::Operation => {}
            Phase::Refuel => {
                self.offload_batch(time)?;
                self.request_fuel(time, gateway)?;
            }
            Phase::Waiting | Phase::Begin => self.request_fuel(time, gateway)?,
            Phase::End => self.offload_core(time)?,
        }

        self.make_offers(time, gateway)
    }

    /// Second callback of a step: settle orders, then load or advance
    pub fn tock(
        &mut self,
        time: usize,
        gateway: &mut dyn MarketGateway,
    ) -> Result<(), ReactorError> {
        self.ensure_active()?;
        self.current_time = time;
        info!(reactor = %self.id, time, phase = %self.phase, "tock");

        self.handle_orders(time, gateway)?;

        match self.phase {
            Phase::End => {
                if self.post_core.is_empty() {
                    self.decommission(time);
                }
            }
            Phase::Begin | Phase::Waiting | Phase::Refuel => {
                self.load_core(time)?;
                if self.core_filled() {
                    self.set_phase(Phase::Operation, time);
                } else {
                    self.set_phase(Phase::Waiting, time);
                }
            }
            Phase::Operation => {
                self.cycle_timer += 1;
                if self.cycle_complete() {
                    self.set_phase(Phase::Refuel, time);
                }
            }
            Phase::Init => {
                return Err(ReactorError::UndefinedPhaseBehavior {
                    step: "tock",
                    phase: self.phase,
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Market protocol
    // ========================================================================

    /// Queue a matched order for execution at the next tock
    ///
    /// # Errors
    /// `ProtocolViolation` if this facility is not the order's supplier; the
    /// order is not queued.
    pub fn receive_order(&mut self, message: Message) -> Result<(), ReactorError> {
        if !message.transaction.is_supplier(&self.id) {
            return Err(ReactorError::ProtocolViolation(format!(
                "{} is not the supplier of transaction {} (supplier: {:?})",
                self.id,
                message.transaction.id(),
                message.transaction.supplier_id()
            )));
        }

        let time = self.current_time;
        trace!(reactor = %self.id, tx_id = message.transaction.id(), "received an order");
        self.events.log(ReactorEvent::OrderReceived {
            time,
            tx_id: message.transaction.id().to_string(),
        });
        self.orders_waiting.push_back(message);
        Ok(())
    }

    /// Withdraw the amount named by `order` from post-core
    ///
    /// # Errors
    /// `ProtocolViolation` if this facility is not the order's supplier or
    /// post-core holds less than the order amount; nothing is withdrawn.
    pub fn withdraw_resource(
        &mut self,
        order: &Transaction,
    ) -> Result<Vec<Material>, ReactorError> {
        if !order.is_supplier(&self.id) {
            return Err(ReactorError::ProtocolViolation(format!(
                "{} cannot release fuel for transaction {}: not the supplier",
                self.id,
                order.id()
            )));
        }

        let amount = order.quantity();
        let held = self.post_core.quantity();
        let manifest = self
            .post_core
            .pop_quantity(amount)
            .map_err(|e| ReactorError::ProtocolViolation(e.to_string()))?;

        debug!(reactor = %self.id, removed = amount, held, "removed fuel from post-core");
        Ok(manifest)
    }

    /// Accept fuel delivered against one of our requests into pre-core
    ///
    /// # Errors
    /// `ProtocolViolation` if this facility is not the transaction's
    /// requester.
    pub fn deposit_resource(
        &mut self,
        transaction: &Transaction,
        manifest: Vec<Material>,
    ) -> Result<(), ReactorError> {
        if !transaction.is_requester(&self.id) {
            return Err(ReactorError::ProtocolViolation(format!(
                "{} did not request transaction {}",
                self.id,
                transaction.id()
            )));
        }

        let before = self.pre_core.quantity();
        self.pre_core.push_all(manifest)?;
        let added = self.pre_core.quantity() - before;

        debug!(reactor = %self.id, added, "added fuel to pre-core");
        self.events.log(ReactorEvent::FuelDeposited {
            time: self.current_time,
            tx_id: transaction.id().to_string(),
            amount: added,
        });
        Ok(())
    }

    /// Execute every queued order, oldest first
    ///
    /// An order post-core cannot satisfy is dropped with a
    /// `ProtocolViolation`. When the gateway refuses a delivery, the fuel goes
    /// back into post-core and the order back to the head of the queue.
    fn handle_orders(
        &mut self,
        time: usize,
        gateway: &mut dyn MarketGateway,
    ) -> Result<(), ReactorError> {
        while let Some(order) = self.orders_waiting.pop_front() {
            let manifest = self.withdraw_resource(&order.transaction)?;
            let amount: f64 = manifest.iter().map(Material::quantity).sum();

            if let Err(error) = gateway.deliver(&order.transaction, manifest.clone()) {
                warn!(
                    reactor = %self.id,
                    tx_id = order.transaction.id(),
                    %error,
                    "delivery refused, returning fuel to post-core"
                );
                self.post_core.restore(manifest);
                self.orders_waiting.push_front(order);
                return Err(error.into());
            }

            let transaction = order.transaction;
            self.events.log(ReactorEvent::TransferApproved {
                time,
                tx_id: transaction.id().to_string(),
                requester_id: transaction.requester_id().unwrap_or_default().to_string(),
                amount,
            });
        }
        Ok(())
    }

    /// Request enough fresh fuel to top the core up
    fn request_fuel(
        &mut self,
        time: usize,
        gateway: &mut dyn MarketGateway,
    ) -> Result<(), ReactorError> {
        let fuel_quantity = self.pre_core.quantity() + self.in_core.quantity();
        let deficit = self.core_loading - fuel_quantity;

        if deficit <= EPS {
            debug!(reactor = %self.id, deficit, "fuel on hand covers the core, no request");
            self.events.log(ReactorEvent::RequestSkipped {
                time,
                commodity: self.in_commodity.clone(),
                deficit,
            });
            return Ok(());
        }

        let commodity = self.in_commodity.clone();
        let tx_id =
            self.interact_with_market(&commodity, deficit, TransactionKind::Request, gateway)?;
        self.events.log(ReactorEvent::FuelRequested {
            time,
            tx_id,
            commodity,
            amount: deficit,
        });
        Ok(())
    }

    /// Offer everything in post-core
    fn make_offers(
        &mut self,
        time: usize,
        gateway: &mut dyn MarketGateway,
    ) -> Result<(), ReactorError> {
        if self.post_core.is_empty() {
            return Ok(());
        }

        let amount = self.post_core.quantity();
        let commodity = self.out_commodity.clone();
        let tx_id = self.interact_with_market(&commodity, amount, TransactionKind::Offer, gateway)?;
        self.events.log(ReactorEvent::FuelOffered {
            time,
            tx_id,
            commodity,
            amount,
        });
        Ok(())
    }

    /// Build a transaction and send it to the market for `commodity`
    ///
    /// Returns the transaction id.
    fn interact_with_market(
        &self,
        commodity: &str,
        amount: f64,
        kind: TransactionKind,
        gateway: &mut dyn MarketGateway,
    ) -> Result<String, ReactorError> {
        let market = gateway
            .market_for(commodity)
            .ok_or_else(|| MarketError::NoMarket {
                commodity: commodity.to_string(),
            })?;

        let resource = match kind {
            TransactionKind::Offer => Resource::Generic(GenericResource {
                units: "kg".to_string(),
                commodity: commodity.to_string(),
                quantity: amount,
            }),
            TransactionKind::Request => Resource::Material(Material::new(&self.in_recipe, amount)),
        };

        let transaction = Transaction::new(&self.id, kind, commodity, resource);
        let tx_id = transaction.id().to_string();
        info!(
            reactor = %self.id,
            kind = kind.name(),
            amount,
            commodity,
            market = %market,
            "sending to market"
        );
        gateway.send(Message::new(&self.id, market, transaction))?;
        Ok(tx_id)
    }

    // ========================================================================
    // Fuel handling
    // ========================================================================

    /// Move pre-core fuel into the core, up to its remaining room
    fn load_core(&mut self, time: usize) -> Result<(), ReactorError> {
        let amount = self.pre_core.quantity().min(self.in_core.space());
        if amount < EPS {
            return Ok(());
        }

        let moved = move_fuel(&mut self.pre_core, &mut self.in_core, amount, &self.out_recipe)?;
        self.log_move(time, BufferKind::PreCore, BufferKind::InCore, moved);
        debug!(
            reactor = %self.id,
            pre_core = self.pre_core.quantity(),
            in_core = self.in_core.quantity(),
            "moved fuel into the core"
        );
        Ok(())
    }

    /// Discharge one batch from the core
    fn offload_batch(&mut self, time: usize) -> Result<(), ReactorError> {
        let batch = self.batch_size();
        let moved = move_fuel(&mut self.in_core, &mut self.post_core, batch, &self.out_recipe)?;
        self.log_move(time, BufferKind::InCore, BufferKind::PostCore, moved);
        debug!(
            reactor = %self.id,
            in_core = self.in_core.quantity(),
            post_core = self.post_core.quantity(),
            "removed a batch of fuel from the core"
        );
        Ok(())
    }

    /// Discharge the whole core
    fn offload_core(&mut self, time: usize) -> Result<(), ReactorError> {
        let moved = move_all(&mut self.in_core, &mut self.post_core, &self.out_recipe)?;
        if moved > 0.0 {
            self.log_move(time, BufferKind::InCore, BufferKind::PostCore, moved);
        }
        debug!(
            reactor = %self.id,
            pre_core = self.pre_core.quantity(),
            in_core = self.in_core.quantity(),
            post_core = self.post_core.quantity(),
            "removed the core"
        );
        Ok(())
    }

    fn log_move(&mut self, time: usize, from: BufferKind, to: BufferKind, amount: f64) {
        self.events.log(ReactorEvent::FuelMoved {
            time,
            from,
            to,
            amount,
        });
    }

    // ========================================================================
    // Phase and cycle bookkeeping
    // ========================================================================

    fn set_phase(&mut self, next: Phase, time: usize) {
        if next.restarts_cycle() {
            self.cycle_timer = 1;
        }
        if next == self.phase {
            return;
        }

        debug!(reactor = %self.id, from = %self.phase, to = %next, "changing phase");
        self.events.log(ReactorEvent::PhaseChange {
            time,
            from: self.phase,
            to: next,
        });
        self.phase = next;
    }

    fn cycle_complete(&self) -> bool {
        self.cycle_timer >= self.cycle_length
    }

    /// Core full within tolerance of its capacity
    pub fn core_filled(&self) -> bool {
        match self.in_core.capacity() {
            Some(capacity) => (self.in_core.quantity() - capacity).abs() < EPS,
            None => false,
        }
    }

    /// True once `lifetime` steps have passed since entry
    pub fn lifetime_reached(&self, time: usize) -> bool {
        match (self.lifetime, self.build_time) {
            (Some(lifetime), Some(build_time)) => time >= build_time.saturating_add(lifetime),
            _ => false,
        }
    }

    fn decommission(&mut self, time: usize) {
        info!(reactor = %self.id, time, "decommissioning");
        self.decommissioned = true;
        self.events.log(ReactorEvent::Decommissioned { time });
    }

    /// True when every inventory is empty and the facility may be destroyed
    pub fn check_decommission_condition(&self) -> bool {
        self.pre_core.is_empty() && self.in_core.is_empty() && self.post_core.is_empty()
    }

    fn ensure_active(&self) -> Result<(), ReactorError> {
        if self.decommissioned {
            return Err(ReactorError::Decommissioned);
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_timer(&self) -> usize {
        self.cycle_timer
    }

    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    pub fn core_loading(&self) -> f64 {
        self.core_loading
    }

    pub fn batches_per_core(&self) -> usize {
        self.batches_per_core
    }

    /// Mass of one batch: `core_loading / batches_per_core`
    pub fn batch_size(&self) -> f64 {
        self.core_loading / self.batches_per_core as f64
    }

    pub fn in_commodity(&self) -> &str {
        &self.in_commodity
    }

    pub fn in_recipe(&self) -> &str {
        &self.in_recipe
    }

    pub fn out_commodity(&self) -> &str {
        &self.out_commodity
    }

    pub fn out_recipe(&self) -> &str {
        &self.out_recipe
    }

    pub fn lifetime(&self) -> Option<usize> {
        self.lifetime
    }

    pub fn producer(&self) -> &CommodityProducer {
        &self.producer
    }

    pub fn pre_core(&self) -> &FuelBuffer {
        &self.pre_core
    }

    pub fn in_core(&self) -> &FuelBuffer {
        &self.in_core
    }

    pub fn post_core(&self) -> &FuelBuffer {
        &self.post_core
    }

    /// Orders queued for the next tock
    pub fn orders_waiting(&self) -> usize {
        self.orders_waiting.len()
    }

    pub fn is_decommissioned(&self) -> bool {
        self.decommissioned
    }

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }
}

impl std::fmt::Display for BatchReactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} has facility parameters {{, Cycle Length = {}, Core Loading = {}, \
             Batches Per Core = {}, converts commodity '{}' into commodity '{}'}}",
            self.id,
            self.cycle_length,
            self.core_loading,
            self.batches_per_core,
            self.in_commodity,
            self.out_commodity
        )
    }
}
