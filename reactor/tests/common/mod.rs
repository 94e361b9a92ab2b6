//! Shared fixtures for integration tests
//!
//! `resolve` stands in for a market that fills every request from a fresh
//! fuel source and takes every offer into a spent fuel sink.

#![allow(dead_code)]

use batch_reactor_core_rs::{
    BatchReactor, CommodityProduction, FuelInput, FuelOutput, Material, Message, Outbox,
    ReactorConfig, Transaction, TransactionKind, EPS,
};

pub const SOURCE: &str = "FRESH_SOURCE";
pub const SINK: &str = "SPENT_SINK";

pub fn config(cycle_length: i64, core_loading: f64, batches: i64) -> ReactorConfig {
    ReactorConfig {
        fuel_input: FuelInput {
            incommodity: "fresh_uox".to_string(),
            inrecipe: "uox_fresh".to_string(),
        },
        fuel_output: FuelOutput {
            outcommodity: "spent_uox".to_string(),
            outrecipe: "uox_spent".to_string(),
        },
        cyclelength: cycle_length,
        coreloading: core_loading,
        batchespercore: batches,
        commodity_production: CommodityProduction {
            commodity: "power".to_string(),
            capacity: 1000.0,
            cost: 1.0,
        },
        lifetime: None,
    }
}

pub fn outbox() -> Outbox {
    Outbox::new()
        .with_market("fresh_uox", "UOX_MARKET")
        .with_market("spent_uox", "SPENT_MARKET")
}

/// Build a reactor from `config` and enter it at step 0
pub fn entered(config: &ReactorConfig) -> BatchReactor {
    let mut reactor = BatchReactor::from_config("REACTOR_1", config).unwrap();
    reactor.enter_simulation(0).unwrap();
    reactor
}

/// Transactions of one kind sent since the outbox was last drained
pub fn sent(outbox: &Outbox, kind: TransactionKind) -> Vec<Transaction> {
    outbox
        .messages()
        .iter()
        .filter(|m| m.transaction.kind() == kind)
        .map(|m| m.transaction.clone())
        .collect()
}

/// Deliver `amount` of fresh fuel against `request`
pub fn deliver(reactor: &mut BatchReactor, request: &Transaction, amount: f64) {
    let order = request.matched_with(SOURCE);
    reactor
        .deposit_resource(&order, vec![Material::new("uox_fresh", amount)])
        .unwrap();
}

/// Match `offer` with the sink and hand the order back to the reactor
pub fn accept_offer(reactor: &mut BatchReactor, offer: &Transaction) {
    let order = offer.matched_with(SINK);
    reactor
        .receive_order(Message::new("SPENT_MARKET", reactor.id().to_string(), order))
        .unwrap();
}

/// Fill every request in full and accept every offer
pub fn resolve(reactor: &mut BatchReactor, outbox: &mut Outbox) {
    for message in outbox.take_messages() {
        let tx = message.transaction;
        match tx.kind() {
            TransactionKind::Request => {
                let amount = tx.quantity();
                deliver(reactor, &tx, amount);
            }
            TransactionKind::Offer => accept_offer(reactor, &tx),
        }
    }
}

/// One full step against the fill-everything market
pub fn step(reactor: &mut BatchReactor, outbox: &mut Outbox, time: usize) {
    reactor.tick(time, outbox).unwrap();
    resolve(reactor, outbox);
    reactor.tock(time, outbox).unwrap();
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}
