//! Tests for the request / offer / order protocol

mod common;

use batch_reactor_core_rs::{
    BatchReactor, GenericResource, MarketError, MarketGateway, Material, Message, Outbox, Phase,
    ReactorError, Resource, Transaction, TransactionKind,
};
use common::*;

/// Gateway whose requesters can no longer take delivery
struct ClosedSink;

impl MarketGateway for ClosedSink {
    fn market_for(&self, _commodity: &str) -> Option<String> {
        Some("SPENT_MARKET".to_string())
    }

    fn send(&mut self, _message: Message) -> Result<(), MarketError> {
        Ok(())
    }

    fn deliver(
        &mut self,
        _order: &Transaction,
        _manifest: Vec<Material>,
    ) -> Result<(), MarketError> {
        Err(MarketError::Rejected("requester gone".to_string()))
    }
}

/// Reactor that has discharged one batch of 25 into post-core
fn reactor_with_discharge() -> (BatchReactor, Outbox) {
    let mut reactor = entered(&config(2, 100.0, 4));
    let mut outbox = outbox();
    step(&mut reactor, &mut outbox, 0);
    step(&mut reactor, &mut outbox, 1);
    reactor.tick(2, &mut outbox).unwrap();
    assert_close(reactor.post_core().quantity(), 25.0);
    (reactor, outbox)
}

#[test]
fn test_offer_token_shape() {
    let (_, outbox) = reactor_with_discharge();

    let message = outbox
        .messages()
        .iter()
        .find(|m| m.transaction.kind() == TransactionKind::Offer)
        .unwrap();

    assert_eq!(message.recipient, "SPENT_MARKET");
    assert_eq!(message.transaction.commodity(), "spent_uox");
    assert_eq!(message.transaction.min_frac(), 1.0);
    assert_eq!(message.transaction.price(), 0.0);
    assert_eq!(message.transaction.supplier_id(), Some("REACTOR_1"));
    match message.transaction.resource() {
        Resource::Generic(generic) => {
            assert_eq!(generic.units, "kg");
            assert_eq!(generic.commodity, "spent_uox");
            assert_close(generic.quantity, 25.0);
        }
        other => panic!("expected generic token, got {:?}", other),
    }
}

#[test]
fn test_offers_repeat_until_taken() {
    let (mut reactor, mut outbox) = reactor_with_discharge();
    let request = sent(&outbox, TransactionKind::Request).remove(0);
    deliver(&mut reactor, &request, 25.0);
    reactor.tock(2, &mut outbox).unwrap();
    outbox.take_messages();

    // Nobody took the offer, so it is made again next tick
    reactor.tick(3, &mut outbox).unwrap();
    let offers = sent(&outbox, TransactionKind::Offer);
    assert_eq!(offers.len(), 1);
    assert_close(offers[0].quantity(), 25.0);
}

#[test]
fn test_order_from_other_supplier_rejected() {
    let (mut reactor, outbox) = reactor_with_discharge();
    let request = sent(&outbox, TransactionKind::Request).remove(0);

    // Our own request names the source as supplier once matched
    let foreign = request.matched_with(SOURCE);
    let result = reactor.receive_order(Message::new("UOX_MARKET", "REACTOR_1", foreign));

    assert!(matches!(result, Err(ReactorError::ProtocolViolation(_))));
    assert_eq!(reactor.orders_waiting(), 0);
    assert!(reactor.event_log().events_of_type("OrderReceived").is_empty());
}

#[test]
fn test_orders_execute_at_next_tock_only() {
    let (mut reactor, mut outbox) = reactor_with_discharge();
    let offer = sent(&outbox, TransactionKind::Offer).remove(0);

    accept_offer(&mut reactor, &offer);
    assert_eq!(reactor.orders_waiting(), 1);
    assert_close(reactor.post_core().quantity(), 25.0);
    assert!(outbox.deliveries().is_empty());

    reactor.tock(2, &mut outbox).unwrap();

    assert_eq!(reactor.orders_waiting(), 0);
    assert!(reactor.post_core().is_empty());
    assert_eq!(outbox.deliveries().len(), 1);
    assert_eq!(outbox.deliveries()[0].order.id(), offer.id());
    assert!(outbox.deliveries()[0]
        .manifest
        .iter()
        .all(|m| m.recipe() == "uox_spent"));
}

#[test]
fn test_orders_execute_in_arrival_order() {
    let (mut reactor, mut outbox) = reactor_with_discharge();
    let offer = sent(&outbox, TransactionKind::Offer).remove(0);

    let first = offer
        .matched_with("REPOSITORY_A")
        .with_resource(Resource::Material(Material::new("uox_spent", 10.0)));
    let second = offer
        .matched_with("REPOSITORY_B")
        .with_resource(Resource::Material(Material::new("uox_spent", 15.0)));
    reactor
        .receive_order(Message::new("SPENT_MARKET", "REACTOR_1", first))
        .unwrap();
    reactor
        .receive_order(Message::new("SPENT_MARKET", "REACTOR_1", second))
        .unwrap();

    reactor.tock(2, &mut outbox).unwrap();

    let requesters: Vec<&str> = outbox
        .deliveries()
        .iter()
        .map(|d| d.order.requester_id().unwrap())
        .collect();
    assert_eq!(requesters, vec!["REPOSITORY_A", "REPOSITORY_B"]);
    assert_close(outbox.deliveries()[0].quantity(), 10.0);
    assert_close(outbox.deliveries()[1].quantity(), 15.0);
    assert!(reactor.post_core().is_empty());
}

#[test]
fn test_oversized_order_fails_without_mutation() {
    let (mut reactor, mut outbox) = reactor_with_discharge();
    let offer = sent(&outbox, TransactionKind::Offer).remove(0);
    let greedy = offer
        .matched_with("REPOSITORY")
        .with_resource(Resource::Material(Material::new("uox_spent", 40.0)));

    let result = reactor.withdraw_resource(&greedy);
    assert!(matches!(result, Err(ReactorError::ProtocolViolation(_))));
    assert_close(reactor.post_core().quantity(), 25.0);

    // Same claim arriving as an order halts the tock
    reactor
        .receive_order(Message::new("SPENT_MARKET", "REACTOR_1", greedy))
        .unwrap();
    assert!(matches!(
        reactor.tock(2, &mut outbox),
        Err(ReactorError::ProtocolViolation(_))
    ));
    assert_close(reactor.post_core().quantity(), 25.0);
    assert!(outbox.deliveries().is_empty());
}

#[test]
fn test_non_finite_claim_rejected() {
    let (mut reactor, outbox) = reactor_with_discharge();
    let offer = sent(&outbox, TransactionKind::Offer).remove(0);

    for quantity in [f64::NAN, f64::INFINITY] {
        let claim = offer
            .matched_with("REPOSITORY")
            .with_resource(Resource::Generic(GenericResource {
                units: "kg".to_string(),
                commodity: "spent_uox".to_string(),
                quantity,
            }));

        let result = reactor.withdraw_resource(&claim);
        assert!(matches!(result, Err(ReactorError::ProtocolViolation(_))));
        assert_close(reactor.post_core().quantity(), 25.0);
    }
}

#[test]
fn test_refused_delivery_returns_fuel_and_keeps_order() {
    let (mut reactor, mut outbox) = reactor_with_discharge();
    let offer = sent(&outbox, TransactionKind::Offer).remove(0);
    accept_offer(&mut reactor, &offer);

    assert_eq!(
        reactor.tock(2, &mut ClosedSink),
        Err(ReactorError::Market(MarketError::Rejected(
            "requester gone".to_string()
        )))
    );
    assert_close(reactor.post_core().quantity(), 25.0);
    assert!(reactor.post_core().units().all(|u| u.recipe() == "uox_spent"));
    assert_eq!(reactor.orders_waiting(), 1);
    assert!(reactor.event_log().events_of_type("TransferApproved").is_empty());

    // Retried at the next tock once the requester is reachable
    reactor.tock(2, &mut outbox).unwrap();
    assert_eq!(reactor.orders_waiting(), 0);
    assert!(reactor.post_core().is_empty());
    assert_eq!(outbox.deliveries().len(), 1);
    assert_eq!(outbox.deliveries()[0].order.id(), offer.id());
    assert_close(outbox.deliveries()[0].quantity(), 25.0);
}

#[test]
fn test_withdraw_requires_supplier_role() {
    let (mut reactor, outbox) = reactor_with_discharge();
    let request = sent(&outbox, TransactionKind::Request).remove(0);

    let result = reactor.withdraw_resource(&request.matched_with(SOURCE));
    assert!(matches!(result, Err(ReactorError::ProtocolViolation(_))));
}

#[test]
fn test_deposit_requires_requester_role() {
    let (mut reactor, outbox) = reactor_with_discharge();
    let offer = sent(&outbox, TransactionKind::Offer).remove(0);

    let result = reactor.deposit_resource(
        &offer.matched_with(SINK),
        vec![Material::new("uox_fresh", 5.0)],
    );
    assert!(matches!(result, Err(ReactorError::ProtocolViolation(_))));
    assert!(reactor.pre_core().is_empty());
}

#[test]
fn test_deposit_lands_in_pre_core_until_tock() {
    let mut reactor = entered(&config(2, 100.0, 4));
    let mut outbox = outbox();
    reactor.tick(0, &mut outbox).unwrap();
    let request = sent(&outbox, TransactionKind::Request).remove(0);

    deliver(&mut reactor, &request, 60.0);
    assert_close(reactor.pre_core().quantity(), 60.0);
    assert!(reactor.in_core().is_empty());
    assert_eq!(reactor.phase(), Phase::Begin);

    let deposits = reactor.event_log().events_for_tx(request.id());
    // FuelRequested + FuelDeposited
    assert_eq!(deposits.len(), 2);
}

#[test]
fn test_pre_core_accepts_more_than_a_core() {
    let mut reactor = entered(&config(2, 100.0, 4));
    let mut outbox = outbox();
    reactor.tick(0, &mut outbox).unwrap();
    let request = sent(&outbox, TransactionKind::Request).remove(0);

    deliver(&mut reactor, &request, 250.0);
    reactor.tock(0, &mut outbox).unwrap();

    assert_eq!(reactor.phase(), Phase::Operation);
    assert_close(reactor.in_core().quantity(), 100.0);
    assert_close(reactor.pre_core().quantity(), 150.0);
}
