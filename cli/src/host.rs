//! Single-facility host
//!
//! Drives one reactor step by step against an unlimited fresh fuel source
//! and an unlimited spent fuel sink. Every request is filled in full and
//! every offer is taken between tick and tock.

use batch_reactor_core_rs::{
    BatchReactor, Material, Message, Outbox, Phase, ReactorError, TransactionKind,
};
use tracing::{debug, info};

pub const SOURCE_ID: &str = "FRESH_FUEL_SOURCE";
pub const SINK_ID: &str = "SPENT_FUEL_SINK";

/// Totals accumulated over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub steps_run: usize,
    pub fuel_received: f64,
    pub fuel_discharged: f64,
    pub refuels: usize,
    pub decommissioned_at: Option<usize>,
}

pub struct Host {
    reactor: BatchReactor,
    outbox: Outbox,
    summary: RunSummary,
}

impl Host {
    /// Wrap a reactor that has not yet entered the simulation
    pub fn new(reactor: BatchReactor) -> Self {
        let outbox = Outbox::new()
            .with_market(reactor.in_commodity().to_string(), "FRESH_FUEL_MARKET")
            .with_market(reactor.out_commodity().to_string(), "SPENT_FUEL_MARKET");
        Self {
            reactor,
            outbox,
            summary: RunSummary::default(),
        }
    }

    pub fn reactor(&self) -> &BatchReactor {
        &self.reactor
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Enter the reactor at step 0 and run up to `steps` steps
    ///
    /// Stops early once the reactor is decommissioned.
    pub fn run(&mut self, steps: usize) -> Result<&RunSummary, ReactorError> {
        self.reactor.enter_simulation(0)?;

        for time in 0..steps {
            self.step(time)?;
            if self.reactor.is_decommissioned() {
                self.summary.decommissioned_at = Some(time);
                info!(time, "reactor decommissioned, stopping");
                break;
            }
        }
        Ok(&self.summary)
    }

    fn step(&mut self, time: usize) -> Result<(), ReactorError> {
        self.reactor.tick(time, &mut self.outbox)?;
        if self.reactor.phase() == Phase::Refuel {
            self.summary.refuels += 1;
        }
        self.clear_market()?;
        self.reactor.tock(time, &mut self.outbox)?;

        for delivery in self.outbox.take_deliveries() {
            self.summary.fuel_discharged += delivery.quantity();
        }
        self.summary.steps_run += 1;
        debug!(
            time,
            phase = %self.reactor.phase(),
            in_core = self.reactor.in_core().quantity(),
            "step complete"
        );
        Ok(())
    }

    /// Match everything the reactor sent this tick
    fn clear_market(&mut self) -> Result<(), ReactorError> {
        for message in self.outbox.take_messages() {
            let transaction = message.transaction;
            match transaction.kind() {
                TransactionKind::Request => {
                    let amount = transaction.quantity();
                    let order = transaction.matched_with(SOURCE_ID);
                    let fuel = Material::new(self.reactor.in_recipe(), amount);
                    self.reactor.deposit_resource(&order, vec![fuel])?;
                    self.summary.fuel_received += amount;
                }
                TransactionKind::Offer => {
                    let order = transaction.matched_with(SINK_ID);
                    let reply = Message::new(message.recipient, self.reactor.id(), order);
                    self.reactor.receive_order(reply)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_reactor_core_rs::ReactorConfig;

    fn reactor(lifetime: Option<usize>) -> BatchReactor {
        let mut config =
            ReactorConfig::from_json(include_str!("../configs/batch_reactor.json")).unwrap();
        config.lifetime = lifetime;
        BatchReactor::from_config("REACTOR_1", &config).unwrap()
    }

    #[test]
    fn test_run_to_decommission() {
        let mut host = Host::new(reactor(Some(40)));
        let summary = host.run(100).unwrap().clone();

        assert_eq!(summary.decommissioned_at, Some(40));
        assert_eq!(summary.steps_run, 41);
        // Everything received is eventually handed to the sink
        assert!((summary.fuel_received - summary.fuel_discharged).abs() < 1e-6);
        assert!(host.reactor().check_decommission_condition());
    }

    #[test]
    fn test_refuels_counted() {
        // 18-step cycles: refuel ticks at steps 18 and 36
        let mut host = Host::new(reactor(None));
        let summary = host.run(40).unwrap();

        assert_eq!(summary.refuels, 2);
        assert_eq!(summary.decommissioned_at, None);
        assert!((summary.fuel_received - (120.0 + 2.0 * 40.0)).abs() < 1e-6);
        assert!((summary.fuel_discharged - 80.0).abs() < 1e-6);
    }
}
