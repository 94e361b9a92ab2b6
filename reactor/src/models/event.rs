//! Event logging for facility auditing.
//!
//! This module defines the ReactorEvent enum which captures every significant
//! state change of a batch reactor. Events enable:
//! - Debugging (understand what the facility did and when)
//! - Auditing (verify fuel conservation across buffers and trades)
//! - Analysis (extract refuelling cadence, throughput)
//!
//! # Event Types
//!
//! - **Lifecycle**: entry into simulation, phase changes, decommission
//! - **Market**: requests, offers, received orders, approved transfers
//! - **Inventory**: deposits and moves between buffers
//!
//! # Example
//!
//! ```rust
//! use batch_reactor_core_rs::models::event::{EventLog, ReactorEvent};
//!
//! let mut log = EventLog::new();
//! log.log(ReactorEvent::Decommissioned { time: 40 });
//! assert_eq!(log.events_of_type("Decommissioned").len(), 1);
//! ```

use crate::models::buffer::BufferKind;
use crate::reactor::Phase;
use serde::{Deserialize, Serialize};

/// Facility event capturing a state change.
///
/// All events include the step time for temporal ordering.
/// Events are logged in the order they occur within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum ReactorEvent {
    /// Facility entered the simulation
    EnteredSimulation { time: usize, core_loading: f64 },

    PhaseChange { time: usize, from: Phase, to: Phase },

    /// Request for fresh fuel sent to market
    FuelRequested {
        time: usize,
        tx_id: String,
        commodity: String,
        amount: f64,
    },

    /// Computed deficit was not positive, no request sent
    RequestSkipped {
        time: usize,
        commodity: String,
        deficit: f64,
    },

    /// Offer of discharged fuel sent to market
    FuelOffered {
        time: usize,
        tx_id: String,
        commodity: String,
        amount: f64,
    },

    /// Matched order queued for the next tock
    OrderReceived { time: usize, tx_id: String },

    /// Queued order executed: fuel left post-core for the requester
    TransferApproved {
        time: usize,
        tx_id: String,
        requester_id: String,
        amount: f64,
    },

    /// Delivered fuel accepted into pre-core
    FuelDeposited {
        time: usize,
        tx_id: String,
        amount: f64,
    },

    FuelMoved {
        time: usize,
        from: BufferKind,
        to: BufferKind,
        amount: f64,
    },

    Decommissioned { time: usize },
}

impl ReactorEvent {
    /// Get the step time of this event
    pub fn time(&self) -> usize {
        match self {
            ReactorEvent::EnteredSimulation { time, .. } => *time,
            ReactorEvent::PhaseChange { time, .. } => *time,
            ReactorEvent::FuelRequested { time, .. } => *time,
            ReactorEvent::RequestSkipped { time, .. } => *time,
            ReactorEvent::FuelOffered { time, .. } => *time,
            ReactorEvent::OrderReceived { time, .. } => *time,
            ReactorEvent::TransferApproved { time, .. } => *time,
            ReactorEvent::FuelDeposited { time, .. } => *time,
            ReactorEvent::FuelMoved { time, .. } => *time,
            ReactorEvent::Decommissioned { time } => *time,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            ReactorEvent::EnteredSimulation { .. } => "EnteredSimulation",
            ReactorEvent::PhaseChange { .. } => "PhaseChange",
            ReactorEvent::FuelRequested { .. } => "FuelRequested",
            ReactorEvent::RequestSkipped { .. } => "RequestSkipped",
            ReactorEvent::FuelOffered { .. } => "FuelOffered",
            ReactorEvent::OrderReceived { .. } => "OrderReceived",
            ReactorEvent::TransferApproved { .. } => "TransferApproved",
            ReactorEvent::FuelDeposited { .. } => "FuelDeposited",
            ReactorEvent::FuelMoved { .. } => "FuelMoved",
            ReactorEvent::Decommissioned { .. } => "Decommissioned",
        }
    }

    /// Get transaction ID if this event relates to a trade
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            ReactorEvent::FuelRequested { tx_id, .. }
            | ReactorEvent::FuelOffered { tx_id, .. }
            | ReactorEvent::OrderReceived { tx_id, .. }
            | ReactorEvent::TransferApproved { tx_id, .. }
            | ReactorEvent::FuelDeposited { tx_id, .. } => Some(tx_id.as_str()),
            _ => None,
        }
    }
}

/// Append-only log of facility events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ReactorEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: ReactorEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[ReactorEvent] {
        &self.events
    }

    /// Get events logged at a specific step
    pub fn events_at(&self, time: usize) -> Vec<&ReactorEvent> {
        self.events.iter().filter(|e| e.time() == time).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&ReactorEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific transaction
    pub fn events_for_tx(&self, tx_id: &str) -> Vec<&ReactorEvent> {
        self.events
            .iter()
            .filter(|e| e.tx_id() == Some(tx_id))
            .collect()
    }

    /// Phase transitions in the order they happened
    pub fn phase_history(&self) -> Vec<(usize, Phase, Phase)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReactorEvent::PhaseChange { time, from, to } => Some((*time, *from, *to)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_and_type() {
        let event = ReactorEvent::FuelMoved {
            time: 7,
            from: BufferKind::InCore,
            to: BufferKind::PostCore,
            amount: 25.0,
        };

        assert_eq!(event.time(), 7);
        assert_eq!(event.event_type(), "FuelMoved");
        assert_eq!(event.tx_id(), None);
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(ReactorEvent::FuelRequested {
            time: 1,
            tx_id: "tx_1".to_string(),
            commodity: "fresh_uox".to_string(),
            amount: 100.0,
        });
        log.log(ReactorEvent::FuelDeposited {
            time: 2,
            tx_id: "tx_1".to_string(),
            amount: 100.0,
        });
        log.log(ReactorEvent::PhaseChange {
            time: 2,
            from: Phase::Begin,
            to: Phase::Operation,
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_at(2).len(), 2);
        assert_eq!(log.events_for_tx("tx_1").len(), 2);
        assert_eq!(
            log.phase_history(),
            vec![(2, Phase::Begin, Phase::Operation)]
        );
    }
}
