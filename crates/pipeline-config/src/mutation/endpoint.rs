//! Insertion into the input/output slots, with broker promotion.

use crate::tree::{Broker, Endpoint, Slot};

use super::InsertOutcome;

/// Adds `endpoint` to `slot`, promoting the slot to a broker first if needed.
///
/// Promotion moves the existing declaration, untouched, into a new default
/// broker as its first endpoint. When the endpoint being added is itself a
/// broker and promotion just happened, nothing further is appended: the
/// caller only asked for broker topology.
pub(crate) fn insert_endpoint<S: Slot>(slot: &mut Endpoint<S>, endpoint: Endpoint<S>) -> InsertOutcome {
    if let Endpoint::Broker(broker) = slot {
        return InsertOutcome::Appended {
            position: broker.push(endpoint),
        };
    }

    let current = std::mem::replace(slot, Endpoint::Broker(Broker::new()));
    let mut broker = Broker::wrapping(current);
    let appended = if endpoint.is_broker() {
        None
    } else {
        Some(broker.push(endpoint))
    };
    *slot = Endpoint::Broker(broker);

    InsertOutcome::Promoted { appended }
}
