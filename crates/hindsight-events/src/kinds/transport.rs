//! Shuttle and dropship bookings.

use crate::capability::{EventHeader, LedgerEffect, LedgerTarget};
use crate::fields::Fields;

/// `BookTaxi` / `BookDropship`: a flight was booked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Booking {
    /// Destination star system.
    pub destination_system: String,
    /// Destination settlement or station.
    pub destination_location: String,
    /// Fare in credits; 0 when free.
    pub cost: i64,
}

impl Booking {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            destination_system: f.str("DestinationSystem"),
            destination_location: f.str("DestinationLocation"),
            cost: f.i64("Cost"),
        }
    }
}

impl LedgerEffect for Booking {
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget) {
        if self.cost > 0 {
            let note = format!("->{}:{}", self.destination_system, self.destination_location);
            target.add_transaction(header, &note, self.cost.saturating_neg());
        }
    }
}

/// `CancelTaxi` / `CancelDropship`: a booking was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cancellation {
    /// Credits refunded.
    pub refund: i64,
}

impl Cancellation {
    pub(crate) fn from_fields(f: Fields<'_>) -> Self {
        Self {
            refund: f.i64("Refund"),
        }
    }
}

impl LedgerEffect for Cancellation {
    fn update_ledger(&self, header: EventHeader, target: &mut dyn LedgerTarget) {
        if self.refund > 0 {
            target.add_transaction(header, "", self.refund);
        }
    }
}
