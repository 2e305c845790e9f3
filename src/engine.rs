// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Reservation engine.
//!
//! The [`Engine`] accepts booking requests, validates them against policy,
//! and delegates the atomic seat confirmation to the [`SeatLedger`]. It also
//! fronts the trip catalog and the reservation history projection for
//! callers.
//!
//! # Request Processing
//!
//! - **Validation**: authentication, batch size, seat-number range, and
//!   in-request duplicates are checked before the ledger is touched. Each
//!   failure has its own rejection reason.
//! - **Confirmation**: a validated batch is handed to the ledger, which
//!   commits it atomically or rejects it naming the conflicting seat.
//!   Conflicts are terminal for the request; the engine never retries.
//!
//! # Thread Safety
//!
//! The engine is shared-state free apart from the ledger: any number of
//! request handlers may call [`Engine::reserve`] concurrently. Requests for
//! different trips proceed in parallel; requests for the same trip serialize
//! inside the ledger.

use crate::base::{SeatNumber, TripId, UserId};
use crate::error::ReservationError;
use crate::ledger::SeatLedger;
use crate::reservation::{Reservation, ReservationBatch};
use crate::trip::{SEAT_CAPACITY, Trip, TripCatalog};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Booking policy limits, injected at construction time.
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// Most seats one booking request may confirm.
    pub max_seats_per_request: usize,
    /// Highest valid seat number on any vehicle.
    pub seat_capacity: u8,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            max_seats_per_request: 2,
            seat_capacity: SEAT_CAPACITY,
        }
    }
}

/// Reservation engine over a trip catalog and a seat ledger.
pub struct Engine {
    catalog: TripCatalog,
    ledger: SeatLedger,
    policy: BookingPolicy,
}

impl Engine {
    /// Creates an engine over `catalog` with the default policy.
    pub fn new(catalog: TripCatalog) -> Self {
        Self::with_policy(catalog, BookingPolicy::default())
    }

    /// Creates an engine with an explicit policy.
    pub fn with_policy(catalog: TripCatalog, policy: BookingPolicy) -> Self {
        Self {
            catalog,
            ledger: SeatLedger::new(),
            policy,
        }
    }

    /// Reserves `seats` on `trip_id` for the authenticated user.
    ///
    /// # Validation
    ///
    /// Checks run in order, each with a distinct rejection reason:
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | no user supplied | [`ReservationError::Unauthenticated`] |
    /// | empty seat list | [`ReservationError::NoSeatsSelected`] |
    /// | more than policy allows | [`ReservationError::TooManySeats`] |
    /// | seat outside `[1, capacity]` | [`ReservationError::InvalidSeat`] |
    /// | seat repeated in the request | [`ReservationError::InvalidSeat`] |
    /// | unknown trip | [`ReservationError::TripNotFound`] |
    /// | seat already confirmed | [`ReservationError::SeatAlreadyBooked`] |
    ///
    /// On success every seat in the request was confirmed as one atomic
    /// unit; on any failure none were.
    pub fn reserve(
        &self,
        user_id: Option<UserId>,
        trip_id: TripId,
        seats: &[SeatNumber],
    ) -> Result<ReservationBatch, ReservationError> {
        let user_id = user_id.ok_or(ReservationError::Unauthenticated)?;

        if seats.is_empty() {
            return Err(ReservationError::NoSeatsSelected);
        }
        if seats.len() > self.policy.max_seats_per_request {
            return Err(ReservationError::TooManySeats);
        }

        let mut seen = BTreeSet::new();
        for &seat in seats {
            if seat.0 < 1 || seat.0 > self.policy.seat_capacity {
                return Err(ReservationError::InvalidSeat { seat });
            }
            // A repeated seat number would make the batch claim the same
            // (trip, seat) pair twice; reject rather than dedup silently.
            if !seen.insert(seat) {
                return Err(ReservationError::InvalidSeat { seat });
            }
        }

        if !self.catalog.contains(&trip_id) {
            debug!(%trip_id, %user_id, "booking request for unknown trip");
            return Err(ReservationError::TripNotFound);
        }

        let batch = self.ledger.try_confirm(trip_id, seats, user_id)?;
        info!(
            %trip_id,
            %user_id,
            seats = batch.len(),
            "reservation batch confirmed"
        );
        Ok(batch)
    }

    /// Searches the catalog for trips matching origin, destination, and
    /// date, ordered by trip id.
    pub fn find_trips(&self, origin: &str, destination: &str, date: NaiveDate) -> Vec<&Trip> {
        self.catalog.find_trips(origin, destination, date)
    }

    /// Looks up a trip by id.
    pub fn trip(&self, trip_id: &TripId) -> Option<&Trip> {
        self.catalog.get(trip_id)
    }

    /// Snapshot of the confirmed seats on a trip.
    pub fn occupied_seats(&self, trip_id: &TripId) -> BTreeSet<SeatNumber> {
        self.ledger.occupied_seats(trip_id)
    }

    /// Reservation history for a user, newest first, joined to the trip
    /// each reservation belongs to.
    pub fn reservations_for(&self, user_id: &UserId) -> Vec<(Reservation, Trip)> {
        self.ledger
            .reservations_for(user_id)
            .into_iter()
            .filter_map(|reservation| {
                let trip = self.catalog.get(&reservation.trip_id).cloned()?;
                Some((reservation, trip))
            })
            .collect()
    }

    /// The underlying seat ledger.
    pub fn ledger(&self) -> &SeatLedger {
        &self.ledger
    }

    /// The trip catalog this engine serves.
    pub fn catalog(&self) -> &TripCatalog {
        &self.catalog
    }
}
