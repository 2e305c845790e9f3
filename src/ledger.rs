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

//! Seat ledger.
//!
//! The ledger is the source of truth for which (trip, seat) pairs are
//! confirmed. [`SeatLedger::try_confirm`] is the only mutating entry point:
//! it takes the trip's exclusive claim, checks every requested seat, and
//! either confirms the whole batch or none of it.
//!
//! # Thread Safety
//!
//! Trips are held in a [`DashMap`]; each trip's seat map sits behind its own
//! [`parking_lot::Mutex`]. Concurrent confirmations against the same trip
//! serialize on that mutex; confirmations against different trips do not
//! contend. The guard is scope-bound, so the claim is released on every exit
//! path, conflict returns included.

use crate::base::{ReservationId, SeatNumber, TripId, UserId};
use crate::error::ConflictError;
use crate::reservation::{Reservation, ReservationBatch, ReservationStatus};
use crate::reservation_log::ReservationLog;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Seat state for one trip, only ever touched under the trip's claim.
#[derive(Debug, Default)]
struct SeatMap {
    /// Confirmed seats mapped to the reservation that claimed them.
    confirmed: BTreeMap<SeatNumber, ReservationId>,
}

impl SeatMap {
    /// Returns the first requested seat that is already confirmed, if any.
    fn first_conflict(&self, seats: &[SeatNumber]) -> Option<SeatNumber> {
        seats
            .iter()
            .copied()
            .find(|seat| self.confirmed.contains_key(seat))
    }
}

/// The per-trip serialization point.
#[derive(Debug, Default)]
struct TripSeats {
    inner: Mutex<SeatMap>,
}

/// Durable record of confirmed (trip, seat) claims.
///
/// # Invariants
///
/// - For any trip and seat, at most one confirmed reservation exists.
/// - A batch confirms atomically: all requested seats or none.
/// - Confirmed records are append-only; the ledger never deletes or
///   rewrites one.
#[derive(Debug)]
pub struct SeatLedger {
    /// Per-trip seat maps indexed by trip id.
    trips: DashMap<TripId, TripSeats>,
    /// Append-only record store backing the history projection.
    log: ReservationLog,
    /// Global reservation id allocator.
    next_id: AtomicU64,
}

impl SeatLedger {
    /// Creates an empty ledger with no confirmed seats.
    pub fn new() -> Self {
        Self {
            trips: DashMap::new(),
            log: ReservationLog::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Snapshot of the confirmed seat numbers for a trip.
    ///
    /// Side-effect-free; a trip with no confirmations yields an empty set.
    pub fn occupied_seats(&self, trip_id: &TripId) -> BTreeSet<SeatNumber> {
        self.trips
            .get(trip_id)
            .map(|trip| trip.inner.lock().confirmed.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Atomically confirms `seats` on `trip_id` for `user_id`.
    ///
    /// Either every seat in the batch becomes confirmed as one indivisible
    /// unit, or none do and the first conflicting seat is named in the
    /// error. Callers are expected to have validated seat numbers and batch
    /// size; the ledger only enforces exclusivity.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError`] if any requested seat is already confirmed
    /// for this trip. No partial writes happen on that path.
    pub fn try_confirm(
        &self,
        trip_id: TripId,
        seats: &[SeatNumber],
        user_id: UserId,
    ) -> Result<ReservationBatch, ConflictError> {
        let trip = self.trips.entry(trip_id).or_default();

        // Exclusive per-trip claim. Everything from the conflict check to
        // the final insert happens under this guard; dropping it on any
        // return releases the claim.
        let mut seat_map = trip.inner.lock();

        if let Some(seat) = seat_map.first_conflict(seats) {
            debug!(%trip_id, %user_id, %seat, "seat conflict, rejecting batch");
            return Err(ConflictError { seat });
        }

        let confirmed_at = Utc::now();
        let mut reservation_ids = Vec::with_capacity(seats.len());

        for &seat in seats {
            let id = ReservationId(self.next_id.fetch_add(1, Ordering::Relaxed));
            seat_map.confirmed.insert(seat, id);
            self.log.append(Reservation {
                id,
                trip_id,
                user_id,
                seat,
                status: ReservationStatus::Confirmed,
                confirmed_at,
            });
            reservation_ids.push(id);
        }

        Ok(ReservationBatch {
            reservation_ids,
            trip_id,
            seat_numbers: seats.to_vec(),
            user_id,
        })
    }

    /// Looks up a single reservation record by id.
    pub fn reservation(&self, id: &ReservationId) -> Option<Reservation> {
        self.log.get(id)
    }

    /// All confirmed reservations for a user, newest first.
    ///
    /// Ties on the confirmation timestamp are broken by reservation id
    /// descending so the ordering is deterministic.
    pub fn reservations_for(&self, user_id: &UserId) -> Vec<Reservation> {
        let mut reservations = self.log.for_user(user_id);
        reservations.sort_by(|a, b| {
            b.confirmed_at
                .cmp(&a.confirmed_at)
                .then(b.id.cmp(&a.id))
        });
        reservations
    }

    /// Every confirmed reservation in the ledger, in id (commit) order.
    pub fn reservations(&self) -> Vec<Reservation> {
        let mut reservations = self.log.all();
        reservations.sort_by_key(|r| r.id);
        reservations
    }

    /// Total number of confirmed reservations across all trips.
    pub fn confirmed_count(&self) -> usize {
        self.log.len()
    }
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new()
    }
}
