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

//! Append-only store of confirmed reservation records.
//!
//! Records are keyed by reservation id for O(1) lookup and are never
//! mutated or removed once written.

use crate::base::{ReservationId, UserId};
use crate::reservation::Reservation;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe append-only reservation store.
///
/// Writes happen only from inside a per-trip critical section in the seat
/// ledger; reads may happen concurrently from any thread.
#[derive(Debug, Default)]
pub(crate) struct ReservationLog {
    records: DashMap<ReservationId, Arc<Reservation>>,
}

impl ReservationLog {
    /// Creates a new empty log.
    pub(crate) fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Appends a confirmed reservation.
    ///
    /// Ids are allocated from a single atomic counter, so a collision here
    /// would be a ledger bug.
    pub(crate) fn append(&self, reservation: Reservation) {
        let id = reservation.id;
        let previous = self.records.insert(id, Arc::new(reservation));
        debug_assert!(previous.is_none(), "reservation id {id} written twice");
    }

    /// Looks up a reservation by id.
    pub(crate) fn get(&self, id: &ReservationId) -> Option<Reservation> {
        self.records.get(id).map(|r| (**r.value()).clone())
    }

    /// Returns every reservation belonging to `user_id`, in no particular
    /// order; callers sort.
    pub(crate) fn for_user(&self, user_id: &UserId) -> Vec<Reservation> {
        self.records
            .iter()
            .filter(|r| r.value().user_id == *user_id)
            .map(|r| (**r.value()).clone())
            .collect()
    }

    /// Returns every reservation in the log, in no particular order.
    pub(crate) fn all(&self) -> Vec<Reservation> {
        self.records.iter().map(|r| (**r.value()).clone()).collect()
    }

    /// Number of confirmed reservations.
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
