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

//! Reservation records.
//!
//! A confirmed reservation is append-only history: the ledger never mutates
//! or deletes one. Cancellation, if it is ever added, must be a new
//! compensating record so the audit trail stays intact.

use crate::base::{ReservationId, SeatNumber, TripId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a reservation.
///
/// Payment is treated as always-succeeds, so the ledger only ever writes
/// `Confirmed` rows; `Pending` and `Cancelled` exist for collaborators that
/// model the full lifecycle around the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// One confirmed (trip, seat) claim by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub trip_id: TripId,
    pub user_id: UserId,
    pub seat: SeatNumber,
    pub status: ReservationStatus,
    pub confirmed_at: DateTime<Utc>,
}

/// The unit of success for one booking request.
///
/// All seats in a batch were confirmed together as one indivisible unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationBatch {
    pub reservation_ids: Vec<ReservationId>,
    pub trip_id: TripId,
    pub seat_numbers: Vec<SeatNumber>,
    pub user_id: UserId,
}

impl ReservationBatch {
    /// Number of seats confirmed by this batch.
    pub fn len(&self) -> usize {
        self.seat_numbers.len()
    }

    /// Returns `true` if the batch confirmed no seats (never produced by
    /// the engine; empty requests are rejected before the ledger).
    pub fn is_empty(&self) -> bool {
        self.seat_numbers.is_empty()
    }
}
