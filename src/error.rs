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

//! Error types for reservation processing.

use crate::base::SeatNumber;
use thiserror::Error;

/// A requested seat is already confirmed for the trip.
///
/// Returned by the seat ledger when a batch touches an occupied seat. The
/// whole batch is rejected; `seat` names the first conflicting seat so a
/// client can tell the user exactly which seat to deselect.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("seat {seat} is already confirmed for this trip")]
pub struct ConflictError {
    pub seat: SeatNumber,
}

/// Reservation processing errors.
///
/// Every rejection is terminal for the current request; nothing is retried
/// by the engine. [`ReservationError::StorageUnavailable`] is the only kind
/// a caller might reasonably retry with backoff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// No authenticated user was supplied with the request
    #[error("no authenticated user")]
    Unauthenticated,

    /// The request contained an empty seat list
    #[error("no seats selected")]
    NoSeatsSelected,

    /// The request asked for more seats than one booking may confirm
    #[error("too many seats requested for a single booking")]
    TooManySeats,

    /// A seat number is out of range or duplicated within the request
    #[error("invalid seat number {seat}")]
    InvalidSeat { seat: SeatNumber },

    /// The referenced trip does not exist in the catalog
    #[error("trip not found")]
    TripNotFound,

    /// A requested seat is already confirmed by another reservation
    #[error("seat {seat} is already booked")]
    SeatAlreadyBooked { seat: SeatNumber },

    /// The ledger's backing store could not be reached
    #[error("reservation storage unavailable")]
    StorageUnavailable,
}

impl From<ConflictError> for ReservationError {
    fn from(err: ConflictError) -> Self {
        ReservationError::SeatAlreadyBooked { seat: err.seat }
    }
}
