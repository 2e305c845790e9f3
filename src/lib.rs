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

//! # Booking Demo
//!
//! This library provides a seat-reservation engine for scheduled trips:
//! searching a trip catalog, confirming seats against a ledger, and reading
//! back a user's reservation history.
//!
//! ## Core Components
//!
//! - [`Engine`]: Validates booking requests and confirms them atomically
//! - [`SeatLedger`]: Source of truth for confirmed (trip, seat) pairs
//! - [`TripCatalog`]: Read-only store of scheduled trips
//! - [`ReservationError`]: Rejection reasons for failed booking requests
//!
//! ## Example
//!
//! ```
//! use booking_demo_rs::{Engine, SeatNumber, Trip, TripCatalog, TripId, UserId};
//!
//! let catalog = TripCatalog::new([Trip {
//!     id: TripId(1),
//!     origin: "Lisbon".to_string(),
//!     destination: "Porto".to_string(),
//!     date: "2026-09-01".parse().unwrap(),
//!     price: 4500,
//! }]);
//! let engine = Engine::new(catalog);
//!
//! // Reserve two seats
//! let batch = engine
//!     .reserve(Some(UserId(1)), TripId(1), &[SeatNumber(5), SeatNumber(6)])
//!     .unwrap();
//! assert_eq!(batch.reservation_ids.len(), 2);
//!
//! // The seats now show as occupied
//! let occupied = engine.occupied_seats(&TripId(1));
//! assert!(occupied.contains(&SeatNumber(5)));
//! assert!(occupied.contains(&SeatNumber(6)));
//! ```
//!
//! ## Thread Safety
//!
//! The engine handles concurrent booking requests: confirmations for the
//! same trip serialize on a per-trip claim, so no two reservations can ever
//! hold the same (trip, seat) pair, while bookings on different trips
//! proceed in parallel.

pub mod error;
pub mod ledger;
pub mod session;
mod base;
mod engine;
mod reservation;
mod reservation_log;
mod trip;

pub use base::{ReservationId, SeatNumber, TripId, UserId};
pub use engine::{BookingPolicy, Engine};
pub use error::{ConflictError, ReservationError};
pub use ledger::SeatLedger;
pub use reservation::{Reservation, ReservationBatch, ReservationStatus};
pub use session::{Session, SessionStore, SessionToken};
pub use trip::{SEAT_CAPACITY, Trip, TripCatalog};
