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

//! Property-based tests for the reservation engine.
//!
//! These tests verify invariants that should hold for any sequence of
//! booking requests.

use booking_demo_rs::{
    Engine, ReservationError, SeatNumber, Trip, TripCatalog, TripId, UserId,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

const NUM_TRIPS: u32 = 4;

fn make_engine() -> Engine {
    Engine::new(TripCatalog::new((1..=NUM_TRIPS).map(|i| Trip {
        id: TripId(i),
        origin: "Lisbon".to_string(),
        destination: "Porto".to_string(),
        date: "2026-09-01".parse().unwrap(),
        price: 4500,
    })))
}

fn seats(numbers: &[u8]) -> Vec<SeatNumber> {
    numbers.iter().copied().map(SeatNumber).collect()
}

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// A valid seat number on an 18-seat vehicle.
fn arb_seat() -> impl Strategy<Value = u8> {
    1u8..=18
}

/// A policy-sized batch of seat numbers (may contain duplicates, which the
/// engine must reject without writing).
fn arb_batch() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(arb_seat(), 1..=2)
}

/// One booking request: (trip, user, seats).
fn arb_request() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
    (1..=NUM_TRIPS, 1u32..=6, arb_batch())
}

// =============================================================================
// Ledger Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// After any request sequence the occupied set of every trip equals the
    /// union of its successful batches, each seat is owned exactly once,
    /// and failed requests leave the trip untouched.
    #[test]
    fn occupied_is_union_of_successful_batches(
        requests in prop::collection::vec(arb_request(), 1..60),
    ) {
        let engine = make_engine();
        let mut expected: HashMap<u32, BTreeSet<SeatNumber>> = HashMap::new();
        let mut confirmed = 0usize;

        for (trip, user, batch) in requests {
            let trip_id = TripId(trip);
            let before = engine.occupied_seats(&trip_id);

            match engine.reserve(Some(UserId(user)), trip_id, &seats(&batch)) {
                Ok(result) => {
                    let claimed = expected.entry(trip).or_default();
                    for seat in result.seat_numbers {
                        prop_assert!(claimed.insert(seat), "seat {} confirmed twice", seat);
                    }
                    confirmed += batch.len();
                }
                Err(err) => {
                    // Valid-shaped requests can only fail on conflicts or
                    // on an in-request duplicate.
                    prop_assert!(
                        matches!(
                            err,
                            ReservationError::SeatAlreadyBooked { .. }
                                | ReservationError::InvalidSeat { .. }
                        ),
                        "unexpected error variant: {:?}",
                        err
                    );
                    // A failed request never commits anything.
                    prop_assert_eq!(engine.occupied_seats(&trip_id), before);
                }
            }
        }

        for trip in 1..=NUM_TRIPS {
            let claimed = expected.remove(&trip).unwrap_or_default();
            prop_assert_eq!(engine.occupied_seats(&TripId(trip)), claimed);
        }
        prop_assert_eq!(engine.ledger().confirmed_count(), confirmed);
    }

    /// Re-requesting an already-confirmed seat always fails and names a
    /// seat from the request.
    #[test]
    fn rebooking_names_a_requested_seat(
        seat in arb_seat(),
        second in arb_batch(),
    ) {
        let engine = make_engine();
        engine
            .reserve(Some(UserId(1)), TripId(1), &seats(&[seat]))
            .unwrap();

        let mut batch = second;
        batch[0] = seat; // Guarantee the overlap
        let result = engine.reserve(Some(UserId(2)), TripId(1), &seats(&batch));

        match result {
            Err(ReservationError::SeatAlreadyBooked { seat: named }) => {
                prop_assert!(batch.contains(&named.0));
            }
            Err(ReservationError::InvalidSeat { .. }) => {
                // The random second seat may duplicate the overlap seat.
                prop_assert_eq!(batch[0], batch[1]);
            }
            other => prop_assert!(false, "unexpected result: {:?}", other),
        }
    }
}

// =============================================================================
// Validation Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Oversized batches are rejected regardless of seat availability.
    #[test]
    fn oversized_batch_always_too_many_seats(
        batch in prop::collection::vec(arb_seat(), 3..=6),
        trip in 1..=NUM_TRIPS,
    ) {
        let engine = make_engine();
        let result = engine.reserve(Some(UserId(1)), TripId(trip), &seats(&batch));
        prop_assert_eq!(result, Err(ReservationError::TooManySeats));
        prop_assert!(engine.occupied_seats(&TripId(trip)).is_empty());
    }

    /// Seat numbers outside [1, 18] are rejected wherever they appear.
    #[test]
    fn out_of_range_seat_always_invalid(
        valid in arb_seat(),
        invalid in 19u8..,
        invalid_first in any::<bool>(),
    ) {
        let engine = make_engine();
        let batch = if invalid_first {
            vec![invalid, valid]
        } else {
            vec![valid, invalid]
        };

        let result = engine.reserve(Some(UserId(1)), TripId(1), &seats(&batch));
        prop_assert_eq!(
            result,
            Err(ReservationError::InvalidSeat { seat: SeatNumber(invalid) })
        );
        prop_assert!(engine.occupied_seats(&TripId(1)).is_empty());
    }

    /// Requests without a user never reach the ledger.
    #[test]
    fn unauthenticated_always_rejected(
        batch in arb_batch(),
        trip in 1..=NUM_TRIPS,
    ) {
        let engine = make_engine();
        let result = engine.reserve(None, TripId(trip), &seats(&batch));
        prop_assert_eq!(result, Err(ReservationError::Unauthenticated));
        prop_assert!(engine.occupied_seats(&TripId(trip)).is_empty());
    }

    /// Duplicate seats inside one request are rejected without writes.
    #[test]
    fn duplicate_seats_in_request_rejected(seat in arb_seat()) {
        let engine = make_engine();
        let result = engine.reserve(Some(UserId(1)), TripId(1), &seats(&[seat, seat]));
        prop_assert_eq!(
            result,
            Err(ReservationError::InvalidSeat { seat: SeatNumber(seat) })
        );
        prop_assert!(engine.occupied_seats(&TripId(1)).is_empty());
    }
}

// =============================================================================
// History Projection Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The history projection returns exactly the user's confirmed seats,
    /// newest first, each joined to its catalog trip.
    #[test]
    fn history_matches_confirmed_seats(
        requests in prop::collection::vec(arb_request(), 1..40),
    ) {
        let engine = make_engine();
        let mut per_user: HashMap<u32, Vec<(u32, u8)>> = HashMap::new();

        for (trip, user, batch) in requests {
            if let Ok(result) =
                engine.reserve(Some(UserId(user)), TripId(trip), &seats(&batch))
            {
                let claims = per_user.entry(user).or_default();
                for seat in result.seat_numbers {
                    claims.push((trip, seat.0));
                }
            }
        }

        for (user, mut claims) in per_user {
            let history = engine.reservations_for(&UserId(user));
            prop_assert_eq!(history.len(), claims.len());

            // Newest first, deterministically tie-broken.
            for pair in history.windows(2) {
                let newer = &pair[0].0;
                let older = &pair[1].0;
                prop_assert!(
                    (newer.confirmed_at, newer.id) > (older.confirmed_at, older.id)
                );
            }

            // Same multiset of (trip, seat) claims, and a consistent join.
            let mut seen: Vec<(u32, u8)> = history
                .iter()
                .map(|(r, t)| {
                    prop_assert_eq!(r.trip_id, t.id);
                    Ok((r.trip_id.0, r.seat.0))
                })
                .collect::<Result<_, TestCaseError>>()?;
            seen.sort_unstable();
            claims.sort_unstable();
            prop_assert_eq!(seen, claims);
        }
    }
}
