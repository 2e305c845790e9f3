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

//! Seat ledger public API integration tests.

use booking_demo_rs::{ReservationStatus, SeatLedger, SeatNumber, TripId, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

fn seats(numbers: &[u8]) -> Vec<SeatNumber> {
    numbers.iter().copied().map(SeatNumber).collect()
}

// === Basic Ledger Tests ===

#[test]
fn new_ledger_has_no_confirmations() {
    let ledger = SeatLedger::new();
    assert!(ledger.occupied_seats(&TripId(1)).is_empty());
    assert_eq!(ledger.confirmed_count(), 0);
}

#[test]
fn confirmed_batch_is_visible_in_occupied_set() {
    let ledger = SeatLedger::new();
    ledger
        .try_confirm(TripId(1), &seats(&[5, 6]), UserId(1))
        .unwrap();

    let occupied: BTreeSet<SeatNumber> = seats(&[5, 6]).into_iter().collect();
    assert_eq!(ledger.occupied_seats(&TripId(1)), occupied);
}

#[test]
fn batch_with_conflict_writes_nothing() {
    let ledger = SeatLedger::new();
    ledger
        .try_confirm(TripId(1), &seats(&[4]), UserId(1))
        .unwrap();

    let err = ledger
        .try_confirm(TripId(1), &seats(&[3, 4]), UserId(2))
        .unwrap_err();
    assert_eq!(err.seat, SeatNumber(4));

    assert_eq!(ledger.occupied_seats(&TripId(1)), seats(&[4]).into_iter().collect());
    assert_eq!(ledger.confirmed_count(), 1);
}

#[test]
fn reservation_ids_are_unique_across_trips() {
    let ledger = SeatLedger::new();
    let a = ledger
        .try_confirm(TripId(1), &seats(&[1, 2]), UserId(1))
        .unwrap();
    let b = ledger
        .try_confirm(TripId(2), &seats(&[1, 2]), UserId(2))
        .unwrap();

    let mut all_ids: Vec<_> = a
        .reservation_ids
        .iter()
        .chain(b.reservation_ids.iter())
        .collect();
    all_ids.sort();
    all_ids.dedup();
    assert_eq!(all_ids.len(), 4);
}

#[test]
fn records_carry_confirmed_status_and_owner() {
    let ledger = SeatLedger::new();
    let batch = ledger
        .try_confirm(TripId(9), &seats(&[12]), UserId(3))
        .unwrap();

    let record = ledger.reservation(&batch.reservation_ids[0]).unwrap();
    assert_eq!(record.status, ReservationStatus::Confirmed);
    assert_eq!(record.user_id, UserId(3));
    assert_eq!(record.trip_id, TripId(9));
    assert_eq!(record.seat, SeatNumber(12));
}

#[test]
fn history_is_per_user() {
    let ledger = SeatLedger::new();
    ledger
        .try_confirm(TripId(1), &seats(&[1]), UserId(1))
        .unwrap();
    ledger
        .try_confirm(TripId(1), &seats(&[2]), UserId(2))
        .unwrap();

    assert_eq!(ledger.reservations_for(&UserId(1)).len(), 1);
    assert_eq!(ledger.reservations_for(&UserId(2)).len(), 1);
    assert!(ledger.reservations_for(&UserId(3)).is_empty());
}

// === Concurrency Tests ===

/// The core correctness property: N concurrent confirmations of the same
/// seat produce exactly one success and N-1 conflicts naming the seat.
#[test]
fn concurrent_same_seat_exactly_one_success() {
    let ledger = Arc::new(SeatLedger::new());

    const NUM_THREADS: usize = 50;
    let mut handles = Vec::with_capacity(NUM_THREADS);

    for i in 0..NUM_THREADS {
        let ledger = ledger.clone();
        handles.push(thread::spawn(move || {
            ledger.try_confirm(TripId(1), &seats(&[1]), UserId(i as u32))
        }));
    }

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.seat == SeatNumber(1)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, NUM_THREADS - 1);
    assert_eq!(ledger.confirmed_count(), 1);
}

/// Confirmations against different trips share no claim and all succeed.
#[test]
fn concurrent_different_trips_all_succeed() {
    let ledger = Arc::new(SeatLedger::new());

    const NUM_TRIPS: usize = 32;
    let mut handles = Vec::with_capacity(NUM_TRIPS);

    for i in 0..NUM_TRIPS {
        let ledger = ledger.clone();
        handles.push(thread::spawn(move || {
            ledger.try_confirm(TripId(i as u32), &seats(&[1, 2]), UserId(1))
        }));
    }

    for handle in handles {
        handle.join().expect("thread panicked").unwrap();
    }

    assert_eq!(ledger.confirmed_count(), NUM_TRIPS * 2);
}

/// Hammer one trip with conflicting batches: the confirmed set is always
/// the union of the winning batches, with every seat owned exactly once.
#[test]
fn contended_trip_converges_to_disjoint_winners() {
    let ledger = Arc::new(SeatLedger::new());

    const NUM_THREADS: usize = 40;
    let mut handles = Vec::with_capacity(NUM_THREADS);

    for i in 0..NUM_THREADS {
        let ledger = ledger.clone();
        handles.push(thread::spawn(move || {
            // Overlapping pairs across an 18-seat vehicle.
            let first = (i % 17) as u8 + 1;
            ledger.try_confirm(TripId(1), &seats(&[first, first + 1]), UserId(i as u32))
        }));
    }

    let mut claimed = BTreeSet::new();
    for handle in handles {
        if let Ok(batch) = handle.join().expect("thread panicked") {
            for seat in batch.seat_numbers {
                assert!(claimed.insert(seat), "seat {seat} double-confirmed");
            }
        }
    }

    assert_eq!(ledger.occupied_seats(&TripId(1)), claimed);
}

/// Readers racing a writer never see a torn batch: occupied() observes
/// either none or all of a two-seat confirmation.
#[test]
fn readers_never_observe_partial_batches() {
    let ledger = Arc::new(SeatLedger::new());

    const NUM_BATCHES: u32 = 200;
    let writer = {
        let ledger = ledger.clone();
        thread::spawn(move || {
            for i in 0..NUM_BATCHES {
                // Each batch claims a seat pair on its own trip.
                ledger
                    .try_confirm(TripId(i), &seats(&[1, 2]), UserId(1))
                    .unwrap();
            }
        })
    };

    let reader = {
        let ledger = ledger.clone();
        thread::spawn(move || {
            for _ in 0..1_000 {
                for trip in 0..NUM_BATCHES {
                    let occupied = ledger.occupied_seats(&TripId(trip));
                    assert!(
                        occupied.is_empty() || occupied.len() == 2,
                        "torn batch visible: {occupied:?}"
                    );
                }
            }
        })
    };

    writer.join().expect("writer panicked");
    reader.join().expect("reader panicked");
}
