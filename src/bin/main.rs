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

use booking_demo_rs::{Engine, SeatNumber, Trip, TripCatalog, TripId, UserId};
use chrono::NaiveDate;
use clap::Parser;
use crossbeam::channel::bounded;
use csv::{ReaderBuilder, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::thread;
use tracing::debug;

/// Booking Engine - Process reservation request CSV files
///
/// Loads a trip catalog from a seed file, replays booking requests against
/// it on a pool of worker threads, and writes the confirmed reservations to
/// stdout.
#[derive(Parser, Debug)]
#[command(name = "booking-demo-rs")]
#[command(about = "A seat-reservation engine that replays booking request CSVs", long_about = None)]
struct Args {
    /// Path to the trip seed CSV
    ///
    /// Expected format: trip,origin,destination,date,price
    #[arg(value_name = "TRIPS")]
    trips: PathBuf,

    /// Path to the booking request CSV
    ///
    /// Expected format: user,trip,seats (seats space-separated, e.g. "5 6")
    #[arg(value_name = "REQUESTS")]
    requests: PathBuf,

    /// Number of concurrent booking workers
    #[arg(long, default_value_t = 4)]
    workers: usize,
}

fn main() {
    // Logs go to stderr; stdout carries the reservations CSV.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_demo_rs=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let trips_file = match File::open(&args.trips) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening trips file '{}': {}", args.trips.display(), e);
            process::exit(1);
        }
    };

    let catalog = match load_trips(BufReader::new(trips_file)) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading trips: {}", e);
            process::exit(1);
        }
    };
    tracing::info!(trips = catalog.len(), "trip catalog loaded");

    let engine = Engine::new(catalog);

    let requests_file = match File::open(&args.requests) {
        Ok(f) => f,
        Err(e) => {
            eprintln!(
                "Error opening requests file '{}': {}",
                args.requests.display(),
                e
            );
            process::exit(1);
        }
    };

    if let Err(e) = process_requests(BufReader::new(requests_file), &engine, args.workers) {
        eprintln!("Error processing requests: {}", e);
        process::exit(1);
    }

    if let Err(e) = write_reservations(&engine, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record of one scheduled trip.
///
/// Fields: `trip, origin, destination, date, price`
#[derive(Debug, Deserialize)]
struct TripRecord {
    trip: u32,
    origin: String,
    destination: String,
    date: String,
    price: i64,
}

impl TripRecord {
    /// Converts the record to a Trip.
    ///
    /// Returns `None` when the date is not a valid `YYYY-MM-DD` calendar
    /// date.
    fn into_trip(self) -> Option<Trip> {
        let date: NaiveDate = self.date.parse().ok()?;
        Some(Trip {
            id: TripId(self.trip),
            origin: self.origin,
            destination: self.destination,
            date,
            price: self.price,
        })
    }
}

/// Raw CSV record of one booking request.
///
/// Fields: `user, trip, seats`. A missing user column models an
/// unauthenticated request and is rejected by the engine, not the parser.
#[derive(Debug, Deserialize)]
struct RequestRecord {
    #[serde(deserialize_with = "csv::invalid_option")]
    user: Option<u32>,
    trip: u32,
    seats: String,
}

impl RequestRecord {
    /// Parses the space-separated seat list.
    ///
    /// Returns `None` when any entry is not a seat number; range checks are
    /// the engine's job.
    fn seat_numbers(&self) -> Option<Vec<SeatNumber>> {
        self.seats
            .split_whitespace()
            .map(|s| s.parse::<u8>().ok().map(SeatNumber))
            .collect()
    }
}

/// Loads the trip catalog from a CSV reader.
///
/// Rows with unparseable fields are skipped; the remaining rows seed the
/// catalog.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn load_trips<R: Read>(reader: R) -> Result<TripCatalog, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut trips = Vec::new();
    for result in rdr.deserialize::<TripRecord>() {
        match result {
            Ok(record) => {
                let Some(trip) = record.into_trip() else {
                    debug!("skipping trip row with invalid date");
                    continue;
                };
                trips.push(trip);
            }
            Err(e) => {
                debug!(error = %e, "skipping malformed trip row");
                continue;
            }
        }
    }

    Ok(TripCatalog::new(trips))
}

/// Replays booking requests from a CSV reader against the engine.
///
/// Requests are fanned out to `workers` threads over a bounded channel, so
/// conflicting requests genuinely race the way concurrent request handlers
/// would. Malformed rows are skipped; rejected requests are logged at debug
/// level and processing continues.
///
/// # CSV Format
///
/// Expected columns: `user, trip, seats`
/// - `user`: User id (optional; empty means unauthenticated)
/// - `trip`: Trip id (u32)
/// - `seats`: Space-separated seat numbers, e.g. `"5 6"`
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn process_requests<R: Read>(
    reader: R,
    engine: &Engine,
    workers: usize,
) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let (tx, rx) = bounded::<RequestRecord>(256);

    thread::scope(|scope| {
        for _ in 0..workers.max(1) {
            let rx = rx.clone();
            scope.spawn(move || {
                for record in rx.iter() {
                    let Some(seats) = record.seat_numbers() else {
                        debug!(trip = record.trip, "skipping request with unparseable seats");
                        continue;
                    };
                    let user = record.user.map(UserId);
                    if let Err(e) = engine.reserve(user, TripId(record.trip), &seats) {
                        debug!(trip = record.trip, error = %e, "request rejected");
                    }
                }
            });
        }
        drop(rx);

        for result in rdr.deserialize::<RequestRecord>() {
            match result {
                Ok(record) => {
                    // Workers only stop receiving once the sender is gone.
                    if tx.send(record).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "skipping malformed request row");
                    continue;
                }
            }
        }
        drop(tx);
    });

    Ok(())
}

/// One output row per confirmed reservation.
///
/// Columns: `reservation, trip, user, seat`
#[derive(Debug, Serialize)]
struct ReservationRow {
    reservation: u64,
    trip: u32,
    user: u32,
    seat: u8,
}

/// Writes all confirmed reservations to a CSV writer in commit order.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_reservations<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for reservation in engine.ledger().reservations() {
        wtr.serialize(ReservationRow {
            reservation: reservation.id.0,
            trip: reservation.trip_id.0,
            user: reservation.user_id.0,
            seat: reservation.seat.0,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
