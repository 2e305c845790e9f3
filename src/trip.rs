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

//! Trip catalog.
//!
//! The catalog is a read-only store of scheduled trips. Trips are created
//! only by a seeding collaborator (the CSV loader in the CLI, a literal seed
//! in the demo server) and are immutable afterwards; the reservation engine
//! never writes here.

use crate::base::TripId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every vehicle in the fleet has the same fixed seat count.
///
/// Capacity is an invariant of the system, not a per-trip attribute.
pub const SEAT_CAPACITY: u8 = 18;

/// A scheduled vehicle departure between two named locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub origin: String,
    pub destination: String,
    /// Departure date only; the schedule carries no time component.
    pub date: NaiveDate,
    /// Price in minor currency units.
    pub price: i64,
}

/// Read-only store of scheduled trips.
///
/// Search is an equality match on origin, destination, and date. Results are
/// ordered by [`TripId`] ascending so searches are reproducible.
#[derive(Debug, Default)]
pub struct TripCatalog {
    trips: BTreeMap<TripId, Trip>,
}

impl TripCatalog {
    /// Builds a catalog from a seed of trips.
    ///
    /// Later duplicates of a trip id replace earlier ones.
    pub fn new(trips: impl IntoIterator<Item = Trip>) -> Self {
        Self {
            trips: trips.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Looks up a single trip by id.
    pub fn get(&self, id: &TripId) -> Option<&Trip> {
        self.trips.get(id)
    }

    /// Returns `true` if the catalog contains the trip.
    pub fn contains(&self, id: &TripId) -> bool {
        self.trips.contains_key(id)
    }

    /// Finds all trips matching origin, destination, and departure date.
    ///
    /// Matching is exact (case-sensitive); ordering is by trip id ascending.
    pub fn find_trips(&self, origin: &str, destination: &str, date: NaiveDate) -> Vec<&Trip> {
        self.trips
            .values()
            .filter(|t| t.origin == origin && t.destination == destination && t.date == date)
            .collect()
    }

    /// Iterates over all trips in id order.
    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    /// Number of trips in the catalog.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Returns `true` if the catalog holds no trips.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
