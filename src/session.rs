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

//! Session identity.
//!
//! The engine itself only ever sees `Option<UserId>`; this module is the
//! collaborator that produces it. Session state is an explicit value type
//! holding exactly who is authenticated and until when — not an untyped bag.

use crate::base::UserId;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque session identifier handed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub Uuid);

impl SessionToken {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Authenticated session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` if the session has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory session store with a fixed time-to-live.
///
/// Constructed once at startup and passed to the request layer; request
/// logic never reaches for process-wide session state.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionToken, Session>,
    ttl: Duration,
}

impl SessionStore {
    /// Creates a store whose sessions live for `ttl` after issuance.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Issues a fresh opaque token for an already-authenticated user.
    pub fn issue(&self, user_id: UserId) -> SessionToken {
        let token = SessionToken::generate();
        self.sessions.insert(
            token,
            Session {
                user_id,
                expires_at: Utc::now() + self.ttl,
            },
        );
        token
    }

    /// Resolves a token back to its user.
    ///
    /// Expired sessions are dropped on lookup and resolve to `None`, the
    /// same as tokens that were never issued.
    pub fn resolve(&self, token: &SessionToken) -> Option<UserId> {
        let session = self.sessions.get(token).map(|s| *s.value())?;
        if session.is_expired_at(Utc::now()) {
            drop(self.sessions.remove(token));
            return None;
        }
        Some(session.user_id)
    }

    /// Removes a session, if present.
    pub fn revoke(&self, token: &SessionToken) {
        self.sessions.remove(token);
    }

    /// Number of live (possibly expired, not yet pruned) sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
