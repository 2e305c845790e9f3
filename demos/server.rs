//! Simple REST API server example for the booking engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /sessions` - Exchange a user id for an opaque session token
//! - `GET /trips` - Search trips by origin, destination, and date
//! - `GET /trips/{id}/seats` - List occupied seats on a trip
//! - `POST /reservations` - Reserve seats (requires bearer token)
//! - `GET /reservations` - Reservation history for the session user
//!
//! ## Example Usage
//!
//! ```bash
//! # Open a session
//! curl -X POST http://localhost:3000/sessions \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": 1}'
//!
//! # Search trips
//! curl "http://localhost:3000/trips?origin=Lisbon&destination=Porto&date=2026-09-01"
//!
//! # Reserve seats 5 and 6
//! curl -X POST http://localhost:3000/reservations \
//!   -H "Content-Type: application/json" \
//!   -H "Authorization: Bearer <token>" \
//!   -d '{"trip_id": 1, "seats": [5, 6]}'
//!
//! # Reservation history
//! curl http://localhost:3000/reservations -H "Authorization: Bearer <token>"
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use booking_demo_rs::{
    Engine, ReservationError, SeatNumber, SessionStore, SessionToken, Trip, TripCatalog, TripId,
    UserId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for opening a session.
///
/// Registration and password checks live outside this demo; the session
/// store only needs an already-authenticated user id.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: u32,
}

/// Response body carrying the opaque session token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: SessionToken,
}

/// Query parameters for trip search.
#[derive(Debug, Deserialize)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

/// Request body for reserving seats.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub trip_id: u32,
    pub seats: Vec<u8>,
}

/// Response body for a confirmed reservation batch.
#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub reservation_ids: Vec<u64>,
    pub trip_id: u32,
    pub seats: Vec<u8>,
    pub user_id: u32,
}

/// Response body for the occupied-seats listing.
#[derive(Debug, Serialize)]
pub struct SeatsResponse {
    pub trip_id: u32,
    pub occupied: Vec<u8>,
}

/// One entry of a user's reservation history.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub reservation_id: u64,
    pub seat: u8,
    pub confirmed_at: chrono::DateTime<chrono::Utc>,
    pub trip: Trip,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the engine and the session store.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub sessions: Arc<SessionStore>,
}

// === Error Handling ===

/// Wrapper for converting `ReservationError` into HTTP responses.
pub struct AppError(ReservationError);

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ReservationError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ReservationError::NoSeatsSelected => (StatusCode::BAD_REQUEST, "NO_SEATS_SELECTED"),
            ReservationError::TooManySeats => (StatusCode::UNPROCESSABLE_ENTITY, "TOO_MANY_SEATS"),
            ReservationError::InvalidSeat { .. } => (StatusCode::BAD_REQUEST, "INVALID_SEAT"),
            ReservationError::TripNotFound => (StatusCode::NOT_FOUND, "TRIP_NOT_FOUND"),
            ReservationError::SeatAlreadyBooked { .. } => {
                (StatusCode::CONFLICT, "SEAT_ALREADY_BOOKED")
            }
            ReservationError::StorageUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Resolves the bearer token (if any) to a user id.
///
/// Absent, malformed, unknown, and expired tokens all resolve to `None`;
/// the engine turns that into `Unauthenticated`.
fn session_user(state: &AppState, headers: &HeaderMap) -> Option<UserId> {
    let token: SessionToken = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .parse()
        .ok()?;
    state.sessions.resolve(&token)
}

// === Handlers ===

/// POST /sessions - Issue a session token for a user.
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> (StatusCode, Json<SessionResponse>) {
    let token = state.sessions.issue(UserId(request.user_id));
    (StatusCode::CREATED, Json(SessionResponse { token }))
}

/// GET /trips - Search trips by origin, destination, and date.
async fn search_trips(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Json<Vec<Trip>> {
    let trips = state
        .engine
        .find_trips(&query.origin, &query.destination, query.date)
        .into_iter()
        .cloned()
        .collect();
    Json(trips)
}

/// GET /trips/{id}/seats - Occupied seats on a trip.
async fn occupied_seats(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<SeatsResponse>, AppError> {
    let trip_id = TripId(id);
    if state.engine.trip(&trip_id).is_none() {
        return Err(ReservationError::TripNotFound.into());
    }

    let occupied = state
        .engine
        .occupied_seats(&trip_id)
        .into_iter()
        .map(|seat| seat.0)
        .collect();
    Ok(Json(SeatsResponse {
        trip_id: id,
        occupied,
    }))
}

/// POST /reservations - Reserve seats on a trip.
async fn create_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReserveResponse>), AppError> {
    let user = session_user(&state, &headers);
    let seats: Vec<SeatNumber> = request.seats.iter().copied().map(SeatNumber).collect();

    let batch = state
        .engine
        .reserve(user, TripId(request.trip_id), &seats)?;

    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse {
            reservation_ids: batch.reservation_ids.iter().map(|id| id.0).collect(),
            trip_id: batch.trip_id.0,
            seats: batch.seat_numbers.iter().map(|seat| seat.0).collect(),
            user_id: batch.user_id.0,
        }),
    ))
}

/// GET /reservations - Reservation history for the session user.
async fn reservation_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let user = session_user(&state, &headers).ok_or(ReservationError::Unauthenticated)?;

    let history = state
        .engine
        .reservations_for(&user)
        .into_iter()
        .map(|(reservation, trip)| HistoryEntry {
            reservation_id: reservation.id.0,
            seat: reservation.seat.0,
            confirmed_at: reservation.confirmed_at,
            trip,
        })
        .collect();

    Ok(Json(history))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/trips", get(search_trips))
        .route("/trips/{id}/seats", get(occupied_seats))
        .route(
            "/reservations",
            post(create_reservation).get(reservation_history),
        )
        .with_state(state)
}

fn seed_catalog() -> TripCatalog {
    let seed = [
        ("Lisbon", "Porto", "2026-09-01", 4500),
        ("Lisbon", "Porto", "2026-09-02", 4500),
        ("Porto", "Lisbon", "2026-09-01", 4500),
        ("Lisbon", "Faro", "2026-09-01", 6000),
        ("Faro", "Lisbon", "2026-09-02", 6000),
    ];

    TripCatalog::new(seed.into_iter().enumerate().map(
        |(i, (origin, destination, date, price))| Trip {
            id: TripId(i as u32 + 1),
            origin: origin.to_string(),
            destination: destination.to_string(),
            date: date.parse().unwrap(),
            price,
        },
    ))
}

// === Main ===

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_demo_rs=debug".into()),
        )
        .init();

    let state = AppState {
        engine: Arc::new(Engine::new(seed_catalog())),
        sessions: Arc::new(SessionStore::new(chrono::Duration::minutes(30))),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Booking API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /sessions          - Open a session");
    println!("  GET  /trips             - Search trips");
    println!("  GET  /trips/:id/seats   - Occupied seats on a trip");
    println!("  POST /reservations      - Reserve seats");
    println!("  GET  /reservations      - Reservation history");

    axum::serve(listener, app).await.unwrap();
}
