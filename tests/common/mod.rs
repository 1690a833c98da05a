use std::path::PathBuf;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use common::DbPool;
use courtside::schemas::reservation::ReservationResponse;
use courtside::{AppState, CLIENT_ID_HEADER, CONTROL_ID_HEADER, Config, routes};
use diesel::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

mod mock_db;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};

#[allow(dead_code)]
pub const VENUE_ID: i32 = 1;
/// Available court, capacity 10, open 08:00 - 22:00
#[allow(dead_code)]
pub const COURT_ID: i32 = 1;
/// Court under maintenance
#[allow(dead_code)]
pub const MAINTENANCE_COURT_ID: i32 = 2;
/// Available court, capacity 4, open 09:00 - 13:00
#[allow(dead_code)]
pub const SMALL_COURT_ID: i32 = 3;
#[allow(dead_code)]
pub const CLIENT_ID: i32 = 1;
#[allow(dead_code)]
pub const OTHER_CLIENT_ID: i32 = 2;
#[allow(dead_code)]
pub const DISCIPLINE_ID: i32 = 1;
#[allow(dead_code)]
pub const CONTROL_ID: i32 = 1;

#[allow(dead_code)]
pub const DATE: &str = "2025-03-10";

const FIXTURES: &[&str] = &[
	"INSERT INTO venue (id, name, address) VALUES (1, 'Polideportivo Norte', \
	 'Av. Siempre Viva 742')",
	"INSERT INTO court (id, venue_id, name, capacity, status, opens_at, \
	 closes_at) VALUES (1, 1, 'Cancha 1', 10, 'available', '08:00', '22:00')",
	"INSERT INTO court (id, venue_id, name, capacity, status, opens_at, \
	 closes_at) VALUES (2, 1, 'Cancha 2', 10, 'maintenance', '08:00', \
	 '22:00')",
	"INSERT INTO court (id, venue_id, name, capacity, status, opens_at, \
	 closes_at) VALUES (3, 1, 'Cancha 3', 4, 'available', '09:00', '13:00')",
	"INSERT INTO client (id, name, email) VALUES (1, 'Lucia Fernandez', \
	 'lucia@example.com')",
	"INSERT INTO client (id, name, email) VALUES (2, 'Mateo Rojas', NULL)",
	"INSERT INTO discipline (id, name) VALUES (1, 'Futbol 5'), (2, 'Padel')",
	"INSERT INTO control (id, name) VALUES (1, 'Porteria principal')",
];

#[allow(dead_code)]
pub struct TestEnv {
	pub app:      TestServer,
	pub pool:     DbPool,
	pub files:    TempDir,
	pub db_guard: DatabaseGuard,
}

impl TestEnv {
	/// Get a test environment with a seeded database and an empty files
	/// directory
	///
	/// # Panics
	/// Panics if building the database or test server fails
	pub async fn new() -> Self {
		let mut config = Config::from_env();

		let db_guard = (*DATABASE_PROVIDER).acquire().await;
		let pool = db_guard.create_pool().await;

		{
			let conn = pool.get().await.unwrap();

			conn.interact(|conn| {
				for query in FIXTURES {
					diesel::sql_query(*query).execute(conn)?;
				}

				Ok::<_, diesel::result::Error>(())
			})
			.await
			.unwrap()
			.unwrap();
		}

		let files = tempfile::tempdir().unwrap();
		config.files_dir = files.path().to_path_buf();

		let state = AppState::new(config, pool.clone());
		let app = TestServer::new(routes::get_app_router(state)).unwrap();

		TestEnv { app, pool, files, db_guard }
	}

	/// Absolute path of a stored artifact
	#[allow(dead_code)]
	pub fn artifact(&self, rel_path: &str) -> PathBuf {
		self.files.path().join(rel_path)
	}

	/// Run a raw SQL statement against the test database
	#[allow(dead_code)]
	pub async fn execute(&self, query: String) {
		let conn = self.pool.get().await.unwrap();

		conn.interact(move |conn| diesel::sql_query(query).execute(conn))
			.await
			.unwrap()
			.unwrap();
	}

	/// Create a reservation on [`COURT_ID`] for [`CLIENT_ID`]
	#[allow(dead_code)]
	pub async fn create_reservation(
		&self,
		total: i64,
		balance: i64,
		status: &str,
	) -> ReservationResponse {
		let response = self
			.app
			.post("/reservations")
			.as_client(CLIENT_ID)
			.json(&reservation_body(total, balance, status))
			.await;

		assert_eq!(response.status_code(), 201, "{}", response.text());

		response.json::<ReservationResponse>()
	}

	/// Create a single 10:00 - 11:00 time block for a reservation
	#[allow(dead_code)]
	pub async fn book_morning(&self, r_id: i32) {
		let response = self
			.app
			.post(&format!("/reservations/{r_id}/time-blocks"))
			.as_client(CLIENT_ID)
			.json(&json!({
				"date": DATE,
				"blocks": [{ "start": "10:00:00", "end": "11:00:00" }],
			}))
			.await;

		assert_eq!(response.status_code(), 201, "{}", response.text());
	}
}

/// Request body for a reservation on [`COURT_ID`] for [`CLIENT_ID`]
#[allow(dead_code)]
pub fn reservation_body(total: i64, balance: i64, status: &str) -> Value {
	json!({
		"date": DATE,
		"cupo": 5,
		"totalAmount": total,
		"outstandingBalance": balance,
		"status": status,
		"clientId": CLIENT_ID,
		"courtId": COURT_ID,
		"disciplineId": DISCIPLINE_ID,
	})
}

/// Request body for issuing a credential valid for the day of [`DATE`]
#[allow(dead_code)]
pub fn credential_body(code: &str) -> Value {
	json!({
		"generatedAt": "2025-03-10T08:00:00",
		"expiresAt": "2025-03-10T23:00:00",
		"code": code,
		"status": "active",
	})
}

/// Attach identity headers to a test request
#[allow(dead_code)]
pub trait WithIdentity {
	fn as_client(self, c_id: i32) -> Self;

	fn as_control(self, c_id: i32) -> Self;
}

impl WithIdentity for TestRequest {
	fn as_client(self, c_id: i32) -> Self {
		self.add_header(
			HeaderName::from_static(CLIENT_ID_HEADER),
			HeaderValue::from(c_id),
		)
	}

	fn as_control(self, c_id: i32) -> Self {
		self.add_header(
			HeaderName::from_static(CONTROL_ID_HEADER),
			HeaderValue::from(c_id),
		)
	}
}
