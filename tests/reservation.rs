use axum::http::StatusCode;

mod common;

use common::{
	CLIENT_ID,
	COURT_ID,
	DISCIPLINE_ID,
	MAINTENANCE_COURT_ID,
	OTHER_CLIENT_ID,
	SMALL_COURT_ID,
	TestEnv,
	WithIdentity,
	reservation_body,
};
use courtside::schemas::reservation::ReservationResponse;
use db::ReservationStatus;
use serde_json::{Value, json};

#[tokio::test(flavor = "multi_thread")]
async fn create_unpaid_reservation() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/reservations")
		.as_client(CLIENT_ID)
		.json(&reservation_body(100, 100, "pending"))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = response.json::<ReservationResponse>();

	assert_eq!(body.cupo, 5);
	assert_eq!(body.total_amount, 100);
	assert_eq!(body.outstanding_balance, 100);
	assert_eq!(body.status, ReservationStatus::Pending);
	assert_eq!(body.client.id, CLIENT_ID);
	assert_eq!(body.court.id, COURT_ID);
	assert_eq!(body.discipline.id, DISCIPLINE_ID);
	assert!(body.time_blocks.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_reservation_requires_identity() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/reservations")
		.json(&reservation_body(100, 100, "pending"))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_reservation_with_unknown_status() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.post("/reservations")
		.as_client(CLIENT_ID)
		.json(&reservation_body(100, 100, "refunded"))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_reservation_on_maintenance_court() {
	let env = TestEnv::new().await;

	let mut body = reservation_body(100, 100, "pending");
	body["courtId"] = json!(MAINTENANCE_COURT_ID);

	let response =
		env.app.post("/reservations").as_client(CLIENT_ID).json(&body).await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_reservation_over_capacity() {
	let env = TestEnv::new().await;

	let mut body = reservation_body(100, 100, "pending");
	body["courtId"] = json!(SMALL_COURT_ID);

	let response =
		env.app.post("/reservations").as_client(CLIENT_ID).json(&body).await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_reservation_checks_client_before_court() {
	let env = TestEnv::new().await;

	let mut body = reservation_body(100, 100, "pending");
	body["clientId"] = json!(999);
	body["courtId"] = json!(MAINTENANCE_COURT_ID);

	let response =
		env.app.post("/reservations").as_client(CLIENT_ID).json(&body).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_reservation_with_invalid_amounts() {
	let env = TestEnv::new().await;

	for (total, balance) in [(100, 101), (100, -1), (0, 0)] {
		let response = env
			.app
			.post("/reservations")
			.as_client(CLIENT_ID)
			.json(&reservation_body(total, balance, "pending"))
			.await;

		assert_eq!(
			response.status_code(),
			StatusCode::UNPROCESSABLE_ENTITY,
			"total {total} with balance {balance}"
		);
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn get_reservation() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;
	env.book_morning(reservation.id).await;

	let response = env
		.app
		.get(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<ReservationResponse>();

	assert_eq!(body.id, reservation.id);
	assert_eq!(body.time_blocks.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn get_unknown_reservation() {
	let env = TestEnv::new().await;

	let response = env.app.get("/reservations/999").as_client(CLIENT_ID).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_reservation_is_a_merge_patch() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "outstandingBalance": 40, "status": "installment" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<ReservationResponse>();

	assert_eq!(body.outstanding_balance, 40);
	assert_eq!(body.status, ReservationStatus::Installment);
	assert_eq!(body.total_amount, 100);
	assert_eq!(body.cupo, 5);
	assert_eq!(body.court.id, COURT_ID);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_reservation_checks_merged_amounts() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;

	// Lowering the total below the stored balance breaks the invariant
	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "totalAmount": 50 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "totalAmount": 50, "outstandingBalance": 50 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_reservation_checks_cupo_against_current_court() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "cupo": 11 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "cupo": 10 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_reservation_checks_cupo_against_new_court() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;

	// cupo 5 does not fit the small court
	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "courtId": SMALL_COURT_ID }))
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "courtId": MAINTENANCE_COURT_ID }))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "courtId": SMALL_COURT_ID, "cupo": 4 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<ReservationResponse>();

	assert_eq!(body.court.id, SMALL_COURT_ID);
	assert_eq!(body.cupo, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_reservation_rejects_invalid_transition() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "cancelled").await;

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "status": "paid" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let body = response.json::<Value>();
	assert_eq!(body["info"], "{\"from\":\"cancelled\",\"to\":\"paid\"}");

	// Setting the current status again is a no-op
	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "status": "cancelled" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_reservation_to_unknown_client() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "clientId": 999 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let response = env
		.app
		.patch(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "clientId": OTHER_CLIENT_ID }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<ReservationResponse>().client.id, OTHER_CLIENT_ID);
}

#[tokio::test(flavor = "multi_thread")]
async fn moving_reservation_moves_its_time_blocks() {
	let env = TestEnv::new().await;

	let first = env.create_reservation(100, 100, "pending").await;
	env.book_morning(first.id).await;

	// Occupy the same slot on the next day
	let mut body = reservation_body(100, 100, "pending");
	body["date"] = json!("2025-03-11");

	let second = env
		.app
		.post("/reservations")
		.as_client(CLIENT_ID)
		.json(&body)
		.await
		.json::<ReservationResponse>();

	let response = env
		.app
		.post(&format!("/reservations/{}/time-blocks", second.id))
		.as_client(CLIENT_ID)
		.json(&json!({
			"date": "2025-03-11",
			"blocks": [{ "start": "10:30:00", "end": "11:30:00" }],
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let response = env
		.app
		.patch(&format!("/reservations/{}", first.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "date": "2025-03-11" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);

	let response = env
		.app
		.patch(&format!("/reservations/{}", first.id))
		.as_client(CLIENT_ID)
		.json(&json!({ "date": "2025-03-12" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<ReservationResponse>();

	assert_eq!(body.time_blocks.len(), 1);
	assert_eq!(body.time_blocks[0].date.to_string(), "2025-03-12");
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_reservation() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;
	env.book_morning(reservation.id).await;

	let response = env
		.app
		.delete(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let response = env
		.app
		.get(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let response = env
		.app
		.delete(&format!("/reservations/{}", reservation.id))
		.as_client(CLIENT_ID)
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
