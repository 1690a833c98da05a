use axum::http::StatusCode;

mod common;

use common::{CLIENT_ID, COURT_ID, DATE, SMALL_COURT_ID, TestEnv, WithIdentity};
use courtside::schemas::availability::AvailabilityResponse;
use serde_json::json;
use time_block::SlotState;

fn describe(body: &AvailabilityResponse) -> Vec<(String, String, SlotState)> {
	body.slots
		.iter()
		.map(|s| {
			(
				s.start.format("%H:%M").to_string(),
				s.end.format("%H:%M").to_string(),
				s.state,
			)
		})
		.collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_court_is_free_all_day() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.get(&format!("/courts/{SMALL_COURT_ID}/availability"))
		.add_query_param("date", DATE)
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<AvailabilityResponse>();

	assert_eq!(body.court_id, SMALL_COURT_ID);
	assert_eq!(body.date.to_string(), DATE);
	assert_eq!(describe(&body), vec![
		("09:00".to_string(), "10:00".to_string(), SlotState::Free),
		("10:00".to_string(), "11:00".to_string(), SlotState::Free),
		("11:00".to_string(), "12:00".to_string(), SlotState::Free),
		("12:00".to_string(), "13:00".to_string(), SlotState::Free),
	]);
}

#[tokio::test(flavor = "multi_thread")]
async fn booked_blocks_show_up_as_occupied() {
	let env = TestEnv::new().await;

	let reservation = env.create_reservation(100, 100, "pending").await;

	let response = env
		.app
		.post(&format!("/reservations/{}/time-blocks", reservation.id))
		.as_client(CLIENT_ID)
		.json(&json!({
			"date": DATE,
			"blocks": [{ "start": "10:00:00", "end": "11:30:00" }],
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = env
		.app
		.get(&format!("/courts/{COURT_ID}/availability"))
		.add_query_param("date", DATE)
		.await
		.json::<AvailabilityResponse>();

	let slots = describe(&body);

	assert_eq!(
		slots.first(),
		Some(&("08:00".to_string(), "09:00".to_string(), SlotState::Free))
	);
	assert!(slots.contains(&(
		"10:00".to_string(),
		"11:30".to_string(),
		SlotState::Occupied
	)));
	assert!(slots.contains(&(
		"11:30".to_string(),
		"12:30".to_string(),
		SlotState::Free
	)));
	assert_eq!(
		slots.last(),
		Some(&("21:30".to_string(), "22:00".to_string(), SlotState::Free))
	);

	let occupied =
		slots.iter().filter(|s| s.2 == SlotState::Occupied).count();
	assert_eq!(occupied, 1);

	// Other days are untouched
	let body = env
		.app
		.get(&format!("/courts/{COURT_ID}/availability"))
		.add_query_param("date", "2025-03-11")
		.await
		.json::<AvailabilityResponse>();

	assert!(body.slots.iter().all(|s| s.state == SlotState::Free));
	assert_eq!(body.slots.len(), 14);
}

#[tokio::test(flavor = "multi_thread")]
async fn availability_of_unknown_court() {
	let env = TestEnv::new().await;

	let response = env
		.app
		.get("/courts/999/availability")
		.add_query_param("date", DATE)
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
