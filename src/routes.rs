use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::availability::get_court_availability;
use crate::controllers::credential::{
	get_credential,
	get_credential_statuses,
	issue_credential,
	redeem_credential,
	revoke_credential,
	update_credential,
};
use crate::controllers::healthcheck;
use crate::controllers::reservation::{
	create_reservation,
	delete_reservation,
	get_reservation,
	update_reservation,
};
use crate::controllers::time_block::create_time_blocks;
use crate::controllers::vocabulary::get_vocabulary;
use crate::middleware::IdentityLayer;

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/courts", court_routes())
		.nest("/reservations", reservation_routes())
		.nest("/credentials", credential_routes())
		.nest("/vocabularies", vocabulary_routes());

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::with_status_code(
					StatusCode::REQUEST_TIMEOUT,
					Duration::from_secs(10),
				))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Court routes
fn court_routes() -> Router<AppState> {
	Router::new().route("/{id}/availability", get(get_court_availability))
}

/// Reservation routes, all of them require an identity
fn reservation_routes() -> Router<AppState> {
	Router::new()
		.route("/", post(create_reservation))
		.route(
			"/{id}",
			get(get_reservation)
				.patch(update_reservation)
				.delete(delete_reservation),
		)
		.route("/{id}/time-blocks", post(create_time_blocks))
		.route("/{id}/credential", post(issue_credential))
		.route_layer(IdentityLayer::new())
}

/// Credential routes with identity protection for everything but the status
/// vocabulary
fn credential_routes() -> Router<AppState> {
	let protected = Router::new()
		.route(
			"/{id}",
			get(get_credential)
				.patch(update_credential)
				.delete(revoke_credential),
		)
		.route("/redeem", post(redeem_credential))
		.route_layer(IdentityLayer::new());

	Router::new()
		.route("/statuses", get(get_credential_statuses))
		.merge(protected)
}

/// Vocabulary routes
fn vocabulary_routes() -> Router<AppState> {
	Router::new().route("/{name}", get(get_vocabulary))
}
