use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use primitive_court::PrimitiveCourt;
use time_block::court_availability;

use crate::Config;
use crate::schemas::availability::{AvailabilityQuery, AvailabilityResponse};

#[instrument(skip(config, pool))]
pub async fn get_court_availability(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	Path(court_id): Path<i32>,
	Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let court = PrimitiveCourt::get_by_id(court_id, &conn).await?;

	let slots =
		court_availability(&court, query.date, config.slot_length, &conn)
			.await?;

	let response = AvailabilityResponse { court_id, date: query.date, slots };

	Ok((StatusCode::OK, Json(response)))
}
