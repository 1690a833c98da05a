use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use common::{DbPool, Error};
use db::ReservationStatus;
use reservation::Reservation;
use utils::{
	ArtifactStore,
	discard_artifact,
	reconcile_reservation_artifact,
};
use vocabulary::EnumRegistry;

use crate::schemas::reservation::{
	CreateReservationRequest,
	ReservationResponse,
	UpdateReservationRequest,
};

#[instrument(skip(registry, pool))]
pub async fn create_reservation(
	State(registry): State<EnumRegistry>,
	State(pool): State<DbPool>,
	Json(request): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let status = registry
		.parse::<ReservationStatus>(&request.status, &conn)
		.await?;

	let reservation = request.to_insertable(status).insert(&conn).await?;
	let response = ReservationResponse::from(reservation);

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub async fn get_reservation(
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let reservation = Reservation::get_by_id(r_id, &conn).await?;
	let response = ReservationResponse::from(reservation);

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(registry, store, pool))]
pub async fn update_reservation(
	State(registry): State<EnumRegistry>,
	State(store): State<ArtifactStore>,
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
	Json(request): Json<UpdateReservationRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let status = match &request.status {
		Some(s) => Some(registry.parse::<ReservationStatus>(s, &conn).await?),
		None => None,
	};

	let changes = request.to_changeset(status);
	let touches_credential = changes.touches_credential();

	let reservation = changes.apply_to(r_id, &conn).await?;

	if touches_credential {
		reconcile_reservation_artifact(r_id, &store, &conn).await?;
	}

	let response = ReservationResponse::from(reservation);

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(store, pool))]
pub async fn delete_reservation(
	State(store): State<ArtifactStore>,
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
) -> Result<NoContent, Error> {
	let conn = pool.get().await?;

	let deleted = Reservation::delete_by_id(r_id, &conn).await?;

	if let Some(credential) = &deleted.credential {
		discard_artifact(&store, credential);
	}

	Ok(NoContent)
}
