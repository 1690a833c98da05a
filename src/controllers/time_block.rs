use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use primitive_reservation::PrimitiveReservation;
use time_block::NewTimeBlocks;
use utils::{ArtifactStore, reconcile_reservation_artifact};

use crate::Identity;
use crate::schemas::time_block::{CreateTimeBlocksRequest, TimeBlockResponse};

#[instrument(skip(store, pool))]
pub async fn create_time_blocks(
	State(store): State<ArtifactStore>,
	State(pool): State<DbPool>,
	identity: Identity,
	Path(r_id): Path<i32>,
	Json(request): Json<CreateTimeBlocksRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let reservation = PrimitiveReservation::get_by_id(r_id, &conn).await?;

	identity.ensure_client(reservation.client_id)?;

	let spans = request.to_spans()?;

	let new_blocks =
		NewTimeBlocks { reservation_id: r_id, date: request.date, spans };

	let blocks = new_blocks.insert(&conn).await?;

	// The slots are part of the credential payload
	reconcile_reservation_artifact(r_id, &store, &conn).await?;

	let response: Vec<TimeBlockResponse> =
		blocks.into_iter().map(Into::into).collect();

	Ok((StatusCode::CREATED, Json(response)))
}
