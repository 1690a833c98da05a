use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{DbPool, Error};
use vocabulary::EnumRegistry;

use crate::schemas::vocabulary::VocabularyResponse;

#[instrument(skip(registry, pool))]
pub async fn get_vocabulary(
	State(registry): State<EnumRegistry>,
	State(pool): State<DbPool>,
	Path(name): Path<String>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let values = registry.allowed_values(&name, &conn).await?;

	Ok((StatusCode::OK, Json(VocabularyResponse { name, values })))
}
