use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use chrono::Utc;
use common::{DbPool, Error};
use credential::{Credential, check_validity};
use db::{CredentialStatus, Vocabulary};
use utils::{ArtifactStore, reconcile_artifact};
use validator::Validate;
use vocabulary::EnumRegistry;

use crate::schemas::BuildResponse;
use crate::schemas::credential::{
	CredentialResponse,
	IssueCredentialRequest,
	RedeemCredentialRequest,
	UpdateCredentialRequest,
};
use crate::schemas::vocabulary::VocabularyResponse;
use crate::{Config, Identity};

#[instrument(skip(config, registry, store, pool))]
pub async fn issue_credential(
	State(config): State<Config>,
	State(registry): State<EnumRegistry>,
	State(store): State<ArtifactStore>,
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
	Json(request): Json<IssueCredentialRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let status = registry
		.parse::<CredentialStatus>(&request.status, &conn)
		.await?;

	check_validity(request.generated_at, request.expires_at)?;

	let new_credential = request.to_insertable(r_id, status);
	let credential =
		utils::issue_credential(new_credential, &store, &conn).await?;

	let response: CredentialResponse = credential.build_response(&config)?;

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(config, pool))]
pub async fn get_credential(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	Path(c_id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let credential = Credential::get_by_id(c_id, &conn).await?;
	let response: CredentialResponse = credential.build_response(&config)?;

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(config, registry, store, pool))]
pub async fn update_credential(
	State(config): State<Config>,
	State(registry): State<EnumRegistry>,
	State(store): State<ArtifactStore>,
	State(pool): State<DbPool>,
	Path(c_id): Path<i32>,
	Json(request): Json<UpdateCredentialRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let status = match &request.status {
		Some(s) => Some(registry.parse::<CredentialStatus>(s, &conn).await?),
		None => None,
	};

	request.to_changeset(status).apply_to(c_id, &conn).await?;

	let credential = reconcile_artifact(c_id, &store, &conn).await?;
	let response: CredentialResponse = credential.build_response(&config)?;

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(store, pool))]
pub async fn revoke_credential(
	State(store): State<ArtifactStore>,
	State(pool): State<DbPool>,
	Path(c_id): Path<i32>,
) -> Result<NoContent, Error> {
	let conn = pool.get().await?;

	utils::revoke_credential(c_id, &store, &conn).await?;

	Ok(NoContent)
}

#[instrument(skip(config, pool))]
pub async fn redeem_credential(
	State(config): State<Config>,
	State(pool): State<DbPool>,
	identity: Identity,
	Json(request): Json<RedeemCredentialRequest>,
) -> Result<impl IntoResponse, Error> {
	let control_id = identity.require_control()?;

	request.validate()?;

	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();
	let credential =
		Credential::redeem(request.code, control_id, now, &conn).await?;

	let response: CredentialResponse = credential.build_response(&config)?;

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(registry, pool))]
pub async fn get_credential_statuses(
	State(registry): State<EnumRegistry>,
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let name = CredentialStatus::NAME.to_string();
	let values = registry.allowed_values(&name, &conn).await?;

	Ok((StatusCode::OK, Json(VocabularyResponse { name, values })))
}
