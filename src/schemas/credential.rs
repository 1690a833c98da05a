use chrono::NaiveDateTime;
use common::Error;
use credential::{Credential, CredentialUpdate, NewCredential};
use db::CredentialStatus;
use primitive_credential::PrimitiveCredential;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator_derive::Validate;

use crate::Config;
use crate::schemas::BuildResponse;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResponse {
	pub id:             i32,
	pub reservation_id: i32,
	pub generated_at:   NaiveDateTime,
	pub expires_at:     NaiveDateTime,
	pub file_path:      Option<String>,
	pub artifact_url:   Option<String>,
	pub code:           String,
	pub status:         CredentialStatus,
	pub control_id:     Option<i32>,
	pub created_at:     NaiveDateTime,
	pub updated_at:     NaiveDateTime,
}

impl BuildResponse<Result<CredentialResponse, Error>> for PrimitiveCredential {
	fn build_response(
		self,
		config: &Config,
	) -> Result<CredentialResponse, Error> {
		let artifact_url = match &self.file_path {
			Some(path) => Some(config.static_url.join(path)?.to_string()),
			None => None,
		};

		Ok(CredentialResponse {
			id: self.id,
			reservation_id: self.reservation_id,
			generated_at: self.generated_at,
			expires_at: self.expires_at,
			file_path: self.file_path,
			artifact_url,
			code: self.code,
			status: self.status,
			control_id: self.control_id,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}

impl BuildResponse<Result<CredentialResponse, Error>> for Credential {
	fn build_response(
		self,
		config: &Config,
	) -> Result<CredentialResponse, Error> {
		self.credential.build_response(config)
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueCredentialRequest {
	pub generated_at: NaiveDateTime,
	pub expires_at:   NaiveDateTime,
	#[validate(length(
		min = 1,
		max = 128,
		message = "code must be between 1 and 128 characters long",
		code = "code-length"
	))]
	pub code:         String,
	pub status:       String,
	pub control_id:   Option<i32>,
}

impl IssueCredentialRequest {
	#[must_use]
	pub fn to_insertable(
		self,
		reservation_id: i32,
		status: CredentialStatus,
	) -> NewCredential {
		NewCredential {
			reservation_id,
			generated_at: self.generated_at,
			expires_at: self.expires_at,
			code: self.code,
			status,
			control_id: self.control_id,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialRequest {
	pub generated_at: Option<NaiveDateTime>,
	pub expires_at:   Option<NaiveDateTime>,
	#[validate(length(
		min = 1,
		max = 128,
		message = "code must be between 1 and 128 characters long",
		code = "code-length"
	))]
	pub code:         Option<String>,
	pub status:       Option<String>,
	pub control_id:   Option<i32>,
}

impl UpdateCredentialRequest {
	#[must_use]
	pub fn to_changeset(
		self,
		status: Option<CredentialStatus>,
	) -> CredentialUpdate {
		CredentialUpdate {
			generated_at: self.generated_at,
			expires_at: self.expires_at,
			code: self.code,
			status,
			control_id: self.control_id,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct RedeemCredentialRequest {
	#[validate(length(
		min = 1,
		max = 128,
		message = "code must be between 1 and 128 characters long",
		code = "code-length"
	))]
	pub code: String,
}
