//! Caller identity forwarded by the gateway

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::{Error, IdentityError, InternalServerError};

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const CONTROL_ID_HEADER: &str = "x-control-id";

/// The authenticated caller of a request
///
/// ```rs
/// pub async fn foo_route(identity: Identity) -> impl IntoResponse {
///     println!("{:?}", identity.client_id);
///
///     ()
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
	pub client_id:  Option<i32>,
	pub control_id: Option<i32>,
}

fn parse_id(headers: &HeaderMap, name: &str) -> Result<Option<i32>, Error> {
	let Some(value) = headers.get(name) else {
		return Ok(None);
	};

	let id = value
		.to_str()
		.ok()
		.and_then(|v| v.trim().parse::<i32>().ok())
		.ok_or_else(|| IdentityError::MalformedHeader(name.to_string()))?;

	Ok(Some(id))
}

impl Identity {
	/// Read an [`Identity`] from the trusted identity headers
	///
	/// Returns `None` if neither a client nor a control id is present
	pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, Error> {
		let client_id = parse_id(headers, CLIENT_ID_HEADER)?;
		let control_id = parse_id(headers, CONTROL_ID_HEADER)?;

		if client_id.is_none() && control_id.is_none() {
			return Ok(None);
		}

		Ok(Some(Self { client_id, control_id }))
	}

	/// Fail with [`Error::Forbidden`] unless the caller is the given client
	pub fn ensure_client(&self, c_id: i32) -> Result<(), Error> {
		if self.client_id != Some(c_id) {
			return Err(Error::Forbidden);
		}

		Ok(())
	}

	/// Get the control id of the caller
	pub fn require_control(&self) -> Result<i32, Error> {
		self.control_id.ok_or(Error::Forbidden)
	}
}

impl<S> FromRequestParts<S> for Identity
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Identity>()
			.cloned()
			.ok_or_else(|| InternalServerError::IdentityWithoutLayerError.into())
	}
}
