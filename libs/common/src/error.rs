//! Library-wide error types and [`From`] impls

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Missing or malformed identity claims
	#[error(transparent)]
	IdentityError(#[from] IdentityError),
	/// Any error related to creating or updating a reservation
	#[error(transparent)]
	ReservationError(#[from] ReservationError),
	/// Any error related to allocating time blocks
	#[error(transparent)]
	TimeBlockError(#[from] TimeBlockError),
	/// Any error related to issuing or using a credential
	#[error(transparent)]
	CredentialError(#[from] CredentialError),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever increase,
	/// an error code should never be reused once its assigned to avoid
	/// unexpectedly breaking the frontend
	fn code(&self) -> i32 {
		match self {
			Self::Forbidden => 2,
			Self::InternalServerError => 4,
			Self::NotFound(_) => 5,
			Self::ValidationError(_) => 6,
			Self::IdentityError(e) => {
				match e {
					IdentityError::MissingIdentity => 7,
					IdentityError::MalformedHeader(_) => 8,
				}
			},
			Self::ReservationError(e) => {
				match e {
					ReservationError::CourtUnavailable { .. } => 9,
					ReservationError::CapacityExceeded { .. } => 10,
					ReservationError::NonPositiveTotal(_) => 11,
					ReservationError::BalanceOutOfRange { .. } => 12,
					ReservationError::InvalidTransition { .. } => 13,
				}
			},
			Self::TimeBlockError(e) => {
				match e {
					TimeBlockError::Empty => 14,
					TimeBlockError::Malformed(_) => 15,
					TimeBlockError::EmptyRange { .. } => 16,
					TimeBlockError::Overlapping { .. } => 17,
					TimeBlockError::DateMismatch { .. } => 18,
					TimeBlockError::SlotTaken { .. } => 19,
				}
			},
			Self::CredentialError(e) => {
				match e {
					CredentialError::AlreadyIssued => 20,
					CredentialError::CodeInUse => 21,
					CredentialError::OutstandingBalance(_) => 22,
					CredentialError::InvalidValidity { .. } => 23,
					CredentialError::NotActive(_) => 24,
					CredentialError::Expired(_) => 25,
				}
			},
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::NotFound(m)
			| Self::ValidationError(m)
			| Self::IdentityError(IdentityError::MalformedHeader(m))
			| Self::TimeBlockError(TimeBlockError::Malformed(m))
			| Self::CredentialError(CredentialError::NotActive(m)) => {
				Some(m.to_owned())
			},
			Self::ReservationError(e) => {
				match e {
					ReservationError::CourtUnavailable { court_id, status } => {
						Some(
							serde_json::json!({
								"courtId": court_id,
								"status": status,
							})
							.to_string(),
						)
					},
					ReservationError::CapacityExceeded { cupo, capacity } => {
						Some(
							serde_json::json!({
								"cupo": cupo,
								"capacity": capacity,
							})
							.to_string(),
						)
					},
					ReservationError::NonPositiveTotal(total) => {
						Some(serde_json::json!({"total": total}).to_string())
					},
					ReservationError::BalanceOutOfRange { balance, total } => {
						Some(
							serde_json::json!({
								"balance": balance,
								"total": total,
							})
							.to_string(),
						)
					},
					ReservationError::InvalidTransition { from, to } => {
						Some(
							serde_json::json!({"from": from, "to": to})
								.to_string(),
						)
					},
				}
			},
			Self::TimeBlockError(e) => {
				match e {
					TimeBlockError::EmptyRange { start, end }
					| TimeBlockError::SlotTaken { start, end } => {
						Some(
							serde_json::json!({"start": start, "end": end})
								.to_string(),
						)
					},
					TimeBlockError::Overlapping { first, second } => {
						Some(
							serde_json::json!({"blocks": [first, second]})
								.to_string(),
						)
					},
					TimeBlockError::DateMismatch { expected } => {
						Some(serde_json::json!({"date": expected}).to_string())
					},
					_ => None,
				}
			},
			Self::CredentialError(e) => {
				match e {
					CredentialError::OutstandingBalance(balance) => {
						Some(serde_json::json!({"balance": balance}).to_string())
					},
					CredentialError::InvalidValidity {
						generated_at,
						expires_at,
					} => {
						Some(
							serde_json::json!({
								"generatedAt": generated_at,
								"expiresAt": expires_at,
							})
							.to_string(),
						)
					},
					CredentialError::Expired(at) => {
						Some(serde_json::json!({"expiredAt": at}).to_string())
					},
					_ => None,
				}
			},
			_ => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		debug!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match self {
			Self::ReservationError(
				ReservationError::CourtUnavailable { .. }
				| ReservationError::InvalidTransition { .. },
			)
			| Self::TimeBlockError(TimeBlockError::SlotTaken { .. }) => {
				StatusCode::CONFLICT
			},
			Self::CredentialError(CredentialError::InvalidValidity {
				..
			}) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::CredentialError(_) => StatusCode::CONFLICT,
			Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
			Self::IdentityError(IdentityError::MissingIdentity) => {
				StatusCode::UNAUTHORIZED
			},
			Self::IdentityError(IdentityError::MalformedHeader(_)) => {
				StatusCode::BAD_REQUEST
			},
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::ValidationError(_)
			| Self::ReservationError(_)
			| Self::TimeBlockError(_) => StatusCode::UNPROCESSABLE_ENTITY,
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Any error related to the identity claims forwarded by the gateway
#[derive(Debug, Error)]
pub enum IdentityError {
	#[error("missing identity")]
	MissingIdentity,
	#[error("malformed identity header")]
	MalformedHeader(String),
}

/// Any error related to creating or updating a reservation
#[derive(Debug, Error)]
pub enum ReservationError {
	/// The court can not be booked in its current state
	#[error("court is not available for reservations")]
	CourtUnavailable { court_id: i32, status: String },
	/// The requested occupancy does not fit the court
	#[error("cupo must be between 1 and the court capacity")]
	CapacityExceeded { cupo: i32, capacity: i32 },
	/// The total amount due must be strictly positive
	#[error("total amount must be greater than zero")]
	NonPositiveTotal(i64),
	/// The outstanding balance must lie between zero and the total amount
	#[error("outstanding balance must be between zero and the total amount")]
	BalanceOutOfRange { balance: i64, total: i64 },
	/// The status change is not allowed from the current status
	#[error("reservation status can not change from {from} to {to}")]
	InvalidTransition { from: String, to: String },
}

/// Any error related to allocating time blocks for a reservation
#[derive(Debug, Error)]
pub enum TimeBlockError {
	#[error("at least one time block is required")]
	Empty,
	/// A time did not match `HH:MM:SS`
	#[error("times must be formatted as HH:MM:SS")]
	Malformed(String),
	#[error("a time block must end after it starts")]
	EmptyRange { start: NaiveTime, end: NaiveTime },
	/// Two blocks in the same request overlap, holds their indices
	#[error("submitted time blocks overlap each other")]
	Overlapping { first: usize, second: usize },
	#[error("time blocks must fall on the reservation date")]
	DateMismatch { expected: NaiveDate },
	/// The block overlaps a block already booked on the same court
	#[error("this slot is already taken")]
	SlotTaken { start: NaiveTime, end: NaiveTime },
}

/// Any error related to issuing, updating, or redeeming a credential
#[derive(Debug, Error)]
pub enum CredentialError {
	#[error("a credential already exists for this reservation")]
	AlreadyIssued,
	#[error("code is already in use")]
	CodeInUse,
	/// The reservation still has money due
	#[error("cannot issue until balance is zero")]
	OutstandingBalance(i64),
	#[error("expiration must be after generation")]
	InvalidValidity { generated_at: NaiveDateTime, expires_at: NaiveDateTime },
	/// Only active credentials can be redeemed, holds the current status
	#[error("credential is not active")]
	NotActive(String),
	#[error("credential has expired")]
	Expired(NaiveDateTime),
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Unknown database constraint violation
	#[error("constraint error -- {0:?}")]
	ConstraintError(String),
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error handling some form of I/O
	#[error("I/O error -- {0:?}")]
	IOError(std::io::Error),
	/// Error encoding an image
	#[error("image error -- {0:?}")]
	ImageError(image_processing::ImageError),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
	/// Error building a QR code from a payload
	#[error("qr error -- {0:?}")]
	QrError(qrcode::types::QrError),
	/// Error related to `serde_json`
	#[error("serde_json error -- {0:?}")]
	SerdeJsonError(serde_json::Error),
	/// Attempted to extract an identity from a request that did not pass the
	/// identity layer
	#[error("attempted to extract identity without the identity layer")]
	IdentityWithoutLayerError,
	/// Failed to parse a url
	#[error("could not parse url -- {0:?}")]
	UrlParseError(url::ParseError),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map a unique constraint name to the conflict it represents
fn unique_violation(constraint_name: &str) -> Option<Error> {
	match constraint_name {
		"credential_reservation_id_key" => {
			Some(CredentialError::AlreadyIssued.into())
		},
		"credential_code_key" => Some(CredentialError::CodeInUse.into()),
		_ => None,
	}
}

/// Map a foreign key or check constraint name to a fixed message
///
/// Raw database messages name tables and columns and never reach the caller
fn constraint_violation(constraint_name: Option<&str>) -> Error {
	let message = match constraint_name {
		Some("reservation_client_id_fkey") => "client does not exist",
		Some("reservation_court_id_fkey") => "court does not exist",
		Some("reservation_discipline_id_fkey") => "discipline does not exist",
		Some("credential_control_id_fkey") => "control does not exist",
		Some(
			"credential_reservation_id_fkey" | "time_block_reservation_id_fkey",
		) => "reservation does not exist",
		Some("reservation_cupo_check") => "cupo must be greater than zero",
		Some("reservation_total_amount_check") => {
			"total amount must be greater than zero"
		},
		Some("reservation_balance_check") => {
			"outstanding balance must be between zero and the total amount"
		},
		Some("time_block_range_check") => "a time block must end after it starts",
		Some("time_block_amount_check") => "amount must not be negative",
		Some("credential_validity_check") => {
			"expiration must be after generation"
		},
		other => {
			warn!("unmapped constraint violation -- {other:?}");

			"request violates a data constraint"
		},
	};

	Error::ValidationError(message.to_string())
}

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				let Some(constraint_name) = info.constraint_name() else {
					return InternalServerError::DatabaseError(err).into();
				};

				match unique_violation(constraint_name) {
					Some(e) => e,
					None => {
						InternalServerError::ConstraintError(
							constraint_name.to_string(),
						)
						.into()
					},
				}
			},
			// Foreign key or check constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::ForeignKeyViolation
				| DatabaseErrorKind::CheckViolation,
				info,
			) => constraint_violation(info.constraint_name()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		InternalServerError::IOError(err).into()
	}
}

impl From<image_processing::ImageError> for Error {
	fn from(value: image_processing::ImageError) -> Self {
		match value {
			image_processing::ImageError::IoError(e) => {
				InternalServerError::IOError(e).into()
			},
			e => InternalServerError::ImageError(e).into(),
		}
	}
}

impl From<qrcode::types::QrError> for Error {
	fn from(value: qrcode::types::QrError) -> Self {
		InternalServerError::QrError(value).into()
	}
}

impl From<serde_json::Error> for Error {
	fn from(value: serde_json::Error) -> Self {
		InternalServerError::SerdeJsonError(value).into()
	}
}

impl From<url::ParseError> for Error {
	fn from(err: url::ParseError) -> Self {
		InternalServerError::UrlParseError(err).into()
	}
}
