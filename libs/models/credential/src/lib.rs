#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{CredentialError, DbConn, Error};
use db::{
	CredentialStatus,
	client,
	court,
	credential,
	discipline,
	reservation,
	time_block,
};
use diesel::prelude::*;
use models_common::{ensure_control, lock_reservation};
use primitive_client::PrimitiveClient;
use primitive_court::PrimitiveCourt;
use primitive_credential::PrimitiveCredential;
use primitive_discipline::PrimitiveDiscipline;
use primitive_reservation::PrimitiveReservation;
use primitive_time_block::PrimitiveTimeBlock;
use serde::{Deserialize, Serialize};

mod payload;

pub use payload::*;

pub type JoinedCredentialData = (
	PrimitiveCredential,
	PrimitiveReservation,
	PrimitiveClient,
	PrimitiveCourt,
	PrimitiveDiscipline,
);

/// A credential together with everything rendered into its QR code
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Credential {
	pub credential:  PrimitiveCredential,
	pub reservation: PrimitiveReservation,
	pub client:      PrimitiveClient,
	pub court:       PrimitiveCourt,
	pub discipline:  PrimitiveDiscipline,
	pub time_blocks: Vec<PrimitiveTimeBlock>,
}

/// Fail unless a credential expires strictly after it was generated
pub fn check_validity(
	generated_at: NaiveDateTime,
	expires_at: NaiveDateTime,
) -> Result<(), Error> {
	if expires_at <= generated_at {
		return Err(
			CredentialError::InvalidValidity { generated_at, expires_at }.into()
		);
	}

	Ok(())
}

/// Fail if `code` is held by any credential other than `exclude`
fn ensure_code_unused(
	new_code: &str,
	exclude: Option<i32>,
	conn: &mut PgConnection,
) -> Result<(), Error> {
	let mut query = credential::table
		.filter(credential::code.eq(new_code))
		.select(credential::id)
		.into_boxed();

	if let Some(c_id) = exclude {
		query = query.filter(credential::id.ne(c_id));
	}

	if query.first::<i32>(conn).optional()?.is_some() {
		return Err(CredentialError::CodeInUse.into());
	}

	Ok(())
}

impl Credential {
	/// Load a full [`Credential`] on an open connection
	fn load(c_id: i32, conn: &mut PgConnection) -> Result<Self, Error> {
		let (credential, reservation, client, court, discipline) =
			credential::table
				.inner_join(reservation::table)
				.inner_join(
					client::table.on(reservation::client_id.eq(client::id)),
				)
				.inner_join(court::table.on(reservation::court_id.eq(court::id)))
				.inner_join(
					discipline::table
						.on(reservation::discipline_id.eq(discipline::id)),
				)
				.filter(credential::id.eq(c_id))
				.select((
					PrimitiveCredential::as_select(),
					PrimitiveReservation::as_select(),
					PrimitiveClient::as_select(),
					PrimitiveCourt::as_select(),
					PrimitiveDiscipline::as_select(),
				))
				.first::<JoinedCredentialData>(conn)
				.optional()?
				.ok_or_else(|| {
					Error::NotFound(format!("credential with id {c_id}"))
				})?;

		let time_blocks = time_block::table
			.filter(time_block::reservation_id.eq(reservation.id))
			.order((time_block::position.asc(), time_block::id.asc()))
			.select(PrimitiveTimeBlock::as_select())
			.load(conn)?;

		Ok(Self {
			credential,
			reservation,
			client,
			court,
			discipline,
			time_blocks,
		})
	}

	/// Get a [`Credential`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(c_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let credential =
			conn.interact(move |conn| Self::load(c_id, conn)).await??;

		Ok(credential)
	}

	/// Store the artifact path of a credential that does not have one yet
	///
	/// Returns `false` if the credential is gone or already has a path
	#[instrument(skip(conn))]
	pub async fn link_artifact(
		c_id: i32,
		path: String,
		conn: &DbConn,
	) -> Result<bool, Error> {
		let count = conn
			.interact(move |conn| {
				use self::credential::dsl::*;

				diesel::update(
					credential.filter(id.eq(c_id)).filter(file_path.is_null()),
				)
				.set(file_path.eq(path))
				.execute(conn)
			})
			.await??;

		if count == 1 {
			info!("linked artifact to credential with id {c_id}");
		}

		Ok(count == 1)
	}

	/// Check whether a credential still exists and points at `path`
	#[instrument(skip(conn))]
	pub async fn is_linked(
		c_id: i32,
		path: String,
		conn: &DbConn,
	) -> Result<bool, Error> {
		let linked = conn
			.interact(move |conn| {
				use self::credential::dsl::*;

				diesel::select(diesel::dsl::exists(
					credential.filter(id.eq(c_id)).filter(file_path.eq(path)),
				))
				.get_result::<bool>(conn)
			})
			.await??;

		Ok(linked)
	}

	/// Delete a [`Credential`] given its id, returning the deleted row
	#[instrument(skip(conn))]
	pub async fn delete_by_id(
		c_id: i32,
		conn: &DbConn,
	) -> Result<PrimitiveCredential, Error> {
		let deleted = conn
			.interact(move |conn| {
				use self::credential::dsl::*;

				diesel::delete(credential.find(c_id))
					.returning(PrimitiveCredential::as_returning())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| {
				Error::NotFound(format!("credential with id {c_id}"))
			})?;

		info!("deleted credential with id {c_id}");

		Ok(deleted)
	}

	/// Redeem an active credential at the point of entry
	#[instrument(skip(conn))]
	pub async fn redeem(
		redeem_code: String,
		ctl_id: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<PrimitiveCredential, Error> {
		let redeemed = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					use self::credential::dsl::*;

					let current = credential
						.filter(code.eq(&redeem_code))
						.select(PrimitiveCredential::as_select())
						.for_update()
						.first(conn)
						.optional()?
						.ok_or_else(|| {
							Error::NotFound("no credential with this code".into())
						})?;

					if current.status != CredentialStatus::Active {
						return Err(CredentialError::NotActive(
							current.status.to_string(),
						)
						.into());
					}

					if current.expires_at <= now {
						return Err(
							CredentialError::Expired(current.expires_at).into()
						);
					}

					ensure_control(ctl_id, conn)?;

					let redeemed = diesel::update(credential.find(current.id))
						.set((
							status.eq(CredentialStatus::Used),
							control_id.eq(Some(ctl_id)),
						))
						.returning(PrimitiveCredential::as_returning())
						.get_result(conn)?;

					Ok(redeemed)
				})
			})
			.await??;

		info!(
			"credential with id {} redeemed by control {ctl_id}",
			redeemed.id
		);

		Ok(redeemed)
	}

	/// Mark every active credential that expired at or before `now` as
	/// expired, returning the number of credentials touched
	#[instrument(skip(conn))]
	pub async fn expire_overdue(
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<usize, Error> {
		let count = conn
			.interact(move |conn| {
				use self::credential::dsl::*;

				diesel::update(
					credential
						.filter(status.eq(CredentialStatus::Active))
						.filter(expires_at.le(now)),
				)
				.set(status.eq(CredentialStatus::Expired))
				.execute(conn)
			})
			.await??;

		if count > 0 {
			info!("expired {count} overdue credentials");
		}

		Ok(count)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = credential)]
pub struct NewCredential {
	pub reservation_id: i32,
	pub generated_at:   NaiveDateTime,
	pub expires_at:     NaiveDateTime,
	pub code:           String,
	pub status:         CredentialStatus,
	pub control_id:     Option<i32>,
}

impl NewCredential {
	/// Insert this [`NewCredential`] without an artifact
	///
	/// The reservation stays locked while it is checked, nothing is written
	/// unless its balance is fully paid
	#[instrument(skip(conn))]
	pub async fn insert(
		self,
		conn: &DbConn,
	) -> Result<PrimitiveCredential, Error> {
		check_validity(self.generated_at, self.expires_at)?;

		let credential = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let reservation =
						lock_reservation(self.reservation_id, conn)?;

					let issued = diesel::select(diesel::dsl::exists(
						credential::table.filter(
							credential::reservation_id.eq(reservation.id),
						),
					))
					.get_result::<bool>(conn)?;

					if issued {
						return Err(CredentialError::AlreadyIssued.into());
					}

					if let Some(ctl_id) = self.control_id {
						ensure_control(ctl_id, conn)?;
					}

					ensure_code_unused(&self.code, None, conn)?;

					if !reservation.is_paid_off() {
						return Err(CredentialError::OutstandingBalance(
							reservation.outstanding_balance,
						)
						.into());
					}

					let credential = diesel::insert_into(credential::table)
						.values(&self)
						.returning(PrimitiveCredential::as_returning())
						.get_result(conn)?;

					Ok(credential)
				})
			})
			.await??;

		info!("issued credential {credential:?}");

		Ok(credential)
	}
}

/// A merge patch for a credential, absent fields are left untouched
#[derive(AsChangeset, Clone, Debug, Default, Deserialize, Serialize)]
#[diesel(table_name = credential)]
pub struct CredentialUpdate {
	pub generated_at: Option<NaiveDateTime>,
	pub expires_at:   Option<NaiveDateTime>,
	pub code:         Option<String>,
	pub status:       Option<CredentialStatus>,
	pub control_id:   Option<i32>,
}

impl CredentialUpdate {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.generated_at.is_none()
			&& self.expires_at.is_none()
			&& self.code.is_none()
			&& self.status.is_none()
			&& self.control_id.is_none()
	}

	/// Apply this update to the credential with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(
		self,
		c_id: i32,
		conn: &DbConn,
	) -> Result<PrimitiveCredential, Error> {
		let credential = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let current = credential::table
						.find(c_id)
						.select(PrimitiveCredential::as_select())
						.for_update()
						.first(conn)
						.optional()?
						.ok_or_else(|| {
							Error::NotFound(format!("credential with id {c_id}"))
						})?;

					check_validity(
						self.generated_at.unwrap_or(current.generated_at),
						self.expires_at.unwrap_or(current.expires_at),
					)?;

					if let Some(ctl_id) = self.control_id {
						ensure_control(ctl_id, conn)?;
					}

					if let Some(new_code) = &self.code {
						ensure_code_unused(new_code, Some(c_id), conn)?;
					}

					if self.is_empty() {
						return Ok(current);
					}

					let credential = diesel::update(credential::table.find(c_id))
						.set(&self)
						.returning(PrimitiveCredential::as_returning())
						.get_result(conn)?;

					Ok(credential)
				})
			})
			.await??;

		info!("updated credential {credential:?}");

		Ok(credential)
	}
}
