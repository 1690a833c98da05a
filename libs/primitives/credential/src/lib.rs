#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{CredentialStatus, credential};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = credential)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveCredential {
	pub id:             i32,
	pub reservation_id: i32,
	pub generated_at:   NaiveDateTime,
	pub expires_at:     NaiveDateTime,
	pub file_path:      Option<String>,
	pub code:           String,
	pub status:         CredentialStatus,
	pub control_id:     Option<i32>,
	pub created_at:     NaiveDateTime,
	pub updated_at:     NaiveDateTime,
}

impl PrimitiveCredential {
	/// Get the [`PrimitiveCredential`] bound to a reservation, if any
	#[instrument(skip(conn))]
	pub async fn for_reservation(
		r_id: i32,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let credential = conn
			.interact(move |conn| {
				use self::credential::dsl::*;

				credential
					.filter(reservation_id.eq(r_id))
					.select(Self::as_select())
					.first(conn)
					.optional()
			})
			.await??;

		Ok(credential)
	}
}
