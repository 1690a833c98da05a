#[macro_use]
extern crate tracing;

use chrono::{NaiveDateTime, NaiveTime};
use common::{DbConn, Error, ReservationError};
use db::{CourtStatus, court};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = court)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveCourt {
	pub id:         i32,
	pub venue_id:   i32,
	pub name:       String,
	pub capacity:   i32,
	pub status:     CourtStatus,
	pub opens_at:   NaiveTime,
	pub closes_at:  NaiveTime,
	pub created_at: NaiveDateTime,
	pub updated_at: NaiveDateTime,
}

impl PrimitiveCourt {
	/// Get a [`PrimitiveCourt`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(c_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let court = conn
			.interact(move |conn| {
				use self::court::dsl::*;

				court
					.find(c_id)
					.select(Self::as_select())
					.first(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| {
				Error::NotFound(format!("court with id {c_id}"))
			})?;

		Ok(court)
	}

	/// Fail unless new reservations can be made on this court
	pub fn ensure_available(&self) -> Result<(), Error> {
		if self.status != CourtStatus::Available {
			return Err(ReservationError::CourtUnavailable {
				court_id: self.id,
				status:   self.status.to_string(),
			}
			.into());
		}

		Ok(())
	}

	/// Fail unless `cupo` people fit on this court
	pub fn ensure_fits(&self, cupo: i32) -> Result<(), Error> {
		if cupo <= 0 || cupo > self.capacity {
			return Err(ReservationError::CapacityExceeded {
				cupo,
				capacity: self.capacity,
			}
			.into());
		}

		Ok(())
	}
}
