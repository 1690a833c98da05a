#[macro_use]
extern crate tracing;

use chrono::{NaiveDate, NaiveDateTime};
use common::{DbConn, Error, ReservationError};
use db::{ReservationStatus, reservation};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = reservation)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveReservation {
	pub id:                  i32,
	pub date:                NaiveDate,
	pub cupo:                i32,
	pub total_amount:        i64,
	pub outstanding_balance: i64,
	pub status:              ReservationStatus,
	pub client_id:           i32,
	pub court_id:            i32,
	pub discipline_id:       i32,
	pub created_at:          NaiveDateTime,
	pub updated_at:          NaiveDateTime,
}

impl PrimitiveReservation {
	/// Get a [`PrimitiveReservation`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let reservation = conn
			.interact(move |conn| {
				use self::reservation::dsl::*;

				reservation
					.find(r_id)
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| {
				Error::NotFound(format!("reservation with id {r_id}"))
			})?;

		Ok(reservation)
	}

	/// Whether nothing is left to pay on this reservation
	#[must_use]
	pub fn is_paid_off(&self) -> bool { self.outstanding_balance == 0 }
}

/// Check the monetary invariants of a reservation
///
/// `total` must be positive and `balance` must lie in `0..=total`
pub fn check_amounts(total: i64, balance: i64) -> Result<(), Error> {
	if total <= 0 {
		return Err(ReservationError::NonPositiveTotal(total).into());
	}

	if !(0..=total).contains(&balance) {
		return Err(
			ReservationError::BalanceOutOfRange { balance, total }.into()
		);
	}

	Ok(())
}

/// Check whether a reservation may move from `from` to `to`
pub fn check_transition(
	from: ReservationStatus,
	to: ReservationStatus,
) -> Result<(), Error> {
	if !from.can_transition_to(to) {
		return Err(ReservationError::InvalidTransition {
			from: from.to_string(),
			to:   to.to_string(),
		}
		.into());
	}

	Ok(())
}
