//! Row guards shared by the models
//!
//! Every function here runs on a raw connection so it can be composed inside
//! a single transaction. The `lock_*` functions take a `FOR UPDATE` row lock
//! that is held until the surrounding transaction ends.

use common::Error;
use db::{client, control, court, discipline, reservation};
use diesel::prelude::*;
use primitive_court::PrimitiveCourt;
use primitive_reservation::PrimitiveReservation;

/// Fail with [`Error::NotFound`] unless a client with this id exists
pub fn ensure_client(c_id: i32, conn: &mut PgConnection) -> Result<(), Error> {
	let exists = diesel::select(diesel::dsl::exists(client::table.find(c_id)))
		.get_result::<bool>(conn)?;

	if !exists {
		return Err(Error::NotFound(format!("client with id {c_id}")));
	}

	Ok(())
}

/// Fail with [`Error::NotFound`] unless a discipline with this id exists
pub fn ensure_discipline(
	d_id: i32,
	conn: &mut PgConnection,
) -> Result<(), Error> {
	let exists =
		diesel::select(diesel::dsl::exists(discipline::table.find(d_id)))
			.get_result::<bool>(conn)?;

	if !exists {
		return Err(Error::NotFound(format!("discipline with id {d_id}")));
	}

	Ok(())
}

/// Fail with [`Error::NotFound`] unless a control with this id exists
pub fn ensure_control(c_id: i32, conn: &mut PgConnection) -> Result<(), Error> {
	let exists = diesel::select(diesel::dsl::exists(control::table.find(c_id)))
		.get_result::<bool>(conn)?;

	if !exists {
		return Err(Error::NotFound(format!("control with id {c_id}")));
	}

	Ok(())
}

/// Lock a court row for the rest of the transaction
pub fn lock_court(
	c_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveCourt, Error> {
	court::table
		.find(c_id)
		.select(PrimitiveCourt::as_select())
		.for_update()
		.first(conn)
		.optional()?
		.ok_or_else(|| Error::NotFound(format!("court with id {c_id}")))
}

/// Lock a reservation row for the rest of the transaction
pub fn lock_reservation(
	r_id: i32,
	conn: &mut PgConnection,
) -> Result<PrimitiveReservation, Error> {
	reservation::table
		.find(r_id)
		.select(PrimitiveReservation::as_select())
		.for_update()
		.first(conn)
		.optional()?
		.ok_or_else(|| Error::NotFound(format!("reservation with id {r_id}")))
}
