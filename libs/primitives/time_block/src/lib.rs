#[macro_use]
extern crate tracing;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::{DbConn, Error};
use db::time_block;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = time_block)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveTimeBlock {
	pub id:             i32,
	pub reservation_id: i32,
	pub date:           NaiveDate,
	pub start_time:     NaiveTime,
	pub end_time:       NaiveTime,
	pub amount:         i64,
	pub position:       i32,
	pub created_at:     NaiveDateTime,
}

impl PrimitiveTimeBlock {
	/// Get all [`PrimitiveTimeBlock`]s of a reservation in insertion order
	#[instrument(skip(conn))]
	pub async fn for_reservation(
		r_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let blocks = conn
			.interact(move |conn| {
				use self::time_block::dsl::*;

				time_block
					.filter(reservation_id.eq(r_id))
					.order((position.asc(), id.asc()))
					.select(Self::as_select())
					.get_results(conn)
			})
			.await??;

		Ok(blocks)
	}
}
