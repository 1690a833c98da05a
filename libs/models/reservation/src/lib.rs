#[macro_use]
extern crate tracing;

use chrono::{NaiveDate, NaiveTime};
use common::{DbConn, Error};
use db::{
	ReservationStatus,
	client,
	court,
	credential,
	discipline,
	reservation,
	time_block,
};
use diesel::prelude::*;
use models_common::{
	ensure_client,
	ensure_discipline,
	lock_court,
	lock_reservation,
};
use primitive_client::PrimitiveClient;
use primitive_court::PrimitiveCourt;
use primitive_credential::PrimitiveCredential;
use primitive_discipline::PrimitiveDiscipline;
use primitive_reservation::{
	PrimitiveReservation,
	check_amounts,
	check_transition,
};
use primitive_time_block::PrimitiveTimeBlock;
use serde::{Deserialize, Serialize};
use ::time_block::{TimeSpan, ensure_free, occupied_spans};

pub type JoinedReservationData = (
	PrimitiveReservation,
	PrimitiveClient,
	PrimitiveCourt,
	PrimitiveDiscipline,
);

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reservation {
	pub reservation: PrimitiveReservation,
	pub client:      PrimitiveClient,
	pub court:       PrimitiveCourt,
	pub discipline:  PrimitiveDiscipline,
	pub time_blocks: Vec<PrimitiveTimeBlock>,
}

impl Reservation {
	/// Load a full [`Reservation`] on an open connection
	fn load(r_id: i32, conn: &mut PgConnection) -> Result<Self, Error> {
		let (reservation, client, court, discipline) = reservation::table
			.inner_join(client::table)
			.inner_join(court::table)
			.inner_join(discipline::table)
			.filter(reservation::id.eq(r_id))
			.select((
				PrimitiveReservation::as_select(),
				PrimitiveClient::as_select(),
				PrimitiveCourt::as_select(),
				PrimitiveDiscipline::as_select(),
			))
			.first::<JoinedReservationData>(conn)
			.optional()?
			.ok_or_else(|| {
				Error::NotFound(format!("reservation with id {r_id}"))
			})?;

		let time_blocks = time_block::table
			.filter(time_block::reservation_id.eq(r_id))
			.order((time_block::position.asc(), time_block::id.asc()))
			.select(PrimitiveTimeBlock::as_select())
			.load(conn)?;

		Ok(Self { reservation, client, court, discipline, time_blocks })
	}

	/// Get a [`Reservation`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let reservation =
			conn.interact(move |conn| Self::load(r_id, conn)).await??;

		Ok(reservation)
	}

	/// Delete a [`Reservation`] together with its credential
	///
	/// Time blocks are removed by the cascading foreign key. The deleted
	/// credential is returned so its artifact can be cleaned up afterwards.
	#[instrument(skip(conn))]
	pub async fn delete_by_id(
		r_id: i32,
		conn: &DbConn,
	) -> Result<DeletedReservation, Error> {
		let deleted = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					lock_reservation(r_id, conn)?;

					let credential = diesel::delete(
						credential::table
							.filter(credential::reservation_id.eq(r_id)),
					)
					.returning(PrimitiveCredential::as_returning())
					.get_result(conn)
					.optional()?;

					let reservation =
						diesel::delete(reservation::table.find(r_id))
							.returning(PrimitiveReservation::as_returning())
							.get_result(conn)?;

					Ok(DeletedReservation { reservation, credential })
				})
			})
			.await??;

		info!("deleted reservation with id {r_id}");

		Ok(deleted)
	}
}

/// What was removed by [`Reservation::delete_by_id`]
#[derive(Clone, Debug)]
pub struct DeletedReservation {
	pub reservation: PrimitiveReservation,
	pub credential:  Option<PrimitiveCredential>,
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = reservation)]
pub struct NewReservation {
	pub date:                NaiveDate,
	pub cupo:                i32,
	pub total_amount:        i64,
	pub outstanding_balance: i64,
	pub status:              ReservationStatus,
	pub client_id:           i32,
	pub court_id:            i32,
	pub discipline_id:       i32,
}

impl NewReservation {
	/// Insert this [`NewReservation`]
	///
	/// The client, court and discipline are checked in that order before the
	/// occupancy and amounts, the court stays locked until the insert is done
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Reservation, Error> {
		let reservation = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					ensure_client(self.client_id, conn)?;

					let court = lock_court(self.court_id, conn)?;
					court.ensure_available()?;

					ensure_discipline(self.discipline_id, conn)?;

					court.ensure_fits(self.cupo)?;
					check_amounts(self.total_amount, self.outstanding_balance)?;

					let r_id = diesel::insert_into(reservation::table)
						.values(&self)
						.returning(reservation::id)
						.get_result::<i32>(conn)?;

					Reservation::load(r_id, conn)
				})
			})
			.await??;

		info!("created reservation {reservation:?}");

		Ok(reservation)
	}
}

/// A merge patch for a reservation, absent fields are left untouched
#[derive(AsChangeset, Clone, Debug, Default, Deserialize, Serialize)]
#[diesel(table_name = reservation)]
pub struct ReservationUpdate {
	pub date:                Option<NaiveDate>,
	pub cupo:                Option<i32>,
	pub total_amount:        Option<i64>,
	pub outstanding_balance: Option<i64>,
	pub status:              Option<ReservationStatus>,
	pub client_id:           Option<i32>,
	pub court_id:            Option<i32>,
	pub discipline_id:       Option<i32>,
}

impl ReservationUpdate {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.date.is_none()
			&& self.cupo.is_none()
			&& self.total_amount.is_none()
			&& self.outstanding_balance.is_none()
			&& self.status.is_none()
			&& self.client_id.is_none()
			&& self.court_id.is_none()
			&& self.discipline_id.is_none()
	}

	/// Whether this update can change what is rendered into a credential or
	/// whether a credential may be rendered at all
	#[must_use]
	pub fn touches_credential(&self) -> bool {
		self.date.is_some()
			|| self.cupo.is_some()
			|| self.outstanding_balance.is_some()
			|| self.client_id.is_some()
			|| self.court_id.is_some()
			|| self.discipline_id.is_some()
	}

	/// Apply this update to the [`Reservation`] with the given id
	///
	/// Moving a reservation to another court or date moves its time blocks
	/// along, which fails if they collide with blocks booked there
	#[instrument(skip(conn))]
	pub async fn apply_to(
		self,
		r_id: i32,
		conn: &DbConn,
	) -> Result<Reservation, Error> {
		let reservation = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let current = lock_reservation(r_id, conn)?;

					if let Some(status) = self.status {
						check_transition(current.status, status)?;
					}

					if let Some(c_id) = self.client_id {
						ensure_client(c_id, conn)?;
					}

					let court_id = self.court_id.unwrap_or(current.court_id);
					let date = self.date.unwrap_or(current.date);

					let moves_court = court_id != current.court_id;
					let moves_date = date != current.date;

					let court = if moves_court || moves_date || self.cupo.is_some()
					{
						Some(lock_court(court_id, conn)?)
					} else {
						None
					};

					if let Some(court) = court.as_ref().filter(|_| moves_court) {
						court.ensure_available()?;
					}

					if let Some(d_id) = self.discipline_id {
						ensure_discipline(d_id, conn)?;
					}

					let refits = moves_court || self.cupo.is_some();

					if let Some(court) = court.as_ref().filter(|_| refits) {
						court.ensure_fits(self.cupo.unwrap_or(current.cupo))?;
					}

					if self.total_amount.is_some()
						|| self.outstanding_balance.is_some()
					{
						check_amounts(
							self.total_amount.unwrap_or(current.total_amount),
							self.outstanding_balance
								.unwrap_or(current.outstanding_balance),
						)?;
					}

					if moves_court || moves_date {
						move_time_blocks(r_id, court_id, date, conn)?;
					}

					if !self.is_empty() {
						diesel::update(reservation::table.find(r_id))
							.set(&self)
							.execute(conn)?;
					}

					Reservation::load(r_id, conn)
				})
			})
			.await??;

		info!("updated reservation {reservation:?}");

		Ok(reservation)
	}
}

/// Move the time blocks of a reservation to another court and/or day
fn move_time_blocks(
	r_id: i32,
	c_id: i32,
	day: NaiveDate,
	conn: &mut PgConnection,
) -> Result<(), Error> {
	let spans: Vec<TimeSpan> = time_block::table
		.filter(time_block::reservation_id.eq(r_id))
		.select((time_block::start_time, time_block::end_time))
		.load::<(NaiveTime, NaiveTime)>(conn)?
		.into_iter()
		.map(|(start, end)| TimeSpan { start, end })
		.collect();

	if spans.is_empty() {
		return Ok(());
	}

	let occupied = occupied_spans(c_id, day, Some(r_id), conn)?;
	ensure_free(&spans, &occupied)?;

	diesel::update(
		time_block::table.filter(time_block::reservation_id.eq(r_id)),
	)
	.set(time_block::date.eq(day))
	.execute(conn)?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use db::ReservationStatus;

	use super::ReservationUpdate;

	#[test]
	fn empty_patch_is_detected() {
		assert!(ReservationUpdate::default().is_empty());

		let patch = ReservationUpdate {
			status: Some(ReservationStatus::Paid),
			..Default::default()
		};

		assert!(!patch.is_empty());
	}

	#[test]
	fn status_only_patch_leaves_credential_alone() {
		let patch = ReservationUpdate {
			status: Some(ReservationStatus::Cancelled),
			..Default::default()
		};

		assert!(!patch.touches_credential());

		let patch =
			ReservationUpdate { outstanding_balance: Some(0), ..Default::default() };

		assert!(patch.touches_credential());
	}
}
