#[macro_use]
extern crate tracing;

use chrono::{NaiveDate, NaiveTime};
use common::{DbConn, Error, TimeBlockError};
use db::{reservation, time_block};
use diesel::prelude::*;
use models_common::{lock_court, lock_reservation};
use primitive_time_block::PrimitiveTimeBlock;
use serde::{Deserialize, Serialize};

mod availability;

pub use availability::*;

/// A half open `[start, end)` interval within a single day
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct TimeSpan {
	pub start: NaiveTime,
	pub end:   NaiveTime,
}

impl TimeSpan {
	#[must_use]
	pub fn overlaps(&self, other: &Self) -> bool {
		self.start < other.end && other.start < self.end
	}
}

impl From<&PrimitiveTimeBlock> for TimeSpan {
	fn from(value: &PrimitiveTimeBlock) -> Self {
		Self { start: value.start_time, end: value.end_time }
	}
}

/// Check a batch of spans submitted together
///
/// The batch may not be empty, every span must end after it starts and no
/// two spans may overlap
pub fn check_spans(spans: &[TimeSpan]) -> Result<(), Error> {
	if spans.is_empty() {
		return Err(TimeBlockError::Empty.into());
	}

	for span in spans {
		if span.start >= span.end {
			return Err(TimeBlockError::EmptyRange {
				start: span.start,
				end:   span.end,
			}
			.into());
		}
	}

	for (first, a) in spans.iter().enumerate() {
		for (offset, b) in spans[first + 1..].iter().enumerate() {
			if a.overlaps(b) {
				let second = first + 1 + offset;

				return Err(TimeBlockError::Overlapping { first, second }.into());
			}
		}
	}

	Ok(())
}

/// Fail with [`TimeBlockError::SlotTaken`] if any span overlaps an occupied
/// one
pub fn ensure_free(
	spans: &[TimeSpan],
	occupied: &[TimeSpan],
) -> Result<(), Error> {
	for span in spans {
		if let Some(taken) = occupied.iter().find(|o| o.overlaps(span)) {
			return Err(TimeBlockError::SlotTaken {
				start: taken.start,
				end:   taken.end,
			}
			.into());
		}
	}

	Ok(())
}

/// Split `total` equally over `count` parts, the remainder goes to the last
/// part
#[must_use]
pub fn split_amount(total: i64, count: usize) -> Vec<i64> {
	if count == 0 {
		return vec![];
	}

	#[allow(clippy::cast_possible_wrap)]
	let parts = count as i64;
	let share = total / parts;
	let remainder = total % parts;

	let mut amounts = vec![share; count];

	if let Some(last) = amounts.last_mut() {
		*last += remainder;
	}

	amounts
}

/// Get the spans of every time block booked on a court for a given day
///
/// Blocks belonging to `exclude` are left out
pub fn occupied_spans(
	c_id: i32,
	day: NaiveDate,
	exclude: Option<i32>,
	conn: &mut PgConnection,
) -> QueryResult<Vec<TimeSpan>> {
	let mut query = time_block::table
		.inner_join(reservation::table)
		.filter(reservation::court_id.eq(c_id))
		.filter(time_block::date.eq(day))
		.select((time_block::start_time, time_block::end_time))
		.order((time_block::start_time.asc(), time_block::end_time.asc()))
		.into_boxed();

	if let Some(r_id) = exclude {
		query = query.filter(reservation::id.ne(r_id));
	}

	let spans = query
		.load::<(NaiveTime, NaiveTime)>(conn)?
		.into_iter()
		.map(|(start, end)| TimeSpan { start, end })
		.collect();

	Ok(spans)
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = time_block)]
struct InsertableTimeBlock {
	reservation_id: i32,
	date:           NaiveDate,
	start_time:     NaiveTime,
	end_time:       NaiveTime,
	amount:         i64,
	position:       i32,
}

/// A batch of time blocks to be booked for a single reservation
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTimeBlocks {
	pub reservation_id: i32,
	pub date:           NaiveDate,
	pub spans:          Vec<TimeSpan>,
}

impl NewTimeBlocks {
	/// Insert this batch of [`NewTimeBlocks`]
	///
	/// The court of the reservation stays locked until the blocks are
	/// inserted so two batches for the same court can never both claim a
	/// slot
	#[instrument(skip(conn))]
	pub async fn insert(
		self,
		conn: &DbConn,
	) -> Result<Vec<PrimitiveTimeBlock>, Error> {
		check_spans(&self.spans)?;

		let r_id = self.reservation_id;

		let mut blocks = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let reservation =
						lock_reservation(self.reservation_id, conn)?;

					if reservation.date != self.date {
						return Err(TimeBlockError::DateMismatch {
							expected: reservation.date,
						}
						.into());
					}

					lock_court(reservation.court_id, conn)?;

					let occupied = occupied_spans(
						reservation.court_id,
						self.date,
						None,
						conn,
					)?;

					ensure_free(&self.spans, &occupied)?;

					let existing: i64 = time_block::table
						.filter(time_block::reservation_id.eq(reservation.id))
						.count()
						.get_result(conn)?;

					#[allow(clippy::cast_possible_truncation)]
					let first_position = existing as i32;

					let amounts = split_amount(
						reservation.total_amount,
						self.spans.len(),
					);

					let rows: Vec<InsertableTimeBlock> = self
						.spans
						.iter()
						.zip(amounts)
						.zip(first_position..)
						.map(|((span, amount), position)| {
							InsertableTimeBlock {
								reservation_id: reservation.id,
								date: self.date,
								start_time: span.start,
								end_time: span.end,
								amount,
								position,
							}
						})
						.collect();

					let blocks = diesel::insert_into(time_block::table)
						.values(&rows)
						.returning(PrimitiveTimeBlock::as_returning())
						.get_results::<PrimitiveTimeBlock>(conn)?;

					Ok(blocks)
				})
			})
			.await??;

		blocks.sort_by_key(|b: &PrimitiveTimeBlock| b.position);

		info!("created {} time blocks for reservation {r_id}", blocks.len());

		Ok(blocks)
	}
}
