use chrono::{NaiveDate, NaiveTime, TimeDelta};
use common::{DbConn, Error};
use primitive_court::PrimitiveCourt;
use serde::{Deserialize, Serialize};

use crate::{TimeSpan, occupied_spans};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
	Free,
	Occupied,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Slot {
	pub start: NaiveTime,
	pub end:   NaiveTime,
	pub state: SlotState,
}

/// Lay out the slots of a single day
///
/// Occupied spans are returned exactly as booked, the remaining opening hours
/// are tiled with free slots of at most `slot_length`
#[must_use]
pub fn build_availability(
	opens_at: NaiveTime,
	closes_at: NaiveTime,
	slot_length: TimeDelta,
	mut occupied: Vec<TimeSpan>,
) -> Vec<Slot> {
	occupied.sort_by_key(|s| (s.start, s.end));

	let mut slots = vec![];
	let mut cursor = opens_at;

	for span in occupied {
		if span.start > cursor {
			fill_free(&mut slots, cursor, span.start.min(closes_at), slot_length);
		}

		slots.push(Slot {
			start: span.start,
			end:   span.end,
			state: SlotState::Occupied,
		});

		cursor = cursor.max(span.end);
	}

	fill_free(&mut slots, cursor, closes_at, slot_length);

	slots.sort_by_key(|s| (s.start, s.end));

	slots
}

fn fill_free(
	slots: &mut Vec<Slot>,
	mut from: NaiveTime,
	to: NaiveTime,
	slot_length: TimeDelta,
) {
	while from < to {
		let (next, wrapped) = from.overflowing_add_signed(slot_length);

		let end = if wrapped == 0 && next > from && next < to { next } else { to };

		slots.push(Slot { start: from, end, state: SlotState::Free });

		from = end;
	}
}

/// Get the free and occupied slots of a court for a given day
#[instrument(skip(court, conn), fields(court_id = court.id))]
pub async fn court_availability(
	court: &PrimitiveCourt,
	day: NaiveDate,
	slot_length: TimeDelta,
	conn: &DbConn,
) -> Result<Vec<Slot>, Error> {
	let c_id = court.id;

	let occupied = conn
		.interact(move |conn| occupied_spans(c_id, day, None, conn))
		.await??;

	let slots =
		build_availability(court.opens_at, court.closes_at, slot_length, occupied);

	Ok(slots)
}
