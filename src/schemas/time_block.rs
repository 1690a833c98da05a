use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use common::{Error, TimeBlockError};
use primitive_time_block::PrimitiveTimeBlock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time_block::TimeSpan;
use validator::Validate;
use validator_derive::Validate;

static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d$").unwrap()
});

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlockResponse {
	pub id:             i32,
	pub reservation_id: i32,
	pub date:           NaiveDate,
	pub start:          NaiveTime,
	pub end:            NaiveTime,
	pub amount:         i64,
	pub position:       i32,
}

impl From<PrimitiveTimeBlock> for TimeBlockResponse {
	fn from(value: PrimitiveTimeBlock) -> Self {
		Self {
			id:             value.id,
			reservation_id: value.reservation_id,
			date:           value.date,
			start:          value.start_time,
			end:            value.end_time,
			amount:         value.amount,
			position:       value.position,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct TimeBlockRequest {
	#[validate(regex(
		path = *TIME_REGEX,
		message = "start must be formatted as HH:MM:SS",
		code = "start-format"
	))]
	pub start: String,
	#[validate(regex(
		path = *TIME_REGEX,
		message = "end must be formatted as HH:MM:SS",
		code = "end-format"
	))]
	pub end:   String,
}

impl TimeBlockRequest {
	/// Validate the format of this block and parse it into a [`TimeSpan`]
	pub fn to_span(&self) -> Result<TimeSpan, Error> {
		self.validate().map_err(|e| {
			match Error::from(e) {
				Error::ValidationError(m) => TimeBlockError::Malformed(m).into(),
				e => e,
			}
		})?;

		let parse = |t: &str| {
			NaiveTime::parse_from_str(t, "%H:%M:%S")
				.map_err(|e| Error::from(TimeBlockError::Malformed(e.to_string())))
		};

		Ok(TimeSpan { start: parse(&self.start)?, end: parse(&self.end)? })
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateTimeBlocksRequest {
	pub date:   NaiveDate,
	pub blocks: Vec<TimeBlockRequest>,
}

impl CreateTimeBlocksRequest {
	/// Parse every block in request order
	pub fn to_spans(&self) -> Result<Vec<TimeSpan>, Error> {
		self.blocks.iter().map(TimeBlockRequest::to_span).collect()
	}
}
