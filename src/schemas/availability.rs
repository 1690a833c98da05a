use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use time_block::Slot;

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct AvailabilityQuery {
	pub date: NaiveDate,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
	pub court_id: i32,
	pub date:     NaiveDate,
	pub slots:    Vec<Slot>,
}
