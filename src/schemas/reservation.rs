use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use db::{CourtStatus, ReservationStatus};
use primitive_court::PrimitiveCourt;
use reservation::{NewReservation, Reservation, ReservationUpdate};
use serde::{Deserialize, Serialize};

use crate::schemas::time_block::TimeBlockResponse;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
	pub id:                  i32,
	pub date:                NaiveDate,
	pub cupo:                i32,
	pub total_amount:        i64,
	pub outstanding_balance: i64,
	pub status:              ReservationStatus,
	pub client:              ClientResponse,
	pub court:               CourtResponse,
	pub discipline:          DisciplineResponse,
	pub time_blocks:         Vec<TimeBlockResponse>,
	pub created_at:          NaiveDateTime,
	pub updated_at:          NaiveDateTime,
}

impl From<Reservation> for ReservationResponse {
	fn from(value: Reservation) -> Self {
		let reservation = value.reservation;

		Self {
			id:                  reservation.id,
			date:                reservation.date,
			cupo:                reservation.cupo,
			total_amount:        reservation.total_amount,
			outstanding_balance: reservation.outstanding_balance,
			status:              reservation.status,
			client:              ClientResponse {
				id:   value.client.id,
				name: value.client.name,
			},
			court:               value.court.into(),
			discipline:          DisciplineResponse {
				id:   value.discipline.id,
				name: value.discipline.name,
			},
			time_blocks:         value
				.time_blocks
				.into_iter()
				.map(Into::into)
				.collect(),
			created_at:          reservation.created_at,
			updated_at:          reservation.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClientResponse {
	pub id:   i32,
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DisciplineResponse {
	pub id:   i32,
	pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtResponse {
	pub id:        i32,
	pub venue_id:  i32,
	pub name:      String,
	pub capacity:  i32,
	pub status:    CourtStatus,
	pub opens_at:  NaiveTime,
	pub closes_at: NaiveTime,
}

impl From<PrimitiveCourt> for CourtResponse {
	fn from(value: PrimitiveCourt) -> Self {
		Self {
			id:        value.id,
			venue_id:  value.venue_id,
			name:      value.name,
			capacity:  value.capacity,
			status:    value.status,
			opens_at:  value.opens_at,
			closes_at: value.closes_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
	pub date:                NaiveDate,
	pub cupo:                i32,
	pub total_amount:        i64,
	pub outstanding_balance: i64,
	pub status:              String,
	pub client_id:           i32,
	pub court_id:            i32,
	pub discipline_id:       i32,
}

impl CreateReservationRequest {
	#[must_use]
	pub fn to_insertable(self, status: ReservationStatus) -> NewReservation {
		NewReservation {
			date: self.date,
			cupo: self.cupo,
			total_amount: self.total_amount,
			outstanding_balance: self.outstanding_balance,
			status,
			client_id: self.client_id,
			court_id: self.court_id,
			discipline_id: self.discipline_id,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
	pub date:                Option<NaiveDate>,
	pub cupo:                Option<i32>,
	pub total_amount:        Option<i64>,
	pub outstanding_balance: Option<i64>,
	pub status:              Option<String>,
	pub client_id:           Option<i32>,
	pub court_id:            Option<i32>,
	pub discipline_id:       Option<i32>,
}

impl UpdateReservationRequest {
	#[must_use]
	pub fn to_changeset(
		self,
		status: Option<ReservationStatus>,
	) -> ReservationUpdate {
		ReservationUpdate {
			date: self.date,
			cupo: self.cupo,
			total_amount: self.total_amount,
			outstanding_balance: self.outstanding_balance,
			status,
			client_id: self.client_id,
			court_id: self.court_id,
			discipline_id: self.discipline_id,
		}
	}
}
