use chrono::{NaiveDate, NaiveDateTime};
use common::Error;
use serde::Serialize;

use crate::Credential;

/// Data encoded into the QR code of a credential
///
/// Never contains the outstanding balance
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload<'a> {
	pub reservation_id: i32,
	pub client:         &'a str,
	pub date:           NaiveDate,
	pub cupo:           i32,
	pub court:          &'a str,
	pub discipline:     &'a str,
	pub slots:          Vec<String>,
	pub code:           &'a str,
	pub generated_at:   NaiveDateTime,
	pub expires_at:     NaiveDateTime,
}

impl<'a> From<&'a Credential> for CredentialPayload<'a> {
	fn from(value: &'a Credential) -> Self {
		let slots = value
			.time_blocks
			.iter()
			.map(|b| {
				format!(
					"{}-{}",
					b.start_time.format("%H:%M:%S"),
					b.end_time.format("%H:%M:%S")
				)
			})
			.collect();

		Self {
			reservation_id: value.reservation.id,
			client: &value.client.name,
			date: value.reservation.date,
			cupo: value.reservation.cupo,
			court: &value.court.name,
			discipline: &value.discipline.name,
			slots,
			code: &value.credential.code,
			generated_at: value.credential.generated_at,
			expires_at: value.credential.expires_at,
		}
	}
}

impl Credential {
	/// Serialize the payload of this credential
	///
	/// Equal inputs always produce the exact same string
	pub fn payload(&self) -> Result<String, Error> {
		let payload = serde_json::to_string(&CredentialPayload::from(self))?;

		Ok(payload)
	}
}
