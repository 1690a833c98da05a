use std::fmt;

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

/// Name of a postgres enum type that doubles as a controlled vocabulary
pub trait Vocabulary: Sized + Copy + 'static {
	const NAME: &'static str;

	fn as_str(self) -> &'static str;

	fn variants() -> &'static [Self];

	/// Parse a raw vocabulary value into a known variant
	fn from_label(label: &str) -> Option<Self> {
		Self::variants().iter().copied().find(|v| v.as_str() == label)
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[ExistingTypePath = "crate::schema::sql_types::CourtStatus"]
pub enum CourtStatus {
	#[default]
	Available,
	Unavailable,
	Maintenance,
}

impl Vocabulary for CourtStatus {
	const NAME: &'static str = "court_status";

	fn as_str(self) -> &'static str {
		match self {
			Self::Available => "available",
			Self::Unavailable => "unavailable",
			Self::Maintenance => "maintenance",
		}
	}

	fn variants() -> &'static [Self] {
		&[Self::Available, Self::Unavailable, Self::Maintenance]
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[ExistingTypePath = "crate::schema::sql_types::ReservationStatus"]
pub enum ReservationStatus {
	#[default]
	Pending,
	Paid,
	Installment,
	Cancelled,
}

impl ReservationStatus {
	/// Check whether a reservation in this status may move to `next`
	///
	/// ```text
	/// pending     -> paid | installment | cancelled
	/// installment -> paid | cancelled
	/// paid, cancelled are terminal
	/// ```
	///
	/// Setting the current status again is always allowed
	#[must_use]
	pub fn can_transition_to(self, next: Self) -> bool {
		if self == next {
			return true;
		}

		if self.is_terminal() {
			return false;
		}

		matches!(
			(self, next),
			(Self::Pending, Self::Paid | Self::Installment | Self::Cancelled)
				| (Self::Installment, Self::Paid | Self::Cancelled)
		)
	}

	#[must_use]
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Paid | Self::Cancelled)
	}
}

impl Vocabulary for ReservationStatus {
	const NAME: &'static str = "reservation_status";

	fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Paid => "paid",
			Self::Installment => "installment",
			Self::Cancelled => "cancelled",
		}
	}

	fn variants() -> &'static [Self] {
		&[Self::Pending, Self::Paid, Self::Installment, Self::Cancelled]
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[ExistingTypePath = "crate::schema::sql_types::CredentialStatus"]
pub enum CredentialStatus {
	#[default]
	Active,
	Expired,
	Used,
}

impl Vocabulary for CredentialStatus {
	const NAME: &'static str = "credential_status";

	fn as_str(self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Expired => "expired",
			Self::Used => "used",
		}
	}

	fn variants() -> &'static [Self] {
		&[Self::Active, Self::Expired, Self::Used]
	}
}

macro_rules! impl_display {
	($($ty:ty),*) => {
		$(
			impl fmt::Display for $ty {
				fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
					f.write_str(self.as_str())
				}
			}
		)*
	};
}

impl_display!(CourtStatus, ReservationStatus, CredentialStatus);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pending_moves_anywhere() {
		let pending = ReservationStatus::Pending;

		assert!(pending.can_transition_to(ReservationStatus::Paid));
		assert!(pending.can_transition_to(ReservationStatus::Installment));
		assert!(pending.can_transition_to(ReservationStatus::Cancelled));
	}

	#[test]
	fn installment_cannot_go_back_to_pending() {
		let installment = ReservationStatus::Installment;

		assert!(installment.can_transition_to(ReservationStatus::Paid));
		assert!(installment.can_transition_to(ReservationStatus::Cancelled));
		assert!(!installment.can_transition_to(ReservationStatus::Pending));
	}

	#[test]
	fn terminal_states_only_accept_themselves() {
		for status in [ReservationStatus::Paid, ReservationStatus::Cancelled] {
			assert!(status.is_terminal());
			assert!(status.can_transition_to(status));

			for next in ReservationStatus::variants() {
				if *next != status {
					assert!(!status.can_transition_to(*next));
				}
			}
		}
	}

	#[test]
	fn labels_match_display() {
		for status in CredentialStatus::variants() {
			assert_eq!(
				CredentialStatus::from_label(&status.to_string()),
				Some(*status)
			);
		}

		assert_eq!(ReservationStatus::from_label("refunded"), None);
	}
}
