use chrono::NaiveDateTime;
use db::control;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A staff member who validates credentials at the point of entry
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = control)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveControl {
	pub id:         i32,
	pub name:       String,
	pub created_at: NaiveDateTime,
}
