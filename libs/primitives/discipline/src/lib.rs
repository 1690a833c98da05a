use chrono::NaiveDateTime;
use db::discipline;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = discipline)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveDiscipline {
	pub id:         i32,
	pub name:       String,
	pub created_at: NaiveDateTime,
}
