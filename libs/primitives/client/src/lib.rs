use chrono::NaiveDateTime;
use db::client;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = client)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveClient {
	pub id:         i32,
	pub name:       String,
	pub email:      Option<String>,
	pub created_at: NaiveDateTime,
}
