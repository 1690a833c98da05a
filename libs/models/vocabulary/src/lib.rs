//! Controlled vocabularies backed by postgres enum types
//!
//! The allowed values of a vocabulary are read from the live database
//! catalogue instead of being hardcoded, so adding a label with
//! `ALTER TYPE ... ADD VALUE` is picked up without a redeploy.

#[macro_use]
extern crate tracing;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{DbConn, Error};
use db::Vocabulary;
use diesel::prelude::*;
use diesel::sql_types::Text;
use parking_lot::RwLock;

#[derive(Debug, QueryableByName)]
struct EnumLabel {
	#[diesel(sql_type = Text)]
	label: String,
}

#[derive(Clone, Debug)]
struct CachedValues {
	values:     Vec<String>,
	fetched_at: Instant,
}

/// Registry answering which values a named vocabulary currently allows
///
/// Lookups are cached per vocabulary for the configured time to live, a
/// zero ttl disables caching entirely
#[derive(Clone, Debug)]
pub struct EnumRegistry {
	ttl:   Duration,
	cache: Arc<RwLock<HashMap<String, CachedValues>>>,
}

impl EnumRegistry {
	#[must_use]
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, cache: Arc::default() }
	}

	/// Get the allowed values of a vocabulary in declaration order
	///
	/// Unknown vocabularies yield an empty list
	#[instrument(skip(self, conn))]
	pub async fn allowed_values(
		&self,
		vocabulary: &str,
		conn: &DbConn,
	) -> Result<Vec<String>, Error> {
		if let Some(values) = self.cached(vocabulary) {
			return Ok(values);
		}

		let name = vocabulary.to_string();

		let labels = conn
			.interact(move |conn| {
				diesel::sql_query(
					"SELECT e.enumlabel::text AS label FROM pg_enum e INNER \
					 JOIN pg_type t ON t.oid = e.enumtypid WHERE t.typname = \
					 $1 AND pg_type_is_visible(t.oid) ORDER BY \
					 e.enumsortorder",
				)
				.bind::<Text, _>(name)
				.load::<EnumLabel>(conn)
			})
			.await??;

		let values: Vec<String> = labels.into_iter().map(|l| l.label).collect();

		if values.is_empty() {
			debug!("vocabulary {vocabulary} has no known values");
		}

		self.store(vocabulary, values.clone());

		Ok(values)
	}

	/// Fail with a validation error unless `value` is allowed by `vocabulary`
	pub async fn ensure_allowed(
		&self,
		vocabulary: &str,
		value: &str,
		conn: &DbConn,
	) -> Result<(), Error> {
		let values = self.allowed_values(vocabulary, conn).await?;

		if !values.iter().any(|v| v == value) {
			return Err(Error::ValidationError(format!(
				"'{value}' is not an allowed {vocabulary}, expected one of: {}",
				values.join(", ")
			)));
		}

		Ok(())
	}

	/// Check a raw value against the live vocabulary and parse it into `V`
	///
	/// A label that exists in the database but is unknown to this build is
	/// rejected as well
	pub async fn parse<V: Vocabulary>(
		&self,
		value: &str,
		conn: &DbConn,
	) -> Result<V, Error> {
		self.ensure_allowed(V::NAME, value, conn).await?;

		V::from_label(value).ok_or_else(|| {
			Error::ValidationError(format!(
				"'{value}' is not a supported {}",
				V::NAME
			))
		})
	}

	fn cached(&self, vocabulary: &str) -> Option<Vec<String>> {
		if self.ttl.is_zero() {
			return None;
		}

		let cache = self.cache.read();
		let entry = cache.get(vocabulary)?;

		if entry.fetched_at.elapsed() >= self.ttl {
			return None;
		}

		Some(entry.values.clone())
	}

	fn store(&self, vocabulary: &str, values: Vec<String>) {
		if self.ttl.is_zero() {
			return;
		}

		let entry = CachedValues { values, fetched_at: Instant::now() };

		self.cache.write().insert(vocabulary.to_string(), entry);
	}
}
