use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use deadpool_diesel::postgres::{Manager, Pool};
use url::Url;

#[derive(Clone, Debug)]
pub struct Config {
	pub database_url: String,
	pub bind_address: String,

	/// Root directory credential artifacts are written to
	pub files_dir:  PathBuf,
	/// Public base url the files directory is served under
	pub static_url: Url,

	pub slot_length:           TimeDelta,
	pub vocabulary_cache_ttl:  Duration,
	pub expiry_sweep_interval: Duration,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	fn get_env_var_or(var: &str, default: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| default.to_string())
	}

	fn get_number_or(var: &str, default: u64) -> u64 {
		std::env::var(var).map_or(default, |v| {
			v.parse::<u64>()
				.unwrap_or_else(|_| panic!("{var} must be a positive number"))
		})
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if a required environment variable is missing or malformed
	#[must_use]
	pub fn from_env() -> Self {
		let database_url = Self::get_env_var("DATABASE_URL");
		let bind_address = Self::get_env_var_or("BIND_ADDRESS", "0.0.0.0:80");

		let files_dir =
			PathBuf::from(Self::get_env_var_or("FILES_DIR", "/mnt/files"));

		// A trailing slash is required for `Url::join` to keep the last segment
		let mut static_url =
			Self::get_env_var_or("STATIC_URL", "http://localhost/static/");
		if !static_url.ends_with('/') {
			static_url.push('/');
		}
		let static_url = Url::parse(&static_url)
			.unwrap_or_else(|_| panic!("STATIC_URL must be a valid url"));

		let slot_length_minutes = Self::get_number_or("SLOT_LENGTH_MINUTES", 60);
		assert!(slot_length_minutes > 0, "SLOT_LENGTH_MINUTES must not be 0");

		#[allow(clippy::cast_possible_wrap)]
		let slot_length = TimeDelta::minutes(slot_length_minutes as i64);

		let vocabulary_cache_ttl = Duration::from_secs(Self::get_number_or(
			"VOCABULARY_CACHE_TTL_SECONDS",
			30,
		));

		let expiry_sweep_interval = Duration::from_secs(
			Self::get_number_or("EXPIRY_SWEEP_INTERVAL_SECONDS", 300).max(1),
		);

		Self {
			database_url,
			bind_address,
			files_dir,
			static_url,
			slot_length,
			vocabulary_cache_ttl,
			expiry_sweep_interval,
		}
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}
}
