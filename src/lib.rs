//! # Courtside reservation backend library

#[macro_use]
extern crate tracing;

use axum::extract::FromRef;
use common::DbPool;
use utils::ArtifactStore;
use vocabulary::EnumRegistry;

mod config;
mod identity;
mod sweeper;

pub mod controllers;
pub mod middleware;
pub mod routes;
pub mod schemas;

pub use config::*;
pub use identity::*;
pub use sweeper::*;

/// Common state of the app
#[derive(Clone)]
pub struct AppState {
	pub config:         Config,
	pub database_pool:  DbPool,
	pub enum_registry:  EnumRegistry,
	pub artifact_store: ArtifactStore,
}

impl AppState {
	/// Build the app state for a config and database pool
	#[must_use]
	pub fn new(config: Config, database_pool: DbPool) -> Self {
		let enum_registry = EnumRegistry::new(config.vocabulary_cache_ttl);
		let artifact_store = ArtifactStore::new(config.files_dir.clone());

		Self { config, database_pool, enum_registry, artifact_store }
	}
}

impl FromRef<AppState> for Config {
	fn from_ref(input: &AppState) -> Self { input.config.clone() }
}

impl FromRef<AppState> for DbPool {
	fn from_ref(input: &AppState) -> Self { input.database_pool.clone() }
}

impl FromRef<AppState> for EnumRegistry {
	fn from_ref(input: &AppState) -> Self { input.enum_registry.clone() }
}

impl FromRef<AppState> for ArtifactStore {
	fn from_ref(input: &AppState) -> Self { input.artifact_store.clone() }
}
