//! Background task expiring overdue credentials

use std::time::Duration;

use chrono::Utc;
use common::{DbPool, Error};
use credential::Credential;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Expire every active credential past its expiration date once
pub async fn expire_overdue_credentials(pool: &DbPool) -> Result<usize, Error> {
	let conn = pool.get().await?;

	Credential::expire_overdue(Utc::now().naive_utc(), &conn).await
}

/// Spawn a task that expires overdue credentials every `period`
pub fn spawn_expiry_sweeper(pool: DbPool, period: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut interval = tokio::time::interval(period);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			interval.tick().await;

			if let Err(e) = expire_overdue_credentials(&pool).await {
				error!("failed to expire overdue credentials -- {e}");
			}
		}
	})
}
