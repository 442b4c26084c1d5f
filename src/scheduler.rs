use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::state::SharedState;

/// Background maintenance: periodically deletes sessions past their
/// expiry. Expired sessions are also rejected (and removed) lazily on
/// each authenticated request, so the sweep only reclaims rows for users
/// who walked away.
pub struct Scheduler {
    state: Arc<SharedState>,
}

impl Scheduler {
    #[must_use]
    pub const fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Starts the sweep job and parks until the task is aborted.
    pub async fn run(&self) -> Result<()> {
        let interval = self.state.config.auth.sweep_interval_seconds;
        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let state = Arc::clone(&state);
            Box::pin(async move {
                match state.auth_service.sweep_sessions().await {
                    Ok(0) => {}
                    Ok(n) => info!("Session sweep removed {} expired sessions", n),
                    Err(e) => error!("Session sweep failed: {}", e),
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Session sweep scheduled every {} seconds", interval);

        // The scheduler stops when dropped; hold it until we are aborted.
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }

    /// One sweep pass, for direct invocation.
    pub async fn run_once(&self) -> Result<u64> {
        let swept = self.state.auth_service.sweep_sessions().await?;
        Ok(swept)
    }
}
