//! Background reaper for expired session rows
//!
//! Expired sessions are already invisible to lookups; the reaper only
//! reclaims the rows.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::auth::SessionStore;

/// Periodic expired-session cleanup
pub struct SessionReaper {
    handle: Option<JoinHandle<()>>,
}

impl SessionReaper {
    /// Spawn the cleanup loop. The first sweep runs immediately.
    pub fn start(sessions: SessionStore, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match sessions.purge_expired().await {
                    Ok(0) => {}
                    Ok(deleted) => info!(deleted, "Cleaned expired sessions"),
                    Err(e) => error!(error = ?e, "Session cleanup failed"),
                }
            }
        });
        info!(interval_secs = interval.as_secs(), "Session reaper started");
        Self { handle: Some(handle) }
    }

    /// One sweep, outside the schedule (CLI, tests)
    pub async fn run_once(sessions: &SessionStore) -> crate::Result<usize> {
        let deleted = sessions.purge_expired().await?;
        info!(deleted, "Session cleanup complete");
        Ok(deleted)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the background task
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Session reaper stopped");
        }
    }
}

impl Drop for SessionReaper {
    fn drop(&mut self) {
        self.stop();
    }
}
