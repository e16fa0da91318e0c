//! Fixed-interval session-refresh probe.
//!
//! Mirrors the frontend's token-refresh timer: fires on a fixed interval,
//! re-arms after each attempt, and never surfaces failures anywhere but the
//! debug log.

use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::gateway::session::SessionCookies;
use crate::gateway::upstream::{RequestOptions, UpstreamClient};

/// Spawn the probe task. `interval_secs == 0` disables it.
pub fn spawn_refresh_timer(
    upstream: Arc<UpstreamClient>,
    interval_secs: u64,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("Session-refresh probe disabled");
        return None;
    }

    let handle = tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so the probe runs on the
        // configured cadence only.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let cookies = SessionCookies::default();
            match upstream
                .request(
                    "/api/v1/auth/refresh",
                    &cookies,
                    RequestOptions::method(reqwest::Method::POST),
                )
                .await
            {
                Ok(res) => {
                    tracing::debug!("refresh probe: upstream answered {}", res.status.as_u16())
                }
                Err(e) => tracing::debug!("refresh probe failed: {}", e),
            }
        }
    });

    tracing::info!("Session-refresh probe armed every {}s", interval_secs);
    Some(handle)
}
