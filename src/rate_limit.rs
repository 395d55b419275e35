use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::metrics::RATE_LIMIT_ENTRIES;
use crate::session::now_ms;

// Rate limit entry - tracks requests per session/IP/key
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: i64, // epoch ms
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            window_ms: 60_000,
        }
    }
}

// Outcome of one admission check, `reset_at` is epoch ms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub success: bool,
    pub remaining: u32,
    pub reset_at: i64,
}

/// Fixed-window request counter keyed by identifier.
///
/// Holds state in process memory only, so every instance of the service
/// enforces its own budget. A client can get up to `2 * limit` requests
/// through around a window boundary.
#[derive(Default)]
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitDecision {
        self.check_at(identifier, config, now_ms())
    }

    pub fn check_at(&self, identifier: &str, config: &RateLimitConfig, now: i64) -> RateLimitDecision {
        let window = millis(config.window_ms);

        // the entry guard holds the shard lock until we return, so
        // check-and-increment is atomic per identifier
        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // new or expired window? start over
        if entry.count == 0 || now.saturating_sub(entry.window_start) > window {
            entry.count = 1;
            entry.window_start = now;
            return RateLimitDecision {
                success: true,
                remaining: config.limit.saturating_sub(1),
                reset_at: now.saturating_add(window),
            };
        }

        let reset_at = entry.window_start.saturating_add(window);

        // over limit, rejected requests don't use up a slot
        if entry.count >= config.limit {
            return RateLimitDecision {
                success: false,
                remaining: 0,
                reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            success: true,
            remaining: config.limit - entry.count,
            reset_at,
        }
    }

    // Drop entries whose window started more than `idle_ms` ago
    pub fn sweep(&self, idle_ms: u64) -> usize {
        self.sweep_at(idle_ms, now_ms())
    }

    pub fn sweep_at(&self, idle_ms: u64, now: i64) -> usize {
        let idle = millis(idle_ms);
        let before = self.entries.len();
        self.entries.retain(|_, entry| now.saturating_sub(entry.window_start) <= idle);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Seconds until `reset_at`, rounded up, for the Retry-After header
pub fn retry_after_secs(reset_at: i64, now: i64) -> u64 {
    let wait = reset_at.saturating_sub(now);
    if wait <= 0 {
        0
    } else {
        (wait as u64).div_ceil(1000)
    }
}

fn millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub idle_ms: u64,
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            idle_ms: 60_000,
            interval: Duration::from_secs(60),
        }
    }
}

/// Background task that periodically clears idle limiter entries.
///
/// Owned by whoever owns the limiter; call [`Sweeper::shutdown`] to stop it.
pub struct Sweeper {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub fn spawn(limiter: Arc<RateLimiter>, config: SweepConfig) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(config.interval);
            // first tick completes immediately
            ticker.tick().await;

            tracing::info!(
                interval_ms = config.interval.as_millis() as u64,
                idle_ms = config.idle_ms,
                "Rate limit sweeper started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep(config.idle_ms);
                        RATE_LIMIT_ENTRIES.set(limiter.len() as f64);
                        if removed > 0 {
                            tracing::debug!(removed, remaining = limiter.len(), "Swept idle rate limit entries");
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            tracing::info!("Rate limit sweeper stopped");
        });

        Self { stop_tx, handle }
    }

    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Rate limit sweeper did not stop cleanly");
        }
    }
}
