// ==================== CACHE SWEEPER ====================
// Job de fond qui purge les entrées expirées du cache Scryfall et les IP
// oubliées du rate limiter, pour que la mémoire ne grossisse pas.

use crate::middleware::SlidingWindow;
use crate::utils::TtlCache;
use actix_web::web;
use std::sync::Arc;
use tokio::time::{interval, Duration};

const SWEEP_INTERVAL_SECS: u64 = 600;

/// Démarre le balayage périodique du cache et du rate limiter.
/// Les entrées expirées sont déjà ignorées en lecture; ce job ne fait
/// que récupérer la mémoire des entrées que personne ne relit.
pub fn start_cache_sweeper(cache: web::Data<TtlCache>, limiter: Arc<SlidingWindow>) {
    log::info!(
        "🧹 Starting cache sweeper (runs every {}s)",
        SWEEP_INTERVAL_SECS
    );

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            interval.tick().await;

            let removed = cache.sweep();
            if removed > 0 {
                log::info!(
                    "🧹 Cache sweep: {} expired entries removed ({} remaining)",
                    removed,
                    cache.len()
                );
            } else {
                log::debug!("🧹 Cache sweep: nothing to remove ({} entries)", cache.len());
            }

            let idle_ips = limiter.sweep();
            if idle_ips > 0 {
                log::debug!(
                    "🧹 Rate limiter sweep: {} idle IPs forgotten ({} tracked)",
                    idle_ips,
                    limiter.tracked_keys()
                );
            }
        }
    });

    log::info!("✅ Cache sweeper started successfully");
}
