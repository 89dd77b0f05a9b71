//! Sites cache demo
//!
//! Shows an owning component wrapping an [`ExpiringCache`] for site records
//! loaded from a slow backend.
//!
//! Run with `RUST_LOG=expiring_cache=debug cargo run --example sites`.
//! `CACHE_MAX_ENTRIES` and `CACHE_DEFAULT_TTL` override the configuration.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::bail;
use expiring_cache::{CacheConfig, ExpiringCache};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct Site {
    id: u64,
    name: String,
}

/// Stand-in for a database lookup.
fn load_site(id: &u64) -> anyhow::Result<Site> {
    thread::sleep(Duration::from_millis(50));
    if *id == 0 {
        bail!("site id 0 is reserved");
    }
    Ok(Site {
        id: *id,
        name: format!("site-{id}"),
    })
}

/// Owns the cache and exposes the operations the rest of the program uses.
struct SitesCache {
    cache: ExpiringCache<u64, Site>,
}

impl SitesCache {
    fn new(config: &CacheConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let cache = ExpiringCache::builder()
            .loader(load_site)
            .config(config)
            .build()?;
        Ok(Self { cache })
    }

    fn site(&self, id: u64) -> anyhow::Result<Site> {
        Ok(self.cache.get(&id)?)
    }

    fn revoke_site(&self, id: u64) {
        self.cache.revoke(&id);
    }

    fn revoke_all(&self) {
        self.cache.revoke_all();
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sites=info,expiring_cache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s",
        config.max_entries, config.default_ttl_secs
    );

    let sites = Arc::new(SitesCache::new(&config)?);

    // Readers on several threads share one instance
    let readers: Vec<_> = (0..4)
        .map(|worker| {
            let sites = sites.clone();
            thread::spawn(move || {
                for id in 1..=3 {
                    match sites.site(id) {
                        Ok(site) => info!(worker, id = site.id, name = %site.name, "Fetched site"),
                        Err(err) => info!(worker, id, error = %err, "Fetch failed"),
                    }
                }
            })
        })
        .collect();
    for reader in readers {
        if reader.join().is_err() {
            bail!("reader thread panicked");
        }
    }

    sites.revoke_site(2);
    let site = sites.site(2)?;
    info!(id = site.id, "Reloaded revoked site");

    if let Err(err) = sites.site(0) {
        info!(error = %err, "Loader failure surfaced to caller");
    }

    sites.revoke_all();
    info!(stats = ?sites.cache.stats(), "Done");
    Ok(())
}
