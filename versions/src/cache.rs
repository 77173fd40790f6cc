use crate::catalog::{CatalogClient, Game};
use crate::fetch::{self, FetchError, FetchOutcome, VersionPages};
use crate::metrics_defs::{
    CACHE_EXPIRED, CACHE_HIT, CACHE_MISS, RECONCILE_BACKFILL_FAILED, RECONCILE_BACKFILLED,
    RECONCILE_BUDGET_EXHAUSTED, RECONCILE_PRUNED,
};
use crate::store::{StoreError, VersionStore};
use crate::ttl;
use crate::types::{CacheEntry, PlaceId, VersionRecord};
use shared::counter;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Hard cap on the costed upstream work a single reconciliation pass may do.
/// Each backfilled place is charged its page fetches plus a flat cost of one.
pub const BACKFILL_BUDGET: u32 = 25;

#[derive(thiserror::Error, Debug)]
pub enum VersionError {
    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("version store failed: {0}")]
    Store(#[from] StoreError),
}

/// How a single-place lookup treats the cached entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Serve the cached entry when it exists and is fresh.
    Cached,
    /// Skip the freshness check and re-fetch unconditionally. Reserved for
    /// the reconciler's backfill of places known to be absent; interactive
    /// lookups must go through `Cached` or the cache buys nothing.
    ForcedRefresh,
}

pub struct ReconcileOutcome {
    /// The live, unarchived catalog at the time of the pass.
    pub games: Vec<Game>,
    /// Version list per live place. Places whose backfill did not fit under
    /// the budget (or failed) are absent and will be retried on a later pass.
    pub versions: HashMap<PlaceId, Vec<VersionRecord>>,
}

/// Bundles the upstream clients, the durable store and the cache limits.
/// Holds no per-request state; the store carries everything between calls.
pub struct VersionCache {
    catalog: Arc<dyn CatalogClient>,
    pages: Arc<dyn VersionPages>,
    store: Arc<dyn VersionStore>,
    budget: u32,
    ttl_secs: u64,
}

impl VersionCache {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        pages: Arc<dyn VersionPages>,
        store: Arc<dyn VersionStore>,
    ) -> Self {
        Self::with_limits(catalog, pages, store, BACKFILL_BUDGET, ttl::TTL_SECS)
    }

    pub fn with_limits(
        catalog: Arc<dyn CatalogClient>,
        pages: Arc<dyn VersionPages>,
        store: Arc<dyn VersionStore>,
        budget: u32,
        ttl_secs: u64,
    ) -> Self {
        VersionCache {
            catalog,
            pages,
            store,
            budget,
            ttl_secs,
        }
    }

    /// Resolves the full version history for one place. With
    /// `Lookup::Cached`, a fresh entry is returned without touching the
    /// upstream; otherwise the history is re-fetched in full and written
    /// back before returning.
    pub async fn resolve(
        &self,
        place_id: PlaceId,
        lookup: Lookup,
    ) -> Result<Vec<VersionRecord>, VersionError> {
        let now = ttl::unix_now();

        if lookup == Lookup::Cached {
            match self.store.get(place_id)? {
                Some(entry) if ttl::is_fresh_at(entry.updated_at, now, self.ttl_secs) => {
                    counter!(CACHE_HIT).increment(1);
                    return Ok(entry.versions);
                }
                Some(_) => counter!(CACHE_EXPIRED).increment(1),
                None => counter!(CACHE_MISS).increment(1),
            }
        }

        let outcome = self.refresh(place_id, now).await?;
        Ok(outcome.versions)
    }

    /// Full re-fetch and write-back. The entry is only persisted once the
    /// pagination ran to completion, so interrupted fetches never surface.
    async fn refresh(&self, place_id: PlaceId, now: u64) -> Result<FetchOutcome, VersionError> {
        let outcome = fetch::fetch_all(self.pages.as_ref(), place_id).await?;
        self.store.put(place_id, &outcome.versions, now)?;
        Ok(outcome)
    }

    /// Reconciles the store against the live catalog: prunes entries for
    /// places that left the catalog, then backfills missing places in
    /// catalog order until the call budget is spent. Best-effort; steady
    /// state is reached over successive passes.
    pub async fn reconcile_all(&self) -> Result<ReconcileOutcome, VersionError> {
        let mut cached = self.store.list_all()?;
        let games = self.catalog.list_games(false).await?;

        let live: HashSet<PlaceId> = games.iter().map(|game| game.root_place_id).collect();

        let dead: Vec<PlaceId> = cached
            .keys()
            .copied()
            .filter(|place_id| !live.contains(place_id))
            .collect();
        for place_id in dead {
            tracing::debug!(place_id, "pruning versions for place no longer in catalog");
            self.store.remove(place_id)?;
            cached.remove(&place_id);
            counter!(RECONCILE_PRUNED).increment(1);
        }

        let missing: Vec<&Game> = games
            .iter()
            .filter(|game| !cached.contains_key(&game.root_place_id))
            .collect();

        let mut spent = 0u32;
        for game in missing {
            if spent >= self.budget {
                counter!(RECONCILE_BUDGET_EXHAUSTED).increment(1);
                tracing::info!(
                    spent,
                    budget = self.budget,
                    "backfill budget exhausted, deferring remaining places"
                );
                break;
            }

            let now = ttl::unix_now();
            match self.refresh(game.root_place_id, now).await {
                Ok(outcome) => {
                    spent += outcome.calls + 1;
                    cached.insert(
                        game.root_place_id,
                        CacheEntry {
                            versions: outcome.versions,
                            updated_at: now,
                        },
                    );
                    counter!(RECONCILE_BACKFILLED).increment(1);
                }
                Err(VersionError::Fetch(err)) => {
                    // Charge the attempted call plus the flat per-place cost so
                    // a failing upstream cannot turn a pass into a retry storm.
                    spent += 2;
                    counter!(RECONCILE_BACKFILL_FAILED).increment(1);
                    tracing::warn!(
                        place_id = game.root_place_id,
                        error = %err,
                        "backfill fetch failed, leaving place unresolved"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        let versions = games
            .iter()
            .filter_map(|game| {
                cached
                    .remove(&game.root_place_id)
                    .map(|entry| (game.root_place_id, entry.versions))
            })
            .collect();

        Ok(ReconcileOutcome { games, versions })
    }
}
