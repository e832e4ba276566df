//! The catalog store.
//!
//! State sits behind a `std::sync::RwLock` that is never held across an
//! `.await`; every mutation builds its result under one write lock, so
//! readers only ever see a complete list. Refreshes are serialised by an
//! async mutex.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use machbar_core::catalog::ranking::positions;
use machbar_core::catalog::query::{by_creator, category_counts, find_by_slug};
use machbar_core::{
    CommunityPost, ExploreQuery, LeaderboardEntry, Product, ProductCategory, ProductId, User,
    UserId, assign_unique_slugs, leaderboard, sort_products,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{
    Catalog, CatalogFault, CatalogSource, RefreshOutcome, RemotePersistError, SeedError,
    UpvoteReceipt, seed,
};

struct CatalogState {
    /// Always in ranking order.
    products: Vec<Product>,
    posts: Vec<CommunityPost>,
    /// Positions before the most recent reordering, for leaderboard trends.
    previous_ranks: HashMap<ProductId, usize>,
    is_loading: bool,
    error: Option<CatalogFault>,
    last_refreshed: Option<DateTime<Utc>>,
}

/// Snapshot of the store's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStatus {
    pub is_loading: bool,
    pub error: Option<CatalogFault>,
    pub products: usize,
    pub posts: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// A creator with everything they made and posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorProfile {
    pub creator: User,
    pub products: Vec<Product>,
    pub posts: Vec<CommunityPost>,
}

/// In-memory catalog with seed fallback, refresh and optimistic upvotes.
pub struct CatalogStore<S> {
    source: Arc<S>,
    state: RwLock<CatalogState>,
    refresh_gate: Mutex<()>,
}

/// Clears `is_loading` even if the refresh future is dropped mid-fetch.
struct LoadingFlag<'a>(&'a RwLock<CatalogState>);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .is_loading = false;
    }
}

impl<S: CatalogSource> CatalogStore<S> {
    /// Create a store holding `initial`, ranked.
    #[must_use]
    pub fn new(source: S, initial: Catalog) -> Self {
        let Catalog {
            mut products,
            posts,
        } = initial;
        assign_unique_slugs(&mut products);
        sort_products(&mut products);

        Self {
            source: Arc::new(source),
            state: RwLock::new(CatalogState {
                products,
                posts,
                previous_ranks: HashMap::new(),
                is_loading: false,
                error: None,
                last_refreshed: None,
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Create a store initialised from the bundled seed.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the bundled dataset is unusable.
    pub fn with_seed(source: S) -> Result<Self, SeedError> {
        Ok(Self::new(source, seed::load()?))
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All products in ranking order.
    #[must_use]
    pub fn get_products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    /// Community posts, newest first.
    #[must_use]
    pub fn get_posts(&self) -> Vec<CommunityPost> {
        self.read().posts.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// Why the last refresh failed, until a later one succeeds.
    #[must_use]
    pub fn error(&self) -> Option<CatalogFault> {
        self.read().error.clone()
    }

    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        let state = self.read();
        CatalogStatus {
            is_loading: state.is_loading,
            error: state.error.clone(),
            products: state.products.len(),
            posts: state.posts.len(),
            last_refreshed: state.last_refreshed,
        }
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.read().products.iter().find(|p| &p.id == id).cloned()
    }

    #[must_use]
    pub fn product_by_slug(&self, slug: &str) -> Option<Product> {
        find_by_slug(&self.read().products, slug).cloned()
    }

    /// Filter and order products for the explore page.
    #[must_use]
    pub fn explore(&self, query: &ExploreQuery) -> Vec<Product> {
        query.apply(&self.read().products)
    }

    /// Ranked leaderboard with movement since the last reordering.
    #[must_use]
    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        let state = self.read();
        leaderboard(&state.products, &state.previous_ranks, limit)
    }

    /// Product counts for every browsable category.
    #[must_use]
    pub fn category_counts(&self) -> Vec<(ProductCategory, usize)> {
        category_counts(&self.read().products)
    }

    /// A creator, their products and their posts.
    ///
    /// Creators are only known through the products and posts they appear
    /// on; `None` if neither mentions `id`.
    #[must_use]
    pub fn creator_profile(&self, id: &UserId) -> Option<CreatorProfile> {
        let state = self.read();
        let products = by_creator(&state.products, id);
        let posts: Vec<CommunityPost> = state
            .posts
            .iter()
            .filter(|p| &p.author.id == id)
            .cloned()
            .collect();

        let creator = products
            .first()
            .map(|p| p.creator.clone())
            .or_else(|| posts.first().map(|p| p.author.clone()))?;

        Some(CreatorProfile {
            creator,
            products,
            posts,
        })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Fetch from the source and publish the result.
    ///
    /// Never fails: errors are recorded in [`error`](Self::error) and the
    /// existing data is kept. Concurrent calls run one after another.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _in_flight = self.refresh_gate.lock().await;

        self.write().is_loading = true;
        let loading = LoadingFlag(&self.state);
        let result = self.source.fetch_catalog().await;

        let outcome = {
            let mut state = self.write();
            match result {
                Ok(catalog) if catalog.is_empty() => {
                    warn!("Remote catalog returned no records, keeping current data");
                    RefreshOutcome::EmptyRemote
                }
                Ok(Catalog {
                    mut products,
                    posts,
                }) => {
                    let product_count = products.len();
                    if products.is_empty() {
                        warn!("Remote catalog returned posts only, keeping current products");
                    } else {
                        assign_unique_slugs(&mut products);
                        sort_products(&mut products);
                        let previous = positions(&state.products);
                        state.previous_ranks = previous;
                        state.products = products;
                    }
                    let post_count = posts.len();
                    state.posts = posts;
                    state.error = None;
                    state.last_refreshed = Some(Utc::now());

                    info!(
                        products = product_count,
                        posts = post_count,
                        "Catalog refreshed from remote"
                    );
                    RefreshOutcome::Replaced {
                        products: product_count,
                        posts: post_count,
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to fetch remote catalog, keeping current data");
                    let fault = CatalogFault::from(&e);
                    state.error = Some(fault.clone());
                    RefreshOutcome::Failed { fault }
                }
            }
        };

        drop(loading);
        outcome
    }

    /// Add one upvote to `id`.
    ///
    /// The local increment and re-sort happen before this returns. For
    /// remote-origin products the write-back is spawned onto the current
    /// Tokio runtime and never rolled back on failure. Unknown ids are a
    /// no-op and return `None`.
    pub fn upvote(&self, id: &ProductId) -> Option<UpvoteReceipt> {
        let (before, after) = {
            let mut state = self.write();
            let order_before: Vec<ProductId> =
                state.products.iter().map(|p| p.id.clone()).collect();

            let product = state.products.iter_mut().find(|p| &p.id == id)?;
            let before = product.upvotes;
            product.upvotes = before.saturating_add(1);
            let after = product.upvotes;

            sort_products(&mut state.products);
            let reordered = state
                .products
                .iter()
                .zip(&order_before)
                .any(|(p, old)| &p.id != old);
            if reordered {
                state.previous_ranks = order_before
                    .into_iter()
                    .enumerate()
                    .map(|(i, id)| (id, i))
                    .collect();
            }

            (before, after)
        };

        debug!(product_id = %id, upvotes = after, "Upvote applied locally");

        let persistence = if id.is_remote() {
            self.spawn_persist(id.clone(), before)
        } else {
            None
        };

        Some(UpvoteReceipt {
            product_id: id.clone(),
            upvotes: after,
            persistence,
        })
    }

    fn spawn_persist(
        &self,
        id: ProductId,
        current: u64,
    ) -> Option<tokio::task::JoinHandle<Result<(), RemotePersistError>>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(product_id = %id, "No async runtime, upvote not persisted");
            return None;
        };

        let source = Arc::clone(&self.source);
        Some(runtime.spawn(async move {
            let result = source.increment_upvote(&id, current).await;
            match &result {
                Ok(()) => debug!(product_id = %id, "Upvote persisted"),
                Err(e) => error!(error = %e, product_id = %id, "Failed to persist upvote"),
            }
            result
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use machbar_core::{ImageRef, Price, Slug, Trend};

    use super::super::RemoteFetchError;
    use super::*;

    fn product(id: &str, upvotes: u64, image: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: ProductCategory::ProgrammableRobotics,
            sub_category: None,
            description: String::new(),
            price: Price::whole(10),
            images: vec![ImageRef::new(image)],
            creator: User {
                id: UserId::new(format!("maker-{id}")),
                name: format!("Maker {id}"),
                username: format!("maker_{id}"),
                ..User::default()
            },
            status: machbar_core::ProductStatus::Available,
            upvotes,
            privacy_verified: false,
            launch_date: String::new(),
            slug: Slug::slugify(id).unwrap(),
            skill_level: None,
            external_link: None,
            apps: Vec::new(),
        }
    }

    fn catalog(products: Vec<Product>) -> Catalog {
        Catalog {
            products,
            posts: Vec::new(),
        }
    }

    /// Scripted source: returns a fixed result and counts calls.
    #[derive(Default)]
    struct FakeSource {
        catalog: std::sync::Mutex<Option<Catalog>>,
        fetches: AtomicUsize,
        persisted: std::sync::Mutex<Vec<(ProductId, u64)>>,
        fail_persist: bool,
        delay: Option<Duration>,
    }

    impl CatalogSource for FakeSource {
        async fn fetch_catalog(&self) -> Result<Catalog, RemoteFetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.catalog
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| RemoteFetchError::new("connection refused"))
        }

        async fn increment_upvote(
            &self,
            id: &ProductId,
            current: u64,
        ) -> Result<(), RemotePersistError> {
            if self.fail_persist {
                return Err(RemotePersistError::new(id.clone(), "503"));
            }
            self.persisted.lock().unwrap().push((id.clone(), current));
            Ok(())
        }
    }

    impl FakeSource {
        fn returning(catalog: Catalog) -> Self {
            Self {
                catalog: std::sync::Mutex::new(Some(catalog)),
                ..Self::default()
            }
        }
    }

    fn ids(products: &[Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    fn scenario_store(source: FakeSource) -> CatalogStore<FakeSource> {
        CatalogStore::new(
            source,
            catalog(vec![
                product("a", 5, "📦"),
                product("b", 3, "http://x/y.png"),
            ]),
        )
    }

    #[test]
    fn test_seeded_store_is_non_empty() {
        let store = CatalogStore::with_seed(FakeSource::default()).unwrap();
        assert!(!store.get_products().is_empty());
        assert!(!store.is_loading());
        assert!(store.error().is_none());
    }

    #[test]
    fn test_initial_sort_puts_real_images_first() {
        let store = scenario_store(FakeSource::default());
        assert_eq!(ids(&store.get_products()), vec!["b", "a"]);
    }

    #[test]
    fn test_tier_beats_upvote_count() {
        let store = scenario_store(FakeSource::default());
        for _ in 0..3 {
            store.upvote(&ProductId::new("a")).unwrap();
        }
        let products = store.get_products();
        assert_eq!(ids(&products), vec!["b", "a"]);
        assert_eq!(products[1].upvotes, 8);
    }

    #[tokio::test]
    async fn test_refresh_replaces_on_success() {
        let remote = catalog(vec![
            product("recX", 1, "https://x"),
            product("recY", 9, "https://y"),
            product("recZ", 4, "🤖"),
        ]);
        let store = scenario_store(FakeSource::returning(remote));

        let outcome = store.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome::Replaced {
                products: 3,
                posts: 0
            }
        );
        assert_eq!(ids(&store.get_products()), vec!["recY", "recX", "recZ"]);
        assert!(store.error().is_none());
        assert!(!store.is_loading());
        assert!(store.status().last_refreshed.is_some());
    }

    #[tokio::test]
    async fn test_refresh_empty_is_noop() {
        let store = scenario_store(FakeSource::returning(Catalog::default()));
        let before = store.get_products();

        assert_eq!(store.refresh().await, RefreshOutcome::EmptyRemote);
        assert_eq!(store.get_products(), before);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_data_and_sets_error() {
        let store = scenario_store(FakeSource::default());
        let before = store.get_products();

        let outcome = store.refresh().await;
        assert!(matches!(outcome, RefreshOutcome::Failed { .. }));
        assert_eq!(store.get_products(), before);
        assert!(matches!(
            store.error(),
            Some(CatalogFault::FetchFailed { .. })
        ));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_successful_refresh_clears_error() {
        let store = scenario_store(FakeSource::default());
        store.refresh().await;
        assert!(store.error().is_some());

        *store.source().catalog.lock().unwrap() =
            Some(catalog(vec![product("recX", 1, "https://x")]));
        store.refresh().await;
        assert!(store.error().is_none());
        assert_eq!(ids(&store.get_products()), vec!["recX"]);
    }

    #[tokio::test]
    async fn test_posts_only_refresh_keeps_products() {
        let post = CommunityPost {
            id: machbar_core::PostId::new("p1"),
            author: User::anonymous(),
            content: "hello".to_string(),
            images: Vec::new(),
            product: None,
            hashtags: Vec::new(),
            timestamp: Utc::now(),
            likes: 0,
            replies: 0,
        };
        let store = scenario_store(FakeSource::returning(Catalog {
            products: Vec::new(),
            posts: vec![post],
        }));

        let outcome = store.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome::Replaced {
                products: 0,
                posts: 1
            }
        );
        assert_eq!(ids(&store.get_products()), vec!["b", "a"]);
        assert_eq!(store.get_posts().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_are_serialised() {
        let store = Arc::new(scenario_store(FakeSource {
            delay: Some(Duration::from_millis(20)),
            ..FakeSource::returning(catalog(vec![product("recX", 1, "https://x")]))
        }));

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        });
        let second = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        });
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(store.source().fetches.load(Ordering::SeqCst), 2);
        assert!(!store.is_loading());
        assert_eq!(ids(&store.get_products()), vec!["recX"]);
    }

    #[test]
    fn test_upvote_increments_exactly_one() {
        let store = scenario_store(FakeSource::default());
        let before = store.get_products();

        let receipt = store.upvote(&ProductId::new("b")).unwrap();
        assert_eq!(receipt.upvotes, 4);
        assert!(receipt.persistence.is_none());

        for p in store.get_products() {
            let old = before.iter().find(|o| o.id == p.id).unwrap();
            let expected = if p.id.as_str() == "b" {
                old.upvotes + 1
            } else {
                old.upvotes
            };
            assert_eq!(p.upvotes, expected);
        }
    }

    #[test]
    fn test_upvote_unknown_id_is_noop() {
        let store = scenario_store(FakeSource::default());
        let before = store.get_products();
        assert!(store.upvote(&ProductId::new("nonexistent")).is_none());
        assert_eq!(store.get_products(), before);
    }

    #[test]
    fn test_upvote_resorts_immediately() {
        let store = CatalogStore::new(
            FakeSource::default(),
            catalog(vec![
                product("top", 10, "https://a"),
                product("climber", 10, "https://b"),
            ]),
        );
        assert_eq!(ids(&store.get_products()), vec!["top", "climber"]);

        store.upvote(&ProductId::new("climber")).unwrap();
        assert_eq!(ids(&store.get_products()), vec!["climber", "top"]);

        let board = store.leaderboard(None);
        assert_eq!(board[0].trend, Trend::Up);
        assert_eq!(board[1].trend, Trend::Down);
    }

    #[tokio::test]
    async fn test_remote_upvote_persists_pre_increment_count() {
        let store = CatalogStore::new(
            FakeSource::default(),
            catalog(vec![product("recA", 41, "https://a")]),
        );

        let receipt = store.upvote(&ProductId::new("recA")).unwrap();
        assert_eq!(receipt.upvotes, 42);
        receipt.persistence.unwrap().await.unwrap().unwrap();

        let persisted = store.source().persisted.lock().unwrap().clone();
        assert_eq!(persisted, vec![(ProductId::new("recA"), 41)]);
    }

    #[tokio::test]
    async fn test_failed_persist_is_not_rolled_back() {
        let store = CatalogStore::new(
            FakeSource {
                fail_persist: true,
                ..FakeSource::default()
            },
            catalog(vec![product("recA", 1, "https://a")]),
        );

        let receipt = store.upvote(&ProductId::new("recA")).unwrap();
        let result = receipt.persistence.unwrap().await.unwrap();
        assert!(result.is_err());
        assert_eq!(store.get_products()[0].upvotes, 2);
    }

    #[test]
    fn test_remote_upvote_without_runtime_stays_local() {
        let store = CatalogStore::new(
            FakeSource::default(),
            catalog(vec![product("recA", 1, "https://a")]),
        );
        let receipt = store.upvote(&ProductId::new("recA")).unwrap();
        assert!(receipt.persistence.is_none());
        assert_eq!(receipt.upvotes, 2);
    }

    #[test]
    fn test_creator_profile() {
        let store = CatalogStore::with_seed(FakeSource::default()).unwrap();
        let profile = store.creator_profile(&UserId::new("pollen")).unwrap();
        assert_eq!(profile.creator.name, "Pollen Robotics");
        assert_eq!(profile.products.len(), 1);
        assert_eq!(profile.posts.len(), 1);

        assert!(store.creator_profile(&UserId::new("nobody")).is_none());
    }

    #[test]
    fn test_lookups() {
        let store = CatalogStore::with_seed(FakeSource::default()).unwrap();
        assert_eq!(
            store.product_by_slug("nybble").map(|p| p.name),
            Some("Nybble".to_string())
        );
        assert!(store.product(&ProductId::new("real-1")).is_some());
        assert_eq!(store.category_counts().len(), 6);
    }
}
