//! Property-Based Tests for the cache-aside accessor
//!
//! Random catalogs and operation sequences checked against the backing
//! store as the source of truth.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio_test::block_on;

use crate::accessor::{AccessorOptions, CacheAside, WriteOutcome};
use crate::cache::{CacheStore, MemoryCache};
use crate::catalog::{FieldValue, Product};
use crate::store::{BackingStore, MemoryStore};

// == Strategies ==
fn product_strategy() -> impl Strategy<Value = Product> {
    (1i64..50, "[A-Za-z]{1,16}", 0u32..100_000, 0i64..1_000)
        .prop_map(|(id, name, cents, stock)| Product::new(id, name, cents as f64 / 100.0, stock))
}

fn catalog_strategy() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec(product_strategy(), 0..20)
}

#[derive(Debug, Clone)]
enum AccessOp {
    Read(i64),
    SetStock(i64, i64),
    SetName(i64, String),
}

fn access_op_strategy() -> impl Strategy<Value = AccessOp> {
    prop_oneof![
        (1i64..60).prop_map(AccessOp::Read),
        (1i64..60, 0i64..1_000).prop_map(|(id, stock)| AccessOp::SetStock(id, stock)),
        (1i64..60, "[a-z]{1,8}").prop_map(|(id, name)| AccessOp::SetName(id, name)),
    ]
}

fn accessor_over(store: Arc<MemoryStore>, cache: Arc<MemoryCache>) -> CacheAside {
    let options = AccessorOptions {
        invalidation_backoff: Duration::from_millis(1),
        ..AccessorOptions::default()
    };
    CacheAside::new(store, cache, options)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // A read on a cold cache returns the store's value and caches an equal
    // snapshot; absent ids return None and leave no entry behind.
    #[test]
    fn prop_read_through_matches_store(catalog in catalog_strategy(), id in 1i64..60) {
        let store = Arc::new(MemoryStore::with_products(catalog));
        let cache = Arc::new(MemoryCache::new(1_000));
        let accessor = accessor_over(store.clone(), cache.clone());

        block_on(async {
            let expected = store.find_by_id(id).await.unwrap();
            let got = accessor.read(id).await.unwrap();
            prop_assert_eq!(&got, &expected);

            let key = accessor.cache_key(id);
            let cached = cache.get(key.as_str()).await.unwrap();
            match expected {
                Some(product) => {
                    let cached = cached.expect("hit should be cached");
                    prop_assert_eq!(Product::from_cache_bytes(&cached).unwrap(), product);
                }
                None => {
                    prop_assert!(cached.is_none(), "absence must not be cached");
                }
            }
            Ok(())
        })?;
    }

    // Whatever the interleaving of reads and writes, every read agrees with
    // the backing store at that moment.
    #[test]
    fn prop_reads_never_stale_after_writes(
        catalog in catalog_strategy(),
        ops in prop::collection::vec(access_op_strategy(), 1..60)
    ) {
        let store = Arc::new(MemoryStore::with_products(catalog));
        let cache = Arc::new(MemoryCache::new(1_000));
        let accessor = accessor_over(store.clone(), cache);

        block_on(async {
            for op in ops {
                match op {
                    AccessOp::Read(id) => {
                        let truth = store.find_by_id(id).await.unwrap();
                        prop_assert_eq!(accessor.read(id).await.unwrap(), truth);
                    }
                    AccessOp::SetStock(id, stock) => {
                        let existed = store.find_by_id(id).await.unwrap().is_some();
                        let outcome = accessor
                            .write_fields(id, [("stock", FieldValue::Int(stock))])
                            .await
                            .unwrap();
                        prop_assert_eq!(matches!(outcome, WriteOutcome::Updated { .. }), existed);
                    }
                    AccessOp::SetName(id, name) => {
                        accessor
                            .write_fields(id, [("name", FieldValue::Text(name))])
                            .await
                            .unwrap();
                    }
                }
            }
            Ok(())
        })?;
    }

    // Hits and misses always add up to the number of reads issued, and the
    // store is consulted only on misses.
    #[test]
    fn prop_store_reads_equal_misses(
        catalog in catalog_strategy(),
        ids in prop::collection::vec(1i64..60, 1..40)
    ) {
        let store = Arc::new(MemoryStore::with_products(catalog));
        let cache = Arc::new(MemoryCache::new(1_000));
        let accessor = accessor_over(store.clone(), cache);
        let reads = ids.len() as u64;

        block_on(async {
            for id in ids {
                accessor.read(id).await.unwrap();
            }
            Ok::<_, TestCaseError>(())
        })?;

        let stats = accessor.stats();
        prop_assert_eq!(stats.hits + stats.misses, reads);
        prop_assert_eq!(stats.store_reads, stats.misses);
        prop_assert_eq!(store.find_calls(), stats.misses);
    }

    // Any accepted price survives the trip through the cache bit for bit.
    #[test]
    fn prop_cached_price_matches_store(
        price in any::<f64>().prop_filter("accepted price", |p| p.is_finite() && *p >= 0.0)
    ) {
        let store = Arc::new(MemoryStore::seeded());
        let cache = Arc::new(MemoryCache::new(1_000));
        let accessor = accessor_over(store.clone(), cache);

        block_on(async {
            accessor.write_fields(101, [("price", FieldValue::Float(price))]).await.unwrap();

            let miss = accessor.read(101).await.unwrap().unwrap();
            let hit = accessor.read(101).await.unwrap().unwrap();
            prop_assert_eq!(miss.price.to_bits(), price.to_bits());
            prop_assert_eq!(hit.price.to_bits(), price.to_bits());
            prop_assert_eq!(accessor.stats().hits, 1);
            Ok(())
        })?;
    }
}
