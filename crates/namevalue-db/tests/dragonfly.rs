//! Integration tests for the `Dragonfly` backend.
//!
//! These tests require a live `Dragonfly` (or Redis) instance. Run with:
//!
//! ```bash
//! docker run -d -p 6379:6379 docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p namevalue-db -- --ignored
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

use namevalue_db::{DragonflyPool, KvStore, PARTICIPANTS_KEY};

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_set_get_flush() {
    let pool = DragonflyPool::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly");
    let store = KvStore::Dragonfly(pool.clone());

    store.set(PARTICIPANTS_KEY, "[]").await.unwrap();
    assert_eq!(
        store.get(PARTICIPANTS_KEY).await.unwrap().as_deref(),
        Some("[]")
    );

    pool.flush_all().await.unwrap();
    assert_eq!(store.get(PARTICIPANTS_KEY).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_json_helpers() {
    let pool = DragonflyPool::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly");
    let store = KvStore::Dragonfly(pool.clone());

    store.set_json("test:numbers", &vec![1_u64, 2, 3]).await.unwrap();
    let back: Option<Vec<u64>> = store.get_json("test:numbers").await.unwrap();
    assert_eq!(back, Some(vec![1, 2, 3]));

    pool.flush_all().await.unwrap();
}
