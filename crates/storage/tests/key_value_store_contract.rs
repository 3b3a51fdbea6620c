use std::sync::Arc;

use storage::{KeyValueStore, MemoryStore, Storage};

async fn exercise(store: Arc<dyn KeyValueStore>) {
    for (key, value) in [
        ("userToken", "t1"),
        ("userEmail", "e1"),
        ("userName", "n1"),
        ("userNumber", "123"),
    ] {
        store.set(key, value).await.expect("set");
    }

    assert_eq!(store.entries().await.expect("entries").len(), 4);

    store.remove("userEmail").await.expect("remove");
    assert_eq!(store.get("userEmail").await.expect("get"), None);
    assert_eq!(
        store.get("userToken").await.expect("get"),
        Some("t1".to_string())
    );
    assert_eq!(store.entries().await.expect("entries").len(), 3);
}

#[tokio::test]
async fn sqlite_store_keeps_keys_independent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    exercise(Arc::new(storage)).await;
}

#[tokio::test]
async fn memory_store_keeps_keys_independent() {
    exercise(Arc::new(MemoryStore::new())).await;
}
