//! Tests for the memoized call variants

mod common;

#[cfg(test)]
mod tests {
    use super::common::setup_test_client;
    use memoreq::{MemoryCache, RequestClient, RequestConfig, RequestError, cache_key};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(60);

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u64,
    }

    /// Key of a GET descriptor with no query, as the client derives it.
    fn get_key(base: &str, path: &str) -> String {
        cache_key::derive(&format!("{}/{}?", base, path), None)
    }

    #[tokio::test]
    async fn test_get_cached_populates_store() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(1)
            .create_async()
            .await;

        let result: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
        assert_eq!(result, Some(Item { id: 1 }));

        assert_eq!(client.cache().len(), 1);
        let key = get_key(&server.url(), "item");
        assert!(client.cache().get(&key).is_some(), "entry under derived key");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_call_skips_network() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(1)
            .create_async()
            .await;

        let first: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
        let second: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
        assert_eq!(first, Some(Item { id: 1 }));
        assert_eq!(first, second);

        // One network call for two requests
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches_and_overwrites() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(2)
            .create_async()
            .await;

        let ttl = Duration::from_millis(100);
        let _: Option<Item> = client.get_cached("item", &[], ttl).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let refreshed: Option<Item> = client.get_cached("item", &[], ttl).await.unwrap();

        assert_eq!(refreshed, Some(Item { id: 1 }));
        assert_eq!(client.cache().len(), 1, "entry overwritten, not duplicated");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_store_untouched() {
        let cache = MemoryCache::new();
        let config = RequestConfig::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(1))
            .with_cache(cache.clone());
        let client = RequestClient::new(config).unwrap();

        let result: memoreq::Result<Option<Item>> = client.get_cached("item", &[], TTL).await;
        assert!(matches!(result, Err(RequestError::Transport { .. })));
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cold_key() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move {
                    let value: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
                    assert_eq!(value, Some(Item { id: 1 }));
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        // Racing misses may each have fetched; the store ends with one
        // valid entry regardless
        assert_eq!(client.cache().len(), 1);
        let value: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
        assert_eq!(value, Some(Item { id: 1 }));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_cached_distinct_bodies_have_independent_entries() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("POST", "/find")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(2)
            .create_async()
            .await;

        let _: Option<Item> = client
            .post_cached("find", &Item { id: 1 }, TTL)
            .await
            .unwrap();
        let _: Option<Item> = client
            .post_cached("find", &Item { id: 2 }, TTL)
            .await
            .unwrap();

        assert_eq!(client.cache().len(), 2);

        // Repeats of both descriptors are now hits
        let _: Option<Item> = client
            .post_cached("find", &Item { id: 1 }, TTL)
            .await
            .unwrap();
        let _: Option<Item> = client
            .post_cached("find", &Item { id: 2 }, TTL)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_undecodable_entry_falls_back_to_fetch() {
        let cache = MemoryCache::new();
        let mut server = mockito::Server::new_async().await;
        let config = RequestConfig::json(server.url()).with_cache(cache.clone());
        let client = RequestClient::new(config).unwrap();

        let key = get_key(&server.url(), "item");
        cache.set(key.clone(), b"{not json".to_vec(), TTL);

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(1)
            .create_async()
            .await;

        let result: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
        assert_eq!(result, Some(Item { id: 1 }));

        // The garbage entry was replaced by the fresh result
        let stored = cache.get(&key).unwrap();
        assert_eq!(stored, br#"{"id":1}"#.to_vec());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_body_result_roundtrips_through_cache() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body("")
            .expect(1)
            .create_async()
            .await;

        let first: Option<Item> = client.get_cached("ping", &[], TTL).await.unwrap();
        let second: Option<Item> = client.get_cached("ping", &[], TTL).await.unwrap();
        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(client.cache().len(), 1, "no-op result is cached as null");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_get_forces_refetch() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(2)
            .create_async()
            .await;

        let _: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();
        client.invalidate_get("item", &[]);
        assert!(client.cache().is_empty());

        let _: Option<Item> = client.get_cached("item", &[], TTL).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_clients_share_an_injected_store() {
        let cache = MemoryCache::new();
        let mut server = mockito::Server::new_async().await;

        let first = RequestClient::new(
            RequestConfig::json(server.url()).with_cache(cache.clone()),
        )
        .unwrap();
        let second = RequestClient::new(
            RequestConfig::json(server.url()).with_cache(cache.clone()),
        )
        .unwrap();

        let mock = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(1)
            .create_async()
            .await;

        let a: Option<Item> = first.get_cached("item", &[], TTL).await.unwrap();
        let b: Option<Item> = second.get_cached("item", &[], TTL).await.unwrap();
        assert_eq!(a, Some(Item { id: 1 }));
        assert_eq!(a, b);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_distinct_queries_cache_separately() {
        let (client, mut server) = setup_test_client().await;

        let mock = server
            .mock("GET", "/blocks")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .expect(2)
            .create_async()
            .await;

        let _: Option<Item> = client
            .get_cached("blocks", &[("page", "1")], TTL)
            .await
            .unwrap();
        let _: Option<Item> = client
            .get_cached("blocks", &[("page", "2")], TTL)
            .await
            .unwrap();

        assert_eq!(client.cache().len(), 2);

        mock.assert_async().await;
    }
}
