//! Catalog fetcher tests against a local HTTP listener.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use memeboard::{
    CatalogFetcher, Error, FetchStatus, ImgflipFetcher, MemeStore, MemoryKeyValueStore,
    RandomEnricher,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves a single HTTP response and returns the endpoint URL.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0_u8; 4096];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/get_memes")
}

const CATALOG: &str = r#"{"success":true,"data":{"memes":[
    {"id":"181913649","name":"Drake Hotline Bling","url":"https://i.imgflip.com/30b1gx.jpg","width":1200,"height":1200,"box_count":2,"captions":1385000},
    {"id":"87743020","name":"Two Buttons","url":"https://i.imgflip.com/1g8my4.jpg","width":600,"height":908,"box_count":3}
]}}"#;

#[tokio::test]
async fn test_fetch_from_endpoint() {
    let endpoint = serve_once("200 OK", CATALOG).await;
    let memes = ImgflipFetcher::new()
        .with_endpoint(endpoint)
        .fetch()
        .await
        .unwrap();
    assert_eq!(memes.len(), 2);
    assert_eq!(memes[1].name, "Two Buttons");
}

#[tokio::test]
async fn test_store_fetch_enriches_catalog() {
    let endpoint = serve_once("200 OK", CATALOG).await;
    let fetcher = ImgflipFetcher::new().with_endpoint(endpoint);
    let mut store =
        MemeStore::new(MemoryKeyValueStore::new()).with_enricher(RandomEnricher::seeded(42));

    store.fetch_catalog(&fetcher).await.unwrap();
    assert_eq!(store.status(), FetchStatus::Succeeded);
    for meme in store.catalog() {
        assert!(meme.likes < 1000);
        assert!(meme.category.is_some());
        assert!(meme.date.is_some());
        assert!(meme.user.is_none());
    }
}

#[tokio::test]
async fn test_unsuccessful_payload_marks_store_failed() {
    let endpoint = serve_once("200 OK", r#"{"success":false}"#).await;
    let fetcher = ImgflipFetcher::new().with_endpoint(endpoint);
    let mut store = MemeStore::new(MemoryKeyValueStore::new());

    let result = store.fetch_catalog(&fetcher).await;
    assert!(matches!(result, Err(Error::Fetch(_))));
    assert_eq!(store.status(), FetchStatus::Failed);
    assert_eq!(store.error(), Some("Failed to fetch memes"));
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let endpoint = serve_once("503 Service Unavailable", "{}").await;
    let result = ImgflipFetcher::new().with_endpoint(endpoint).fetch().await;
    assert!(matches!(result, Err(Error::Fetch(ref m)) if m.contains("503")));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_fetch_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = ImgflipFetcher::new()
        .with_endpoint(format!("http://{addr}/get_memes"))
        .fetch()
        .await;
    assert!(matches!(result, Err(Error::Fetch(_))));
}
