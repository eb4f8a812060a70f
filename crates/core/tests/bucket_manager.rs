mod common;

use std::collections::HashSet;
use std::fs;

use common::MemoryStorage;
use sitepilot_core::{BucketCreation, BucketManager, Error, SyncOptions, WebsiteDocuments};

#[tokio::test]
async fn test_init_bucket_creates_then_reuses_owned_bucket() {
    let manager = BucketManager::new(MemoryStorage::new());

    let first = manager.init_bucket("www.example.com", "us-east-2").await.unwrap();
    assert_eq!(first, BucketCreation::Created);

    let second = manager.init_bucket("www.example.com", "us-east-2").await.unwrap();
    assert_eq!(second, BucketCreation::AlreadyOwned);

    // The reused bucket works exactly like a fresh one
    manager.set_policy("www.example.com").await.unwrap();
    manager
        .configure_website("www.example.com", &WebsiteDocuments::default())
        .await
        .unwrap();
    let buckets = manager.all_buckets().await.unwrap();
    assert_eq!(buckets.len(), 1);
}

#[tokio::test]
async fn test_init_bucket_owned_by_someone_else_fails() {
    let mut storage = MemoryStorage::new();
    storage.foreign_buckets = HashSet::from(["taken.example.com".to_string()]);
    let manager = BucketManager::new(storage);

    let result = manager.init_bucket("taken.example.com", "us-east-1").await;
    assert!(matches!(result, Err(Error::AwsSdk(_))));
}

#[tokio::test]
async fn test_set_policy_grants_public_read_on_bucket() {
    let manager = BucketManager::new(MemoryStorage::new());
    manager.set_policy("site-bucket").await.unwrap();

    let policies = manager.client().policies.lock().unwrap().clone();
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].0, "site-bucket");
    assert!(policies[0].1.contains("arn:aws:s3:::site-bucket/*"));
    assert!(policies[0].1.contains("s3:GetObject"));
}

#[tokio::test]
async fn test_configure_website_documents() {
    let manager = BucketManager::new(MemoryStorage::new());
    let documents = WebsiteDocuments {
        index_document: "home.html".to_string(),
        error_document: "404.html".to_string(),
    };
    manager.configure_website("site-bucket", &documents).await.unwrap();

    let websites = manager.client().websites.lock().unwrap().clone();
    assert_eq!(websites, vec![("site-bucket".to_string(), documents)]);
}

#[tokio::test]
async fn test_get_bucket_url() {
    let manager = BucketManager::new(MemoryStorage::new());
    let url = manager.get_bucket_url("www.example.com").await.unwrap();
    assert_eq!(url, "http://www.example.com.s3-website-us-east-1.amazonaws.com");
}

#[tokio::test]
async fn test_all_objects_follows_pages() {
    let mut storage = MemoryStorage::new();
    storage.page_size = 2;
    for key in ["a.html", "b.html", "c.html", "d.html", "e.html"] {
        storage = storage.with_object(key, "\"etag\"");
    }
    let manager = BucketManager::new(storage);

    let objects = manager.all_objects("site-bucket").await.unwrap();
    let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["a.html", "b.html", "c.html", "d.html", "e.html"]);
}

#[tokio::test]
async fn test_manager_sync() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
    fs::write(dir.path().join("error.html"), "<h1>oops</h1>").unwrap();
    let manager = BucketManager::new(MemoryStorage::new());

    let report = manager
        .sync(dir.path(), "site-bucket", SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.uploaded, vec!["error.html", "index.html"]);
}
