//! Integration tests for the object_store backed client

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;

use store::{pages, ListPage, ListQuery, ObjectStoreConfig, Storage, StoreClient};

async fn memory_storage(keys: &[&str]) -> Storage {
    let inner = Arc::new(InMemory::new());
    for key in keys {
        inner
            .put(&ObjectPath::from(*key), Bytes::from_static(b"x").into())
            .await
            .unwrap();
    }
    Storage::from_object_store(inner)
}

#[tokio::test]
async fn test_local_backend_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("photos/2024")).unwrap();
    std::fs::write(dir.path().join("photos/2024/cat.png"), b"png-bytes").unwrap();
    std::fs::write(dir.path().join("photos/notes.txt"), b"notes").unwrap();

    let storage = Storage::new(ObjectStoreConfig::Local {
        path: dir.path().to_path_buf(),
    })
    .await
    .unwrap();

    assert!(storage.exists("photos/2024/cat.png").await.unwrap());
    assert!(!storage.exists("photos/2024/dog.png").await.unwrap());

    let reader = storage.open("photos/notes.txt").await.unwrap();
    let body: Vec<Bytes> = reader.stream.try_collect().await.unwrap();
    assert_eq!(body.concat(), b"notes");

    let page = storage
        .list_page(&ListQuery::new("photos/"), None)
        .await
        .unwrap();
    let prefixes: BTreeSet<_> = page.prefixes.into_iter().collect();
    assert_eq!(prefixes, BTreeSet::from(["photos/2024/".to_string()]));
    let keys: Vec<_> = page.objects.into_iter().map(|o| o.key).collect();
    assert_eq!(keys, vec!["photos/notes.txt".to_string()]);
}

#[tokio::test]
async fn test_pages_report_direct_children_only() {
    let storage = memory_storage(&[
        "root/a.txt",
        "root/b/1.txt",
        "root/b/2.txt",
        "root/c/1.txt",
        "root/d.txt",
        "root/e/f/g.txt",
    ])
    .await;

    let query = ListQuery::new("root/");
    let all: Vec<ListPage> = pages(&storage, &query).try_collect().await.unwrap();
    assert_eq!(all.len(), 1);

    let page = &all[0];
    assert_eq!(page.prefixes, vec!["root/b/", "root/c/", "root/e/"]);
    let files: Vec<_> = page.objects.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(files, vec!["root/a.txt", "root/d.txt"]);
    assert!(page.next_token.is_none());
}

#[tokio::test]
async fn test_local_backend_lists_every_entry() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("d");
    std::fs::create_dir_all(&base).unwrap();
    // created out of key order so directory order differs from sorted order
    for i in (0..30).rev() {
        std::fs::write(base.join(format!("file-{i:02}.txt")), b"x").unwrap();
    }
    for name in ["zeta", "alpha", "mid"] {
        std::fs::create_dir_all(base.join(name)).unwrap();
        std::fs::write(base.join(name).join("inner.txt"), b"y").unwrap();
    }

    let storage = Storage::new(ObjectStoreConfig::Local {
        path: dir.path().to_path_buf(),
    })
    .await
    .unwrap();

    let query = ListQuery::new("d/");
    let all: Vec<ListPage> = pages(&storage, &query).try_collect().await.unwrap();
    let files: Vec<String> = all
        .iter()
        .flat_map(|p| p.objects.iter().map(|o| o.key.clone()))
        .collect();
    let prefixes: Vec<String> = all.iter().flat_map(|p| p.prefixes.clone()).collect();

    let expected: Vec<String> = (0..30).map(|i| format!("d/file-{i:02}.txt")).collect();
    assert_eq!(files, expected);
    assert_eq!(prefixes, vec!["d/alpha/", "d/mid/", "d/zeta/"]);
}

#[tokio::test]
async fn test_empty_prefix_lists_nothing() {
    let storage = memory_storage(&["a/b.txt"]).await;
    let page = storage
        .list_page(&ListQuery::new("zzz/"), None)
        .await
        .unwrap();
    assert_eq!(page, ListPage::default());
}
