//! In-process stand-in for a real object store.
//!
//! Listing pages are scripted per prefix so tests can pin down exactly what
//! the store reports on each page, including continuation tokens and
//! failures part-way through.
//!
//! ```rust,ignore
//! let store = ScriptedStore::new()
//!     .with_object("docs/readme.txt", "hello")
//!     .with_pages("docs/", vec![
//!         ScriptedPage::new().folders(["docs/a/"]),
//!         ScriptedPage::new().files(["docs/readme.txt"]),
//!     ]);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::client::{ListPage, ListQuery, ObjectEntry, ObjectReader, StoreClient};
use crate::error::{Result, StoreError};

/// Description of one listing page before continuation tokens are assigned.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    folders: Vec<String>,
    files: Vec<String>,
    fail: bool,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folders.extend(folders.into_iter().map(Into::into));
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Requesting this page fails with a transport error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct ScriptedObject {
    data: Bytes,
    content_type: Option<String>,
    /// Yield the data, then fail the stream
    broken: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedStore {
    objects: HashMap<String, ScriptedObject>,
    pages: HashMap<String, Vec<ScriptedPage>>,
    failing_keys: HashSet<String>,
    list_calls: AtomicUsize,
    queries: Mutex<Vec<(ListQuery, Option<String>)>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.insert(
            key.into(),
            ScriptedObject {
                data: data.into(),
                content_type: None,
                broken: false,
            },
        );
        self
    }

    pub fn with_typed_object(
        mut self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        self.objects.insert(
            key.into(),
            ScriptedObject {
                data: data.into(),
                content_type: Some(content_type.into()),
                broken: false,
            },
        );
        self
    }

    /// An object whose stream errors after its data has been sent.
    pub fn with_broken_object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.insert(
            key.into(),
            ScriptedObject {
                data: data.into(),
                content_type: None,
                broken: true,
            },
        );
        self
    }

    /// Any call touching this key fails with a transport error.
    pub fn with_failing_key(mut self, key: impl Into<String>) -> Self {
        self.failing_keys.insert(key.into());
        self
    }

    /// Script the pages returned for `prefix`. Prefixes without a script
    ///  list as a single empty page.
    pub fn with_pages(mut self, prefix: impl Into<String>, pages: Vec<ScriptedPage>) -> Self {
        self.pages.insert(prefix.into(), pages);
        self
    }

    /// Number of `list_page` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Every `(query, token)` pair received, in order.
    pub fn queries(&self) -> Vec<(ListQuery, Option<String>)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if self.failing_keys.contains(key) {
            return Err(StoreError::Transport(format!("injected failure for {key}")));
        }
        Ok(())
    }
}

fn page_token(index: usize) -> String {
    format!("page-{index}")
}

fn parse_token(token: &str) -> Result<usize> {
    token
        .strip_prefix("page-")
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| StoreError::InvalidToken(token.to_string()))
}

#[async_trait]
impl StoreClient for ScriptedStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_key(key)?;
        Ok(self.objects.contains_key(key))
    }

    async fn open(&self, key: &str) -> Result<ObjectReader> {
        self.check_key(key)?;
        let object = self
            .objects
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let mut chunks: Vec<Result<Bytes>> = vec![Ok(object.data.clone())];
        if object.broken {
            chunks.push(Err(StoreError::Transport(format!(
                "stream interrupted for {key}"
            ))));
        }

        Ok(ObjectReader {
            content_type: object.content_type.clone(),
            size: (!object.broken).then_some(object.data.len() as u64),
            stream: stream::iter(chunks).boxed(),
        })
    }

    async fn list_page(&self, query: &ListQuery, token: Option<&str>) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.clone(), token.map(str::to_string)));
        }
        self.check_key(&query.prefix)?;

        let index = token.map(parse_token).transpose()?.unwrap_or(0);
        let Some(script) = self.pages.get(&query.prefix) else {
            return match index {
                0 => Ok(ListPage::default()),
                _ => Err(StoreError::InvalidToken(page_token(index))),
            };
        };
        let page = script
            .get(index)
            .ok_or_else(|| StoreError::InvalidToken(page_token(index)))?;
        if page.fail {
            return Err(StoreError::Transport(format!(
                "listing {} failed on page {index}",
                query.prefix
            )));
        }

        let objects = page
            .files
            .iter()
            .map(|key| {
                let size = self
                    .objects
                    .get(key)
                    .map(|o| o.data.len() as u64)
                    .unwrap_or_default();
                ObjectEntry::new(key.clone(), size)
            })
            .collect();
        let next_token = (index + 1 < script.len()).then(|| page_token(index + 1));

        Ok(ListPage {
            objects,
            prefixes: page.folders.clone(),
            next_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::pages;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_scripted_pages_chain_tokens() {
        let store = ScriptedStore::new().with_pages(
            "docs/",
            vec![
                ScriptedPage::new().folders(["docs/a/"]),
                ScriptedPage::new().files(["docs/readme.txt"]),
            ],
        );
        let query = ListQuery::new("docs/");
        let all: Vec<ListPage> = pages(&store, &query).try_collect().await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(all[0].next_token.as_deref(), Some("page-1"));
        assert_eq!(all[1].next_token, None);
        assert_eq!(store.list_calls(), 2);
        let tokens: Vec<_> = store.queries().into_iter().map(|(_, t)| t).collect();
        assert_eq!(tokens, vec![None, Some("page-1".to_string())]);
    }

    #[tokio::test]
    async fn test_unscripted_prefix_is_empty() {
        let store = ScriptedStore::new();
        let page = store
            .list_page(&ListQuery::new("nothing/"), None)
            .await
            .unwrap();
        assert_eq!(page, ListPage::default());
    }

    #[tokio::test]
    async fn test_pages_stop_after_error() {
        let store = ScriptedStore::new().with_pages(
            "x/",
            vec![
                ScriptedPage::new().folders(["x/a/"]),
                ScriptedPage::failing(),
                ScriptedPage::new().files(["x/never.txt"]),
            ],
        );
        let query = ListQuery::new("x/");
        let results: Vec<Result<ListPage>> = pages(&store, &query).collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(StoreError::Transport(_))));
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_broken_object_fails_mid_stream() {
        let store = ScriptedStore::new().with_broken_object("a.bin", "abc");
        let reader = store.open("a.bin").await.unwrap();
        let chunks: Vec<Result<Bytes>> = reader.stream.collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap(), &Bytes::from_static(b"abc"));
        assert!(chunks[1].is_err());
    }
}
