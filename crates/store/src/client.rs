//! The capability the rest of the workspace needs from an object store:
//! existence checks, streaming reads and paginated prefix listings.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, Stream};

use crate::error::{Result, StoreError};

/// Hierarchy separator used for prefix-delimited listings.
pub const DELIMITER: char = '/';

/// A single stored object as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }
}

/// Parameters of one logical prefix query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Only keys starting with this string are reported
    pub prefix: String,
    /// Keys sharing `prefix` up to the next delimiter collapse
    ///  into a single sub-prefix
    pub delimiter: char,
}

impl ListQuery {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: DELIMITER,
        }
    }
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<ObjectEntry>,
    /// Common sub-prefixes, each ending in the delimiter
    pub prefixes: Vec<String>,
    /// Opaque cursor for the next page, `None` on the terminal page
    pub next_token: Option<String>,
}

/// A readable object body plus whatever metadata the store reported.
pub struct ObjectReader {
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub stream: BoxStream<'static, Result<Bytes>>,
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Whether an object with exactly this key exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Open a streaming reader over the object's contents.
    async fn open(&self, key: &str) -> Result<ObjectReader>;

    /// Fetch a single listing page. `token` is the `next_token` of the
    ///  previous page, or `None` for the first page.
    async fn list_page(&self, query: &ListQuery, token: Option<&str>) -> Result<ListPage>;
}

pub type DynStoreClient = Arc<dyn StoreClient>;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Walk every page of a prefix query in order.
///
/// Each page is only requested once the previous one has been received, and
/// the stream ends after the first page without a continuation token. An
/// error is yielded once and then the stream ends.
pub fn pages<'a>(
    client: &'a dyn StoreClient,
    query: &'a ListQuery,
) -> impl Stream<Item = Result<ListPage>> + Send + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return Ok::<_, StoreError>(None),
        };

        tracing::trace!(prefix = %query.prefix, ?token, "requesting listing page");
        let page = client.list_page(query, token.as_deref()).await?;
        let next = match &page.next_token {
            Some(token) => Cursor::Next(token.clone()),
            None => Cursor::Done,
        };
        Ok::<_, StoreError>(Some((page, next)))
    })
}
