//! Object storage backend (GCS/S3/local filesystem/memory) implementing
//! [`StoreClient`] on top of the `object_store` crate.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, ObjectStore};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::{ListPage, ListQuery, ObjectEntry, ObjectReader, StoreClient, DELIMITER};
use crate::error::{Result, StoreError};

/// Configuration for the object storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectStoreConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    ///  Credentials are read from the standard AWS environment variables.
    S3 {
        /// Bucket name
        bucket: String,
        /// Optional endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: Option<String>,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },

    /// Google Cloud Storage
    ///  Credentials are read from the standard Google environment variables.
    Gcs {
        /// Bucket name
        bucket: String,
    },
}

impl ObjectStoreConfig {
    /// Bucket name for cloud backends.
    pub fn bucket(&self) -> Option<&str> {
        match self {
            ObjectStoreConfig::S3 { bucket, .. } | ObjectStoreConfig::Gcs { bucket } => {
                Some(bucket)
            }
            ObjectStoreConfig::Memory | ObjectStoreConfig::Local { .. } => None,
        }
    }
}

/// Read-only view of an object storage backend.
///
/// Prefix listings use the backend's native delimiter listing. `object_store`
/// follows the provider's continuation tokens internally, so every listing
/// comes back as a single terminal page.
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<dyn ObjectStore>,
}

impl Storage {
    /// Create a new storage backend from configuration.
    pub async fn new(config: ObjectStoreConfig) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match &config {
            ObjectStoreConfig::Memory => Arc::new(InMemory::new()),

            ObjectStoreConfig::Local { path } => {
                if !path.is_dir() {
                    return Err(StoreError::InvalidConfig(format!(
                        "local store root {} is not a directory",
                        path.display()
                    )));
                }
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                )
            }

            ObjectStoreConfig::S3 {
                bucket,
                endpoint,
                region,
            } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"));
                if let Some(endpoint) = endpoint {
                    let url = Url::parse(endpoint).map_err(|e| {
                        StoreError::InvalidConfig(format!("invalid endpoint {endpoint}: {e}"))
                    })?;
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(url.scheme() == "http");
                }
                let store: Arc<dyn ObjectStore> = Arc::new(
                    builder
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                );
                probe_bucket(store.as_ref(), bucket).await?;
                store
            }

            ObjectStoreConfig::Gcs { bucket } => {
                let store: Arc<dyn ObjectStore> = Arc::new(
                    GoogleCloudStorageBuilder::from_env()
                        .with_bucket_name(bucket)
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                );
                probe_bucket(store.as_ref(), bucket).await?;
                store
            }
        };

        tracing::info!(?config, "object store ready");
        Ok(Self::from_object_store(inner))
    }

    /// Wrap an already constructed `object_store` backend.
    pub fn from_object_store(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    fn object_path(key: &str) -> ObjectPath {
        ObjectPath::from(key)
    }
}

/// Fail fast if the bucket doesn't exist by pulling a single listing entry.
async fn probe_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<()> {
    let mut stream = store.list(None);
    match stream.try_next().await {
        // Bucket exists (may or may not have items)
        Ok(_) => Ok(()),
        Err(object_store::Error::NotFound { .. }) => {
            Err(StoreError::BucketNotFound(bucket.to_string()))
        }
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("NoSuchBucket") || msg.contains("bucket") && msg.contains("not") {
                return Err(StoreError::BucketNotFound(bucket.to_string()));
            }
            Err(e.into())
        }
    }
}

#[async_trait]
impl StoreClient for Storage {
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.inner.head(&Self::object_path(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, key: &str) -> Result<ObjectReader> {
        let result = match self.inner.get(&Self::object_path(key)).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| {
                let value: &str = value.as_ref();
                value.to_string()
            });
        let size = Some(result.meta.size as u64);
        let stream = result.into_stream().map_err(StoreError::from).boxed();

        Ok(ObjectReader {
            content_type,
            size,
            stream,
        })
    }

    async fn list_page(&self, query: &ListQuery, token: Option<&str>) -> Result<ListPage> {
        if query.delimiter != DELIMITER {
            return Err(StoreError::UnsupportedDelimiter(query.delimiter));
        }
        // listings are never split, so no page hands out a token
        if let Some(token) = token {
            return Err(StoreError::InvalidToken(token.to_string()));
        }

        let prefix = ObjectPath::from(query.prefix.as_str());
        let prefix = (!prefix.as_ref().is_empty()).then_some(&prefix);
        let result = self.inner.list_with_delimiter(prefix).await?;

        // the local filesystem reports entries in directory order
        let mut prefixes: Vec<String> = result
            .common_prefixes
            .iter()
            .map(|p| format!("{}{}", p, DELIMITER))
            .collect();
        prefixes.sort_unstable();

        let mut objects: Vec<ObjectEntry> = result
            .objects
            .into_iter()
            .map(|meta| ObjectEntry {
                key: meta.location.to_string(),
                size: meta.size as u64,
                last_modified: Some(meta.last_modified),
            })
            .collect();
        objects.sort_unstable_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(
            prefix = %query.prefix,
            objects = objects.len(),
            prefixes = prefixes.len(),
            "listed prefix"
        );
        Ok(ListPage {
            objects,
            prefixes,
            next_token: None,
        })
    }
}
