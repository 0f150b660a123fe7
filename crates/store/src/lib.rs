//! Object store access for the bucket index gateway.
//!
//! The rest of the workspace only talks to storage through the
//! [`StoreClient`] trait: an existence check, a streaming read and a
//! paginated prefix listing. [`Storage`] implements it on top of the
//! `object_store` crate (GCS, S3/MinIO, local filesystem, in-memory) and
//! [`testkit::ScriptedStore`] is a scripted fake for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use store::{pages, ListQuery, ObjectStoreConfig, Storage};
//!
//! # async fn example() -> Result<(), store::StoreError> {
//! let storage = Storage::new(ObjectStoreConfig::Gcs {
//!     bucket: "my-bucket".to_string(),
//! })
//! .await?;
//!
//! let query = ListQuery::new("photos/");
//! let mut listing = std::pin::pin!(pages(&storage, &query));
//! while let Some(page) = listing.try_next().await? {
//!     println!("{:?}", page.prefixes);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod storage;
pub mod testkit;

pub use client::{
    pages, DynStoreClient, ListPage, ListQuery, ObjectEntry, ObjectReader, StoreClient, DELIMITER,
};
pub use error::{Result, StoreError};
pub use storage::{ObjectStoreConfig, Storage};
