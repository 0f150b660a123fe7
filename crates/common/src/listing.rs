use std::collections::HashSet;
use std::pin::pin;

use futures::TryStreamExt;
use store::{pages, ListQuery, ObjectEntry, StoreClient, StoreError};

use crate::path::SEPARATOR;

/// Everything found directly under one directory prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Virtual folders, full keys ending in the separator, in the order the
    ///  store first reported them
    pub folders: Vec<String>,
    /// Objects in the order the store returned them
    pub files: Vec<ObjectEntry>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Outcome of looking up a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryIndex {
    Listing(Listing),
    /// The directory must be addressed by this canonical path instead
    Redirect(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("no such folder: '{0}'")]
    NotFound(String),
    #[error("failed to list '{path}': {source}")]
    Store {
        path: String,
        #[source]
        source: StoreError,
    },
}

/// Accumulates pages of one prefix query.
#[derive(Debug, Default)]
struct ListingBuilder {
    seen_folders: HashSet<String>,
    listing: Listing,
}

impl ListingBuilder {
    fn add_folders(&mut self, folders: Vec<String>) {
        for folder in folders {
            if self.seen_folders.insert(folder.clone()) {
                self.listing.folders.push(folder);
            }
        }
    }

    fn add_files(&mut self, files: Vec<ObjectEntry>) {
        self.listing.files.extend(files);
    }

    fn finish(self) -> Listing {
        self.listing
    }
}

/// Synthesize the directory listing for `path`.
///
/// Directories are only listed under their canonical form ending in the
/// separator; any other non-root path yields [`DirectoryIndex::Redirect`]
/// without touching the store. Pages are fetched one after the other until
/// the store stops handing out continuation tokens. Folders are merged
/// across pages with duplicates collapsed; files are kept from every page.
/// If any page fails the partial listing is dropped.
#[tracing::instrument(skip(store))]
pub async fn list_directory(
    store: &dyn StoreClient,
    path: &str,
) -> Result<DirectoryIndex, ListingError> {
    if !path.is_empty() && !path.ends_with(SEPARATOR) {
        return Ok(DirectoryIndex::Redirect(format!("{path}{SEPARATOR}")));
    }

    let query = ListQuery::new(path);
    let mut listing_pages = pin!(pages(store, &query));
    let mut builder = ListingBuilder::default();
    let mut page_count = 0usize;

    while let Some(page) = listing_pages
        .try_next()
        .await
        .map_err(|source| ListingError::Store {
            path: path.to_string(),
            source,
        })?
    {
        page_count += 1;
        builder.add_folders(page.prefixes);
        builder.add_files(page.objects);
    }

    let listing = builder.finish();
    tracing::debug!(
        pages = page_count,
        folders = listing.folders.len(),
        files = listing.files.len(),
        "directory listed"
    );

    if listing.is_empty() {
        return Err(ListingError::NotFound(path.to_string()));
    }
    Ok(DirectoryIndex::Listing(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::testkit::{ScriptedPage, ScriptedStore};

    fn folders(listing: &Listing) -> Vec<&str> {
        listing.folders.iter().map(String::as_str).collect()
    }

    fn files(listing: &Listing) -> Vec<&str> {
        listing.files.iter().map(|f| f.key.as_str()).collect()
    }

    async fn expect_listing(store: &ScriptedStore, path: &str) -> Listing {
        match list_directory(store, path).await.unwrap() {
            DirectoryIndex::Listing(listing) => listing,
            other => panic!("expected listing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_redirects_without_trailing_separator() {
        let store = ScriptedStore::new();
        let index = list_directory(&store, "docs").await.unwrap();
        assert_eq!(index, DirectoryIndex::Redirect("docs/".to_string()));

        let index = list_directory(&store, "a/b/c").await.unwrap();
        assert_eq!(index, DirectoryIndex::Redirect("a/b/c/".to_string()));
        assert_eq!(store.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_root_is_listed_directly() {
        let store = ScriptedStore::new().with_pages(
            "",
            vec![ScriptedPage::new().folders(["docs/"]).files(["top.txt"])],
        );
        let listing = expect_listing(&store, "").await;
        assert_eq!(folders(&listing), vec!["docs/"]);
        assert_eq!(files(&listing), vec!["top.txt"]);
    }

    #[tokio::test]
    async fn test_merges_pages() {
        let store = ScriptedStore::new().with_pages(
            "docs/",
            vec![
                ScriptedPage::new().folders(["docs/a/"]),
                ScriptedPage::new().files(["docs/readme.txt"]),
            ],
        );
        let listing = expect_listing(&store, "docs/").await;
        assert_eq!(folders(&listing), vec!["docs/a/"]);
        assert_eq!(files(&listing), vec!["docs/readme.txt"]);
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_collapses_duplicate_folders_across_pages() {
        let store = ScriptedStore::new().with_pages(
            "d/",
            vec![
                ScriptedPage::new().folders(["d/b/", "d/a/"]),
                ScriptedPage::new().folders(["d/a/", "d/c/"]),
                ScriptedPage::new().folders(["d/c/"]).files(["d/x.txt"]),
            ],
        );
        let listing = expect_listing(&store, "d/").await;
        assert_eq!(folders(&listing), vec!["d/b/", "d/a/", "d/c/"]);
        assert_eq!(files(&listing), vec!["d/x.txt"]);
    }

    #[tokio::test]
    async fn test_files_keep_store_order_across_pages() {
        let store = ScriptedStore::new().with_pages(
            "f/",
            vec![
                ScriptedPage::new().files(["f/z.txt", "f/a.txt"]),
                ScriptedPage::new().files(["f/m.txt"]),
            ],
        );
        let listing = expect_listing(&store, "f/").await;
        assert_eq!(files(&listing), vec!["f/z.txt", "f/a.txt", "f/m.txt"]);
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_found() {
        let store = ScriptedStore::new().with_pages(
            "empty/",
            vec![ScriptedPage::new(), ScriptedPage::new()],
        );
        let err = list_directory(&store, "empty/").await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound(ref p) if p == "empty/"));
        assert_eq!(err.to_string(), "no such folder: 'empty/'");
    }

    #[tokio::test]
    async fn test_store_error_discards_partial_results() {
        let store = ScriptedStore::new().with_pages(
            "docs/",
            vec![
                ScriptedPage::new().folders(["docs/a/"]),
                ScriptedPage::failing(),
            ],
        );
        let err = list_directory(&store, "docs/").await.unwrap_err();
        match err {
            ListingError::Store { path, source } => {
                assert_eq!(path, "docs/");
                assert!(matches!(source, StoreError::Transport(_)));
            }
            other => panic!("expected store error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_passes_prefix_and_delimiter() {
        let store = ScriptedStore::new()
            .with_pages("p/", vec![ScriptedPage::new().files(["p/1.txt"])]);
        list_directory(&store, "p/").await.unwrap();

        let queries = store.queries();
        assert_eq!(queries.len(), 1);
        let (query, token) = &queries[0];
        assert_eq!(query.prefix, "p/");
        assert_eq!(query.delimiter, '/');
        assert_eq!(token, &None);
    }

    #[tokio::test]
    async fn test_listing_is_idempotent() {
        let store = ScriptedStore::new().with_pages(
            "docs/",
            vec![
                ScriptedPage::new().folders(["docs/guide/", "docs/api/"]),
                ScriptedPage::new().folders(["docs/api/"]).files(["docs/index.md"]),
            ],
        );
        let first = expect_listing(&store, "docs/").await;
        let second = expect_listing(&store, "docs/").await;
        assert_eq!(first, second);
    }
}
