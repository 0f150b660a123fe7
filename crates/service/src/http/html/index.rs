use askama::Template;

use common::breadcrumbs::Breadcrumb;
use common::listing::Listing;
use common::path::{encode_component, SEPARATOR};

/// A folder or file as shown in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLink {
    /// Key relative to the directory being viewed
    pub label: String,
    /// Percent-encoded relative link
    pub href: String,
}

/// Template for a directory index
#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub path: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub folders: Vec<EntryLink>,
    pub files: Vec<EntryLink>,
}

impl IndexTemplate {
    pub fn new(path: &str, listing: &Listing, breadcrumbs: Vec<Breadcrumb>) -> Self {
        let folders = listing
            .folders
            .iter()
            .map(|folder| {
                let relative = relative_key(path, folder);
                let label = relative.strip_suffix(SEPARATOR).unwrap_or(relative);
                EntryLink {
                    label: label.to_string(),
                    href: format!("{}{}", encode_component(label), SEPARATOR),
                }
            })
            .collect();

        let files = listing
            .files
            .iter()
            .map(|file| {
                let label = relative_key(path, &file.key);
                EntryLink {
                    label: label.to_string(),
                    href: encode_component(label).into_owned(),
                }
            })
            .collect();

        Self {
            path: path.to_string(),
            breadcrumbs,
            folders,
            files,
        }
    }
}

/// Render the index page for `path`.
pub fn render(
    path: &str,
    listing: &Listing,
    breadcrumbs: Vec<Breadcrumb>,
) -> Result<String, askama::Error> {
    IndexTemplate::new(path, listing, breadcrumbs).render()
}

/// Strip the directory being viewed (and a separator right after it) from `key`.
fn relative_key<'a>(path: &str, key: &'a str) -> &'a str {
    let relative = key.strip_prefix(path).unwrap_or(key);
    relative.strip_prefix(SEPARATOR).unwrap_or(relative)
}
