use crate::path::SEPARATOR;

/// Label of the first breadcrumb, pointing at the top of the bucket.
pub const ROOT_LABEL: &str = "<root>";

/// Token for stepping up one directory.
const PARENT: &str = "..";

/// One ancestor link shown above a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// Relative link from the current directory to the ancestor
    pub link: String,
}

/// Build the breadcrumb trail for a directory path.
///
/// The trail holds one entry per ancestor, root first; the directory itself
/// is left out. Links are relative, so each is just the right number of
/// `..` hops: the nearest ancestor is always `..`.
pub fn build_breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    if path.is_empty() {
        return Vec::new();
    }

    let trimmed = path.strip_suffix(SEPARATOR).unwrap_or(path);
    let mut labels: Vec<&str> = std::iter::once(ROOT_LABEL)
        .chain(trimmed.split(SEPARATOR))
        .collect();
    labels.pop();

    let depth = labels.len();
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| Breadcrumb {
            label: format!("{label}{SEPARATOR}"),
            link: vec![PARENT; depth - i].join("/"),
        })
        .collect()
}
