/**
 * Request path handling.
 *  - Normalizing raw request paths into store keys
 *  - Deciding whether a path names a file or a directory
 */
pub mod path;
/**
 * Turns a flat namespace of object keys into a
 *  virtual directory by walking every page of a
 *  prefix query.
 */
pub mod listing;
/**
 * Relative navigation links for a directory path.
 */
pub mod breadcrumbs;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::breadcrumbs::{build_breadcrumbs, Breadcrumb};
    pub use crate::listing::{list_directory, DirectoryIndex, Listing, ListingError};
    pub use crate::path::{classify, normalize, PathKind, SEPARATOR};
    pub use crate::version::build_info;
}
