use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Hierarchy separator shared by request paths and object keys.
pub const SEPARATOR: char = '/';

/// Characters left untouched when encoding a single path component:
///  alphanumerics plus `-_.!~*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// Turn the path of an incoming request into a store key: drop a single
/// leading separator and percent-decode the rest. Invalid UTF-8 is replaced
/// rather than rejected.
pub fn normalize(request_path: &str) -> String {
    let trimmed = request_path
        .strip_prefix(SEPARATOR)
        .unwrap_or(request_path);
    percent_decode_str(trimmed).decode_utf8_lossy().into_owned()
}

/// Decide whether `path` names a file.
///
/// A path is a file when its last segment has an extension: a `.` that is
/// neither the segment's first character nor its last. Anything else,
/// including every path ending in the separator, is a directory.
pub fn classify(path: &str) -> PathKind {
    let segment = match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    };

    match segment.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < segment.len() => PathKind::File,
        _ => PathKind::Directory,
    }
}

/// Percent-encode a single path component. Separators are encoded too.
pub fn encode_component(component: &str) -> Cow<'_, str> {
    utf8_percent_encode(component, COMPONENT).into()
}
