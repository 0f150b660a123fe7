use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures::TryStreamExt;

use store::{StoreClient, StoreError};

use super::{error_response, not_found_response};

/// Extensions that get an explicit `image/*` content type.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "gif"];

/// Content type forced for common image extensions, matched case-insensitively.
pub fn image_content_type(path: &str) -> Option<String> {
    let (_, extension) = path.rsplit_once('.')?;
    IMAGE_EXTENSIONS
        .iter()
        .find(|known| extension.eq_ignore_ascii_case(known))
        .map(|known| format!("image/{known}"))
}

/// Stream an object's bytes into the response body.
///
/// Headers are committed before the body is read, so an error part-way
/// through the object can only be logged; the connection is then cut.
pub async fn stream(store: &dyn StoreClient, path: &str) -> Response {
    match store.exists(path).await {
        Ok(true) => {}
        Ok(false) => return missing(path),
        Err(e) => {
            tracing::error!("Failed to check '{}': {}", path, e);
            return error_response();
        }
    }

    let reader = match store.open(path).await {
        Ok(reader) => reader,
        // removed since the existence check
        Err(StoreError::NotFound(_)) => return missing(path),
        Err(e) => {
            tracing::error!("Failed to open '{}': {}", path, e);
            return error_response();
        }
    };

    let content_type = image_content_type(path).or(reader.content_type);
    let key = path.to_string();
    let body = Body::from_stream(reader.stream.inspect_err(move |e| {
        tracing::error!("Error while reading file '{}': {}", key, e);
    }));

    let mut response = Response::builder().status(StatusCode::OK);
    if let Some(content_type) = content_type {
        response = response.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(size) = reader.size {
        response = response.header(header::CONTENT_LENGTH, size);
    }

    response.body(body).unwrap_or_else(|e| {
        tracing::error!("Failed to build response for '{}': {}", path, e);
        error_response()
    })
}

fn missing(path: &str) -> Response {
    not_found_response(&format!("No such file: '{}'", path))
}
