use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::header::{ACCEPT, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

use common::prelude::*;
use common::path::encode_component;

pub mod content;
pub mod index;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET])
        .allow_headers(vec![ACCEPT, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(handler))
        .route("/*path", get(handler))
        .with_state(state)
        .layer(cors_layer)
}

/// Serve a bucket path: file-like paths stream the object, anything else is
/// treated as a directory.
#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>, uri: Uri) -> Response {
    let path = normalize(uri.path());

    match classify(&path) {
        PathKind::File => content::stream(state.store(), &path).await,
        PathKind::Directory => directory(&state, &path).await,
    }
}

async fn directory(state: &ServiceState, path: &str) -> Response {
    let listing = match list_directory(state.store(), path).await {
        Ok(DirectoryIndex::Listing(listing)) => listing,
        Ok(DirectoryIndex::Redirect(canonical)) => return redirect_response(&canonical),
        Err(ListingError::NotFound(path)) => {
            return not_found_response(&format!("No such folder: '{}'", path))
        }
        Err(e) => {
            tracing::error!("Failed to list directory: {}", e);
            return error_response();
        }
    };

    let breadcrumbs = build_breadcrumbs(path);
    match index::render(path, &listing, breadcrumbs) {
        Ok(html) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            html,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to render index template: {}", e);
            error_response()
        }
    }
}

/// Permanent redirect to the canonical form of a directory path.
///
/// The target is relative to the requested URL: only the directory's own
/// name plus a separator, encoded so it can never carry a scheme or host.
fn redirect_response(canonical: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, redirect_location(canonical))],
    )
        .into_response()
}

fn redirect_location(canonical: &str) -> String {
    let directory = canonical.strip_suffix(SEPARATOR).unwrap_or(canonical);
    let name = directory
        .rsplit_once(SEPARATOR)
        .map_or(directory, |(_, name)| name);
    format!("{}{}", encode_component(name), SEPARATOR)
}

pub(crate) fn error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Internal server error",
    )
        .into_response()
}

pub(crate) fn not_found_response(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message.to_string(),
    )
        .into_response()
}
