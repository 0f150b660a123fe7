use serde::Serialize;

/// Version metadata captured by the build script.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub repo_version: &'static str,
    pub rust_version: &'static str,
    pub version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        repo_version: env!("REPO_VERSION"),
        rust_version: env!("RUST_VERSION"),
        version: env!("CARGO_PKG_VERSION"),
    }
}
