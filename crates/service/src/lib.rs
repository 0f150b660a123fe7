//! HTTP service exposing an object store bucket as a browsable filesystem.
//!
//! - State management (ServiceState holding the injected store client)
//! - Request routing (file paths stream contents, directory paths render an index)
//! - HTTP handlers (content streaming, directory index, health checks)

pub mod config;
pub mod http;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use state::{State as ServiceState, StateSetupError};
