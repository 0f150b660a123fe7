use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use store::ObjectStoreConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the HTTP server to listen on.
    ///  if not set then 0.0.0.0:8080 will be used
    pub listen_addr: SocketAddr,

    // data store configuration
    /// which object store backs the listing
    pub store: ObjectStoreConfig,

    // misc
    /// level used for per-request trace events
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080),
            store: ObjectStoreConfig::default(),
            log_level: tracing::Level::INFO,
        }
    }
}
