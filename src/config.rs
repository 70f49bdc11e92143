//! Configuration for both hand-off roles
//!
//! One explicit struct, built once at startup and passed by reference into the
//! server and the client. Nothing here is global.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 64081;

/// Hand-off configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    /// Address the server binds to
    pub bind_host: IpAddr,

    /// Address the client dials
    pub connect_host: IpAddr,

    /// TCP port shared by both roles
    pub port: u16,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            bind_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            connect_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl HandoffConfig {
    /// Default configuration on a different port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Socket address the server listens on
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }

    /// Socket address the client connects to
    pub fn connect_addr(&self) -> SocketAddr {
        SocketAddr::new(self.connect_host, self.port)
    }
}
