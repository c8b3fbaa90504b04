use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use thiserror::Error;

use crate::codec::MAX_HEAD_BYTES;

/// Upper bound of [`ServerConfig::worker_count`].
pub const MAX_WORKER_COUNT: usize = 256;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("address must be set")]
    MissingAddress,

    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },

    #[error("worker count {count} exceed the limit {max}")]
    TooManyWorkers { count: usize, max: usize },

    #[error("max head bytes must be positive")]
    InvalidMaxHeadBytes,
}

/// Validated server options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    address: Vec<SocketAddr>,
    worker_count: usize,
    max_head_bytes: usize,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Number of runtime worker threads, `0` leaves the choice to tokio.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn max_head_bytes(&self) -> usize {
        self.max_head_bytes
    }
}

#[derive(Debug)]
pub struct ServerConfigBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    worker_count: usize,
    max_head_bytes: usize,
}

impl ServerConfigBuilder {
    fn new() -> Self {
        Self { address: None, worker_count: 0, max_head_bytes: MAX_HEAD_BYTES }
    }

    /// Sets the bind address, resolved once here and validated by [`ServerConfigBuilder::build`].
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn max_head_bytes(mut self, max_head_bytes: usize) -> Self {
        self.max_head_bytes = max_head_bytes;
        self
    }

    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let address = self.address.ok_or(ConfigError::MissingAddress)??;
        if address.is_empty() {
            return Err(ConfigError::MissingAddress);
        }
        if self.worker_count > MAX_WORKER_COUNT {
            return Err(ConfigError::TooManyWorkers { count: self.worker_count, max: MAX_WORKER_COUNT });
        }
        if self.max_head_bytes == 0 {
            return Err(ConfigError::InvalidMaxHeadBytes);
        }

        Ok(ServerConfig { address, worker_count: self.worker_count, max_head_bytes: self.max_head_bytes })
    }
}
