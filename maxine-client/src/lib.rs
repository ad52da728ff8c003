//! Client for the Maxine service registry.
//!
//! Resolves a service name to a [`ServiceNode`] over HTTP (cached per
//! client), UDP or TCP (one-shot, uncached).
//!
//! ```no_run
//! use maxine_client::DiscoveryClient;
//!
//! let client = DiscoveryClient::new("http://localhost:8080/");
//! if let Some(node) = client.discover("orders", None, None, None) {
//!     println!("orders is at {} ({})", node.address, node.node_name);
//! }
//! client.close();
//! ```

pub mod cache;
mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use cache::CacheKey;
pub use client::DiscoveryClient;
pub use config::ClientConfig;
pub use error::DiscoveryError;
pub use shared::types::{DiscoverQuery, ServiceNode};
