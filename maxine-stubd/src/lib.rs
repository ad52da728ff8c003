//! Fixture registry answering Maxine discovery queries from a static table
//! over HTTP, UDP and TCP.

pub mod api;
pub mod config;
pub mod listeners;
pub mod registry;
pub mod server;

pub use config::Config;
pub use registry::FixtureRegistry;
pub use server::{start, RunningRegistry};
