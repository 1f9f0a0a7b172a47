//! HTTP adapter for the inventory backend.
//!
//! Every call is a single round trip. Retry and caching live in `services`.

pub mod api;
mod client;
pub mod error;

pub use client::InventoryClient;
pub use error::ClientError;
