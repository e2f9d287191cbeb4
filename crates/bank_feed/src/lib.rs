//! HTTP client for the bank aggregator, implementing [`engine::BankFeed`].

pub use client::{FeedClient, FeedConfig};
pub use error::FeedError;

mod client;
mod error;
mod wire;
