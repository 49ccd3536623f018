//! Where dashboard data comes from.
//!
//! The dashboard never awaits the network on its draw loop. Fetches are
//! handed to a [`Fetcher`], run on the tokio runtime, and come back as
//! [`Fetched`] messages carrying the generation they were issued under.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use slawatch::source::Fetcher;
//! use slawatch_client::NewRelicClient;
//!
//! # tokio_test::block_on(async {
//! let client = NewRelicClient::builder().build().unwrap();
//! let mut fetcher = Fetcher::new(Arc::new(client), tokio::runtime::Handle::current(), "api.newrelic.com");
//! assert!(fetcher.poll().is_none());
//! # });
//! ```

mod fetcher;

pub use fetcher::{Fetched, Fetcher, Payload};
