//! # torznab-client
//!
//! An async client for the Torznab search protocol.
//!
//! The client talks either to an indexer-aggregation proxy (Jackett-style,
//! every indexer mounted under `/api/v2.0/indexers/<id>/results/torznab/api`)
//! or directly to a single tracker's Torznab endpoint. It provides:
//!
//! - Dual-mode request addressing
//! - Bounded retries with jittered delay on network failures and 5xx responses
//! - Typed search requests for generic, TV, movie, music and book searches
//! - Typed, defaulted access to the `torznab:attr` extension attributes
//! - Per-call cancellation and deadlines
//!
//! ## Example
//!
//! ```rust,no_run
//! use torznab_client::{Client, ClientConfig, TvSearch};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new(
//!         ClientConfig::new("http://localhost:9117").with_api_key("secret"),
//!     )?;
//!
//!     let rss = client
//!         .tv_search(TvSearch::new("The Expanse").with_season(6))
//!         .await?;
//!
//!     for item in rss.torznab_items() {
//!         println!("{} ({} seeders)", item.title(), item.seeders());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod context;
mod error;
mod item;
mod params;
mod query;
mod transport;

pub mod address;
pub mod categories;
pub mod decode;
pub mod models;

pub use client::Client;
pub use config::{BasicAuth, ClientConfig, DEFAULT_TIMEOUT_SECS};
pub use context::CallContext;
pub use error::{CancelReason, DecodeError, Result, TorznabError, TransportFailure};
pub use item::{AttributeIndex, TorznabItem};
pub use models::{Capabilities, Indexer, Indexers, RawAttr, RawItem, Rss};
pub use params::SearchParams;
pub use query::{
    BookSearch, GenericSearch, MovieSearch, MusicSearch, SearchKind, SearchRequest, TvSearch,
};
pub use transport::{drain, RetryPolicy, Transport, DEFAULT_MAX_ATTEMPTS};
