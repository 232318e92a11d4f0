//! Map imagery provider abstraction
//!
//! This module provides the traits and implementations for downloading map
//! tiles and static map images. The [`TileSource`] trait is what the
//! stitcher consumes; [`GoogleTileProvider`] implements it over an
//! [`AsyncHttpClient`].
//!
//! ```ignore
//! use terrainav::provider::{AsyncReqwestClient, GoogleTileProvider};
//!
//! let http_client = AsyncReqwestClient::with_timeout(30)?;
//! let provider = GoogleTileProvider::new(http_client);
//! ```

mod google;
mod http;
mod static_map;
mod types;

pub use google::GoogleTileProvider;
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use static_map::StaticMapClient;
pub use types::{MapType, ProviderError, TileSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
