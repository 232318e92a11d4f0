//! Google Maps public tile server provider.
//!
//! # URL Pattern
//!
//! `https://mt{0,1,2,3}.google.com/vt/lyrs={layer}&x={x}&y={y}&z={zoom}`
//!
//! - `mt{0-3}` - Load balancing across 4 tile servers
//! - `lyrs` - `s` satellite, `m` roadmap, `t` terrain
//! - `x`, `y`, `z` - Standard XYZ tile coordinates
//!
//! No API key is needed for this endpoint.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::coord::MAX_ZOOM;
use crate::provider::{AsyncHttpClient, MapType, ProviderError, TileSource};

/// Google Maps tile provider.
///
/// Rotates between the mt0 to mt3 servers for load balancing.
///
/// # Example
///
/// ```ignore
/// use terrainav::provider::{AsyncReqwestClient, GoogleTileProvider};
///
/// let client = AsyncReqwestClient::new()?;
/// let provider = GoogleTileProvider::new(client);
/// ```
pub struct GoogleTileProvider<C: AsyncHttpClient> {
    http_client: C,
    /// Counter for round-robin server selection (0-3)
    server_counter: AtomicU8,
}

impl<C: AsyncHttpClient> GoogleTileProvider<C> {
    /// Creates a new provider.
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            server_counter: AtomicU8::new(0),
        }
    }

    fn next_server(&self) -> u8 {
        self.server_counter.fetch_add(1, Ordering::Relaxed) % 4
    }

    /// Builds the tile URL for the given coordinates.
    fn build_url(&self, tile_x: u32, tile_y: u32, zoom: u8, map_type: MapType) -> String {
        format!(
            "https://mt{}.google.com/vt/lyrs={}&x={}&y={}&z={}",
            self.next_server(),
            map_type.layer_code(),
            tile_x,
            tile_y,
            zoom
        )
    }
}

impl<C: AsyncHttpClient> TileSource for GoogleTileProvider<C> {
    async fn fetch_tile(
        &self,
        tile_x: u32,
        tile_y: u32,
        zoom: u8,
        map_type: MapType,
    ) -> Result<Vec<u8>, ProviderError> {
        if zoom > MAX_ZOOM {
            return Err(ProviderError::UnsupportedZoom(zoom));
        }

        let url = self.build_url(tile_x, tile_y, zoom, map_type);
        self.http_client.get(&url).await
    }

    fn name(&self) -> &str {
        "Google Maps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    #[test]
    fn test_url_construction() {
        let provider = GoogleTileProvider::new(MockAsyncHttpClient::new(Ok(vec![])));

        let url = provider.build_url(200, 100, 10, MapType::Satellite);
        assert_eq!(url, "https://mt0.google.com/vt/lyrs=s&x=200&y=100&z=10");
    }

    #[test]
    fn test_url_layer_follows_map_type() {
        let provider = GoogleTileProvider::new(MockAsyncHttpClient::new(Ok(vec![])));

        assert!(provider
            .build_url(1, 2, 3, MapType::Roadmap)
            .contains("lyrs=m&"));
        assert!(provider
            .build_url(1, 2, 3, MapType::Terrain)
            .contains("lyrs=t&"));
    }

    #[test]
    fn test_server_round_robin() {
        let provider = GoogleTileProvider::new(MockAsyncHttpClient::new(Ok(vec![])));

        let servers: Vec<String> = (0..5)
            .map(|_| provider.build_url(0, 0, 0, MapType::Satellite))
            .map(|url| url[..12].to_string())
            .collect();
        assert_eq!(
            servers,
            vec![
                "https://mt0.",
                "https://mt1.",
                "https://mt2.",
                "https://mt3.",
                "https://mt0."
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_tile_uses_client() {
        let client = MockAsyncHttpClient::new(Ok(vec![0xFF, 0xD8]));
        let provider = GoogleTileProvider::new(client);

        let bytes = provider
            .fetch_tile(5, 6, 7, MapType::Satellite)
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8]);
        assert_eq!(
            provider.http_client.requested_urls(),
            vec!["https://mt0.google.com/vt/lyrs=s&x=5&y=6&z=7"]
        );
    }

    #[tokio::test]
    async fn test_fetch_tile_rejects_unsupported_zoom() {
        let provider = GoogleTileProvider::new(MockAsyncHttpClient::new(Ok(vec![1])));

        let result = provider.fetch_tile(0, 0, 23, MapType::Satellite).await;
        assert_eq!(result, Err(ProviderError::UnsupportedZoom(23)));
        assert!(provider.http_client.requested_urls().is_empty());
    }

    #[test]
    fn test_provider_name() {
        let provider = GoogleTileProvider::new(MockAsyncHttpClient::new(Ok(vec![])));
        assert_eq!(provider.name(), "Google Maps");
        assert_eq!(provider.max_zoom(), 22);
    }
}
