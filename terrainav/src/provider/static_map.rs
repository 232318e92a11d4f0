//! Google Maps Static API client.
//!
//! Returns one image of up to 640×640 pixels centred on a point, with
//! labels hidden. Used for one-shot previews rather than raster missions.

use crate::coord::{GeoPoint, MAX_IMAGE_SIZE, MAX_ZOOM};
use crate::provider::{AsyncHttpClient, MapType, ProviderError};

const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Hides every label so images contain imagery only.
const STYLE_NO_LABELS: &str = "feature:all|element:labels|visibility:off";

/// Client for the Static Maps endpoint.
///
/// The API key is passed in explicitly; a client without one can still
/// build URLs for display but refuses to fetch.
pub struct StaticMapClient<C: AsyncHttpClient> {
    http_client: C,
    api_key: Option<String>,
}

impl<C: AsyncHttpClient> StaticMapClient<C> {
    pub fn new(http_client: C, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Builds the request URL, without the key when none is configured.
    pub fn build_url(
        &self,
        center: GeoPoint,
        map_type: MapType,
        zoom: u8,
        size: [u32; 2],
    ) -> Result<String, ProviderError> {
        if zoom > MAX_ZOOM {
            return Err(ProviderError::UnsupportedZoom(zoom));
        }
        if size[0] == 0 || size[1] == 0 || size[0] > MAX_IMAGE_SIZE || size[1] > MAX_IMAGE_SIZE {
            return Err(ProviderError::InvalidResponse(format!(
                "static map size {}x{} must be within 1..={}",
                size[0], size[1], MAX_IMAGE_SIZE
            )));
        }

        let mut url = format!(
            "{}?center={:.7},{:.7}&zoom={}&size={}x{}&maptype={}&style={}",
            STATIC_MAP_ENDPOINT,
            center.lat,
            center.lon,
            zoom,
            size[0],
            size[1],
            map_type.name(),
            STYLE_NO_LABELS
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        Ok(url)
    }

    /// Fetches a static image.
    pub async fn fetch(
        &self,
        center: GeoPoint,
        map_type: MapType,
        zoom: u8,
        size: [u32; 2],
    ) -> Result<Vec<u8>, ProviderError> {
        if self.api_key.is_none() {
            return Err(ProviderError::MissingApiKey);
        }
        let url = self.build_url(center, map_type, zoom, size)?;
        self.http_client.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockAsyncHttpClient;

    fn memphis() -> GeoPoint {
        GeoPoint {
            lat: 35.1375,
            lon: -89.8615,
        }
    }

    #[test]
    fn test_url_with_key() {
        let client = StaticMapClient::new(
            MockAsyncHttpClient::new(Ok(vec![])),
            Some("abc".to_string()),
        );
        let url = client
            .build_url(memphis(), MapType::Satellite, 17, [640, 480])
            .unwrap();
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/staticmap?center=35.1375000,-89.8615000\
             &zoom=17&size=640x480&maptype=satellite\
             &style=feature:all|element:labels|visibility:off&key=abc"
        );
    }

    #[test]
    fn test_url_without_key() {
        let client = StaticMapClient::new(MockAsyncHttpClient::new(Ok(vec![])), None);
        let url = client
            .build_url(memphis(), MapType::Terrain, 12, [100, 100])
            .unwrap();
        assert!(url.contains("maptype=terrain"));
        assert!(!url.contains("key="));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let client =
            StaticMapClient::new(MockAsyncHttpClient::new(Ok(vec![])), Some("  ".to_string()));
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_rejects_oversized_image() {
        let client = StaticMapClient::new(MockAsyncHttpClient::new(Ok(vec![])), None);
        assert!(client
            .build_url(memphis(), MapType::Satellite, 12, [641, 100])
            .is_err());
        assert_eq!(
            client.build_url(memphis(), MapType::Satellite, 23, [100, 100]),
            Err(ProviderError::UnsupportedZoom(23))
        );
    }

    #[tokio::test]
    async fn test_fetch_requires_key() {
        let client = StaticMapClient::new(MockAsyncHttpClient::new(Ok(vec![1])), None);
        let result = client
            .fetch(memphis(), MapType::Satellite, 12, [100, 100])
            .await;
        assert_eq!(result, Err(ProviderError::MissingApiKey));
        assert!(client.http_client.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_with_key() {
        let client = StaticMapClient::new(
            MockAsyncHttpClient::new(Ok(vec![9, 9])),
            Some("k".to_string()),
        );
        let bytes = client
            .fetch(memphis(), MapType::Roadmap, 12, [100, 100])
            .await
            .unwrap();
        assert_eq!(bytes, vec![9, 9]);
        assert_eq!(client.http_client.requested_urls().len(), 1);
    }
}
