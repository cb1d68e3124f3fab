//! # Cover Thumbnails
//!
//! Downloads album art and re-encodes it as a small inline WebP `data:` URI.
//!
//! - Crops to fill a square (50×50 by default)
//! - Encodes as WebP
//! - Inlines with base64
//!
//! Thumbnailing is best-effort: every failure is logged and turned into `None`.

use crate::error::{MetadataError, Result};
use crate::fetch::{REQUEST_TIMEOUT, USER_AGENT};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::logging::redact_url;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

/// Thumbnail edge length in pixels
pub const THUMBNAIL_SIZE: u32 = 50;

const WEBP_MIME: &str = "image/webp";

/// Turns a cover art URL into an inline thumbnail.
#[async_trait]
pub trait CoverThumbnailer: Send + Sync {
    /// `None` in, `None` out. Failures also yield `None`.
    async fn resize_to_data_uri(&self, source_url: Option<&str>) -> Option<String>;
}

/// Thumbnailer that downloads through an [`HttpClient`]
pub struct ThumbnailService {
    http_client: Arc<dyn HttpClient>,
    size: u32,
}

impl ThumbnailService {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_size(http_client, THUMBNAIL_SIZE)
    }

    pub fn with_size(http_client: Arc<dyn HttpClient>, size: u32) -> Self {
        Self { http_client, size }
    }

    async fn thumbnail(&self, source_url: &str) -> Result<String> {
        let request = HttpRequest::get(source_url)
            .header("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(MetadataError::HttpStatus {
                status: response.status,
                url: redact_url(source_url),
            });
        }

        let data_uri = encode_thumbnail(&response.body, self.size)?;
        debug!(
            source = %redact_url(source_url),
            bytes = response.body.len(),
            "Encoded cover thumbnail"
        );
        Ok(data_uri)
    }
}

#[async_trait]
impl CoverThumbnailer for ThumbnailService {
    async fn resize_to_data_uri(&self, source_url: Option<&str>) -> Option<String> {
        let source_url = source_url?;

        match self.thumbnail(source_url).await {
            Ok(data_uri) => Some(data_uri),
            Err(e) => {
                warn!(source = %redact_url(source_url), error = %e, "Failed to process album cover");
                None
            }
        }
    }
}

/// Decodes `data`, crops it to a `size`×`size` square and returns it as a
/// WebP `data:` URI.
pub fn encode_thumbnail(data: &[u8], size: u32) -> Result<String> {
    let img = image::load_from_memory(data)
        .map_err(|e| MetadataError::ImageProcessing(format!("Failed to decode image: {}", e)))?;

    let resized = img.resize_to_fill(size, size, FilterType::Lanczos3);

    // The WebP encoder only takes 8-bit RGB(A).
    let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());

    let mut buffer = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
        .map_err(|e| MetadataError::ImageProcessing(format!("Failed to encode WebP: {}", e)))?;

    Ok(format!("data:{};base64,{}", WEBP_MIME, STANDARD.encode(&buffer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bytes_response, status_response, MockHttpClient};
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use image::GenericImageView;

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([255, 0, 0]),
        ));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn decode_data_uri(data_uri: &str) -> DynamicImage {
        let encoded = data_uri
            .strip_prefix("data:image/webp;base64,")
            .expect("webp data uri");
        let bytes = STANDARD.decode(encoded).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::WebP).unwrap()
    }

    #[test]
    fn test_encode_thumbnail_crops_to_square() {
        let data_uri = encode_thumbnail(&create_test_image(300, 120), THUMBNAIL_SIZE).unwrap();
        let img = decode_data_uri(&data_uri);
        assert_eq!(img.dimensions(), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }

    #[test]
    fn test_encode_thumbnail_upscales_small_images() {
        let data_uri = encode_thumbnail(&create_test_image(10, 10), THUMBNAIL_SIZE).unwrap();
        assert_eq!(decode_data_uri(&data_uri).dimensions(), (50, 50));
    }

    #[test]
    fn test_encode_thumbnail_rejects_garbage() {
        assert!(matches!(
            encode_thumbnail(b"definitely not an image", THUMBNAIL_SIZE),
            Err(MetadataError::ImageProcessing(_))
        ));
    }

    #[tokio::test]
    async fn test_none_in_none_out() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let service = ThumbnailService::new(Arc::new(mock_http));
        assert!(service.resize_to_data_uri(None).await.is_none());
    }

    #[tokio::test]
    async fn test_downloads_and_encodes() {
        let png = create_test_image(64, 64);
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url == "https://img.example.com/cover.png")
            .times(1)
            .returning(move |_| Ok(bytes_response(200, Bytes::from(png.clone()))));

        let service = ThumbnailService::new(Arc::new(mock_http));
        let data_uri = service
            .resize_to_data_uri(Some("https://img.example.com/cover.png"))
            .await
            .unwrap();

        assert!(data_uri.starts_with("data:image/webp;base64,"));
        assert_eq!(decode_data_uri(&data_uri).dimensions(), (50, 50));
    }

    #[tokio::test]
    async fn test_http_failure_yields_none() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(status_response(404)));

        let service = ThumbnailService::new(Arc::new(mock_http));
        assert!(service
            .resize_to_data_uri(Some("https://img.example.com/missing.png"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_yields_none() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("reset".to_string())));

        let service = ThumbnailService::new(Arc::new(mock_http));
        assert!(service
            .resize_to_data_uri(Some("https://img.example.com/cover.png"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_undecodable_body_yields_none() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(bytes_response(200, Bytes::from_static(b"<html></html>"))));

        let service = ThumbnailService::new(Arc::new(mock_http));
        assert!(service
            .resize_to_data_uri(Some("https://img.example.com/cover.png"))
            .await
            .is_none());
    }
}
