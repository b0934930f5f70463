use async_trait::async_trait;
use staticmap::prelude::*;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Integration tests for how callers actually use the client.
/// Loads are simulated unless a test spins up its own local server.
#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Stand-in for the platform image handle: succeeds or fails on demand
    /// and remembers every URL it was given.
    #[derive(Clone, Default)]
    struct SimulatedLoader {
        fail: bool,
        requests: Arc<Mutex<Vec<Url>>>,
    }

    impl SimulatedLoader {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[derive(Debug, PartialEq)]
    struct FakeImage(String);

    #[async_trait]
    impl ImageLoader for SimulatedLoader {
        type Handle = FakeImage;

        async fn load(&self, url: &Url) -> Result<FakeImage> {
            self.requests.lock().unwrap().push(url.clone());
            if self.fail {
                Err(StaticMapError::load_failure(LoadCause::Unavailable))
            } else {
                Ok(FakeImage(url.to_string()))
            }
        }
    }

    fn client_with(loader: &SimulatedLoader) -> StaticMapClient<SimulatedLoader> {
        StaticMapClient::with_loader(ClientConfig::default(), loader.clone())
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Defaults are applied when zoom and size are omitted
    #[test]
    fn test_defaults_in_query() {
        let client = client_with(&SimulatedLoader::default());
        let url = client
            .build_url(&StaticMapOptions::new().center("Toronto").maptype(MapType::Terrain))
            .unwrap();

        assert!(url.query().unwrap().contains("zoom=14"));
        assert!(url.query().unwrap().contains("size=320x240"));
        assert_eq!(query_value(&url, "maptype").as_deref(), Some("terrain"));
    }

    /// An explicit size is sent verbatim
    #[test]
    fn test_explicit_size_preserved() {
        let client = client_with(&SimulatedLoader::default());
        for size in ["1x1", "640x640", "100x50"] {
            let url = client
                .build_url(&StaticMapOptions::new().center("Toronto").size(size))
                .unwrap();
            assert_eq!(query_value(&url, "size").as_deref(), Some(size));
        }
    }

    /// The documented example produces the documented URL
    #[test]
    fn test_example_center_url() {
        let client = client_with(&SimulatedLoader::default());
        let options = StaticMapOptions::from_json(r#"{"center": "40.714728,-73.998672"}"#).unwrap();

        let url = client.build_url(&options).unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/staticmap?center=40.714728%2C-73.998672&zoom=14&size=320x240"
        );
    }

    /// Options decoded from JSON with repeated markers and non-string
    /// extras go out as repeated pairs, spaces as %20
    #[tokio::test]
    async fn test_repeated_markers_from_json() {
        let loader = SimulatedLoader::default();
        let client = client_with(&loader);
        let options = StaticMapOptions::from_json(
            r#"{"center": "Berkeley, CA", "markers": ["color:blue|A", "color:red|B"], "channel": 5}"#,
        )
        .unwrap();

        client.load(&options).await.unwrap();

        let requests = loader.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].as_str(),
            "https://maps.googleapis.com/maps/api/staticmap?center=Berkeley%2C%20CA&zoom=14&size=320x240\
             &markers=color%3Ablue%7CA&markers=color%3Ared%7CB&channel=5"
        );
    }

    /// LatLng centers serialize the same way as the string form
    #[test]
    fn test_latlng_center_matches_string_center() {
        let client = client_with(&SimulatedLoader::default());
        let from_point = client
            .build_url(&StaticMapOptions::new().center(LatLng::new(40.714728, -73.998672)))
            .unwrap();
        let from_string = client
            .build_url(&StaticMapOptions::new().center("40.714728,-73.998672"))
            .unwrap();
        assert_eq!(from_point, from_string);
    }

    /// A successful load resolves and calls back once with the handle
    #[tokio::test]
    async fn test_load_success_resolves_and_calls_back_once() {
        let loader = SimulatedLoader::default();
        let client = client_with(&loader);
        let options = StaticMapOptions::new().center("43.653226,-79.3831843");

        let mut calls = Vec::new();
        let image = client
            .load_with_callback(&options, |outcome| {
                calls.push(outcome.map(|img| img.0.clone()).map_err(|e| e.to_string()));
            })
            .await
            .unwrap();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].as_ref().unwrap(), &image.0);
        assert_eq!(loader.requests().len(), 1);
    }

    /// A failed load rejects and calls back once with "Cannot load image"
    #[tokio::test]
    async fn test_load_failure_rejects_and_calls_back_once() {
        let loader = SimulatedLoader::failing();
        let client = client_with(&loader);

        let mut messages = Vec::new();
        let err = client
            .load_with_callback(&StaticMapOptions::new().center("Toronto"), |outcome| {
                messages.push(outcome.unwrap_err().to_string());
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Cannot load image");
        assert!(err.is_load_failure());
        assert_eq!(messages, ["Cannot load image"]);
    }

    /// Without validation enabled a request goes out even without a center
    #[tokio::test]
    async fn test_missing_center_still_requests() {
        let loader = SimulatedLoader::default();
        let client = client_with(&loader);

        client.load(&StaticMapOptions::new()).await.unwrap();

        let requests = loader.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(query_value(&requests[0], "center"), None);
        assert_eq!(query_value(&requests[0], "zoom").as_deref(), Some("14"));
    }

    /// With validation enabled a missing center fails before any request
    #[tokio::test]
    async fn test_required_center_is_enforced_when_configured() {
        let loader = SimulatedLoader::default();
        let config = ClientConfig::default().with_require_center(true);
        let client = StaticMapClient::with_loader(config, loader.clone());

        let mut seen = None;
        let err = client
            .load_with_callback(&StaticMapOptions::new().zoom(3), |outcome| {
                seen = Some(outcome.unwrap_err().to_string());
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "center is required");
        assert_eq!(seen.as_deref(), Some("center is required"));
        assert!(loader.requests().is_empty());
    }

    /// Plain `load` without a callback reports the same outcome
    #[tokio::test]
    async fn test_load_without_callback() {
        let client = client_with(&SimulatedLoader::failing());
        let err = client
            .load(&StaticMapOptions::new().center("Toronto"))
            .await
            .unwrap_err();
        assert!(err.is_load_failure());
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([0, 128, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// Serve exactly one HTTP response and report the request line.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/maps/api/staticmap?", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            // The client may hang up early on error statuses
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (base, server)
    }

    /// End to end through the HTTP loader against a local server
    #[tokio::test]
    async fn test_http_loader_fetches_and_decodes() {
        let (base, server) = serve_once("200 OK", "image/png", png_bytes()).await;
        let config = ClientConfig::default()
            .with_base_url(base)
            .with_timeout(Duration::from_secs(5));
        let client = StaticMapClient::with_config(config);

        let mut dims = None;
        let image = client
            .load_with_callback(&StaticMapOptions::new().center("Toronto"), |outcome| {
                dims = outcome.ok().map(|img| (img.width, img.height));
            })
            .await
            .unwrap();

        assert_eq!((image.width, image.height), (8, 6));
        assert_eq!(dims, Some((8, 6)));
        assert_eq!(image.content_type.as_deref(), Some("image/png"));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /maps/api/staticmap?center=Toronto&zoom=14&size=320x240"));
    }

    /// Error statuses from the server surface as load failures
    #[tokio::test]
    async fn test_http_loader_error_status() {
        let (base, server) = serve_once("403 Forbidden", "text/plain", b"denied".to_vec()).await;
        let config = ClientConfig::default()
            .with_base_url(base)
            .with_timeout(Duration::from_secs(5));
        let client = StaticMapClient::with_config(config);

        let err = client
            .load(&StaticMapOptions::new().center("Toronto"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Cannot load image");
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(cause, "server responded with HTTP 403");
        server.await.unwrap();
    }

    /// A body that is not an image fails like a broken image element would
    #[tokio::test]
    async fn test_http_loader_rejects_non_image_body() {
        let (base, server) = serve_once("200 OK", "text/html", b"<html></html>".to_vec()).await;
        let config = ClientConfig::default()
            .with_base_url(base)
            .with_timeout(Duration::from_secs(5));
        let client = StaticMapClient::with_config(config);

        let err = client
            .load(&StaticMapOptions::new().center("Toronto"))
            .await
            .unwrap_err();

        assert!(err.is_load_failure());
        server.await.unwrap();
    }
}
