use super::ImageLoader;
use crate::core::config::ClientConfig;
use crate::{LoadCause, Result, StaticMapError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;
use url::Url;

/// Shared async HTTP client. Building the client once avoids the cost of TLS
/// and connection pool setup for every map. Kept as a `Result` so that a
/// broken TLS backend surfaces as a handle error instead of a panic.
pub(crate) static HTTP_CLIENT: Lazy<std::result::Result<reqwest::Client, String>> =
    Lazy::new(|| {
        reqwest::Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| e.to_string())
    });

/// A loaded static map image.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMapImage {
    /// URL the image was loaded from
    pub url: String,
    /// Value of the `Content-Type` response header, if any
    pub content_type: Option<String>,
    /// Encoded image bytes as served
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl StaticMapImage {
    /// Wrap encoded image bytes, reading the dimensions from them.
    pub fn from_bytes(
        url: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let (width, height) = decode_dimensions(&bytes).map_err(StaticMapError::load_failure)?;
        Ok(Self {
            url: url.into(),
            content_type,
            bytes,
            width,
            height,
        })
    }

    /// Decode into pixels.
    pub fn decode(&self) -> Result<image::DynamicImage> {
        image::load_from_memory(&self.bytes).map_err(StaticMapError::load_failure)
    }

    /// The encoding of [`bytes`](Self::bytes), guessed from its magic number.
    pub fn format(&self) -> Option<image::ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }
}

fn decode_dimensions(bytes: &[u8]) -> std::result::Result<(u32, u32), image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    Ok((img.width(), img.height()))
}

/// Native loader: GETs the URL and accepts the response only if it is a
/// successful response whose body decodes as an image.
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    timeout: Option<Duration>,
    user_agent: String,
}

impl HttpImageLoader {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
        }
    }

    fn request(&self, url: &Url) -> Result<reqwest::Request> {
        let client = HTTP_CLIENT.as_ref().map_err(|e| StaticMapError::Handle(e.clone()))?;
        let mut builder = client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| StaticMapError::Handle(e.to_string()))
    }

    async fn fetch(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<(Option<String>, Vec<u8>), LoadCause> {
        let client = HTTP_CLIENT.as_ref().map_err(|_| LoadCause::Unavailable)?;
        let resp = client.execute(request).await?;
        if !resp.status().is_success() {
            return Err(LoadCause::Status(resp.status().as_u16()));
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?;
        Ok((content_type, bytes.to_vec()))
    }
}

impl Default for HttpImageLoader {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    type Handle = StaticMapImage;

    async fn load(&self, url: &Url) -> Result<StaticMapImage> {
        let request = self.request(url)?;

        let (content_type, bytes) = match self.fetch(request).await {
            Ok(response) => response,
            Err(cause) => {
                #[cfg(feature = "debug")]
                log::warn!("static map download failed: {}", cause);
                return Err(StaticMapError::load_failure(cause));
            }
        };

        #[cfg(feature = "debug")]
        log::debug!("downloaded static map ({} bytes)", bytes.len());

        StaticMapImage::from_bytes(url.as_str(), content_type, bytes)
    }
}
