//! # staticmap
//!
//! A small client for the Google Static Maps image API.
//!
//! Options passed in correlate to the parameters the Static Maps API
//! understands (`center`, `zoom`, `size`, `markers`, `path`, `style`, ...).
//! The client turns them into a request URL, hands that URL to an
//! [`ImageLoader`] and reports the outcome either as the awaited result,
//! through a callback, or both.
//!
//! ```no_run
//! use staticmap::{StaticMapClient, StaticMapOptions};
//!
//! # async fn run() -> staticmap::Result<()> {
//! let client = StaticMapClient::new();
//! let options = StaticMapOptions::new()
//!     .center("43.653226,-79.3831843")
//!     .style("feature:landscape|hue:0xFF00FF|saturation:100|lightness:-50");
//!
//! let image = client.load(&options).await?;
//! println!("{}x{} map from {}", image.width, image.height, image.url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod loader;
pub mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use client::StaticMapClient;
pub use crate::core::{
    config::ClientConfig,
    geo::LatLng,
    options::{ImageFormat, MapType, StaticMapOptions},
};
pub use loader::ImageLoader;

#[cfg(not(target_arch = "wasm32"))]
pub use client::load_static_map;
#[cfg(not(target_arch = "wasm32"))]
pub use loader::http::{HttpImageLoader, StaticMapImage};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use loader::html::HtmlImageLoader;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, StaticMapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum StaticMapError {
    /// The loader could not produce an image. The message carries no detail;
    /// the underlying cause is available through `source()`.
    #[error("Cannot load image")]
    LoadFailure(#[source] LoadCause),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Cannot create image handle: {0}")]
    Handle(String),

    #[error("Invalid value {value:?} for parameter {name}")]
    InvalidParameter { name: String, value: String },

    #[error("{0} is required")]
    MissingParameter(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

impl StaticMapError {
    /// Wrap a loader-side cause into a load failure.
    pub fn load_failure(cause: impl Into<LoadCause>) -> Self {
        Self::LoadFailure(cause.into())
    }

    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::LoadFailure(_))
    }

    /// Errors raised while building the URL or the handle, before any
    /// network activity took place.
    pub fn is_construction_failure(&self) -> bool {
        !self.is_load_failure()
    }
}

/// Why a load failed. Never shown in the [`StaticMapError`] message.
#[derive(Debug, thiserror::Error)]
pub enum LoadCause {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("response is not a decodable image: {0}")]
    Decode(#[from] image::ImageError),

    /// The platform reported an error without further detail.
    #[error("image element signaled an error")]
    Unavailable,
}

/// Error type alias for convenience
pub type Error = StaticMapError;
