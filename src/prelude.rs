//! Prelude module for common staticmap types and traits
//!
//! `use staticmap::prelude::*;` brings in everything needed to build options
//! and load a map.

pub use crate::client::{Completion, StaticMapClient};

pub use crate::core::{
    config::ClientConfig,
    constants::{BASE_URL, DEFAULT_SIZE, DEFAULT_ZOOM},
    geo::LatLng,
    options::{ImageFormat, MapType, StaticMapOptions},
};

pub use crate::loader::ImageLoader;

#[cfg(not(target_arch = "wasm32"))]
pub use crate::loader::http::{HttpImageLoader, StaticMapImage};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use crate::loader::html::HtmlImageLoader;

pub use crate::{Error as StaticMapError, LoadCause, Result};
