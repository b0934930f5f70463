//! Static Maps endpoint and the defaults applied to every request.
//! Keeping them in a single place makes it easier to point the client elsewhere in tests.

/// Endpoint every request URL starts with. The trailing `?` is part of it.
pub const BASE_URL: &str = "https://maps.googleapis.com/maps/api/staticmap?";

/// Zoom used when the caller leaves `zoom` unset.
pub const DEFAULT_ZOOM: u32 = 14;

/// Image size used when the caller leaves `size` unset or empty.
pub const DEFAULT_SIZE: &str = "320x240";

/// Message of every load failure, regardless of cause.
pub const LOAD_ERROR_MESSAGE: &str = "Cannot load image";

/// User agent sent by the native HTTP loader.
pub const USER_AGENT: &str = concat!("staticmap/", env!("CARGO_PKG_VERSION"));
