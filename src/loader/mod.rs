//! Image loaders
//!
//! A loader turns a request URL into an image handle, or reports that it
//! could not. Natively this is an HTTP fetch followed by a decode check
//! ([`http::HttpImageLoader`]); in the browser it is an `<img>` element whose
//! `load`/`error` events decide the outcome (`html::HtmlImageLoader`).

#[cfg(not(target_arch = "wasm32"))]
pub mod http;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod html;

use crate::Result;
use async_trait::async_trait;
use url::Url;

/// Trait representing anything that can load the image behind a URL.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ImageLoader {
    /// What a successful load produces.
    type Handle;

    /// Fetch `url` and hand back the loaded image.
    ///
    /// Failures of the fetch itself must be reported as
    /// [`StaticMapError::LoadFailure`](crate::StaticMapError::LoadFailure);
    /// failures to even set up the fetch as
    /// [`StaticMapError::Handle`](crate::StaticMapError::Handle).
    async fn load(&self, url: &Url) -> Result<Self::Handle>;
}

/// Keeps event handlers alive while something still references them, and
/// detaches them from that something before they are freed.
///
/// `detach` runs first on drop, then `handlers` is dropped. This holds on
/// every path out of a load, including the load future being dropped
/// before either event fired.
#[cfg(any(test, all(feature = "wasm", target_arch = "wasm32")))]
pub(crate) struct DetachOnDrop<H, F: FnMut()> {
    _handlers: H,
    detach: F,
}

#[cfg(any(test, all(feature = "wasm", target_arch = "wasm32")))]
impl<H, F: FnMut()> DetachOnDrop<H, F> {
    pub(crate) fn new(handlers: H, detach: F) -> Self {
        Self {
            _handlers: handlers,
            detach,
        }
    }
}

#[cfg(any(test, all(feature = "wasm", target_arch = "wasm32")))]
impl<H, F: FnMut()> Drop for DetachOnDrop<H, F> {
    fn drop(&mut self) {
        // Fields drop after this returns
        (self.detach)();
    }
}
