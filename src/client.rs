//! Static map client
//!
//! [`StaticMapClient`] merges the caller's options with the defaults, builds
//! the request URL and drives one load through its [`ImageLoader`]. Results
//! come back as the awaited value and, when one is given, through a
//! callback. Every outcome, including failures to build the request, goes
//! through the same completion path so both channels always agree.

use crate::core::{config::ClientConfig, options::StaticMapOptions};
use crate::loader::ImageLoader;
use crate::{Result, StaticMapError};
use url::{form_urlencoded, Url};

#[cfg(not(target_arch = "wasm32"))]
use crate::loader::http::{HttpImageLoader, StaticMapImage};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use crate::loader::html::HtmlImageLoader;

/// Outcome handed to completion callbacks.
pub type Completion<'a, H> = std::result::Result<&'a H, &'a StaticMapError>;

#[derive(Debug, Clone)]
pub struct StaticMapClient<L> {
    config: ClientConfig,
    loader: L,
}

#[cfg(not(target_arch = "wasm32"))]
impl StaticMapClient<HttpImageLoader> {
    /// Client for the public endpoint, loading over HTTP.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let loader = HttpImageLoader::new(&config);
        Self { config, loader }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for StaticMapClient<HttpImageLoader> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl StaticMapClient<HtmlImageLoader> {
    /// Client for the public endpoint, loading through `<img>` elements.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_loader(config, HtmlImageLoader::new())
    }
}

impl<L: ImageLoader> StaticMapClient<L> {
    pub fn with_loader(config: ClientConfig, loader: L) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Build the request URL for `options`.
    ///
    /// `zoom` and `size` are defaulted on a copy; `options` itself is never
    /// modified. The configured API key is used when `options` has none.
    pub fn build_url(&self, options: &StaticMapOptions) -> Result<Url> {
        if self.config.require_center {
            options.require("center")?;
        }

        let mut merged = options.with_defaults();
        if merged.key.is_none() {
            merged.key = self.config.api_key.clone();
        }

        let mut url = Url::parse(&self.config.base_url)?;
        let mut query = url.query().unwrap_or_default().to_string();
        for (name, value) in merged.to_pairs() {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&encode_component(&name));
            query.push('=');
            query.push_str(&encode_component(&value));
        }
        url.set_query(Some(&query));
        Ok(url)
    }

    /// Load the map described by `options`.
    pub async fn load(&self, options: &StaticMapOptions) -> Result<L::Handle> {
        let url = self.build_url(options)?;

        #[cfg(feature = "debug")]
        log::debug!(
            "loading static map center={:?} zoom={:?}",
            options.center,
            options.zoom
        );

        self.loader.load(&url).await
    }

    /// Load the map described by `options` and report the outcome to
    /// `callback` as well. The callback runs exactly once, before the
    /// result is returned, for successes and failures alike.
    pub async fn load_with_callback<F>(
        &self,
        options: &StaticMapOptions,
        callback: F,
    ) -> Result<L::Handle>
    where
        F: FnOnce(Completion<'_, L::Handle>),
    {
        let result = self.load(options).await;
        complete(result, Some(callback))
    }
}

#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
impl<L> StaticMapClient<L>
where
    L: ImageLoader + Clone + Send + Sync + 'static,
    L::Handle: Send + 'static,
{
    /// Run [`load_with_callback`](Self::load_with_callback) as a Tokio task.
    ///
    /// Must be called from within a Tokio runtime. Aborting the returned
    /// handle abandons the load; the callback is then never invoked.
    pub fn spawn_load<F>(
        &self,
        options: StaticMapOptions,
        callback: F,
    ) -> tokio::task::JoinHandle<Result<L::Handle>>
    where
        F: FnOnce(Completion<'_, L::Handle>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move { client.load_with_callback(&options, callback).await })
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl<L> StaticMapClient<L>
where
    L: ImageLoader + Clone + 'static,
    L::Handle: 'static,
{
    /// Run [`load_with_callback`](Self::load_with_callback) on the browser's
    /// event loop. The outcome is only observable through `callback`.
    pub fn spawn_load<F>(&self, options: StaticMapOptions, callback: F)
    where
        F: FnOnce(Completion<'_, L::Handle>) + 'static,
    {
        let client = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = client.load_with_callback(&options, callback).await;
        });
    }
}

/// Fan a finished load out to the optional callback, then hand it back.
fn complete<H, F>(result: Result<H>, callback: Option<F>) -> Result<H>
where
    F: FnOnce(Completion<'_, H>),
{
    #[cfg(feature = "debug")]
    {
        if let Err(e) = &result {
            log::warn!("static map request failed: {}", e);
        }
    }

    if let Some(callback) = callback {
        callback(result.as_ref());
    }
    result
}

/// Form-encode one query component, spaces as `%20` rather than `+`.
/// A literal `+` is already escaped to `%2B`, so every remaining `+`
/// stands for a space.
fn encode_component(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Load a static map with a default client.
#[cfg(not(target_arch = "wasm32"))]
pub async fn load_static_map(options: &StaticMapOptions) -> Result<StaticMapImage> {
    StaticMapClient::new().load(options).await
}
