use super::{DetachOnDrop, ImageLoader};
use crate::{LoadCause, Result, StaticMapError};
use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

/// Browser loader: assigns the URL to a fresh `<img>` element and waits for
/// its `load` or `error` event. There is no timeout; an element that never
/// fires either event leaves the load pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlImageLoader;

impl HtmlImageLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl ImageLoader for HtmlImageLoader {
    type Handle = HtmlImageElement;

    async fn load(&self, url: &Url) -> Result<HtmlImageElement> {
        let image = HtmlImageElement::new()
            .map_err(|e| StaticMapError::Handle(format!("{:?}", e)))?;

        let (tx, rx) = oneshot::channel::<bool>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_load = {
            let tx = Rc::clone(&tx);
            Closure::once(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(true);
                }
            })
        };
        let on_error = Closure::once(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(false);
            }
        });

        image.set_onload(Some(on_load.as_ref().unchecked_ref()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        // Unhooks the element before the closures are freed, whether the
        // load finishes or this future is dropped while still waiting
        let handlers = DetachOnDrop::new((on_load, on_error), {
            let image = image.clone();
            move || {
                image.set_onload(None);
                image.set_onerror(None);
            }
        });

        image.set_src(url.as_str());
        let loaded = rx.await.unwrap_or(false);
        drop(handlers);

        if loaded {
            #[cfg(feature = "debug")]
            log::debug!(
                "static map element loaded ({}x{})",
                image.natural_width(),
                image.natural_height()
            );
            Ok(image)
        } else {
            #[cfg(feature = "debug")]
            log::warn!("static map element signaled an error");
            Err(StaticMapError::load_failure(LoadCause::Unavailable))
        }
    }
}
