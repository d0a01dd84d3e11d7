use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use crate::error::RenderError;

/// Loads and decodes one image. Settles on `load` or `error`; there is no
/// timeout, so a hung request never settles.
pub async fn fetch_image(url: String) -> Result<HtmlImageElement, RenderError> {
    let failed = |reason: String| RenderError::AssetLoad {
        url: url.clone(),
        reason,
    };

    let img = HtmlImageElement::new().map_err(|_| failed("failed to create image element".to_string()))?;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let onload = Closure::once_into_js(move || {
            resolve.call0(&JsValue::NULL).ok();
        });
        let onerror = Closure::once_into_js(move || {
            reject.call0(&JsValue::NULL).ok();
        });
        img.set_onload(Some(onload.unchecked_ref()));
        img.set_onerror(Some(onerror.unchecked_ref()));
    });
    img.set_src(&url);

    JsFuture::from(promise)
        .await
        .map_err(|_| failed("network or decode error".to_string()))?;
    Ok(img)
}
