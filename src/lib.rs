//! A small immediate-mode WebGL pipeline: shader programs, per-frame
//! geometry uploads, textures loaded in the background, and a
//! requestAnimationFrame loop that draws one of the built-in scenes.

#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

pub mod animation;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gl;
#[cfg(feature = "recording")]
pub mod recording;
pub mod scene;
pub mod shader;
pub mod texture;

pub use error::{CompileError, RenderError};

#[cfg(target_arch = "wasm32")]
pub use wasm::{backend::WebGl, images::fetch_image};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use log::error;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use crate::config::{RendererConfig, CANVAS_ID};
    use crate::error::RenderError;

    pub mod backend;
    pub mod images;
    mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = match document.get_element_by_id(CANVAS_ID) {
            Some(element) => element.dyn_into::<web_sys::HtmlCanvasElement>()?,
            None => {
                let _ = console_log::init_with_level(log::Level::Info);
                return Err(report(RenderError::ContextUnavailable(format!("canvas #{CANVAS_ID} not found"))));
            }
        };

        let config = RendererConfig::from_attribute(canvas.get_attribute("data-config").as_deref());
        let level = config.as_ref().map_or(log::Level::Info, |c| c.log_level());
        let _ = console_log::init_with_level(level);
        let config = config.map_err(report)?;

        spawn_local(async move {
            if let Err(err) = render::start(canvas, config).await {
                report(err);
            }
        });
        Ok(())
    }

    /// Logs a fatal error and shows it to the user.
    fn report(err: RenderError) -> JsValue {
        let message = err.to_string();
        error!("{message}");
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(&message);
        }
        JsValue::from_str(&message)
    }
}
