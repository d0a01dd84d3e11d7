use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, HtmlCanvasElement, WebGl2RenderingContext as GL};

use super::backend::WebGl;
use super::images::fetch_image;
use crate::animation::FrameClock;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::frame::FrameRenderer;
use crate::scene::Scene;
use crate::texture::load_all;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Sets up the context and scene, waits for textures, then renders.
pub async fn start(canvas: HtmlCanvasElement, config: RendererConfig) -> Result<(), RenderError> {
    let gl: GL = canvas
        .get_context("webgl2")
        .map_err(|err| RenderError::ContextUnavailable(format!("{err:?}")))?
        .ok_or_else(|| RenderError::ContextUnavailable("WebGL2 not supported".to_string()))?
        .dyn_into()
        .map_err(|_| RenderError::ContextUnavailable("unexpected context type".to_string()))?;

    if config.fit_window {
        if let Err(err) = fit_to_window(&canvas) {
            warn!("canvas will not follow window size: {err:?}");
        }
    }

    let backend = WebGl::new(gl, canvas);
    let renderer = FrameRenderer::new(&backend, config.clear_color);
    let mut scene = Scene::new(&backend, config.scene)?;

    let urls = config.texture_urls();
    if !urls.is_empty() {
        info!("loading {} texture(s)", urls.len());
        let textures = load_all(&backend, &urls, |url| fetch_image(url.to_string()), config.texture_options()).await?;
        scene.attach_textures(textures)?;
    }

    if !scene.kind().is_animated() {
        scene.render(&renderer, 0.0)?;
        info!("{:?} drawn", scene.kind());
        if config.fit_window {
            if let Err(err) = redraw_on_resize(scene, renderer) {
                warn!("static scene will not redraw after resize: {err:?}");
            }
        }
        return Ok(());
    }

    info!("starting animation loop for {:?}", scene.kind());
    run_loop(scene, renderer).map_err(|err| RenderError::Scheduling(format!("{err:?}")))
}

// Resize canvas to fit window
fn fit_to_window(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let resize = {
        let canvas = canvas.clone();
        move || {
            let Some(window) = window() else { return };
            let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            if w > 0.0 && h > 0.0 {
                canvas.set_width(w as u32);
                canvas.set_height(h as u32);
            }
        }
    };
    resize();

    let resize_closure = Closure::wrap(Box::new(resize) as Box<dyn FnMut()>);
    window()
        .ok_or("no window")?
        .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();
    Ok(())
}

// A resize clears the drawing buffer; static scenes have no next frame.
fn redraw_on_resize(mut scene: Scene<WebGl>, renderer: FrameRenderer<WebGl>) -> Result<(), JsValue> {
    let redraw = Closure::wrap(Box::new(move || {
        if let Err(err) = scene.render(&renderer, 0.0) {
            error!("redraw after resize failed: {err}");
        }
    }) as Box<dyn FnMut()>);
    window()
        .ok_or("no window")?
        .add_event_listener_with_callback("resize", redraw.as_ref().unchecked_ref())?;
    redraw.forget();
    Ok(())
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    window()
        .ok_or("no window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Renders `scene` on every animation frame until the page goes away.
fn run_loop(mut scene: Scene<WebGl>, renderer: FrameRenderer<WebGl>) -> Result<(), JsValue> {
    // `f` holds the animation-frame closure so that we can keep calling
    // `request_animation_frame` recursively. Storing it inside an `Option`
    // allows us to create the `Closure` first and then obtain a reference to
    // it from within itself.
    let f: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let mut clock = FrameClock::default();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        let elapsed = clock.tick(now);
        if let Err(err) = scene.render(&renderer, elapsed) {
            error!("frame failed, stopping animation: {err}");
            return;
        }

        // schedule next
        if let Some(callback) = f.borrow().as_ref() {
            if let Err(err) = request_frame(callback) {
                error!("requestAnimationFrame failed: {err:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let scheduled = match g.borrow().as_ref() {
        Some(callback) => request_frame(callback).map(|_| ()),
        None => Ok(()),
    };
    scheduled
}
