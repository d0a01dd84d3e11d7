//! Texture upload and the join-all-settled image loader.

use std::future::Future;

use futures::future::join_all;
use log::{debug, warn};

use crate::error::RenderError;
use crate::gl::{Gl, ImageSource, TextureFilter, TextureWrap};

/// Opaque blue, shown wherever an image is missing.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureOptions {
    /// Nearest-neighbour sampling for pixel art.
    pub sharp: bool,
}

pub struct Texture<G: Gl> {
    pub handle: G::Texture,
    pub width: u32,
    pub height: u32,
    pub mipmapped: bool,
    /// True when this stands in for an image that failed to load.
    pub placeholder: bool,
}

pub fn is_power_of_two(n: u32) -> bool {
    n.is_power_of_two()
}

/// Uploads a 1x1 [`PLACEHOLDER_PIXEL`] texture.
pub fn placeholder<G: Gl>(gl: &G) -> Result<Texture<G>, RenderError> {
    let handle = gl.create_texture().ok_or(RenderError::Allocation("texture"))?;
    gl.bind_texture(&handle);
    gl.tex_image_pixels(1, 1, &PLACEHOLDER_PIXEL)?;
    gl.tex_filter(TextureFilter::Nearest, TextureFilter::Nearest);
    Ok(Texture {
        handle,
        width: 1,
        height: 1,
        mipmapped: false,
        placeholder: true,
    })
}

/// Uploads a decoded image as a 2D texture.
///
/// Images with power-of-two sides get a mipmap chain. Anything else is
/// clamped to the edge and never mipmapped, which WebGL 1 cannot do for
/// NPOT textures.
pub fn upload_image<G: Gl>(gl: &G, image: &G::Image, options: TextureOptions) -> Result<Texture<G>, RenderError> {
    let handle = gl.create_texture().ok_or(RenderError::Allocation("texture"))?;
    gl.bind_texture(&handle);
    gl.tex_image(image)?;

    let (width, height) = (image.width(), image.height());
    let mipmapped = is_power_of_two(width) && is_power_of_two(height);
    if mipmapped {
        gl.generate_mipmap();
        if options.sharp {
            gl.tex_filter(TextureFilter::Nearest, TextureFilter::Nearest);
        } else {
            gl.tex_filter(TextureFilter::LinearMipmapLinear, TextureFilter::Linear);
        }
    } else {
        gl.tex_wrap(TextureWrap::ClampToEdge);
        if options.sharp {
            gl.tex_filter(TextureFilter::Nearest, TextureFilter::Nearest);
        } else {
            gl.tex_filter(TextureFilter::Linear, TextureFilter::Linear);
        }
    }

    debug!("uploaded {width}x{height} texture (mipmapped: {mipmapped})");
    Ok(Texture {
        handle,
        width,
        height,
        mipmapped,
        placeholder: false,
    })
}

/// Fetches every URL concurrently and uploads what arrives.
///
/// Resolves once every fetch has settled. A failed fetch or upload is
/// logged and replaced with a placeholder, so the result always has one
/// texture per URL, in URL order. Only a failure to allocate the
/// placeholder itself is returned as an error.
pub async fn load_all<G, F, Fut>(
    gl: &G,
    urls: &[String],
    fetch: F,
    options: TextureOptions,
) -> Result<Vec<Texture<G>>, RenderError>
where
    G: Gl,
    F: Fn(&str) -> Fut,
    Fut: Future<Output = Result<G::Image, RenderError>>,
{
    let settled = join_all(urls.iter().map(|url| fetch(url.as_str()))).await;

    let mut textures = Vec::with_capacity(settled.len());
    for (url, result) in urls.iter().zip(settled) {
        let texture = match result.and_then(|image| upload_image(gl, &image, options)) {
            Ok(texture) => texture,
            Err(err) => {
                warn!("\"{url}\" load failed: {err}");
                placeholder(gl)?
            }
        };
        textures.push(texture);
    }
    Ok(textures)
}
