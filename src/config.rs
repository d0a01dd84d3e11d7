use serde::Deserialize;

use crate::error::RenderError;
use crate::scene::SceneKind;
use crate::texture::TextureOptions;

/// Id of the canvas the page must provide.
pub const CANVAS_ID: &str = "glCanvas";

/// Start-up settings, read as JSON from the canvas' `data-config`
/// attribute. Every field is optional.
///
/// ```json
/// { "scene": "sprite_batches", "clear_color": [0.1, 0.1, 0.1, 1.0] }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub scene: SceneKind,
    /// Replaces the scene's built-in texture list when set.
    pub texture_urls: Option<Vec<String>>,
    pub clear_color: [f32; 4],
    pub log_level: String,
    /// Resize the canvas to the window and follow window resizes.
    pub fit_window: bool,
    /// Forces nearest (true) or smooth (false) texture sampling.
    pub sharp_textures: Option<bool>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            scene: SceneKind::default(),
            texture_urls: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            log_level: "info".to_string(),
            fit_window: false,
            sharp_textures: None,
        }
    }
}

impl RendererConfig {
    /// Parses `data-config`; a missing or blank attribute means defaults.
    pub fn from_attribute(value: Option<&str>) -> Result<Self, RenderError> {
        match value {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(json)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn texture_urls(&self) -> Vec<String> {
        match &self.texture_urls {
            Some(urls) => urls.clone(),
            None => self.scene.default_texture_urls().iter().map(|u| u.to_string()).collect(),
        }
    }

    pub fn texture_options(&self) -> TextureOptions {
        let mut options = self.scene.texture_options();
        if let Some(sharp) = self.sharp_textures {
            options.sharp = sharp;
        }
        options
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
