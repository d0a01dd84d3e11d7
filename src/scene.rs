//! The built-in scenes: shader text, geometry and camera for each demo.

use log::debug;
use serde::Deserialize;

use crate::animation::ColorOscillator;
use crate::camera::Camera;
use crate::error::RenderError;
use crate::frame::{DrawCall, FrameRenderer, ATTRIBUTES, UNIFORMS};
use crate::geometry::{Channel, GeometryBuffer};
use crate::gl::Gl;
use crate::shader::ShaderProgram;
use crate::texture::{placeholder, Texture, TextureOptions};

pub const WHITE_VS: &str = r#"
    attribute vec4 aVertexPosition;
    uniform mat4 uModelViewMatrix;
    uniform mat4 uProjectionMatrix;
    void main() {
        gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
    }
"#;

pub const WHITE_FS: &str = r#"
    void main() {
        gl_FragColor = vec4(1.0, 1.0, 1.0, 1.0);
    }
"#;

pub const COLOR_VS: &str = r#"
    attribute vec4 aVertexPosition;
    attribute vec4 aVertexColor;
    uniform mat4 uModelViewMatrix;
    uniform mat4 uProjectionMatrix;
    varying lowp vec4 vColor;
    void main() {
        gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
        vColor = aVertexColor;
    }
"#;

pub const COLOR_FS: &str = r#"
    varying lowp vec4 vColor;
    void main() {
        gl_FragColor = vColor;
    }
"#;

pub const TEXTURE_VS: &str = r#"
    attribute vec4 aVertexPosition;
    attribute vec2 aTextureCoord;
    uniform mat4 uModelViewMatrix;
    uniform mat4 uProjectionMatrix;
    varying highp vec2 vTextureCoord;
    void main() {
        gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
        vTextureCoord = aTextureCoord;
    }
"#;

pub const TEXTURE_FS: &str = r#"
    varying highp vec2 vTextureCoord;
    uniform sampler2D uSampler;
    void main(void) {
        gl_FragColor = texture2D(uSampler, vTextureCoord);
    }
"#;

/// Unit quad in strip order: top-right, top-left, bottom-right, bottom-left.
#[rustfmt::skip]
pub const QUAD_POSITIONS: [f32; 8] = [
     1.0,  1.0,
    -1.0,  1.0,
     1.0, -1.0,
    -1.0, -1.0,
];

#[rustfmt::skip]
pub const QUAD_TEX_COORDS: [f32; 8] = [
    1.0, 0.0,
    0.0, 0.0,
    1.0, 1.0,
    0.0, 1.0,
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 2, 3];

/// One textured draw in the sprite scene.
pub struct Batch {
    pub positions: &'static [f32],
    pub tex_coords: &'static [f32],
    pub indices: &'static [u16],
    pub texture: usize,
}

#[rustfmt::skip]
pub const SPRITE_BATCHES: [Batch; 3] = [
    Batch {
        positions: &[
            -96.0, 32.0,
            -32.0, 32.0,
            -96.0, 96.0,
            -32.0, 96.0,
        ],
        tex_coords: &[
            0.0, 1.0,
            1.0, 1.0,
            0.0, 0.0,
            1.0, 0.0,
        ],
        indices: &[0, 1, 2, 1, 2, 3],
        texture: 0,
    },
    Batch {
        positions: &[
            32.0, 32.0,
            96.0, 32.0,
            32.0, 96.0,
            96.0, 96.0,
        ],
        tex_coords: &[
            0.0, 1.0,
            1.0, 1.0,
            0.0, 0.0,
            1.0, 0.0,
        ],
        indices: &[0, 1, 2, 1, 2, 3],
        texture: 1,
    },
    // Two sprites cut from the left and right halves of one atlas.
    Batch {
        positions: &[
            -96.0, -96.0,
            -32.0, -96.0,
            -96.0, -32.0,
            -32.0, -32.0,
             32.0, -96.0,
             96.0, -96.0,
             32.0, -32.0,
             96.0, -32.0,
        ],
        tex_coords: &[
            0.0, 1.0,
            0.5, 1.0,
            0.0, 0.0,
            0.5, 0.0,
            0.5, 1.0,
            1.0, 1.0,
            0.5, 0.0,
            1.0, 0.0,
        ],
        indices: &[
            0, 1, 2,
            1, 2, 3,
            4, 5, 6,
            5, 6, 7,
        ],
        texture: 2,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// A white quad drawn once.
    WhiteQuad,
    /// Strip quad with oscillating vertex colors.
    #[default]
    ColorQuad,
    /// The color quad drawn from an index buffer.
    IndexedColorQuad,
    /// One textured, indexed quad.
    TexturedQuad,
    /// Three sprite batches under a pixel-space orthographic camera.
    SpriteBatches,
}

impl SceneKind {
    pub fn shaders(self) -> (&'static str, &'static str) {
        match self {
            SceneKind::WhiteQuad => (WHITE_VS, WHITE_FS),
            SceneKind::ColorQuad | SceneKind::IndexedColorQuad => (COLOR_VS, COLOR_FS),
            SceneKind::TexturedQuad | SceneKind::SpriteBatches => (TEXTURE_VS, TEXTURE_FS),
        }
    }

    pub fn camera(self) -> Camera {
        match self {
            SceneKind::SpriteBatches => Camera::orthographic(),
            _ => Camera::perspective(),
        }
    }

    pub fn default_texture_urls(self) -> &'static [&'static str] {
        match self {
            SceneKind::TexturedQuad => &["./assets/texture/tex1.png"],
            SceneKind::SpriteBatches => &[
                "./assets/texture/tex1.png",
                "./assets/texture/tex2.png",
                "./assets/texture/tex3.png",
            ],
            _ => &[],
        }
    }

    pub fn texture_options(self) -> TextureOptions {
        TextureOptions {
            sharp: self == SceneKind::SpriteBatches,
        }
    }

    /// Textures the scene samples from; missing ones draw as placeholders.
    pub fn texture_slots(self) -> usize {
        match self {
            SceneKind::TexturedQuad => 1,
            SceneKind::SpriteBatches => SPRITE_BATCHES.iter().map(|b| b.texture + 1).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Static scenes are drawn once and never scheduled again.
    pub fn is_animated(self) -> bool {
        self != SceneKind::WhiteQuad
    }
}

/// Everything one demo needs between frames.
pub struct Scene<G: Gl> {
    gl: G,
    kind: SceneKind,
    program: ShaderProgram<G>,
    geometry: GeometryBuffer<G>,
    textures: Vec<Texture<G>>,
    camera: Camera,
    oscillator: ColorOscillator,
}

impl<G: Gl> Scene<G> {
    /// Compiles the scene's program. Textures arrive later through
    /// [`Scene::attach_textures`] so shader errors surface before any
    /// image is fetched.
    pub fn new(gl: &G, kind: SceneKind) -> Result<Self, RenderError> {
        let (vertex, fragment) = kind.shaders();
        let mut program = ShaderProgram::compile(gl, vertex, fragment)?;
        program.resolve(&ATTRIBUTES, &UNIFORMS);

        let mut geometry = GeometryBuffer::new(gl);
        if kind == SceneKind::WhiteQuad {
            geometry.upload(Channel::Position, &QUAD_POSITIONS)?;
        }

        debug!("scene {kind:?} compiled");
        let mut scene = Self {
            gl: gl.clone(),
            kind,
            program,
            geometry,
            textures: Vec::new(),
            camera: kind.camera(),
            oscillator: ColorOscillator::default(),
        };
        scene.fill_texture_slots()?;
        Ok(scene)
    }

    /// Replaces the scene's textures. Slots past the end of `textures` get
    /// placeholders so every draw binds something of its own.
    pub fn attach_textures(&mut self, textures: Vec<Texture<G>>) -> Result<(), RenderError> {
        debug!("scene {:?} holds {} texture(s)", self.kind, textures.len());
        self.textures = textures;
        self.fill_texture_slots()
    }

    fn fill_texture_slots(&mut self) -> Result<(), RenderError> {
        while self.textures.len() < self.kind.texture_slots() {
            self.textures.push(placeholder(&self.gl)?);
        }
        Ok(())
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn oscillator(&self) -> ColorOscillator {
        self.oscillator
    }

    pub fn geometry(&self) -> &GeometryBuffer<G> {
        &self.geometry
    }

    pub fn textures(&self) -> &[Texture<G>] {
        &self.textures
    }

    /// Advances animation state by `elapsed` seconds and draws one frame.
    pub fn render(&mut self, renderer: &FrameRenderer<G>, elapsed: f32) -> Result<Vec<DrawCall>, RenderError> {
        renderer.begin_frame();
        let mut draws = Vec::new();

        match self.kind {
            SceneKind::WhiteQuad => {
                draws.extend(renderer.draw_frame(&self.program, &self.geometry, None, &self.camera));
            }
            SceneKind::ColorQuad | SceneKind::IndexedColorQuad => {
                self.oscillator = self.oscillator.step(elapsed);
                self.geometry.upload(Channel::Position, &QUAD_POSITIONS)?;
                self.geometry.upload(Channel::Color, &self.oscillator.quad_colors())?;
                if self.kind == SceneKind::IndexedColorQuad {
                    self.geometry.upload_indices(&QUAD_INDICES)?;
                }
                draws.extend(renderer.draw_frame(&self.program, &self.geometry, None, &self.camera));
            }
            SceneKind::TexturedQuad => {
                self.geometry.upload(Channel::Position, &QUAD_POSITIONS)?;
                self.geometry.upload(Channel::TexCoord, &QUAD_TEX_COORDS)?;
                self.geometry.upload_indices(&QUAD_INDICES)?;
                let texture = self.textures.first();
                draws.extend(renderer.draw_frame(&self.program, &self.geometry, texture, &self.camera));
            }
            SceneKind::SpriteBatches => {
                for batch in &SPRITE_BATCHES {
                    self.geometry.upload(Channel::Position, batch.positions)?;
                    self.geometry.upload(Channel::TexCoord, batch.tex_coords)?;
                    self.geometry.upload_indices(batch.indices)?;
                    let texture = self.textures.get(batch.texture);
                    draws.extend(renderer.draw_frame(&self.program, &self.geometry, texture, &self.camera));
                }
            }
        }

        Ok(draws)
    }
}
