use log::trace;

use crate::camera::Camera;
use crate::geometry::{Channel, GeometryBuffer};
use crate::gl::{BufferTarget, DrawMode, Gl};
use crate::shader::ShaderProgram;
use crate::texture::Texture;

pub const ATTR_POSITION: &str = "aVertexPosition";
pub const ATTR_COLOR: &str = "aVertexColor";
pub const ATTR_TEXCOORD: &str = "aTextureCoord";

pub const UNIFORM_PROJECTION: &str = "uProjectionMatrix";
pub const UNIFORM_MODEL_VIEW: &str = "uModelViewMatrix";
pub const UNIFORM_SAMPLER: &str = "uSampler";

pub const ATTRIBUTES: [&str; 3] = [ATTR_POSITION, ATTR_COLOR, ATTR_TEXCOORD];
pub const UNIFORMS: [&str; 3] = [UNIFORM_PROJECTION, UNIFORM_MODEL_VIEW, UNIFORM_SAMPLER];

/// Every texture is sampled from this unit.
pub const TEXTURE_UNIT: u32 = 0;

pub fn attribute_name(channel: Channel) -> &'static str {
    match channel {
        Channel::Position => ATTR_POSITION,
        Channel::Color => ATTR_COLOR,
        Channel::TexCoord => ATTR_TEXCOORD,
    }
}

/// The single draw call issued by [`FrameRenderer::draw_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Strip { vertices: i32 },
    Indexed { indices: i32 },
}

pub struct FrameRenderer<G: Gl> {
    gl: G,
    clear_color: [f32; 4],
}

impl<G: Gl> FrameRenderer<G> {
    pub fn new(gl: &G, clear_color: [f32; 4]) -> Self {
        Self {
            gl: gl.clone(),
            clear_color,
        }
    }

    /// Matches the viewport to the drawing buffer and clears color and
    /// depth. Call once per frame, before any draw.
    pub fn begin_frame(&self) {
        let (width, height) = self.gl.drawing_buffer_size();
        self.gl.viewport(width, height);
        self.gl.enable_depth_test();
        self.gl.clear(self.clear_color);
    }

    /// Binds `geometry` to `program` and issues exactly one draw call.
    ///
    /// Geometry with an index buffer draws an indexed triangle list over all
    /// indices; otherwise a triangle strip over every position. Channels
    /// whose attribute the program does not use are skipped. Returns `None`
    /// without drawing when there are no positions.
    pub fn draw_frame(
        &self,
        program: &ShaderProgram<G>,
        geometry: &GeometryBuffer<G>,
        texture: Option<&Texture<G>>,
        camera: &Camera,
    ) -> Option<DrawCall> {
        let gl = &self.gl;
        let vertices = geometry.vertex_count();
        if vertices == 0 {
            trace!("skipping draw: no positions uploaded");
            return None;
        }

        let matrices = camera.matrices(gl.aspect());
        gl.use_program(program.handle());

        for channel in Channel::ALL {
            let (Some(buffer), Some(slot)) = (geometry.buffer(channel), program.attribute_location(attribute_name(channel))) else {
                continue;
            };
            gl.bind_buffer(BufferTarget::Array, buffer);
            gl.vertex_attrib_pointer(slot, channel.components());
            gl.enable_vertex_attrib_array(slot);
        }

        if let Some(location) = program.uniform_location(UNIFORM_PROJECTION) {
            gl.uniform_matrix4(&location, &matrices.projection.to_cols_array());
        }
        if let Some(location) = program.uniform_location(UNIFORM_MODEL_VIEW) {
            gl.uniform_matrix4(&location, &matrices.model_view.to_cols_array());
        }

        if let Some(texture) = texture {
            gl.active_texture(TEXTURE_UNIT);
            gl.bind_texture(&texture.handle);
            if let Some(location) = program.uniform_location(UNIFORM_SAMPLER) {
                gl.uniform1i(&location, TEXTURE_UNIT as i32);
            }
        }

        match (geometry.index_buffer(), geometry.indices()) {
            (Some(buffer), Some(indices)) => {
                let count = indices.len() as i32;
                gl.bind_buffer(BufferTarget::ElementArray, buffer);
                gl.draw_elements_u16(DrawMode::Triangles, count, 0);
                Some(DrawCall::Indexed { indices: count })
            }
            _ => {
                let count = vertices as i32;
                gl.draw_arrays(DrawMode::TriangleStrip, 0, count);
                Some(DrawCall::Strip { vertices: count })
            }
        }
    }
}
