//! The slice of an immediate-mode graphics API the renderer relies on.
//!
//! The browser implementation wraps `WebGl2RenderingContext`; the
//! `RecordingGl` backend (feature `recording`) logs calls instead
//! of issuing them, which lets the pipeline run headless.

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    TriangleStrip,
    Triangles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// Decoded pixels the backend can upload as a 2D texture.
pub trait ImageSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Rendering context capabilities. Handles are cheap clones of GPU-side
/// objects; `None` from a `create_*` call means the context refused to
/// allocate (usually a lost context).
pub trait Gl: Clone {
    type Shader: Clone;
    type Program: Clone;
    type Buffer: Clone;
    type Texture: Clone;
    type UniformLocation: Clone;
    type Image: ImageSource;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compiled(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_linked(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn delete_program(&self, program: &Self::Program);
    fn use_program(&self, program: &Self::Program);

    /// Raw slot index; negative when the attribute is not active.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32;
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &[f32; 16]);
    fn uniform1i(&self, location: &Self::UniformLocation, value: i32);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_buffer(&self, target: BufferTarget, buffer: &Self::Buffer);
    /// Uploads into the buffer currently bound to `target`.
    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]);
    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]);
    fn vertex_attrib_pointer(&self, slot: u32, components: i32);
    fn enable_vertex_attrib_array(&self, slot: u32);

    fn create_texture(&self) -> Option<Self::Texture>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: &Self::Texture);
    fn tex_image_pixels(&self, width: u32, height: u32, rgba: &[u8]) -> Result<(), RenderError>;
    fn tex_image(&self, image: &Self::Image) -> Result<(), RenderError>;
    fn tex_wrap(&self, wrap: TextureWrap);
    fn tex_filter(&self, min: TextureFilter, mag: TextureFilter);
    fn generate_mipmap(&self);

    fn viewport(&self, width: i32, height: i32);
    fn clear(&self, color: [f32; 4]);
    /// Enables depth testing with `LEQUAL` so near things obscure far things.
    fn enable_depth_test(&self);
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);
    fn draw_elements_u16(&self, mode: DrawMode, count: i32, offset: i32);

    /// Size in pixels of the buffer draws land in. Follows canvas resizes.
    fn drawing_buffer_size(&self) -> (i32, i32);
    /// Width over height of the drawable surface as laid out on the page.
    fn aspect(&self) -> f32;
}
