use js_sys::{Float32Array, Uint16Array};
use wasm_bindgen::JsValue;
use web_sys::{
    HtmlCanvasElement, HtmlImageElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture, WebGlUniformLocation,
};

use crate::error::RenderError;
use crate::gl::{BufferTarget, DrawMode, Gl, ImageSource, ShaderStage, TextureFilter, TextureWrap};

/// [`Gl`] over a WebGL2 context and the canvas it draws into.
#[derive(Clone)]
pub struct WebGl {
    gl: GL,
    canvas: HtmlCanvasElement,
}

impl WebGl {
    pub fn new(gl: GL, canvas: HtmlCanvasElement) -> Self {
        Self { gl, canvas }
    }
}

impl ImageSource for HtmlImageElement {
    fn width(&self) -> u32 {
        self.natural_width()
    }

    fn height(&self) -> u32 {
        self.natural_height()
    }
}

fn stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    }
}

fn target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => GL::ARRAY_BUFFER,
        BufferTarget::ElementArray => GL::ELEMENT_ARRAY_BUFFER,
    }
}

fn mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::TriangleStrip => GL::TRIANGLE_STRIP,
        DrawMode::Triangles => GL::TRIANGLES,
    }
}

fn filter(filter: TextureFilter) -> i32 {
    (match filter {
        TextureFilter::Nearest => GL::NEAREST,
        TextureFilter::Linear => GL::LINEAR,
        TextureFilter::LinearMipmapLinear => GL::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

fn upload_error(err: JsValue) -> RenderError {
    RenderError::Upload(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl Gl for WebGl {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;
    type UniformLocation = WebGlUniformLocation;
    type Image = HtmlImageElement;

    fn create_shader(&self, s: ShaderStage) -> Option<WebGlShader> {
        self.gl.create_shader(stage(s))
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        self.gl.compile_shader(shader);
    }

    fn shader_compiled(&self, shader: &WebGlShader) -> bool {
        self.gl
            .get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.attach_shader(program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        self.gl.link_program(program);
    }

    fn program_linked(&self, program: &WebGlProgram) -> bool {
        self.gl
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn delete_program(&self, program: &WebGlProgram) {
        self.gl.delete_program(Some(program));
    }

    fn use_program(&self, program: &WebGlProgram) {
        self.gl.use_program(Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> i32 {
        self.gl.get_attrib_location(program, name)
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn uniform_matrix4(&self, location: &WebGlUniformLocation, matrix: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(Some(location), false, matrix);
    }

    fn uniform1i(&self, location: &WebGlUniformLocation, value: i32) {
        self.gl.uniform1i(Some(location), value);
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn bind_buffer(&self, t: BufferTarget, buffer: &WebGlBuffer) {
        self.gl.bind_buffer(target(t), Some(buffer));
    }

    fn buffer_data_f32(&self, t: BufferTarget, data: &[f32]) {
        let array = Float32Array::from(data);
        self.gl.buffer_data_with_array_buffer_view(target(t), &array, GL::STATIC_DRAW);
    }

    fn buffer_data_u16(&self, t: BufferTarget, data: &[u16]) {
        let array = Uint16Array::from(data);
        self.gl.buffer_data_with_array_buffer_view(target(t), &array, GL::STATIC_DRAW);
    }

    fn vertex_attrib_pointer(&self, slot: u32, components: i32) {
        // tightly packed floats, starting at the front of the buffer
        self.gl.vertex_attrib_pointer_with_i32(slot, components, GL::FLOAT, false, 0, 0);
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        self.gl.enable_vertex_attrib_array(slot);
    }

    fn create_texture(&self) -> Option<WebGlTexture> {
        self.gl.create_texture()
    }

    fn active_texture(&self, unit: u32) {
        self.gl.active_texture(GL::TEXTURE0 + unit);
    }

    fn bind_texture(&self, texture: &WebGlTexture) {
        self.gl.bind_texture(GL::TEXTURE_2D, Some(texture));
    }

    fn tex_image_pixels(&self, width: u32, height: u32, rgba: &[u8]) -> Result<(), RenderError> {
        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                GL::RGBA as i32,
                width as i32,
                height as i32,
                0,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                Some(rgba),
            )
            .map_err(upload_error)
    }

    fn tex_image(&self, image: &HtmlImageElement) -> Result<(), RenderError> {
        self.gl
            .tex_image_2d_with_u32_and_u32_and_html_image_element(
                GL::TEXTURE_2D,
                0,
                GL::RGBA as i32,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                image,
            )
            .map_err(upload_error)
    }

    fn tex_wrap(&self, wrap: TextureWrap) {
        let value = match wrap {
            TextureWrap::Repeat => GL::REPEAT,
            TextureWrap::ClampToEdge => GL::CLAMP_TO_EDGE,
        } as i32;
        self.gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, value);
        self.gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, value);
    }

    fn tex_filter(&self, min: TextureFilter, mag: TextureFilter) {
        self.gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, filter(min));
        self.gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, filter(mag));
    }

    fn generate_mipmap(&self) {
        self.gl.generate_mipmap(GL::TEXTURE_2D);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    fn clear(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear_depth(1.0);
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    fn enable_depth_test(&self) {
        self.gl.enable(GL::DEPTH_TEST);
        self.gl.depth_func(GL::LEQUAL);
    }

    fn draw_arrays(&self, m: DrawMode, first: i32, count: i32) {
        self.gl.draw_arrays(mode(m), first, count);
    }

    fn draw_elements_u16(&self, m: DrawMode, count: i32, offset: i32) {
        self.gl.draw_elements_with_i32(mode(m), count, GL::UNSIGNED_SHORT, offset);
    }

    fn drawing_buffer_size(&self) -> (i32, i32) {
        (self.gl.drawing_buffer_width(), self.gl.drawing_buffer_height())
    }

    fn aspect(&self) -> f32 {
        let width = self.canvas.client_width() as f32;
        let height = self.canvas.client_height() as f32;
        if height > 0.0 {
            width / height
        } else {
            1.0
        }
    }
}
