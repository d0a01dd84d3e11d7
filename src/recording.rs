//! Headless [`Gl`] backend that records every call.
//!
//! Shader "compilation" is a shallow check: a stage compiles when it has a
//! `main` entry point and balanced braces, and a program links when every
//! varying the fragment stage reads is written by the vertex stage.
//! Attribute and uniform slots are handed out in declaration order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RenderError;
use crate::gl::{BufferTarget, DrawMode, Gl, ImageSource, ShaderStage, TextureFilter, TextureWrap};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader { stage: ShaderStage, id: u32 },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    UniformMatrix4 { slot: u32, matrix: [f32; 16] },
    Uniform1i { slot: u32, value: i32 },
    CreateBuffer(u32),
    BindBuffer { target: BufferTarget, id: u32 },
    BufferDataF32 { target: BufferTarget, len: usize },
    BufferDataU16 { target: BufferTarget, len: usize },
    VertexAttribPointer { slot: u32, components: i32 },
    EnableVertexAttribArray(u32),
    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture(u32),
    TexImage { width: u32, height: u32 },
    TexWrap(TextureWrap),
    TexFilter { min: TextureFilter, mag: TextureFilter },
    GenerateMipmap,
    Viewport { width: i32, height: i32 },
    Clear([f32; 4]),
    EnableDepthTest,
    DrawArrays { mode: DrawMode, first: i32, count: i32 },
    DrawElements { mode: DrawMode, count: i32, offset: i32 },
}

impl Call {
    pub fn is_draw(&self) -> bool {
        matches!(self, Call::DrawArrays { .. } | Call::DrawElements { .. })
    }
}

/// Stand-in for a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedImage {
    pub width: u32,
    pub height: u32,
}

impl RecordedImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ImageSource for RecordedImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Uniform slot handed out by [`RecordingGl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot(pub u32);

#[derive(Debug)]
struct ShaderState {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: Option<String>,
}

#[derive(Debug, Default)]
struct ProgramState {
    shaders: Vec<u32>,
    linked: bool,
    log: Option<String>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug)]
struct State {
    calls: Vec<Call>,
    next_id: u32,
    shaders: HashMap<u32, ShaderState>,
    programs: HashMap<u32, ProgramState>,
    lost: bool,
    aspect: f32,
    surface: (i32, i32),
}

#[derive(Debug, Clone)]
pub struct RecordingGl {
    state: Rc<RefCell<State>>,
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGl {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                calls: Vec::new(),
                next_id: 1,
                shaders: HashMap::new(),
                programs: HashMap::new(),
                lost: false,
                aspect: 640.0 / 480.0,
                surface: (640, 480),
            })),
        }
    }

    pub fn with_aspect(self, aspect: f32) -> Self {
        self.state.borrow_mut().aspect = aspect;
        self
    }

    /// Resizes the drawing buffer, as a canvas resize would.
    pub fn resize(&self, width: i32, height: i32) {
        self.state.borrow_mut().surface = (width, height);
    }

    /// Every later `create_*` call returns `None`.
    pub fn lose_context(&self) {
        self.state.borrow_mut().lost = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Returns the calls recorded so far and starts a fresh log.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn draw_calls(&self) -> Vec<Call> {
        self.state.borrow().calls.iter().filter(|c| c.is_draw()).cloned().collect()
    }

    /// Shaders created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn allocate(&self) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        if state.lost {
            return None;
        }
        let id = state.next_id;
        state.next_id += 1;
        Some(id)
    }
}

/// Names declared with one of `qualifiers` as the leading keyword.
fn declarations(source: &str, qualifiers: &[&str]) -> Vec<String> {
    let code: String = source
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let mut names = Vec::new();
    for statement in code.split(|c: char| c == ';' || c == '{' || c == '}') {
        let mut tokens = statement.split_whitespace();
        let Some(first) = tokens.next() else { continue };
        if !qualifiers.contains(&first) {
            continue;
        }
        if let Some(last) = statement.split_whitespace().last() {
            let name = last.split('[').next().unwrap_or(last);
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn attribute_qualifiers() -> &'static [&'static str] {
    &["attribute", "in"]
}

fn varying_qualifiers(stage: ShaderStage) -> &'static [&'static str] {
    match stage {
        ShaderStage::Vertex => &["varying", "out"],
        ShaderStage::Fragment => &["varying", "in"],
    }
}

fn check_source(source: &str) -> Result<(), String> {
    if !source.contains("void main") {
        return Err("ERROR: 0:0: missing entry point 'main'".to_string());
    }
    let opened = source.matches('{').count();
    let closed = source.matches('}').count();
    if opened != closed {
        return Err(format!("ERROR: 0:0: unbalanced braces ({opened} opened, {closed} closed)"));
    }
    Ok(())
}

impl Gl for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type UniformLocation = UniformSlot;
    type Image = RecordedImage;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        let id = self.allocate()?;
        let mut state = self.state.borrow_mut();
        state.shaders.insert(id, ShaderState { stage, source: String::new(), compiled: false, log: None });
        state.calls.push(Call::CreateShader { stage, id });
        Some(id)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: &u32) {
        let mut state = self.state.borrow_mut();
        if let Some(s) = state.shaders.get_mut(shader) {
            match check_source(&s.source) {
                Ok(()) => {
                    s.compiled = true;
                    s.log = None;
                }
                Err(log) => {
                    s.compiled = false;
                    s.log = Some(log);
                }
            }
        }
        state.calls.push(Call::CompileShader(*shader));
    }

    fn shader_compiled(&self, shader: &u32) -> bool {
        self.state.borrow().shaders.get(shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: &u32) -> Option<String> {
        self.state.borrow().shaders.get(shader).and_then(|s| s.log.clone())
    }

    fn delete_shader(&self, shader: &u32) {
        self.state.borrow_mut().shaders.remove(shader);
        self.record(Call::DeleteShader(*shader));
    }

    fn create_program(&self) -> Option<u32> {
        let id = self.allocate()?;
        let mut state = self.state.borrow_mut();
        state.programs.insert(id, ProgramState::default());
        state.calls.push(Call::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(program) {
            p.shaders.push(*shader);
        }
        self.record(Call::AttachShader { program: *program, shader: *shader });
    }

    fn link_program(&self, program: &u32) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::LinkProgram(*program));

        let attached = match state.programs.get(program) {
            Some(p) => p.shaders.clone(),
            None => return,
        };
        let mut vertex = None;
        let mut fragment = None;
        for id in attached {
            if let Some(s) = state.shaders.get(&id) {
                if !s.compiled {
                    continue;
                }
                match s.stage {
                    ShaderStage::Vertex => vertex = Some(s.source.clone()),
                    ShaderStage::Fragment => fragment = Some(s.source.clone()),
                }
            }
        }

        let result = match (vertex, fragment) {
            (Some(vs), Some(fs)) => {
                let written = declarations(&vs, varying_qualifiers(ShaderStage::Vertex));
                let missing: Vec<String> = declarations(&fs, varying_qualifiers(ShaderStage::Fragment))
                    .into_iter()
                    .filter(|name| !written.contains(name))
                    .collect();
                if missing.is_empty() {
                    let attributes = declarations(&vs, attribute_qualifiers());
                    let mut uniforms = declarations(&vs, &["uniform"]);
                    for name in declarations(&fs, &["uniform"]) {
                        if !uniforms.contains(&name) {
                            uniforms.push(name);
                        }
                    }
                    Ok((attributes, uniforms))
                } else {
                    Err(format!(
                        "varyings read by the fragment shader are not declared in the vertex shader: {}",
                        missing.join(", ")
                    ))
                }
            }
            _ => Err("a compiled vertex and fragment shader must be attached".to_string()),
        };

        if let Some(p) = state.programs.get_mut(program) {
            match result {
                Ok((attributes, uniforms)) => {
                    p.linked = true;
                    p.log = None;
                    p.attributes = attributes;
                    p.uniforms = uniforms;
                }
                Err(log) => {
                    p.linked = false;
                    p.log = Some(log);
                }
            }
        }
    }

    fn program_linked(&self, program: &u32) -> bool {
        self.state.borrow().programs.get(program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: &u32) -> Option<String> {
        self.state.borrow().programs.get(program).and_then(|p| p.log.clone())
    }

    fn delete_program(&self, program: &u32) {
        self.state.borrow_mut().programs.remove(program);
        self.record(Call::DeleteProgram(*program));
    }

    fn use_program(&self, program: &u32) {
        self.record(Call::UseProgram(*program));
    }

    fn attrib_location(&self, program: &u32, name: &str) -> i32 {
        let state = self.state.borrow();
        state
            .programs
            .get(program)
            .filter(|p| p.linked)
            .and_then(|p| p.attributes.iter().position(|a| a == name))
            .map_or(-1, |slot| slot as i32)
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<UniformSlot> {
        let state = self.state.borrow();
        state
            .programs
            .get(program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.iter().position(|u| u == name))
            .map(|slot| UniformSlot(slot as u32))
    }

    fn uniform_matrix4(&self, location: &UniformSlot, matrix: &[f32; 16]) {
        self.record(Call::UniformMatrix4 { slot: location.0, matrix: *matrix });
    }

    fn uniform1i(&self, location: &UniformSlot, value: i32) {
        self.record(Call::Uniform1i { slot: location.0, value });
    }

    fn create_buffer(&self) -> Option<u32> {
        let id = self.allocate()?;
        self.record(Call::CreateBuffer(id));
        Some(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: &u32) {
        self.record(Call::BindBuffer { target, id: *buffer });
    }

    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]) {
        self.record(Call::BufferDataF32 { target, len: data.len() });
    }

    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]) {
        self.record(Call::BufferDataU16 { target, len: data.len() });
    }

    fn vertex_attrib_pointer(&self, slot: u32, components: i32) {
        self.record(Call::VertexAttribPointer { slot, components });
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        self.record(Call::EnableVertexAttribArray(slot));
    }

    fn create_texture(&self) -> Option<u32> {
        let id = self.allocate()?;
        self.record(Call::CreateTexture(id));
        Some(id)
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, texture: &u32) {
        self.record(Call::BindTexture(*texture));
    }

    fn tex_image_pixels(&self, width: u32, height: u32, rgba: &[u8]) -> Result<(), RenderError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::Upload(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        self.record(Call::TexImage { width, height });
        Ok(())
    }

    fn tex_image(&self, image: &RecordedImage) -> Result<(), RenderError> {
        if image.width == 0 || image.height == 0 {
            return Err(RenderError::Upload("image has no pixels".to_string()));
        }
        self.record(Call::TexImage { width: image.width, height: image.height });
        Ok(())
    }

    fn tex_wrap(&self, wrap: TextureWrap) {
        self.record(Call::TexWrap(wrap));
    }

    fn tex_filter(&self, min: TextureFilter, mag: TextureFilter) {
        self.record(Call::TexFilter { min, mag });
    }

    fn generate_mipmap(&self) {
        self.record(Call::GenerateMipmap);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport { width, height });
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(Call::Clear(color));
    }

    fn enable_depth_test(&self) {
        self.record(Call::EnableDepthTest);
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn draw_elements_u16(&self, mode: DrawMode, count: i32, offset: i32) {
        self.record(Call::DrawElements { mode, count, offset });
    }

    fn drawing_buffer_size(&self) -> (i32, i32) {
        self.state.borrow().surface
    }

    fn aspect(&self) -> f32 {
        self.state.borrow().aspect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_skip_precision_and_body() {
        let src = "precision highp float;\nattribute vec4 aPos;\nuniform mat4 uMvp;\nvoid main() { gl_Position = uMvp * aPos; }";
        assert_eq!(declarations(src, &["attribute"]), vec!["aPos"]);
        assert_eq!(declarations(src, &["uniform"]), vec!["uMvp"]);
    }

    #[test]
    fn glsl3_in_out_are_understood() {
        let vs = "#version 300 es\nin vec2 a_pos;\nout vec2 v_uv;\nvoid main() { v_uv = a_pos; }";
        assert_eq!(declarations(vs, attribute_qualifiers()), vec!["a_pos"]);
        assert_eq!(declarations(vs, varying_qualifiers(ShaderStage::Vertex)), vec!["v_uv"]);
    }
}
