use std::collections::HashMap;

use log::debug;

use crate::error::{diagnostic_or_default, CompileError};
use crate::gl::{Gl, ShaderStage};

/// A linked program plus the attribute and uniform slots resolved for it.
///
/// Lookups of unknown names return `None`; optional uniforms are common
/// (the white quad has no sampler) and callers skip them. Names missing
/// from the cache are asked of the context directly.
pub struct ShaderProgram<G: Gl> {
    gl: G,
    program: G::Program,
    attributes: HashMap<String, Option<u32>>,
    uniforms: HashMap<String, Option<G::UniformLocation>>,
}

impl<G: Gl> ShaderProgram<G> {
    /// Compiles both stages and links them.
    ///
    /// A stage that fails to compile is deleted before returning. Both stage
    /// objects are released after a successful link; the program keeps them
    /// alive.
    pub fn compile(gl: &G, vertex: &str, fragment: &str) -> Result<Self, CompileError> {
        let vs = compile_stage(gl, ShaderStage::Vertex, vertex)?;
        let fs = match compile_stage(gl, ShaderStage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(err) => {
                gl.delete_shader(&vs);
                return Err(err);
            }
        };

        let program = match gl.create_program() {
            Some(p) => p,
            None => {
                gl.delete_shader(&vs);
                gl.delete_shader(&fs);
                return Err(CompileError::Link("unable to create program object".to_string()));
            }
        };
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        gl.link_program(&program);

        let linked = gl.program_linked(&program);
        gl.delete_shader(&vs);
        gl.delete_shader(&fs);
        if !linked {
            let log = diagnostic_or_default(gl.program_info_log(&program));
            gl.delete_program(&program);
            return Err(CompileError::Link(log));
        }

        debug!("shader program linked");
        Ok(Self {
            gl: gl.clone(),
            program,
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        })
    }

    /// Resolves and caches the given names. Unknown names are cached as
    /// missing so later lookups stay cheap.
    pub fn resolve(&mut self, attributes: &[&str], uniforms: &[&str]) {
        for &name in attributes {
            let slot = self.query_attribute(name);
            if slot.is_none() {
                debug!("attribute {name} is not active");
            }
            self.attributes.insert(name.to_string(), slot);
        }
        for &name in uniforms {
            let location = self.gl.uniform_location(&self.program, name);
            if location.is_none() {
                debug!("uniform {name} is not active");
            }
            self.uniforms.insert(name.to_string(), location);
        }
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        match self.attributes.get(name) {
            Some(slot) => *slot,
            None => self.query_attribute(name),
        }
    }

    pub fn uniform_location(&self, name: &str) -> Option<G::UniformLocation> {
        match self.uniforms.get(name) {
            Some(location) => location.clone(),
            None => self.gl.uniform_location(&self.program, name),
        }
    }

    pub fn handle(&self) -> &G::Program {
        &self.program
    }

    fn query_attribute(&self, name: &str) -> Option<u32> {
        u32::try_from(self.gl.attrib_location(&self.program, name)).ok()
    }
}

fn compile_stage<G: Gl>(gl: &G, stage: ShaderStage, source: &str) -> Result<G::Shader, CompileError> {
    let failure = |text: String| match stage {
        ShaderStage::Vertex => CompileError::Vertex(text),
        ShaderStage::Fragment => CompileError::Fragment(text),
    };

    let shader = gl
        .create_shader(stage)
        .ok_or_else(|| failure("unable to create shader object".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl.shader_compiled(&shader) {
        let log = diagnostic_or_default(gl.shader_info_log(&shader));
        gl.delete_shader(&shader);
        return Err(failure(log));
    }
    Ok(shader)
}
