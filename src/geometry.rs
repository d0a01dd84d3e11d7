use log::debug;

use crate::error::RenderError;
use crate::gl::{BufferTarget, Gl};

/// Float vertex channels. Indices travel separately as `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Color,
    TexCoord,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Position, Channel::Color, Channel::TexCoord];

    /// Floats per vertex.
    pub fn components(self) -> i32 {
        match self {
            Channel::Position => 2,
            Channel::Color => 4,
            Channel::TexCoord => 2,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Channel::Position => "position buffer",
            Channel::Color => "color buffer",
            Channel::TexCoord => "texture coordinate buffer",
        }
    }
}

struct Slot<B, T> {
    buffer: B,
    data: Vec<T>,
}

/// GPU buffers for one draw batch, each paired with the CPU copy of its
/// last upload so the two lengths never drift apart.
pub struct GeometryBuffer<G: Gl> {
    gl: G,
    channels: [Option<Slot<G::Buffer, f32>>; 3],
    indices: Option<Slot<G::Buffer, u16>>,
}

impl<G: Gl> GeometryBuffer<G> {
    pub fn new(gl: &G) -> Self {
        Self {
            gl: gl.clone(),
            channels: [None, None, None],
            indices: None,
        }
    }

    /// Replaces the full contents of `channel`, allocating its buffer on
    /// first use.
    pub fn upload(&mut self, channel: Channel, data: &[f32]) -> Result<(), RenderError> {
        let gl = &self.gl;
        let slot = &mut self.channels[channel.index()];
        if slot.is_none() {
            let buffer = gl.create_buffer().ok_or(RenderError::Allocation(channel.label()))?;
            debug!("allocated {}", channel.label());
            *slot = Some(Slot { buffer, data: Vec::new() });
        }
        if let Some(slot) = slot {
            gl.bind_buffer(BufferTarget::Array, &slot.buffer);
            gl.buffer_data_f32(BufferTarget::Array, data);
            slot.data.clear();
            slot.data.extend_from_slice(data);
        }
        Ok(())
    }

    pub fn upload_indices(&mut self, indices: &[u16]) -> Result<(), RenderError> {
        let gl = &self.gl;
        if self.indices.is_none() {
            let buffer = gl.create_buffer().ok_or(RenderError::Allocation("index buffer"))?;
            debug!("allocated index buffer");
            self.indices = Some(Slot { buffer, data: Vec::new() });
        }
        if let Some(slot) = &mut self.indices {
            gl.bind_buffer(BufferTarget::ElementArray, &slot.buffer);
            gl.buffer_data_u16(BufferTarget::ElementArray, indices);
            slot.data.clear();
            slot.data.extend_from_slice(indices);
        }
        Ok(())
    }

    pub fn data(&self, channel: Channel) -> Option<&[f32]> {
        self.channels[channel.index()].as_ref().map(|s| s.data.as_slice())
    }

    pub fn buffer(&self, channel: Channel) -> Option<&G::Buffer> {
        self.channels[channel.index()].as_ref().map(|s| &s.buffer)
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_ref().map(|s| s.data.as_slice())
    }

    pub fn index_buffer(&self) -> Option<&G::Buffer> {
        self.indices.as_ref().map(|s| &s.buffer)
    }

    /// Vertices described by the position channel.
    pub fn vertex_count(&self) -> usize {
        self.data(Channel::Position)
            .map_or(0, |d| d.len() / Channel::Position.components() as usize)
    }
}
