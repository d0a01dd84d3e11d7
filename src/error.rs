use thiserror::Error;

/// Failure while turning a vertex/fragment pair into a linked program.
///
/// Every variant carries the driver's diagnostic text; it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("vertex shader failed to compile: {0}")]
    Vertex(String),
    #[error("fragment shader failed to compile: {0}")]
    Fragment(String),
    #[error("shader program failed to link: {0}")]
    Link(String),
}

impl CompileError {
    pub fn diagnostic(&self) -> &str {
        match self {
            CompileError::Vertex(text) | CompileError::Fragment(text) | CompileError::Link(text) => text,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unable to initialize WebGL: {0}")]
    ContextUnavailable(String),
    #[error(transparent)]
    Shader(#[from] CompileError),
    #[error("failed to load \"{url}\": {reason}")]
    AssetLoad { url: String, reason: String },
    #[error("failed to create {0}")]
    Allocation(&'static str),
    #[error("texture upload failed: {0}")]
    Upload(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unable to schedule animation frame: {0}")]
    Scheduling(String),
}

impl RenderError {
    /// Errors that abort start-up. Asset failures only cost a texture.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RenderError::AssetLoad { .. })
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

/// Driver info logs may come back empty even on failure.
pub(crate) fn diagnostic_or_default(log: Option<String>) -> String {
    match log {
        Some(text) if !text.trim().is_empty() => text.trim_end().to_string(),
        _ => "no diagnostic reported".to_string(),
    }
}
