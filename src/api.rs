//! Client API selection (desktop OpenGL or OpenGL ES)

use std::fmt;

/// Rendering API bound with `eglBindAPI`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphicsApi {
    /// Desktop OpenGL (`EGL_OPENGL_API`)
    #[default]
    OpenGl,
    /// OpenGL ES (`EGL_OPENGL_ES_API`)
    OpenGlEs,
}

impl GraphicsApi {
    /// Interpret the first command-line argument.
    ///
    /// Only the exact string `gles` picks OpenGL ES; anything else, including
    /// no argument at all, keeps desktop OpenGL.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("gles") => GraphicsApi::OpenGlEs,
            _ => GraphicsApi::OpenGl,
        }
    }

    /// EGL enum passed to `eglBindAPI`
    pub fn egl_enum(self) -> khronos_egl::Enum {
        match self {
            GraphicsApi::OpenGl => khronos_egl::OPENGL_API,
            GraphicsApi::OpenGlEs => khronos_egl::OPENGL_ES_API,
        }
    }
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsApi::OpenGl => f.write_str("OpenGL"),
            GraphicsApi::OpenGlEs => f.write_str("OpenGL ES"),
        }
    }
}
