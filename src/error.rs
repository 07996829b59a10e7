//! Error types for the window system and EGL layers
//!
//! Every call into a native library that can fail is mapped onto a
//! [`WsiError`] variant instead of aborting the process.

use thiserror::Error;

/// Errors raised while bringing up a window, its EGL context, or the render loop
#[derive(Debug, Error)]
pub enum WsiError {
    /// Could not connect to the display server
    #[error("failed to connect to the {server} display server")]
    Connect {
        /// Which server we tried ("Wayland" or "X11")
        server: &'static str,
    },

    /// A required Wayland global was not advertised
    #[error("compositor does not advertise `{0}`")]
    MissingGlobal(&'static str),

    /// An EGL entry point reported failure
    #[error("{call} failed: {source}")]
    Egl {
        /// Name of the EGL function
        call: &'static str,
        #[source]
        source: khronos_egl::Error,
    },

    /// EGL reported a version we cannot use
    #[error("EGL {major}.{minor} is too old, need 1.5 or newer")]
    EglVersionTooOld { major: i32, minor: i32 },

    /// `eglChooseConfig` matched nothing
    #[error("no EGL config matches the requested window attributes")]
    NoMatchingConfig,

    /// Only screen 0 is handled
    #[error("default X11 screen is {0}, only screen 0 is supported")]
    UnsupportedScreen(i32),

    /// Wayland connection or dispatch failure
    #[error("wayland: {0}")]
    Wayland(String),

    /// X11 request or reply failure
    #[error("x11: {0}")]
    X11(String),

    /// The render thread panicked instead of returning
    #[error("render thread panicked")]
    RenderThreadPanicked,

    /// Neither `WAYLAND_DISPLAY` nor `DISPLAY` points at a server
    #[error("no display server found (WAYLAND_DISPLAY and DISPLAY are unset)")]
    NoDisplayServer,
}

impl WsiError {
    /// Adapter for `map_err` on EGL results
    pub fn egl(call: &'static str) -> impl FnOnce(khronos_egl::Error) -> Self {
        move |source| WsiError::Egl { call, source }
    }
}

macro_rules! impl_from_display {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for WsiError {
                fn from(err: $ty) -> Self {
                    WsiError::$variant(err.to_string())
                }
            }
        )+
    };
}

impl_from_display!(Wayland:
    wayland_client::ConnectError,
    wayland_client::DispatchError,
    wayland_client::backend::WaylandError,
    wayland_client::globals::GlobalError,
    wayland_client::globals::BindError,
);

impl_from_display!(X11:
    x11rb::errors::ConnectError,
    x11rb::errors::ConnectionError,
    x11rb::errors::ReplyError,
    x11rb::errors::ReplyOrIdError,
);

/// Result alias used across the crate
pub type Result<T, E = WsiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egl_error_names_the_call() {
        let err = WsiError::egl("eglInitialize")(khronos_egl::Error::NotInitialized);
        let msg = err.to_string();
        assert!(msg.starts_with("eglInitialize failed"), "got: {msg}");
    }

    #[test]
    fn version_error_mentions_requirement() {
        let err = WsiError::EglVersionTooOld { major: 1, minor: 4 };
        assert_eq!(err.to_string(), "EGL 1.4 is too old, need 1.5 or newer");
    }
}
