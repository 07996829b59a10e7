//! # wsi-demo
//!
//! Opens a native window on Wayland or X11, brings up an EGL context on it
//! and clears it to a solid color every frame.
//!
//! ## Architecture
//!
//! - `api`: OpenGL vs OpenGL ES selection
//! - `egl`: EGL display/config/context/surface bring-up
//! - `render`: the clear-and-swap frame
//! - `frame`: exit and frame-ready flags shared between loops and threads
//! - `window`: geometry bookkeeping for configure events
//! - `wayland`: Wayland + XDG shell backend (single-threaded and threaded)
//! - `x11`: Xlib/XCB backend
//! - `backend`: picking a backend at runtime
//! - `config`, `cli`, `logging`: the usual plumbing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wsi_demo::{DemoConfig, GraphicsApi, WaylandWindow};
//!
//! fn main() -> anyhow::Result<()> {
//!     let window = WaylandWindow::connect(&DemoConfig::default(), GraphicsApi::OpenGl)?;
//!     window.run()?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod egl;
pub mod error;
pub mod frame;
pub mod logging;
pub mod render;
pub mod wayland;
pub mod window;
pub mod x11;

pub use api::GraphicsApi;
pub use backend::{BackendKind, DisplayServer};
pub use cli::DemoArgs;
pub use config::DemoConfig;
pub use error::WsiError;
pub use frame::FrameSignal;
pub use wayland::WaylandWindow;
pub use crate::x11::X11Window;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Bring up a window on `backend` and render until it closes.
///
/// `threaded` only affects Wayland. Returns the number of frames rendered.
pub fn run(
    backend: BackendKind,
    threaded: bool,
    config: &DemoConfig,
    api: GraphicsApi,
) -> Result<u64, WsiError> {
    match backend.resolve()? {
        DisplayServer::Wayland if threaded => WaylandWindow::connect(config, api)?.run_threaded(),
        DisplayServer::Wayland => WaylandWindow::connect(config, api)?.run(),
        DisplayServer::X11 => {
            if threaded {
                log::warn!("--threaded only applies to Wayland, ignoring");
            }
            X11Window::connect(config, api)?.run()
        }
    }
}
