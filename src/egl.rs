//! EGL bring-up shared by the Wayland and X11 backends
//!
//! The sequence mirrors what EGL requires for a window surface:
//! platform display, initialize, bind API, choose config, create context,
//! then attach a native window once the backend has one.

use std::ffi::c_void;
use std::ptr;

use khronos_egl as egl;
use log::{debug, info, warn};

use crate::api::GraphicsApi;
use crate::error::{Result, WsiError};

/// Statically linked libEGL
pub type Egl = egl::Instance<egl::Static>;

/// `EGL_PLATFORM_WAYLAND_KHR`
pub const PLATFORM_WAYLAND_KHR: egl::Enum = 0x31D8;
/// `EGL_PLATFORM_X11_KHR`
pub const PLATFORM_X11_KHR: egl::Enum = 0x31D5;

/// Upper bound handed to `eglChooseConfig`
const MAX_CONFIGS: usize = 256;

const CONFIG_ATTRIBS: [egl::Int; 11] = [
    egl::SURFACE_TYPE,
    egl::WINDOW_BIT,
    egl::RED_SIZE,
    8,
    egl::GREEN_SIZE,
    8,
    egl::BLUE_SIZE,
    8,
    egl::RENDERABLE_TYPE,
    egl::OPENGL_ES_BIT | egl::OPENGL_ES2_BIT | egl::OPENGL_BIT,
    egl::NONE,
];

const CONTEXT_ATTRIBS: [egl::Int; 3] = [egl::CONTEXT_MAJOR_VERSION, 2, egl::NONE];

/// Native platform an EGL display is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Wayland,
    X11,
}

impl Platform {
    /// Platform enum for `eglGetPlatformDisplay`
    pub fn egl_enum(self) -> egl::Enum {
        match self {
            Platform::Wayland => PLATFORM_WAYLAND_KHR,
            Platform::X11 => PLATFORM_X11_KHR,
        }
    }
}

/// Accept EGL 1.5 and later 1.x releases only
pub fn check_version(major: i32, minor: i32) -> Result<()> {
    if major == 1 && minor >= 5 {
        Ok(())
    } else {
        Err(WsiError::EglVersionTooOld { major, minor })
    }
}

/// Display, config, context and (once attached) window surface
pub struct EglContext {
    egl: Egl,
    display: egl::Display,
    config: egl::Config,
    context: egl::Context,
    surface: Option<egl::Surface>,
}

// The handles are plain pointers owned by the EGL implementation. The context
// is only ever current on one thread at a time; see `release_current`.
unsafe impl Send for EglContext {}

impl EglContext {
    /// Initialize EGL on `native_display` and create a context for `api`.
    ///
    /// The context is made current without a surface so the caller can
    /// create the native window next.
    ///
    /// # Safety
    ///
    /// `native_display` must be a live `wl_display*` for [`Platform::Wayland`]
    /// or a live Xlib `Display*` for [`Platform::X11`], and it must outlive
    /// the returned context.
    pub unsafe fn new(
        platform: Platform,
        native_display: *mut c_void,
        api: GraphicsApi,
    ) -> Result<Self> {
        let egl = egl::Instance::new(egl::Static);

        let display = unsafe {
            egl.get_platform_display(platform.egl_enum(), native_display, &[egl::ATTRIB_NONE])
        }
        .map_err(WsiError::egl("eglGetPlatformDisplay"))?;

        let (major, minor) = egl
            .initialize(display)
            .map_err(WsiError::egl("eglInitialize"))?;
        info!("🎨 EGL {}.{} initialized for {:?}", major, minor, platform);
        check_version(major, minor)?;

        egl.bind_api(api.egl_enum())
            .map_err(WsiError::egl("eglBindAPI"))?;
        debug!("Bound {} client API", api);

        let mut configs = Vec::with_capacity(MAX_CONFIGS);
        egl.choose_config(display, &CONFIG_ATTRIBS, &mut configs)
            .map_err(WsiError::egl("eglChooseConfig"))?;
        debug!("eglChooseConfig matched {} configs", configs.len());
        let config = *configs.first().ok_or(WsiError::NoMatchingConfig)?;

        let context = egl
            .create_context(display, config, None, &CONTEXT_ATTRIBS)
            .map_err(WsiError::egl("eglCreateContext"))?;

        egl.make_current(display, None, None, Some(context))
            .map_err(WsiError::egl("eglMakeCurrent"))?;

        Ok(Self {
            egl,
            display,
            config,
            context,
            surface: None,
        })
    }

    /// `EGL_NATIVE_VISUAL_ID` of the chosen config
    pub fn native_visual_id(&self) -> Result<u32> {
        let visual = self
            .egl
            .get_config_attrib(self.display, self.config, egl::NATIVE_VISUAL_ID)
            .map_err(WsiError::egl("eglGetConfigAttrib"))?;
        Ok(visual as u32)
    }

    /// Create the window surface and make it current together with the context.
    ///
    /// # Safety
    ///
    /// `native_window` must be a `wl_egl_window*` on Wayland, or a pointer to
    /// an Xlib `Window` id on X11, valid for as long as the surface lives.
    pub unsafe fn attach_window(&mut self, native_window: *mut c_void) -> Result<()> {
        let surface = unsafe {
            self.egl.create_platform_window_surface(
                self.display,
                self.config,
                native_window,
                &[egl::ATTRIB_NONE],
            )
        }
        .map_err(WsiError::egl("eglCreatePlatformWindowSurface"))?;
        self.surface = Some(surface);
        self.make_current()
    }

    /// Bind context and window surface (if any) to the calling thread
    pub fn make_current(&self) -> Result<()> {
        self.egl
            .make_current(self.display, self.surface, self.surface, Some(self.context))
            .map_err(WsiError::egl("eglMakeCurrent"))
    }

    /// Unbind the context from the calling thread so another thread can take it
    pub fn release_current(&self) -> Result<()> {
        self.egl
            .make_current(self.display, None, None, None)
            .map_err(WsiError::egl("eglMakeCurrent"))
    }

    pub fn set_swap_interval(&self, interval: i32) -> Result<()> {
        self.egl
            .swap_interval(self.display, interval)
            .map_err(WsiError::egl("eglSwapInterval"))
    }

    /// Present the back buffer. A context without a window surface is a no-op.
    pub fn swap_buffers(&self) -> Result<()> {
        match self.surface {
            Some(surface) => self
                .egl
                .swap_buffers(self.display, surface)
                .map_err(WsiError::egl("eglSwapBuffers")),
            None => Ok(()),
        }
    }

    /// Resolve GL entry points through `eglGetProcAddress`
    pub fn load_gl(&self) {
        gl::load_with(|name| {
            self.egl
                .get_proc_address(name)
                .map_or(ptr::null(), |f| f as *const c_void)
        });
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        if let Err(e) = self.release_current() {
            warn!("Failed to release EGL context: {}", e);
        }
        if let Some(surface) = self.surface.take() {
            if let Err(e) = self.egl.destroy_surface(self.display, surface) {
                warn!("eglDestroySurface failed: {}", e);
            }
        }
        if let Err(e) = self.egl.destroy_context(self.display, self.context) {
            warn!("eglDestroyContext failed: {}", e);
        }
        if let Err(e) = self.egl.terminate(self.display) {
            warn!("eglTerminate failed: {}", e);
        }
        debug!("EGL display terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_gate_needs_one_point_five() {
        assert!(check_version(1, 5).is_ok());
        assert!(check_version(1, 6).is_ok());
        assert!(matches!(
            check_version(1, 4),
            Err(WsiError::EglVersionTooOld { major: 1, minor: 4 })
        ));
        assert!(check_version(2, 0).is_err());
        assert!(check_version(0, 9).is_err());
    }

    #[test]
    fn platform_enums_match_khr_values() {
        assert_eq!(Platform::Wayland.egl_enum(), 0x31D8);
        assert_eq!(Platform::X11.egl_enum(), 0x31D5);
    }

    #[test]
    fn config_attributes_are_none_terminated() {
        assert_eq!(CONFIG_ATTRIBS.last(), Some(&egl::NONE));
        assert_eq!(CONTEXT_ATTRIBS.last(), Some(&egl::NONE));
        // Renderable type accepts both desktop GL and ES contexts.
        let renderable = CONFIG_ATTRIBS[9];
        assert_ne!(renderable & egl::OPENGL_BIT, 0);
        assert_ne!(renderable & egl::OPENGL_ES2_BIT, 0);
    }
}
