//! Wayland + XDG shell backend
//!
//! [`WaylandWindow::connect`] performs the whole bring-up: registry, surface
//! roles, EGL context and the `wl_egl_window` the EGL surface renders into.
//! Two loops are offered on top of it:
//!
//! - [`WaylandWindow::run`]: dispatch and draw on the calling thread
//! - [`WaylandWindow::run_threaded`]: dispatch here, draw on a render thread
//!
//! In the threaded loop the EGL context is released on the main thread before
//! the render thread makes it current. The render thread also takes the
//! `wl_egl_window`, so configure events only reach it as a pending size in
//! the shared [`FrameSignal`].

mod state;

pub use state::WaylandState;

use std::ffi::c_void;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use wayland_client::backend::WaylandError;
use wayland_client::globals::registry_queue_init;
use wayland_client::protocol::{wl_compositor, wl_surface};
use wayland_client::{Connection, EventQueue, Proxy};
use wayland_egl::WlEglSurface;
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use crate::api::GraphicsApi;
use crate::config::DemoConfig;
use crate::egl::{EglContext, Platform};
use crate::error::{Result, WsiError};
use crate::frame::FrameSignal;
use crate::render::{ClearRenderer, FrameBudget};
use crate::window::WindowGeometry;

/// Longest a paced loop waits for a frame callback before drawing anyway
pub const FRAME_WAIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Toplevel title when the configuration sets none
pub const DEFAULT_TITLE: &str = "Wayland EGL window";

/// How long the threaded main loop blocks on the socket per iteration
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// A mapped toplevel with an EGL context rendering into it
pub struct WaylandWindow {
    // Dropped first: the EGL surface refers to the wl_egl_window in `state`.
    egl: Option<EglContext>,
    renderer: ClearRenderer,
    budget: FrameBudget,
    pace_with_frame_callbacks: bool,
    state: WaylandState,
    event_queue: EventQueue<WaylandState>,
    _toplevel: xdg_toplevel::XdgToplevel,
    _xdg_surface: xdg_surface::XdgSurface,
    _wm_base: xdg_wm_base::XdgWmBase,
    _compositor: wl_compositor::WlCompositor,
    _connection: Connection,
}

impl WaylandWindow {
    /// Connect to `$WAYLAND_DISPLAY` and bring up a window ready to render
    pub fn connect(config: &DemoConfig, api: GraphicsApi) -> Result<Self> {
        let connection = Connection::connect_to_env().map_err(|e| {
            error!("❌ Wayland connection failed: {}", e);
            WsiError::Connect { server: "Wayland" }
        })?;
        info!("🔌 Connected to Wayland display");

        let (globals, mut event_queue) = registry_queue_init::<WaylandState>(&connection)?;
        let qh = event_queue.handle();

        let compositor: wl_compositor::WlCompositor = globals
            .bind(&qh, 1..=4, ())
            .map_err(|_| WsiError::MissingGlobal("wl_compositor"))?;
        let wm_base: xdg_wm_base::XdgWmBase = globals
            .bind(&qh, 1..=2, ())
            .map_err(|_| WsiError::MissingGlobal("xdg_wm_base"))?;
        debug!("Bound wl_compositor v{} and xdg_wm_base v{}", compositor.version(), wm_base.version());

        let surface = compositor.create_surface(&qh, ());
        let xdg_surface = wm_base.get_xdg_surface(&surface, &qh, ());
        let toplevel = xdg_surface.get_toplevel(&qh, ());
        toplevel.set_title(config.window.title_or(DEFAULT_TITLE).to_string());

        // Armed before the first commit; re-armed from each done event.
        surface.frame(&qh, ());

        let (width, height) = config.window_size();
        let signal = Arc::new(FrameSignal::new());
        let mut state = WaylandState::new(surface.clone(), WindowGeometry::new(width, height), signal);

        let display_ptr = connection.backend().display_ptr() as *mut c_void;
        // SAFETY: `connection` is stored in the returned window and dropped last.
        let mut egl = unsafe { EglContext::new(Platform::Wayland, display_ptr, api)? };

        event_queue.roundtrip(&mut state)?;
        surface.set_buffer_scale(1);
        surface.commit();
        // The initial commit is answered with the first configure.
        event_queue.roundtrip(&mut state)?;
        if !state.is_configured() {
            warn!("Compositor has not configured the surface yet");
        }

        let geometry = state.geometry();
        let egl_window = create_egl_window(&surface, geometry)?;
        // SAFETY: the wl_egl_window lives in `state`, which outlives `egl`.
        unsafe { egl.attach_window(egl_window.ptr() as *mut c_void)? };
        state.egl_window = Some(egl_window);

        egl.load_gl();
        egl.set_swap_interval(config.render.swap_interval)?;
        info!("🪟 Window ready at {}x{} using {}", geometry.width, geometry.height, api);

        Ok(Self {
            egl: Some(egl),
            renderer: ClearRenderer::new(config.render.clear_color),
            budget: FrameBudget::new(config.render.max_frames),
            pace_with_frame_callbacks: config.render.pace_with_frame_callbacks,
            state,
            event_queue,
            _toplevel: toplevel,
            _xdg_surface: xdg_surface,
            _wm_base: wm_base,
            _compositor: compositor,
            _connection: connection,
        })
    }

    /// Shared exit/frame flags of this window
    pub fn signal(&self) -> Arc<FrameSignal> {
        Arc::clone(&self.state.signal)
    }

    /// Dispatch and draw on the calling thread until the window is closed.
    ///
    /// Returns the number of frames rendered.
    pub fn run(mut self) -> Result<u64> {
        let signal = self.signal();
        let egl = self
            .egl
            .take()
            .ok_or_else(|| WsiError::Wayland("EGL context already taken".into()))?;
        let mut last_frame: Option<Instant> = None;

        info!("▶️ Rendering on the main thread");
        while !signal.should_exit() {
            let wait = match (self.pace_with_frame_callbacks, last_frame) {
                (true, Some(at)) => FRAME_WAIT_TIMEOUT.saturating_sub(at.elapsed()),
                _ => Duration::ZERO,
            };
            self.pump_events(wait)?;
            if signal.should_exit() {
                break;
            }

            let ready = !self.pace_with_frame_callbacks
                || signal.take_frame()
                || last_frame.map_or(true, |at| at.elapsed() >= FRAME_WAIT_TIMEOUT);
            if !ready {
                continue;
            }

            let renderer = self.renderer;
            let more = self.budget.spend(|| renderer.draw_frame(&egl))?;
            last_frame = Some(Instant::now());
            if !more {
                signal.request_exit();
            }
        }

        info!("⏹️ Render loop finished after {} frames", self.budget.rendered());
        Ok(self.budget.rendered())
    }

    /// Dispatch on the calling thread while a render thread draws.
    ///
    /// The render thread waits for the compositor's frame callback between
    /// frames. Returns the number of frames rendered.
    pub fn run_threaded(mut self) -> Result<u64> {
        let signal = self.signal();
        let egl = self
            .egl
            .take()
            .ok_or_else(|| WsiError::Wayland("EGL context already taken".into()))?;
        egl.release_current()?;

        // From here on only the render thread touches the wl_egl_window.
        let egl_window = self
            .state
            .egl_window
            .take()
            .ok_or_else(|| WsiError::Wayland("wl_egl_window already taken".into()))?;
        self.state.hand_off_resizes = true;

        let renderer = self.renderer;
        let budget = self.budget;
        let render_signal = Arc::clone(&signal);
        let render = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                let result = render_thread(&egl, &egl_window, renderer, budget, &render_signal);
                // The EGL surface must go before the window it renders into.
                drop(egl);
                drop(egl_window);
                // Whatever happened, the event loop must not outlive rendering.
                render_signal.request_exit();
                result
            })
            .map_err(|e| WsiError::Wayland(format!("failed to spawn render thread: {e}")))?;

        info!("▶️ Rendering on a dedicated thread");
        let mut dispatch_result = Ok(());
        while !signal.should_exit() {
            if let Err(e) = self.pump_events(EVENT_POLL_TIMEOUT) {
                error!("❌ Event dispatch failed: {}", e);
                signal.request_exit();
                dispatch_result = Err(e);
            }
        }

        let render_result = render.join().map_err(|_| WsiError::RenderThreadPanicked)?;
        dispatch_result?;
        let frames = render_result?;
        info!("⏹️ Render thread finished after {} frames", frames);
        Ok(frames)
    }

    /// Flush requests, read the socket for up to `timeout`, dispatch.
    fn pump_events(&mut self, timeout: Duration) -> Result<usize> {
        match self.event_queue.flush() {
            Err(WaylandError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => {}
            other => other?,
        }

        if let Some(guard) = self.event_queue.prepare_read() {
            if poll_readable(guard.connection_fd(), timeout)? {
                match guard.read() {
                    Ok(_) => {}
                    Err(WaylandError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => {}
                    Err(e) => return Err(e.into()),
                }
            }
            // A guard dropped without reading cancels the read.
        }

        Ok(self.event_queue.dispatch_pending(&mut self.state)?)
    }
}

fn create_egl_window(surface: &wl_surface::WlSurface, geometry: WindowGeometry) -> Result<WlEglSurface> {
    WlEglSurface::new(surface.id(), geometry.width, geometry.height)
        .map_err(|e| WsiError::Wayland(format!("wl_egl_window_create failed: {e:?}")))
}

fn render_thread(
    egl: &EglContext,
    egl_window: &WlEglSurface,
    renderer: ClearRenderer,
    mut budget: FrameBudget,
    signal: &FrameSignal,
) -> Result<u64> {
    egl.make_current()?;
    debug!("EGL context current on render thread");

    // The first frame goes out unprompted so the surface gets a buffer.
    let mut first = true;
    while !signal.should_exit() {
        let ready = first || signal.wait_frame(FRAME_WAIT_TIMEOUT);
        if signal.should_exit() {
            break;
        }
        if !ready {
            debug!("No frame callback within {:?}, drawing anyway", FRAME_WAIT_TIMEOUT);
        }
        first = false;

        if let Some((width, height)) = signal.take_resize() {
            debug!("Resizing wl_egl_window to {}x{}", width, height);
            egl_window.resize(width, height, 0, 0);
        }
        if !budget.spend(|| renderer.draw_frame(egl))? {
            break;
        }
    }
    Ok(budget.rendered())
}

/// Wait until `fd` is readable or `timeout` passes
fn poll_readable(fd: BorrowedFd<'_>, timeout: Duration) -> Result<bool> {
    let mut pollfd = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
    let ret = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
    if ret < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(WsiError::Wayland(format!("poll failed: {err}")));
    }
    Ok(ret > 0)
}
