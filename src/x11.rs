//! X11 backend: Xlib display, XCB connection
//!
//! EGL's X11 platform wants an Xlib `Display*`, while window creation and
//! event handling go through XCB. The display is opened with Xlib, its XCB
//! connection borrowed, and the event queue handed to XCB so Xlib never
//! consumes our events.

use std::ffi::c_void;
use std::os::raw::{c_int, c_ulong};
use std::ptr::{self, NonNull};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use ::x11::xlib;
use x11rb::connection::Connection as _;
use x11rb::protocol::xproto::{
    self, AtomEnum, ClientMessageEvent, ColormapAlloc, ConnectionExt as _, CreateWindowAux,
    EventMask, PropMode, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::xcb_ffi::XCBConnection;
use x11rb::COPY_DEPTH_FROM_PARENT;

use crate::api::GraphicsApi;
use crate::config::DemoConfig;
use crate::egl::{EglContext, Platform};
use crate::error::{Result, WsiError};
use crate::frame::FrameSignal;
use crate::render::{ClearRenderer, FrameBudget};
use crate::window::WindowGeometry;

/// `WM_NAME` when the configuration sets none
pub const DEFAULT_TITLE: &str = "X11 EGL window";

/// `XEventQueueOwner::XCBOwnsEventQueue`
const XCB_OWNS_EVENT_QUEUE: c_int = 1;

#[link(name = "X11-xcb")]
extern "C" {
    fn XSetEventQueueOwner(display: *mut xlib::Display, owner: c_int);
}

/// Owned Xlib display, closed on drop
struct XlibDisplay(NonNull<xlib::Display>);

impl XlibDisplay {
    fn open() -> Result<Self> {
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        NonNull::new(display)
            .map(XlibDisplay)
            .ok_or(WsiError::Connect { server: "X11" })
    }

    fn as_ptr(&self) -> *mut xlib::Display {
        self.0.as_ptr()
    }
}

impl Drop for XlibDisplay {
    fn drop(&mut self) {
        unsafe { xlib::XCloseDisplay(self.as_ptr()) };
        debug!("Xlib display closed");
    }
}

/// `WM_PROTOCOLS` / `WM_DELETE_WINDOW` pair used to detect close requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmAtoms {
    pub wm_protocols: xproto::Atom,
    pub wm_delete_window: xproto::Atom,
}

impl WmAtoms {
    fn intern(conn: &XCBConnection) -> Result<Self> {
        let wm_protocols = conn.intern_atom(false, b"WM_PROTOCOLS")?;
        let wm_delete_window = conn.intern_atom(false, b"WM_DELETE_WINDOW")?;
        Ok(Self {
            wm_protocols: wm_protocols.reply()?.atom,
            wm_delete_window: wm_delete_window.reply()?.atom,
        })
    }

    /// Whether `event` is the window manager asking us to close
    pub fn is_delete_request(&self, event: &ClientMessageEvent) -> bool {
        event.format == 32
            && event.type_ == self.wm_protocols
            && event.data.as_data32()[0] == self.wm_delete_window
    }
}

/// A mapped X11 window with an EGL context rendering into it
pub struct X11Window {
    // Field order is drop order: EGL, then the borrowed XCB connection,
    // then the Xlib display that owns it.
    egl: EglContext,
    conn: XCBConnection,
    _display: XlibDisplay,
    window: xproto::Window,
    atoms: WmAtoms,
    geometry: WindowGeometry,
    renderer: ClearRenderer,
    budget: FrameBudget,
    frame_interval: Duration,
    signal: FrameSignal,
}

impl X11Window {
    /// Open `$DISPLAY` and bring up a window ready to render
    pub fn connect(config: &DemoConfig, api: GraphicsApi) -> Result<Self> {
        let display = XlibDisplay::open().inspect_err(|_| error!("❌ XOpenDisplay failed"))?;
        info!("🔌 Connected to X11 display");

        let raw_xcb = unsafe { ::x11::xlib_xcb::XGetXCBConnection(display.as_ptr()) } as *mut c_void;
        if raw_xcb.is_null() {
            return Err(WsiError::X11("XGetXCBConnection returned null".into()));
        }
        unsafe { XSetEventQueueOwner(display.as_ptr(), XCB_OWNS_EVENT_QUEUE) };
        // SAFETY: the connection belongs to `display`, which outlives it and
        // closes it; `should_drop = false` keeps XCB from closing it twice.
        let conn = unsafe { XCBConnection::from_raw_xcb_connection(raw_xcb, false)? };

        // SAFETY: `display` is stored next to the context and dropped after it.
        let mut egl = unsafe { EglContext::new(Platform::X11, display.as_ptr() as *mut c_void, api)? };

        let screen_num = unsafe { xlib::XDefaultScreen(display.as_ptr()) };
        if screen_num != 0 {
            return Err(WsiError::UnsupportedScreen(screen_num));
        }
        let screen = conn
            .setup()
            .roots
            .first()
            .ok_or_else(|| WsiError::X11("server reports no screens".into()))?;
        let root = screen.root;

        let visual = egl.native_visual_id()?;
        let depth = depth_for_visual(&screen.allowed_depths, visual).unwrap_or_else(|| {
            warn!("Visual {:#x} not listed on screen 0, copying depth from parent", visual);
            COPY_DEPTH_FROM_PARENT
        });
        debug!("Using visual {:#x} at depth {}", visual, depth);

        let colormap = conn.generate_id()?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, root, visual)?;

        let (width, height) = config.window_size();
        let geometry = WindowGeometry::new(width, height);
        let window = conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .event_mask(EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY)
            .colormap(colormap)
            .border_pixel(0);
        conn.create_window(
            depth,
            window,
            root,
            0,
            0,
            clamp_u16(width),
            clamp_u16(height),
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            &aux,
        )?;

        conn.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            config.window.title_or(DEFAULT_TITLE).as_bytes(),
        )?;
        let atoms = WmAtoms::intern(&conn)?;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.wm_protocols,
            AtomEnum::ATOM,
            &[atoms.wm_delete_window],
        )?;

        conn.map_window(window)?;
        conn.flush()?;

        let mut native_window: c_ulong = window.into();
        // SAFETY: EGL reads the XID through the pointer during this call only.
        unsafe { egl.attach_window(&mut native_window as *mut c_ulong as *mut c_void)? };

        egl.load_gl();
        egl.set_swap_interval(config.render.swap_interval)?;
        info!("🪟 Window {:#x} ready at {}x{} using {}", window, width, height, api);

        Ok(Self {
            egl,
            conn,
            _display: display,
            window,
            atoms,
            geometry,
            renderer: ClearRenderer::new(config.render.clear_color),
            budget: FrameBudget::new(config.render.max_frames),
            frame_interval: Duration::from_millis(config.x11.frame_interval_ms),
            signal: FrameSignal::new(),
        })
    }

    /// Draw every frame interval until the window is closed.
    ///
    /// Returns the number of frames rendered.
    pub fn run(mut self) -> Result<u64> {
        info!("▶️ Rendering every {:?}", self.frame_interval);
        while !self.signal.should_exit() {
            self.drain_events()?;
            if self.signal.should_exit() {
                break;
            }

            thread::sleep(self.frame_interval);
            let (renderer, egl) = (self.renderer, &self.egl);
            if !self.budget.spend(|| renderer.draw_frame(egl))? {
                self.signal.request_exit();
            }
        }

        info!("⏹️ Render loop finished after {} frames", self.budget.rendered());
        Ok(self.budget.rendered())
    }

    fn drain_events(&mut self) -> Result<()> {
        while let Some(event) = self.conn.poll_for_event()? {
            match event {
                Event::ClientMessage(ev) if self.atoms.is_delete_request(&ev) => {
                    info!("🚪 Close requested by window manager");
                    self.signal.request_exit();
                }
                Event::ConfigureNotify(ev) if ev.window == self.window => {
                    let (width, height) = (i32::from(ev.width), i32::from(ev.height));
                    if let Some((w, h)) = self.geometry.apply_configure(width, height) {
                        info!("📐 Window resized to {}x{}", w, h);
                    }
                }
                Event::Expose(_) => trace!("expose"),
                Event::Error(e) => warn!("X11 error: {:?}", e),
                other => trace!("ignored event {:?}", other),
            }
        }
        Ok(())
    }
}

/// Depth of the screen depth list entry that offers `visual`
pub fn depth_for_visual(depths: &[xproto::Depth], visual: xproto::Visualid) -> Option<u8> {
    depths
        .iter()
        .find(|d| d.visuals.iter().any(|v| v.visual_id == visual))
        .map(|d| d.depth)
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(1, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOMS: WmAtoms = WmAtoms {
        wm_protocols: 300,
        wm_delete_window: 301,
    };

    #[test]
    fn recognizes_wm_delete_window() {
        let event = ClientMessageEvent::new(32, 0x400001, ATOMS.wm_protocols, [301, 0, 0, 0, 0]);
        assert!(ATOMS.is_delete_request(&event));
    }

    #[test]
    fn ignores_other_client_messages() {
        let other_protocol = ClientMessageEvent::new(32, 0x400001, ATOMS.wm_protocols, [999, 0, 0, 0, 0]);
        assert!(!ATOMS.is_delete_request(&other_protocol));

        let other_type = ClientMessageEvent::new(32, 0x400001, 42u32, [301, 0, 0, 0, 0]);
        assert!(!ATOMS.is_delete_request(&other_type));
    }

    #[test]
    fn window_sizes_fit_the_wire_format() {
        assert_eq!(clamp_u16(300), 300);
        assert_eq!(clamp_u16(0), 1);
        assert_eq!(clamp_u16(100_000), u16::MAX);
    }
}
