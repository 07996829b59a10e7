//! Protocol event handlers for the demo window
//!
//! The replies here are what the XDG shell and core protocols demand:
//! answer pings, ack configures, follow toplevel resizes and keep one
//! frame callback armed at all times.

use std::sync::Arc;

use log::{debug, info, trace};
use wayland_client::globals::GlobalListContents;
use wayland_client::protocol::{wl_callback, wl_compositor, wl_registry, wl_surface};
use wayland_client::{delegate_noop, Connection, Dispatch, QueueHandle};
use wayland_egl::WlEglSurface;
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};

use crate::frame::FrameSignal;
use crate::window::WindowGeometry;

/// Client-side state for one toplevel window
pub struct WaylandState {
    pub(crate) surface: wl_surface::WlSurface,
    pub(crate) geometry: WindowGeometry,
    /// Created once the surface has been configured
    pub(crate) egl_window: Option<WlEglSurface>,
    pub(crate) signal: Arc<FrameSignal>,
    /// Set while a render thread owns the `wl_egl_window`; resizes are then
    /// forwarded through `signal` instead of applied here.
    pub(crate) hand_off_resizes: bool,
    configured: bool,
}

impl WaylandState {
    pub(crate) fn new(
        surface: wl_surface::WlSurface,
        geometry: WindowGeometry,
        signal: Arc<FrameSignal>,
    ) -> Self {
        Self {
            surface,
            geometry,
            egl_window: None,
            signal,
            hand_off_resizes: false,
            configured: false,
        }
    }

    /// Whether the compositor has sent at least one `xdg_surface.configure`
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    fn resize(&mut self, width: i32, height: i32) {
        let Some((width, height)) = self.geometry.apply_configure(width, height) else {
            return;
        };
        info!("📐 Window resized to {}x{}", width, height);
        if self.hand_off_resizes {
            self.signal.request_resize(width, height);
        } else if let Some(egl_window) = &self.egl_window {
            egl_window.resize(width, height, 0, 0);
            self.surface.commit();
        }
    }
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for WaylandState {
    fn event(
        _state: &mut Self,
        _registry: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // Globals are bound once at startup; later changes are not tracked.
    }
}

delegate_noop!(WaylandState: wl_compositor::WlCompositor);
delegate_noop!(WaylandState: ignore wl_surface::WlSurface);

impl Dispatch<xdg_wm_base::XdgWmBase, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            trace!("xdg_wm_base ping {}", serial);
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ()> for WaylandState {
    fn event(
        state: &mut Self,
        xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            debug!("xdg_surface configure {}", serial);
            xdg_surface.ack_configure(serial);
            state.configured = true;
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _toplevel: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure { width, height, .. } => {
                debug!("xdg_toplevel configure {}x{}", width, height);
                state.resize(width, height);
            }
            xdg_toplevel::Event::Close => {
                info!("🚪 Close requested by compositor");
                state.signal.request_exit();
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_callback::WlCallback, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _callback: &wl_callback::WlCallback,
        event: wl_callback::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_callback::Event::Done { callback_data } = event {
            trace!("frame done at {}ms", callback_data);
            // The old callback is destroyed by the done event itself.
            state.surface.frame(qh, ());
            state.signal.notify_frame();
        }
    }
}
