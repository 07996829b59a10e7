//! The per-frame work: clear to a constant color and present

use log::{debug, info};

use crate::egl::EglContext;
use crate::error::{Result, WsiError};

/// Color every frame is cleared to
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.2, 0.4, 0.9, 1.0];

/// Clears the color buffer and swaps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearRenderer {
    color: [f32; 4],
}

impl Default for ClearRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_COLOR)
    }
}

impl ClearRenderer {
    pub fn new(color: [f32; 4]) -> Self {
        Self { color }
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Clear and present one frame on the context current on this thread.
    ///
    /// GL entry points must already be loaded with [`EglContext::load_gl`].
    pub fn draw_frame(&self, egl: &EglContext) -> Result<()> {
        let [r, g, b, a] = self.color;
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
        egl.swap_buffers()
    }
}

/// Optional cap on the number of frames a loop renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameBudget {
    limit: Option<u64>,
    rendered: u64,
}

impl FrameBudget {
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit, rendered: 0 }
    }

    /// Unbounded: render until the window closes
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Count one rendered frame
    pub fn record(&mut self) {
        self.rendered += 1;
        if self.rendered % 1000 == 0 {
            debug!("{} frames rendered", self.rendered);
        }
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Run `draw` for one frame if the budget allows it.
    ///
    /// Returns `Ok(false)` without calling `draw` once the limit is reached,
    /// so a limit of zero draws nothing. Otherwise the frame is counted and
    /// `Ok(true)` is returned while frames remain.
    pub fn spend<F>(&mut self, draw: F) -> Result<bool>
    where
        F: FnOnce() -> Result<(), WsiError>,
    {
        if self.exhausted() {
            return Ok(false);
        }
        draw()?;
        self.record();
        if self.exhausted() {
            info!("🏁 Frame budget of {} reached", self.rendered);
            return Ok(false);
        }
        Ok(true)
    }

    pub fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.rendered >= limit)
    }
}
