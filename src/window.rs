//! Window geometry bookkeeping

/// Size the demo window starts with
pub const DEFAULT_SIZE: (i32, i32) = (300, 300);

/// Current window size as last agreed with the display server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub width: i32,
    pub height: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE.0, DEFAULT_SIZE.1)
    }
}

impl WindowGeometry {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Apply a size suggested by a configure event.
    ///
    /// `0x0` leaves the choice to us, so the current size stays. A zero on a
    /// single axis keeps that axis. Returns the new size only when it differs
    /// from the current one.
    pub fn apply_configure(&mut self, width: i32, height: i32) -> Option<(i32, i32)> {
        if width == 0 && height == 0 {
            return None;
        }
        let width = if width > 0 { width } else { self.width };
        let height = if height > 0 { height } else { self.height };
        if self.width == width && self.height == height {
            return None;
        }
        self.width = width;
        self.height = height;
        Some((width, height))
    }
}
