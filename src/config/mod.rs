//! Configuration management for the demos
//!
//! Every setting has a default matching the classic demo behavior (a 300x300
//! window cleared to blue, no vsync), so a config file is optional. Files are
//! TOML and may set any subset of the sections below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::render::DEFAULT_CLEAR_COLOR;
use crate::window::DEFAULT_SIZE;

/// Main configuration struct containing all demo settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DemoConfig {
    /// Window size and title
    #[serde(default)]
    pub window: WindowConfig,

    /// Render loop settings
    #[serde(default)]
    pub render: RenderConfig,

    /// X11-only settings
    #[serde(default)]
    pub x11: X11Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial width (pixels)
    pub width: u32,

    /// Initial height (pixels)
    pub height: u32,

    /// Toplevel title / `WM_NAME` (unset = the backend's own default)
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA clear color, each channel in 0.0-1.0
    pub clear_color: [f32; 4],

    /// Passed to `eglSwapInterval` (0 = don't wait for vblank)
    pub swap_interval: i32,

    /// Stop after this many frames (unset = run until closed)
    pub max_frames: Option<u64>,

    /// Wayland single-threaded loop: only draw after a frame callback
    pub pace_with_frame_callbacks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct X11Config {
    /// Sleep between frames (milliseconds)
    pub frame_interval_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE.0 as u32,
            height: DEFAULT_SIZE.1 as u32,
            title: None,
        }
    }
}

impl WindowConfig {
    /// Configured title, or `fallback` when none is set
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: DEFAULT_CLEAR_COLOR,
            swap_interval: 0,
            max_frames: None,
            pace_with_frame_callbacks: false,
        }
    }
}

impl Default for X11Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: 10,
        }
    }
}

impl DemoConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let rest = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(rest)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: DemoConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            anyhow::bail!(
                "Invalid window size {}x{}: both sides must be non-zero",
                self.window.width,
                self.window.height
            );
        }

        // Sizes travel as i32 on the wire
        if self.window.width > i32::MAX as u32 || self.window.height > i32::MAX as u32 {
            anyhow::bail!("Invalid window size: too large");
        }

        if let Some(channel) = self
            .render
            .clear_color
            .iter()
            .find(|c| !(0.0..=1.0).contains(*c))
        {
            anyhow::bail!("Invalid clear_color channel {}: must be between 0.0 and 1.0", channel);
        }

        if self.render.swap_interval < 0 {
            anyhow::bail!("Invalid swap_interval: must not be negative");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Initial window size as the display servers expect it
    pub fn window_size(&self) -> (i32, i32) {
        (self.window.width as i32, self.window.height as i32)
    }
}
