//! Choosing which display server to talk to

use clap::ValueEnum;
use std::env;

use crate::error::{Result, WsiError};

/// Display server selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendKind {
    /// Wayland if available, otherwise X11
    #[default]
    Auto,
    Wayland,
    X11,
}

/// A concrete display server, once `Auto` has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    Wayland,
    X11,
}

impl BackendKind {
    /// Resolve `Auto` against the current environment
    pub fn resolve(self) -> Result<DisplayServer> {
        self.resolve_with(
            env::var("WAYLAND_DISPLAY").ok().as_deref(),
            env::var("DISPLAY").ok().as_deref(),
        )
    }

    /// Resolve `Auto` against explicit `WAYLAND_DISPLAY` / `DISPLAY` values
    pub fn resolve_with(
        self,
        wayland_display: Option<&str>,
        x11_display: Option<&str>,
    ) -> Result<DisplayServer> {
        let set = |value: Option<&str>| value.is_some_and(|v| !v.is_empty());
        match self {
            BackendKind::Wayland => Ok(DisplayServer::Wayland),
            BackendKind::X11 => Ok(DisplayServer::X11),
            BackendKind::Auto if set(wayland_display) => Ok(DisplayServer::Wayland),
            BackendKind::Auto if set(x11_display) => Ok(DisplayServer::X11),
            BackendKind::Auto => Err(WsiError::NoDisplayServer),
        }
    }
}
