// Smoke test against a real display server: bring up each backend that the
// environment offers and render a handful of frames.
//
// Usage: cargo test --features live-display

#![cfg(feature = "live-display")]

use anyhow::Result;

use wsi_demo::{BackendKind, DemoConfig, GraphicsApi, WaylandWindow, X11Window};

fn short_config() -> DemoConfig {
    let mut config = DemoConfig::default();
    config.render.max_frames = Some(3);
    config.x11.frame_interval_ms = 1;
    config
}

fn has_wayland() -> bool {
    std::env::var("WAYLAND_DISPLAY").is_ok_and(|v| !v.is_empty())
}

fn has_x11() -> bool {
    std::env::var("DISPLAY").is_ok_and(|v| !v.is_empty())
}

#[test]
fn test_wayland_single_threaded_renders_frames() -> Result<()> {
    let _ = env_logger::try_init();
    if !has_wayland() {
        eprintln!("WAYLAND_DISPLAY not set, skipping");
        return Ok(());
    }
    let window = WaylandWindow::connect(&short_config(), GraphicsApi::OpenGl)?;
    assert_eq!(window.run()?, 3);
    Ok(())
}

#[test]
fn test_wayland_threaded_renders_frames() -> Result<()> {
    let _ = env_logger::try_init();
    if !has_wayland() {
        eprintln!("WAYLAND_DISPLAY not set, skipping");
        return Ok(());
    }
    let window = WaylandWindow::connect(&short_config(), GraphicsApi::OpenGlEs)?;
    assert_eq!(window.run_threaded()?, 3);
    Ok(())
}

#[test]
fn test_x11_renders_frames() -> Result<()> {
    let _ = env_logger::try_init();
    if !has_x11() {
        eprintln!("DISPLAY not set, skipping");
        return Ok(());
    }
    let window = X11Window::connect(&short_config(), GraphicsApi::OpenGl)?;
    assert_eq!(window.run()?, 3);
    Ok(())
}

#[test]
fn test_auto_backend_runs() -> Result<()> {
    let _ = env_logger::try_init();
    if !has_wayland() && !has_x11() {
        eprintln!("no display server, skipping");
        return Ok(());
    }
    let frames = wsi_demo::run(BackendKind::Auto, false, &short_config(), GraphicsApi::OpenGl)?;
    assert_eq!(frames, 3);
    Ok(())
}
