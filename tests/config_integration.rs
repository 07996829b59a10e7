//! Integration tests for configuration and argument handling
//!
//! These exercise the path every binary takes before touching a display
//! server: parse arguments, load the config file, apply overrides.

use anyhow::Result;
use clap::Parser;
use std::fs;
use tempfile::tempdir;

use wsi_demo::{BackendKind, DemoArgs, DemoConfig, GraphicsApi};

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,

    #[arg(long, value_enum, default_value_t = BackendKind::Auto)]
    backend: BackendKind,
}

fn parse(argv: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("wsi-demo").chain(argv.iter().copied()))
}

/// Test a config file drives window and render settings
#[test]
fn test_config_file_is_applied() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("demo.toml");
    fs::write(
        &path,
        r#"
[window]
width = 800
height = 600
title = "integration"

[render]
clear_color = [0.0, 0.0, 0.0, 1.0]
swap_interval = 1
max_frames = 10

[x11]
frame_interval_ms = 16
"#,
    )?;

    let path_arg = path.to_string_lossy().into_owned();
    let cli = parse(&["--config", &path_arg]);
    let config = cli.demo.resolve_config();

    assert_eq!(config.window_size(), (800, 600));
    assert_eq!(config.window.title.as_deref(), Some("integration"));
    assert_eq!(config.render.clear_color, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(config.render.swap_interval, 1);
    assert_eq!(config.render.max_frames, Some(10));
    assert_eq!(config.x11.frame_interval_ms, 16);
    Ok(())
}

/// Test `--frames` wins over the file's frame limit
#[test]
fn test_frames_flag_beats_config_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("demo.toml");
    fs::write(&path, "[render]\nmax_frames = 10\n")?;

    let path_arg = path.to_string_lossy().into_owned();
    let cli = parse(&["-c", &path_arg, "--frames", "3"]);
    assert_eq!(cli.demo.resolve_config().render.max_frames, Some(3));
    Ok(())
}

/// Test an invalid file falls back to the defaults rather than failing
#[test]
fn test_invalid_config_file_uses_defaults() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("demo.toml");
    fs::write(&path, "[render]\nclear_color = [2.0, 0.0, 0.0, 1.0]\n")?;

    let path_arg = path.to_string_lossy().into_owned();
    let cli = parse(&["--config", &path_arg]);
    assert_eq!(cli.demo.resolve_config(), DemoConfig::default());
    Ok(())
}

/// Test the API positional and backend flag parse together
#[test]
fn test_api_and_backend_arguments() {
    let cli = parse(&["gles", "--backend", "x11"]);
    assert_eq!(cli.demo.graphics_api(), GraphicsApi::OpenGlEs);
    assert_eq!(cli.backend, BackendKind::X11);

    let cli = parse(&["--backend", "wayland"]);
    assert_eq!(cli.demo.graphics_api(), GraphicsApi::OpenGl);
    assert_eq!(cli.backend, BackendKind::Wayland);

    assert_eq!(parse(&[]).backend, BackendKind::Auto);
}

/// Test an unknown backend name is rejected by the parser
#[test]
fn test_unknown_backend_rejected() {
    let result = Cli::try_parse_from(["wsi-demo", "--backend", "mir"]);
    assert!(result.is_err());
}
