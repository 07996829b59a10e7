//! # wsi-demo
//!
//! Picks Wayland or X11 at runtime and runs the matching EGL clear demo.
//! The dedicated `wayland_egl`, `wayland_egl_threaded` and `x11_egl` binaries
//! run one backend each.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use wsi_demo::{logging, BackendKind, DemoArgs};

#[derive(Parser)]
#[command(name = "wsi-demo")]
#[command(about = "Clear a native window to a solid color through EGL")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,

    /// Display server to use
    #[arg(long, value_enum, default_value_t = BackendKind::Auto)]
    backend: BackendKind,

    /// Render on a separate thread (Wayland only)
    #[arg(long)]
    threaded: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.demo.debug);
    logging::log_startup("wsi-demo");

    let config = cli.demo.resolve_config();
    let api = cli.demo.graphics_api();

    let frames = wsi_demo::run(cli.backend, cli.threaded, &config, api)
        .with_context(|| format!("{:?} backend failed", cli.backend))?;

    info!("👋 Done after {} frames", frames);
    Ok(())
}
