use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use wsi_demo::{logging, DemoArgs, WaylandWindow};

/// Wayland EGL window, rendered from a dedicated thread paced by frame callbacks
#[derive(Parser)]
#[command(name = "wayland_egl_threaded", version)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.demo.debug);
    logging::log_startup("wayland_egl_threaded");

    let config = cli.demo.resolve_config();
    let window = WaylandWindow::connect(&config, cli.demo.graphics_api())
        .context("Failed to set up Wayland EGL window")?;
    let frames = window.run_threaded()?;

    info!("👋 Done after {} frames", frames);
    Ok(())
}
