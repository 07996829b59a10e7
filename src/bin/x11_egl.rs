use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use wsi_demo::{logging, DemoArgs, X11Window};

/// X11 EGL window: Xlib display, XCB window, fixed frame interval
#[derive(Parser)]
#[command(name = "x11_egl", version)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.demo.debug);
    logging::log_startup("x11_egl");

    let config = cli.demo.resolve_config();
    let window = X11Window::connect(&config, cli.demo.graphics_api())
        .context("Failed to set up X11 EGL window")?;
    let frames = window.run()?;

    info!("👋 Done after {} frames", frames);
    Ok(())
}
