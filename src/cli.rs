//! Command-line arguments shared by every demo binary

use clap::Args;
use log::{error, info};
use std::path::PathBuf;

use crate::api::GraphicsApi;
use crate::config::DemoConfig;

/// Arguments every demo accepts
#[derive(Debug, Clone, Default, Args)]
pub struct DemoArgs {
    /// Client API: `gles` selects OpenGL ES, anything else desktop OpenGL.
    ///
    /// Only the first word counts; anything after it, flags included, is
    /// accepted and ignored.
    #[arg(value_name = "API", trailing_var_arg = true, allow_hyphen_values = true)]
    pub api: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Stop after this many frames instead of waiting for the window to close
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,
}

impl DemoArgs {
    pub fn graphics_api(&self) -> GraphicsApi {
        GraphicsApi::from_arg(self.api.first().map(String::as_str))
    }

    /// Load the configuration file (if any) and apply command-line overrides.
    ///
    /// A file that fails to load is reported and the defaults are used.
    pub fn resolve_config(&self) -> DemoConfig {
        let mut config = match &self.config {
            Some(path) => match DemoConfig::load(path) {
                Ok(config) => {
                    info!("✅ Configuration loaded from: {}", path.display());
                    config
                }
                Err(e) => {
                    error!("❌ Failed to load configuration: {:#}", e);
                    info!("📝 Using default configuration");
                    DemoConfig::default()
                }
            },
            None => DemoConfig::default(),
        };

        if let Some(frames) = self.frames {
            config.render.max_frames = Some(frames);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: DemoArgs,
    }

    fn parse(argv: &[&str]) -> DemoArgs {
        TestCli::parse_from(std::iter::once("demo").chain(argv.iter().copied())).args
    }

    #[test]
    fn no_arguments_means_desktop_gl_and_defaults() {
        let args = parse(&[]);
        assert_eq!(args.graphics_api(), GraphicsApi::OpenGl);
        assert_eq!(args.resolve_config(), DemoConfig::default());
    }

    #[test]
    fn gles_positional_selects_es() {
        assert_eq!(parse(&["gles"]).graphics_api(), GraphicsApi::OpenGlEs);
        assert_eq!(parse(&["whatever"]).graphics_api(), GraphicsApi::OpenGl);
    }

    #[test]
    fn extra_words_after_the_api_are_ignored() {
        assert_eq!(parse(&["gles", "extra"]).graphics_api(), GraphicsApi::OpenGlEs);
        assert_eq!(parse(&["gl", "gles"]).graphics_api(), GraphicsApi::OpenGl);
    }

    #[test]
    fn unknown_flag_selects_desktop_gl() {
        let args = parse(&["-x"]);
        assert_eq!(args.graphics_api(), GraphicsApi::OpenGl);
        assert_eq!(args.api, vec!["-x".to_string()]);
    }

    #[test]
    fn frames_flag_overrides_config() {
        let args = parse(&["--frames", "5", "gles"]);
        assert_eq!(args.resolve_config().render.max_frames, Some(5));
        assert_eq!(args.graphics_api(), GraphicsApi::OpenGlEs);
    }

    #[test]
    fn unreadable_config_falls_back_to_defaults() {
        let args = parse(&["--config", "/nonexistent/wsi-demo.toml"]);
        assert_eq!(args.resolve_config(), DemoConfig::default());
    }
}
