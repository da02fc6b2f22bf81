use clap::Parser;
use log::info;
use reef::app::{run_gui, run_headless};
use reef::io::config::Config;
use reef::ReefError;
use std::path::PathBuf;

/// Software-rendered underwater scene.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Scene description (TOML). Built-in defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render one frame to a PNG instead of opening a window.
    #[arg(long)]
    headless: bool,

    /// Output image for --headless; overrides `render.output`.
    #[arg(short, long, value_name = "PNG")]
    output: Option<PathBuf>,
}

fn main() -> Result<(), ReefError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("wgpu", log::LevelFilter::Warn)
        .filter_module("glutin", log::LevelFilter::Warn)
        .filter_module("sctk", log::LevelFilter::Warn)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            info!("No config given, using the built-in scene");
            Config::default()
        }
    };

    if cli.headless {
        let output = cli
            .output
            .unwrap_or_else(|| PathBuf::from(&config.render.output));
        run_headless(&config, &output)
    } else {
        run_gui(config)
    }
}
