//! Headless Tileplane driver.
//!
//! Usage: `tileplane-demo [config.json] [script.json] [--svg]`
//!
//! Builds a tile view from the viewport config, replays the gesture script
//! (a JSON array of input events) through it, and prints the final frame as
//! JSON, or as an SVG document with `--svg`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use clap::Parser;
use tileplane_renderer::{InputEvent, RetainedScene, TileView, ViewportConfig};

#[derive(Parser, Debug, Default)]
#[command(name = "tileplane-demo")]
#[command(about = "Replay a gesture script against the Tileplane tile view")]
#[command(version)]
struct DemoArgs {
    /// Viewport configuration (JSON); defaults apply when omitted
    config: Option<PathBuf>,

    /// Gesture script: a JSON array of input events
    script: Option<PathBuf>,

    /// Print the final frame as an SVG document instead of JSON
    #[arg(long)]
    svg: bool,
}

/// Load a viewport config; missing fields take their defaults.
fn load_config(path: Option<&Path>) -> Result<ViewportConfig, String> {
    let Some(path) = path else {
        return Ok(ViewportConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

fn load_script(path: Option<&Path>) -> Result<VecDeque<InputEvent>, String> {
    let Some(path) = path else {
        return Ok(VecDeque::new());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&json)
        .map_err(|e| format!("Invalid gesture script {}: {}", path.display(), e))
}

fn run(args: DemoArgs) -> Result<String, String> {
    let config = load_config(args.config.as_deref())?;
    let mut events = load_script(args.script.as_deref())?;

    let mut view: TileView<RetainedScene> = TileView::retained(config).map_err(|e| e.to_string())?;
    let frames = view.drain(&mut events).map_err(|e| e.to_string())?;
    log::info!(
        "Replayed script: {} frames reconciled, {} tiles cached, {} visible",
        frames,
        view.cache().len(),
        view.cache().visible_count()
    );

    if args.svg {
        view.scene().to_svg().map_err(|e| e.to_string())
    } else {
        view.render_frame().to_json().map_err(|e| e.to_string())
    }
}

fn main() {
    env_logger::init();

    match run(DemoArgs::parse()) {
        Ok(output) => println!("{}", output),
        Err(message) => {
            log::error!("{}", message);
            eprintln!("tileplane-demo: {}", message);
            std::process::exit(1);
        }
    }
}
