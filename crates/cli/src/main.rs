use cats_eye_core::{
    config::Config,
    init,
    schedule::SystemClock,
    storage::{MemoryStore, Persistence},
    CatsEye, Session, Triangle,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to open (PNG or JPEG)
    image: Option<PathBuf>,

    /// Render and save without opening a window
    #[arg(long, requires = "image")]
    headless: bool,

    /// Selection triangle as JSON, e.g. '[{"x":0,"y":0},{"x":100,"y":0},{"x":100,"y":100}]'
    #[arg(long, requires = "headless")]
    triangle: Option<String>,

    /// Tile scale in percent
    #[arg(long)]
    scale: Option<f64>,

    /// Draw the tile grid
    #[arg(long, default_value_t = false)]
    grid: bool,

    /// Width of the saved image in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Height of the saved image in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Save a single tile instead of a full image
    #[arg(long, requires = "headless", conflicts_with_all = ["width", "height"])]
    tile: bool,

    /// Directory for saved images
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not read or write the persistent store
    #[arg(long, default_value_t = false)]
    no_store: bool,
}

fn main() -> Result<()> {
    // Setup
    init();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load config and apply overrides
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(dir) = &args.output {
        config.output_dir = dir.clone();
    }
    if args.no_store {
        config.disable_store = true;
    }

    if args.headless {
        let path = run_headless(&args, &config)?;
        println!("{}", path.display());
        return Ok(());
    }

    let app = CatsEye::with_config(config);
    app.run_interactive(args.image.as_deref())
        .context("Failed to run the pattern editor")?;
    Ok(())
}

/// Renders `args.image` with the requested settings and writes the export.
///
/// Uses an in-memory store so the editor's saved state is left alone.
fn run_headless(args: &Args, config: &Config) -> Result<PathBuf> {
    let Some(image) = &args.image else {
        bail!("--headless needs an image");
    };

    let persistence = Persistence::new(MemoryStore::new());
    let mut session =
        Session::with_parts(persistence, Arc::new(SystemClock), config.output_dir.clone())
            .context("Failed to create session")?;

    session
        .load_image_file(image)
        .with_context(|| format!("Failed to load {}", image.display()))?;

    if let Some(json) = &args.triangle {
        let data: serde_json::Value =
            serde_json::from_str(json).context("--triangle is not valid JSON")?;
        let triangle = Triangle::from_data(&data).context("--triangle is not a triangle")?;
        session
            .set_selection_triangle(triangle)
            .context("Failed to apply the selection triangle")?;
    }
    if let Some(scale) = args.scale {
        session
            .set_tile_scale(scale)
            .context("Failed to render at the requested scale")?;
    }
    if args.grid {
        session.set_show_grid(true).context("Failed to draw the grid")?;
    }
    if let Some(width) = args.width {
        session.set_save_width(width);
    }
    if let Some(height) = args.height {
        session.set_save_height(height);
    }

    let path = if args.tile {
        session.save_tile().context("Failed to save tile")?
    } else {
        info!(
            "Saving {}x{} image",
            session.save_width(),
            session.save_height()
        );
        session.save_image().context("Failed to save image")?
    };
    Ok(path)
}
