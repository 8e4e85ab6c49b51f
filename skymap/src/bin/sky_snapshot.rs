//! Render one sky map frame from a binary catalog to a PNG.

use anyhow::{ensure, Context, Result};
use clap::Parser;
use skymap::catalog::Catalog;
use skymap::config::SkyMapConfig;
use skymap::projection::{SkyCoord, ViewportSize};
use skymap::raster::{rasterize_with, BlendMode};
use skymap::render::SkyRenderer;
use skymap::viewport::ViewportState;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a sky map snapshot from a binary star catalog",
    long_about = None
)]
struct Args {
    /// Binary catalog produced by compile_catalog
    #[arg(short, long)]
    catalog: PathBuf,

    /// View center right ascension in degrees (defaults to the configured center)
    #[arg(long, allow_negative_numbers = true)]
    ra: Option<f64>,

    /// View center declination in degrees (defaults to the configured center)
    #[arg(long, allow_negative_numbers = true)]
    dec: Option<f64>,

    /// Zoom factor, at least 1 (defaults to the configured zoom)
    #[arg(short, long)]
    zoom: Option<f64>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Composite glows over each other instead of adding them
    #[arg(long)]
    over: bool,

    /// JSON config file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "sky.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    ensure!(
        args.width > 0 && args.height > 0,
        "Image dimensions must be positive, got {}x{}",
        args.width,
        args.height
    );

    let config = match &args.config {
        Some(path) => SkyMapConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SkyMapConfig::default(),
    };

    let catalog = Catalog::load(&args.catalog)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?;
    if !catalog.license.is_empty() {
        log::info!("Catalog license: {}", catalog.license.lines().next().unwrap_or(""));
    }

    let nav = &config.navigation;
    let center = SkyCoord::new(
        args.ra.unwrap_or(nav.initial_center.ra),
        args.dec.unwrap_or(nav.initial_center.dec),
    );
    let view = ViewportState::new(center, args.zoom.unwrap_or(nav.initial_zoom));
    let size = ViewportSize::new(args.width as f64, args.height as f64);

    let renderer = SkyRenderer::new(config.render.clone());
    let frame = renderer.render_frame(&catalog.objects, &view, size);

    let mode = if args.over {
        BlendMode::Over
    } else {
        BlendMode::Additive
    };
    let img = rasterize_with(&frame, mode);
    img.save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Rendered {} of {} objects at zoom {:.2} to {}",
        frame.glows().count(),
        catalog.len(),
        view.zoom,
        args.output.display()
    );
    println!("{}", frame.hud);

    Ok(())
}
