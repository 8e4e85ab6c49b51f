//! Star catalog compiler and sky map core
//!
//! Two halves:
//!
//! - **Offline**: [`spectral`] resolves free-form spectral types to colors and
//!   [`catalog`] packs classified source records into a compact binary
//!   catalog.
//! - **Runtime**: the catalog is decoded once, then [`viewport`] tracks
//!   pan/zoom/drag input, [`projection`] maps sky coordinates to the screen
//!   and [`render`] turns each view into draw commands. [`raster`] executes
//!   those commands into an image.

pub mod catalog;
pub mod config;
pub mod projection;
pub mod raster;
pub mod render;
pub mod spectral;
pub mod units;
pub mod viewport;

pub use catalog::{compile_catalog, Catalog, CatalogError, CelestialObject, EncodeReport};
pub use config::{ConfigError, NavigationConfig, RenderConfig, SkyMapConfig};
pub use projection::{Projection, ScreenPoint, SkyCoord, ViewportSize};
pub use render::{DrawCommand, Frame, Glow, Hud, SkyRenderer};
pub use spectral::{classify, ColorTable, Rgb, SpectralClassifier, Unclassified};
pub use viewport::{InputEvent, NavKey, ViewportController, ViewportState};
