//! Export of generated fields and atmosphere diagnostics.
//!
//! Supports 16-bit grayscale PNG for raw fields, coloured RGB previews of
//! elevation and sunlight, and profile graphs plus a CSV table for the
//! atmosphere simulation.

mod png;
mod preview;
mod profile;

use thiserror::Error;

pub use png::{export_field_png, PngExportOptions};
pub use preview::{
    elevation_colour, elevation_preview, export_rgb_png, sunlight_colour, sunlight_preview,
    PreviewOptions,
};
pub use profile::{render_profile_graph, ProfileExportOptions, ProfileExporter};

/// Errors that can occur during export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidRange(f64, f64),
    #[error("Invalid image size {0}x{1}")]
    InvalidSize(usize, usize),
    #[error("Field size mismatch: expected {expected:?}, found {found:?}")]
    SizeMismatch { expected: (usize, usize), found: (usize, usize) },
}
