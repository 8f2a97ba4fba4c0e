//! Graphs and tables of atmosphere profile snapshots.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType};
use image::{ExtendedColorType, Rgb, RgbImage};
use tracing::debug;

use super::png::encode_png;
use super::ExportError;
use crate::atmosphere::{Profile, ProfileContext, SimulationObserver};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GROUND: Rgb<u8> = Rgb([96, 72, 48]);
const SEPARATOR: Rgb<u8> = Rgb([200, 200, 200]);
const DENSITY: Rgb<u8> = Rgb([64, 96, 192]);
const PRESSURE: Rgb<u8> = Rgb([64, 160, 96]);
const SINKING: Rgb<u8> = Rgb([200, 64, 48]);
const RISING: Rgb<u8> = Rgb([240, 160, 32]);
const GROUND_PX: u32 = 4;

/// Options for profile export.
#[derive(Debug, Clone)]
pub struct ProfileExportOptions {
    pub graph_width: u32,
    pub graph_height: u32,
    /// Write one PNG graph per snapshot.
    pub write_graphs: bool,
    /// Append every snapshot to `profile.csv`.
    pub write_csv: bool,
}

impl Default for ProfileExportOptions {
    fn default() -> Self {
        Self {
            graph_width: 600,
            graph_height: 800,
            write_graphs: true,
            write_csv: true,
        }
    }
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, colour: Rgb<u8>) {
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, colour);
        }
    }
}

/// Draws a profile as stacked layer bands, ground at the bottom.
///
/// Each band spans its layer's altitude range. The left third holds a
/// density bar, the middle third a pressure bar, and the right third a
/// velocity bar drawn from its centre line: red to the left for sinking air,
/// orange to the right for rising air. Bars are scaled to the largest value
/// in the profile.
pub fn render_profile_graph(
    profile: &Profile,
    context: &ProfileContext,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    if width == 0 || height <= GROUND_PX {
        return img;
    }

    let sky = (height - GROUND_PX) as f64;
    fill_rect(&mut img, 0, height - GROUND_PX, width, height, GROUND);

    let max_of = |f: fn(&crate::atmosphere::ProfileCell) -> f64| {
        profile.cells.iter().map(f).fold(0.0, f64::max)
    };
    let max_density = max_of(|c| c.density);
    let max_pressure = max_of(|c| c.pressure);
    let max_speed = max_of(|c| c.velocity.abs());

    let third = width / 3;
    let bar = |value: f64, max: f64| -> u32 {
        if max > 0.0 {
            ((value / max).clamp(0.0, 1.0) * third.saturating_sub(2) as f64) as u32
        } else {
            0
        }
    };
    let to_y = |altitude: f64| -> u32 {
        let t = (altitude / context.height).clamp(0.0, 1.0);
        (sky - t * sky).round() as u32
    };

    for cell in &profile.cells {
        let y_top = to_y(cell.altitude + cell.size.z * 0.5);
        let y_bottom = to_y(cell.altitude - cell.size.z * 0.5);
        if y_bottom <= y_top {
            continue;
        }
        let (y0, y1) = (y_top + 1, y_bottom);

        fill_rect(&mut img, 0, y_top, width, y_top + 1, SEPARATOR);
        fill_rect(&mut img, 1, y0, 1 + bar(cell.density, max_density), y1, DENSITY);
        fill_rect(&mut img, third + 1, y0, third + 1 + bar(cell.pressure, max_pressure), y1, PRESSURE);

        let centre = 2 * third + third / 2;
        let speed = bar(cell.velocity.abs(), max_speed) / 2;
        if cell.velocity > 0.0 {
            fill_rect(&mut img, centre.saturating_sub(speed), y0, centre, y1, SINKING);
        } else if cell.velocity < 0.0 {
            fill_rect(&mut img, centre, y0, centre + speed, y1, RISING);
        }
    }

    img
}

/// Writes snapshot graphs and a CSV table into an output directory.
///
/// Graphs are named `graph-<iteration>.png`; the table is `profile.csv`
/// with one row per layer per snapshot.
pub struct ProfileExporter {
    output_dir: PathBuf,
    options: ProfileExportOptions,
    csv: Option<BufWriter<File>>,
    snapshots: usize,
}

impl ProfileExporter {
    pub const CSV_HEADER: &'static str = "iteration,layer,altitude_m,width_m,height_m,depth_m,density_kg_m3,pressure_pa,velocity_m_s";

    /// Creates the output directory and, if enabled, a fresh CSV table.
    pub fn create(output_dir: impl Into<PathBuf>, options: ProfileExportOptions) -> Result<Self, ExportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        let csv = if options.write_csv {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(output_dir.join("profile.csv"))?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{}", Self::CSV_HEADER)?;
            Some(writer)
        } else {
            None
        };

        Ok(Self { output_dir, options, csv, snapshots: 0 })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn graph_path(&self, iteration: usize) -> PathBuf {
        self.output_dir.join(format!("graph-{}.png", iteration))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join("profile.csv")
    }

    pub fn snapshots(&self) -> usize {
        self.snapshots
    }

    /// Writes one snapshot.
    pub fn export(&mut self, profile: &Profile, context: &ProfileContext) -> Result<(), ExportError> {
        if self.options.write_graphs {
            let img = render_profile_graph(
                profile,
                context,
                self.options.graph_width,
                self.options.graph_height,
            );
            let path = self.graph_path(profile.iteration);
            encode_png(
                &path,
                img.as_raw(),
                img.width(),
                img.height(),
                ExtendedColorType::Rgb8,
                CompressionType::Fast,
                FilterType::Adaptive,
            )?;
            debug!("Wrote {}", path.display());
        }

        if let Some(csv) = self.csv.as_mut() {
            for (layer, cell) in profile.cells.iter().enumerate() {
                writeln!(
                    csv,
                    "{},{},{},{},{},{},{},{},{}",
                    profile.iteration,
                    layer,
                    cell.altitude,
                    cell.size.x,
                    cell.size.y,
                    cell.size.z,
                    cell.density,
                    cell.pressure,
                    cell.velocity
                )?;
            }
        }

        self.snapshots += 1;
        Ok(())
    }

    /// Flushes the CSV table and returns the number of snapshots written.
    pub fn finish(mut self) -> Result<usize, ExportError> {
        if let Some(csv) = self.csv.as_mut() {
            csv.flush()?;
        }
        Ok(self.snapshots)
    }
}

impl SimulationObserver for ProfileExporter {
    fn on_snapshot(
        &mut self,
        profile: &Profile,
        context: &ProfileContext,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.export(profile, context)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::ProfileCell;
    use glam::DVec3;
    use tempfile::tempdir;

    fn context() -> ProfileContext {
        ProfileContext { radius: 6_371_000.0, gravity: 9.81, height: 100.0 }
    }

    fn profile(iteration: usize) -> Profile {
        let cell = |altitude: f64, depth: f64, velocity: f64| ProfileCell {
            size: DVec3::new(10.0, 10.0, depth),
            density: 1.0,
            pressure: 1000.0,
            altitude,
            velocity,
        };
        Profile {
            iteration,
            label: format!("iteration {}/10", iteration),
            cells: vec![cell(25.0, 50.0, 2.0), cell(75.0, 50.0, -1.0)],
        }
    }

    #[test]
    fn graph_draws_layer_bars() {
        let img = render_profile_graph(&profile(0), &context(), 300, 104);
        // lower layer spans y 50..100, upper layer y 0..50
        assert_eq!(*img.get_pixel(5, 75), DENSITY);
        assert_eq!(*img.get_pixel(105, 25), PRESSURE);
        assert_eq!(*img.get_pixel(240, 75), SINKING);
        assert_eq!(*img.get_pixel(260, 25), RISING);
        assert_eq!(*img.get_pixel(5, 102), GROUND);
    }

    #[test]
    fn exporter_writes_graphs_and_table() {
        let dir = tempdir().unwrap();
        let mut exporter = ProfileExporter::create(dir.path(), ProfileExportOptions {
            graph_width: 120,
            graph_height: 80,
            ..Default::default()
        })
        .unwrap();

        exporter.export(&profile(0), &context()).unwrap();
        exporter.export(&profile(5), &context()).unwrap();
        assert!(exporter.graph_path(0).exists());
        assert!(exporter.graph_path(5).exists());

        let csv_path = exporter.csv_path();
        assert_eq!(exporter.finish().unwrap(), 2);

        let table = fs::read_to_string(csv_path).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * 2);
        assert_eq!(lines[0], ProfileExporter::CSV_HEADER);
        assert!(lines[3].starts_with("5,0,25,"));
    }

    #[test]
    fn csv_can_be_disabled() {
        let dir = tempdir().unwrap();
        let options = ProfileExportOptions { write_csv: false, write_graphs: false, ..Default::default() };
        let mut exporter = ProfileExporter::create(dir.path(), options).unwrap();
        exporter.export(&profile(0), &context()).unwrap();
        assert!(!exporter.csv_path().exists());
        assert!(!exporter.graph_path(0).exists());
    }
}
