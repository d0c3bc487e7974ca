// Writing diagnostic images and the summary report

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use serde::Serialize;
use tracing::info;

use crate::array2d::Array2D;
use crate::chart::{render_histogram, ChartLabels};
use crate::color::ycbcr_image;
use crate::config::MotionConfig;
use crate::error::{Error, Result};
use crate::frame::{ChromaFormat, Frame, Plane};
use crate::pipeline::{ChannelBits, FrameAnalysis, MotionStats};
use crate::y4m;

// Samples which can be shown as an 8-bit image
// Signed values saturate, so negative residuals show as black
pub trait DisplaySample: Copy {
  fn to_display(self) -> u8;
}

impl DisplaySample for u8 {
  fn to_display(self) -> u8 {
    self
  }
}

impl DisplaySample for i16 {
  fn to_display(self) -> u8 {
    self.clamp(0, 255) as u8
  }
}

fn save_gray<T: DisplaySample>(path: &Path, plane: &Array2D<T>) -> Result<()> {
  let img = GrayImage::from_fn(plane.cols() as u32, plane.rows() as u32, |x, y| {
    Luma([plane[y as usize][x as usize].to_display()])
  });
  img.save(path).map_err(|e| Error::ImageWrite { path: path.to_path_buf(), source: e })
}

// Write one grayscale PNG per channel, named "<stem>_<channel>.png".
// Returns the paths written.
pub fn write_channels<T: DisplaySample>(dir: &Path, stem: &str, format: ChromaFormat,
                                        planes: &[&Array2D<T>]) -> Result<Vec<PathBuf>> {
  let mut written = Vec::new();

  for (plane, name) in planes.iter().zip(format.channel_names()) {
    let path = dir.join(format!("{}_{}.png", stem, name));
    save_gray(&path, *plane)?;
    written.push(path);
  }

  Ok(written)
}

// Like write_channels, for planes which hold picture samples rather than differences.
// A colour frame also gets a true-colour "<stem>.png" at full luma resolution.
pub fn write_picture(dir: &Path, stem: &str, format: ChromaFormat, planes: &[&Plane]) -> Result<Vec<PathBuf>> {
  let mut written = write_channels(dir, stem, format, planes)?;

  if let [y, cb, cr] = planes {
    let path = dir.join(format!("{}.png", stem));
    ycbcr_image(y, cb, cr).save(&path)
      .map_err(|e| Error::ImageWrite { path: path.clone(), source: e })?;
    written.push(path);
  }

  Ok(written)
}

#[derive(Debug, Serialize)]
pub struct ChannelReport {
  pub name: String,
  pub bits: ChannelBits,
  pub motion: MotionStats
}

#[derive(Debug, Serialize)]
pub struct Report {
  pub anchor_frame: usize,
  pub target_frame: usize,
  pub config: MotionConfig,
  pub channels: Vec<ChannelReport>,
  pub total: ChannelBits,
  // None when the residual costs nothing
  pub compression_ratio: Option<f64>,
  pub saturated: bool
}

impl Report {
  pub fn new(anchor_frame: usize, target_frame: usize, config: MotionConfig,
             format: ChromaFormat, analysis: &FrameAnalysis) -> Self {
    let channels = analysis.channels.iter()
      .zip(format.channel_names())
      .map(|(c, name)| ChannelReport {
        name: name.to_string(),
        bits: c.bits,
        motion: c.motion
      })
      .collect();

    Self {
      anchor_frame: anchor_frame,
      target_frame: target_frame,
      config: config,
      channels: channels,
      total: analysis.total,
      compression_ratio: analysis.ratio.value(),
      saturated: analysis.ratio.is_saturated()
    }
  }
}

pub fn write_report(path: &Path, report: &Report) -> Result<()> {
  let file = File::create(path).map_err(|e| Error::from(e).in_file(path))?;
  let mut w = BufWriter::new(file);
  serde_json::to_writer_pretty(&mut w, report)
    .map_err(|e| Error::ReportWrite { path: path.to_path_buf(), source: e })?;
  w.write_all(b"\n")
    .and_then(|_| w.flush())
    .map_err(|e| Error::from(e).in_file(path))
}

// Write every artifact of one analysed frame pair into `dir`, creating it if needed
pub fn write_outputs(dir: &Path, anchor: &Frame, target: &Frame,
                     analysis: &FrameAnalysis, report: &Report) -> Result<()> {
  fs::create_dir_all(dir).map_err(|e| Error::from(e).in_file(dir))?;
  let format = anchor.format();

  // The reconstruction is exact, so it can be shown and exported as an ordinary frame
  let restored: Vec<Plane> = analysis.channels.iter()
    .map(|c| Plane::new_with(c.reconstructed.rows(), c.reconstructed.cols(),
                             |i, j| c.reconstructed[i][j].to_display()))
    .collect();

  let anchor_planes: Vec<_> = anchor.planes().iter().collect();
  let target_planes: Vec<_> = target.planes().iter().collect();
  let predicted: Vec<_> = analysis.channels.iter().map(|c| &c.predicted).collect();
  let restored_planes: Vec<_> = restored.iter().collect();
  let difference: Vec<_> = analysis.channels.iter().map(|c| &c.difference).collect();
  let residual: Vec<_> = analysis.channels.iter().map(|c| &c.residual).collect();

  write_picture(dir, "First_frame", format, &anchor_planes)?;
  write_picture(dir, "Second_frame", format, &target_planes)?;
  write_picture(dir, "Predicted_frame", format, &predicted)?;
  write_picture(dir, "Restore_frame", format, &restored_planes)?;
  write_channels(dir, "Difference_frame", format, &difference)?;
  write_channels(dir, "Residual_frame", format, &residual)?;

  if let Some(frame) = Frame::from_planes(format, restored) {
    y4m::write_frames(&dir.join("Restore_frame.y4m"), &[&frame])?;
  }

  let chart_path = dir.join("Compression_Histogram.png");
  render_histogram(analysis, &ChartLabels::new(format, analysis.ratio)).save(&chart_path)
    .map_err(|e| Error::ImageWrite { path: chart_path.clone(), source: e })?;

  write_report(&dir.join("summary.json"), report)?;

  info!(dir = %dir.display(), "wrote diagnostic images");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signed_samples_saturate() {
    assert_eq!((-40i16).to_display(), 0);
    assert_eq!(300i16.to_display(), 255);
    assert_eq!(17i16.to_display(), 17);
  }

  #[test]
  fn colour_pictures_get_a_true_colour_composite() {
    let dir = tempfile::tempdir().unwrap();

    let mut yuv444 = Frame::new(ChromaFormat::Cs444, 8, 8);
    for (p, value) in [81u8, 90, 240].into_iter().enumerate() {
      yuv444.plane_mut(p).fill_with(|_, _| value);
    }
    let planes: Vec<_> = yuv444.planes().iter().collect();
    let written = write_picture(dir.path(), "b", ChromaFormat::Cs444, &planes).unwrap();
    assert_eq!(written.len(), 4);
    assert!(dir.path().join("b_V.png").exists());

    let img = image::open(dir.path().join("b.png")).unwrap().to_rgb8();
    assert_eq!(img.get_pixel(3, 3).0, [238, 14, 14]);
  }

  #[test]
  fn subsampled_pictures_are_shown_at_luma_size() {
    let dir = tempfile::tempdir().unwrap();
    let yuv420 = Frame::new(ChromaFormat::Cs420, 6, 10);
    let planes: Vec<_> = yuv420.planes().iter().collect();
    let written = write_picture(dir.path(), "a", ChromaFormat::Cs420, &planes).unwrap();
    assert_eq!(written.len(), 4);

    let img = image::open(dir.path().join("a.png")).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (10, 6));
  }

  #[test]
  fn differences_have_no_composite() {
    let dir = tempfile::tempdir().unwrap();
    let yuv444 = Frame::new(ChromaFormat::Cs444, 4, 4);
    let planes: Vec<_> = yuv444.planes().iter().collect();
    let written = write_channels(dir.path(), "d", ChromaFormat::Cs444, &planes).unwrap();
    assert_eq!(written.len(), 3);
    assert!(!dir.path().join("d.png").exists());
  }

  #[test]
  fn report_failure_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory in the way of the report file
    let path = dir.path().join("summary.json");
    fs::create_dir(&path).unwrap();

    let report = Report {
      anchor_frame: 0,
      target_frame: 1,
      config: MotionConfig::default(),
      channels: Vec::new(),
      total: ChannelBits::default(),
      compression_ratio: None,
      saturated: true
    };
    match write_report(&path, &report) {
      Err(Error::File { path: failed, .. }) => assert_eq!(failed, path),
      other => panic!("unexpected result {:?}", other)
    }
  }

  #[test]
  fn written_plane_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let plane = Array2D::new_with(3, 5, |i, j| (i * 5 + j) as i16 - 4);
    write_channels(dir.path(), "r", ChromaFormat::Mono, &[&plane]).unwrap();

    let img = image::open(dir.path().join("r_Y.png")).unwrap().to_luma8();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(0, 0).0, [0]);
    assert_eq!(img.get_pixel(4, 2).0, [10]);
  }

  #[test]
  fn unwritable_destination_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such_dir");
    let plane: Array2D<u8> = Array2D::zeroed(2, 2);
    let result = write_channels(&missing, "x", ChromaFormat::Mono, &[&plane]);
    match result {
      Err(Error::ImageWrite { path, .. }) => assert_eq!(path, missing.join("x_Y.png")),
      other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
  }
}
