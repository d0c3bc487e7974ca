//! Error types shared by the motion search pipeline and its I/O collaborators.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Every failure aborts processing of the current frame pair.
#[derive(Error, Debug)]
pub enum Error {
  /// A candidate block could not be cut out at full size
  #[error("block shape mismatch: expected {expected_rows}x{expected_cols}, got {actual_rows}x{actual_cols}")]
  ShapeMismatch {
    expected_rows: usize,
    expected_cols: usize,
    actual_rows: usize,
    actual_cols: usize,
  },

  #[error("frame index {index} is out of range (stream has {frame_count} frames)")]
  FrameIndexOutOfRange { index: usize, frame_count: usize },

  #[error("frame size mismatch in channel {channel}: anchor is {anchor_rows}x{anchor_cols}, target is {target_rows}x{target_cols}")]
  FrameSizeMismatch {
    channel: usize,
    anchor_rows: usize,
    anchor_cols: usize,
    target_rows: usize,
    target_cols: usize,
  },

  #[error("frames have different channel counts: anchor {anchor}, target {target}")]
  ChannelCountMismatch { anchor: usize, target: usize },

  /// Residual + prediction did not give back the target
  #[error("reconstruction differs from target in channel {channel} at row {row}, col {col}")]
  ReconstructionMismatch { channel: usize, row: usize, col: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("invalid Y4M stream: {0}")]
  InvalidY4M(String),

  #[error(transparent)]
  Io(#[from] io::Error),

  /// An I/O failure on a known file or directory
  #[error("I/O error on {path}: {source}")]
  File {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write image {path}: {source}")]
  ImageWrite {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },

  #[error("failed to write report {path}: {source}")]
  ReportWrite {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  // Name the file a bare I/O error happened on; other errors pass through
  pub fn in_file(self, path: &Path) -> Error {
    match self {
      Error::Io(source) => Error::File { path: path.to_path_buf(), source: source },
      other => other
    }
  }
}
