// Copyright (c) 2024-2025, The blockmotion contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

// Prediction, residual and reconstruction functions

use rayon::prelude::*;

use crate::array2d::Array2D;
use crate::config::MotionConfig;
use crate::error::{Error, Result};
use crate::frame::Plane;
use crate::grid::{Block, BlockGrid};
use crate::motion::{three_step_search, BlockMatch};
use crate::search::SearchWindow;

// Value left in pixels which are not covered by any block
pub const UNPREDICTED_FILL: u8 = 255;

pub struct Prediction {
  pub grid: BlockGrid,
  pub predicted: Plane,
  // One entry per block, in raster order
  pub matches: Vec<(Block, BlockMatch)>
}

// Planes of one channel must have the same size in both frames
pub fn check_same_size<T, U>(channel: usize, anchor: &Array2D<T>, target: &Array2D<U>) -> Result<()> {
  if anchor.dims() != target.dims() {
    return Err(Error::FrameSizeMismatch {
      channel: channel,
      anchor_rows: anchor.rows(),
      anchor_cols: anchor.cols(),
      target_rows: target.rows(),
      target_cols: target.cols(),
    });
  }
  Ok(())
}

// Build a motion-compensated prediction of `target` out of blocks of `anchor`.
//
// Blocks are searched independently (and in parallel); only once every match is
// known is the predicted plane assembled, each block being written exactly once.
pub fn predict_plane(channel: usize, anchor: &Plane, target: &Plane, config: &MotionConfig) -> Result<Prediction> {
  check_same_size(channel, anchor, target)?;
  config.validate()?;

  let bs = config.block_size;
  let grid = BlockGrid::segment(target.rows(), target.cols(), bs)?;
  let blocks: Vec<Block> = grid.blocks().collect();

  let matches = blocks.par_iter()
    .map(|&block| {
      let target_block = target.region(block.row, block.col, bs, bs);
      let window = SearchWindow::extract(anchor, block, bs, config.search_radius);
      three_step_search(&target_block, &window, bs).map(|found| (block, found))
    })
    .collect::<Result<Vec<_>>>()?;

  let mut predicted = Plane::filled(target.rows(), target.cols(), UNPREDICTED_FILL);
  for (block, found) in matches.iter() {
    predicted.copy_region_from(block.row, block.col, &anchor.region(found.row, found.col, bs, bs));
  }

  Ok(Prediction {
    grid: grid,
    predicted: predicted,
    matches: matches
  })
}

// Signed difference between the true target and its prediction
// Panics if the planes differ in size
pub fn compute_residual(target: &Plane, predicted: &Plane) -> Array2D<i16> {
  assert!(target.dims() == predicted.dims());
  Array2D::new_with(
    target.rows(), target.cols(),
    |i, j| (target[i][j] as i16) - (predicted[i][j] as i16)
  )
}

// Apply a residual to a prediction to get back the target
// Panics if the planes differ in size
pub fn reconstruct(residual: &Array2D<i16>, predicted: &Plane) -> Array2D<i16> {
  assert!(residual.dims() == predicted.dims());
  Array2D::new_with(
    residual.rows(), residual.cols(),
    |i, j| residual[i][j] + (predicted[i][j] as i16)
  )
}

// Residual + prediction must give back the target exactly
pub fn verify_reconstruction(channel: usize, target: &Plane, reconstructed: &Array2D<i16>) -> Result<()> {
  check_same_size(channel, target, reconstructed)?;
  for row in 0..target.rows() {
    for col in 0..target.cols() {
      if reconstructed[row][col] != target[row][col] as i16 {
        return Err(Error::ReconstructionMismatch { channel: channel, row: row, col: col });
      }
    }
  }
  Ok(())
}

// |anchor - target|, the residual we would get without any motion compensation
pub fn abs_difference(anchor: &Plane, target: &Plane) -> Plane {
  assert!(anchor.dims() == target.dims());
  Plane::new_with(anchor.rows(), anchor.cols(), |i, j| anchor[i][j].abs_diff(target[i][j]))
}
