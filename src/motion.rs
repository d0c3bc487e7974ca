// Copyright (c) 2024-2025, The blockmotion contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

// Hierarchical (three-step) block matching

use crate::array2d::Region;
use crate::error::{Error, Result};
use crate::grid::Block;
use crate::search::SearchWindow;

pub const INITIAL_STEP: usize = 4;

// Steps 4, 2, 1
pub const SEARCH_ROUNDS: usize = INITIAL_STEP.ilog2() as usize + 1;

// Candidate offsets, as (d_col, d_row) in units of the current step
// The order matters: on equal cost, the earlier candidate wins
const CANDIDATES: [(isize, isize); 9] = [
  (0, 0),
  (1, 0),
  (0, 1),
  (1, 1),
  (-1, 0),
  (0, -1),
  (-1, -1),
  (1, -1),
  (-1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockMatch {
  // Top-left of the matched region, relative to the search window
  pub window_row: usize,
  pub window_col: usize,
  // Top-left of the matched region, in anchor coordinates
  pub row: usize,
  pub col: usize,
  // Sum of absolute differences against the target block
  pub sad: u32,
  pub mad: f64,
  // Best MAD known at the end of each round
  pub round_mads: [f64; SEARCH_ROUNDS],
}

impl BlockMatch {
  // Displacement from the block's own position to its match, as (d_row, d_col)
  pub fn motion_vector(&self, block: Block) -> (isize, isize) {
    (self.row as isize - block.row as isize, self.col as isize - block.col as isize)
  }
}

pub fn sad(target: &Region<'_, u8>, candidate: &Region<'_, u8>) -> u32 {
  debug_assert_eq!(target.dims(), candidate.dims());

  let mut sum = 0u32;
  for row in 0..target.rows() {
    sum += target[row].iter()
      .zip(candidate[row].iter())
      .map(|(&a, &b)| a.abs_diff(b) as u32)
      .sum::<u32>();
  }
  sum
}

fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
  if actual.0 < expected.0 || actual.1 < expected.1 {
    return Err(Error::ShapeMismatch {
      expected_rows: expected.0,
      expected_cols: expected.1,
      actual_rows: actual.0,
      actual_cols: actual.1,
    });
  }
  Ok(())
}

// Map a candidate centre point to the top-left corner of its block.
// The start is clamped so that the whole block always fits inside the window,
// which means every candidate has exactly the target's shape.
fn block_start(center: isize, block_size: usize, extent: usize) -> usize {
  let start = center - (block_size / 2) as isize;
  start.clamp(0, (extent - block_size) as isize) as usize
}

// Find the block_size x block_size region of `window` which best matches `target`.
//
// This is the classic logarithmic search: each round tests the current centre
// plus its 8 neighbours at distance `step`, moves to the best point seen so far,
// then halves the step. It is not guaranteed to find the global minimum.
pub fn three_step_search(target: &Region<'_, u8>, window: &SearchWindow<'_>, block_size: usize) -> Result<BlockMatch> {
  if target.dims() != (block_size, block_size) {
    return Err(Error::ShapeMismatch {
      expected_rows: block_size,
      expected_cols: block_size,
      actual_rows: target.rows(),
      actual_cols: target.cols(),
    });
  }
  check_shape((block_size, block_size), (window.rows(), window.cols()))?;

  let region = window.region();
  let (rows, cols) = (window.rows(), window.cols());
  let mut center = ((rows / 2) as isize, (cols / 2) as isize);

  let mut best_sad = u32::MAX;
  let mut best_start = (0, 0);
  let mut round_sads = [0u32; SEARCH_ROUNDS];

  let mut step = INITIAL_STEP;
  let mut round = 0;
  while step >= 1 {
    let round_center = center;
    for &(d_col, d_row) in CANDIDATES.iter() {
      let point_row = round_center.0 + d_row * step as isize;
      let point_col = round_center.1 + d_col * step as isize;
      let start = (block_start(point_row, block_size, rows), block_start(point_col, block_size, cols));

      let candidate = region.region(start.0, start.1, block_size, block_size);
      let cost = sad(target, &candidate);
      if cost < best_sad {
        best_sad = cost;
        best_start = start;
        center = (point_row, point_col);
      }
    }

    round_sads[round] = best_sad;
    round += 1;
    step /= 2;
  }

  let area = (block_size * block_size) as f64;
  let (origin_row, origin_col) = window.origin();

  Ok(BlockMatch {
    window_row: best_start.0,
    window_col: best_start.1,
    row: origin_row + best_start.0,
    col: origin_col + best_start.1,
    sad: best_sad,
    mad: best_sad as f64 / area,
    round_mads: round_sads.map(|s| s as f64 / area),
  })
}
