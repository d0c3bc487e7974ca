// Partitioning of a plane into fixed-size, non-overlapping blocks

use crate::error::{Error, Result};

// Top-left pixel of a block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
  pub row: usize,
  pub col: usize
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGrid {
  block_size: usize,
  row_segments: usize,
  col_segments: usize
}

impl BlockGrid {
  // Any leftover rows/columns past the last full block are not covered by the grid
  pub fn segment(rows: usize, cols: usize, block_size: usize) -> Result<Self> {
    if block_size == 0 {
      return Err(Error::InvalidConfig("block size must be at least 1".to_string()));
    }

    Ok(Self {
      block_size: block_size,
      row_segments: rows / block_size,
      col_segments: cols / block_size
    })
  }

  pub fn block_size(&self) -> usize {
    self.block_size
  }

  pub fn row_segments(&self) -> usize {
    self.row_segments
  }

  pub fn col_segments(&self) -> usize {
    self.col_segments
  }

  pub fn num_blocks(&self) -> usize {
    self.row_segments * self.col_segments
  }

  // Extent of the covered area, as (rows, cols)
  pub fn covered_dims(&self) -> (usize, usize) {
    (self.row_segments * self.block_size, self.col_segments * self.block_size)
  }

  pub fn covers(&self, row: usize, col: usize) -> bool {
    let (rows, cols) = self.covered_dims();
    row < rows && col < cols
  }

  // Blocks in raster order
  pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
    let bs = self.block_size;
    (0..self.row_segments).flat_map(move |i| {
      (0..self.col_segments).map(move |j| Block { row: i * bs, col: j * bs })
    })
  }
}
