use crate::array2d::Region;
use crate::frame::Plane;
use crate::grid::Block;

// The part of the anchor plane which is searched for a block's best match
#[derive(Clone, Copy, Debug)]
pub struct SearchWindow<'a> {
  region: Region<'a, u8>
}

impl<'a> SearchWindow<'a> {
  // Carve out the neighbourhood of `block` which holds every candidate within
  // `radius` pixels, plus the block's own extent.
  // The window is clipped to the plane, so near the edges it shrinks (and is
  // no longer centred on the block) rather than being padded.
  pub fn extract(anchor: &'a Plane, block: Block, block_size: usize, radius: usize) -> Self {
    let center_row = block.row + block_size / 2;
    let center_col = block.col + block_size / 2;

    let row0 = (center_row - block_size / 2).saturating_sub(radius);
    let col0 = (center_col - block_size / 2).saturating_sub(radius);
    let row1 = (row0 + 2 * radius + block_size).min(anchor.rows());
    let col1 = (col0 + 2 * radius + block_size).min(anchor.cols());

    Self {
      region: anchor.region(row0, col0, row1 - row0, col1 - col0)
    }
  }

  pub fn region(&self) -> &Region<'a, u8> {
    &self.region
  }

  pub fn rows(&self) -> usize {
    self.region.rows()
  }

  pub fn cols(&self) -> usize {
    self.region.cols()
  }

  // Top-left corner of the window, in anchor coordinates
  pub fn origin(&self) -> (usize, usize) {
    self.region.origin()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  // Interior block: full window, centred on the block
  #[case(Block { row: 16, col: 16 }, (9, 9), (30, 30))]
  // Top-left corner: start clamps to 0, end is measured from the clamped start
  #[case(Block { row: 0, col: 0 }, (0, 0), (30, 30))]
  // Bottom-right corner: end clamps to the plane size
  #[case(Block { row: 32, col: 32 }, (25, 25), (23, 23))]
  // Mixed edges
  #[case(Block { row: 0, col: 32 }, (0, 25), (30, 23))]
  fn window_is_clipped_to_the_plane(#[case] block: Block,
                                    #[case] origin: (usize, usize),
                                    #[case] dims: (usize, usize)) {
    let anchor = Plane::zeroed(48, 48);
    let window = SearchWindow::extract(&anchor, block, 16, 7);
    assert_eq!(window.origin(), origin);
    assert_eq!((window.rows(), window.cols()), dims);
  }

  #[test]
  fn window_contains_the_co_located_block() {
    let anchor = Plane::new_with(40, 56, |i, j| (i + j) as u8);
    let block = Block { row: 16, col: 32 };
    let window = SearchWindow::extract(&anchor, block, 16, 7);
    let (row0, col0) = window.origin();

    assert!(row0 <= block.row && block.row + 16 <= row0 + window.rows());
    assert!(col0 <= block.col && block.col + 16 <= col0 + window.cols());
    assert_eq!(window.region()[block.row - row0][block.col - col0], anchor[16][32]);
  }
}
