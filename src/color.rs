// Colour conversion for viewing YCbCr frames

use image::{Rgb, RgbImage};

use crate::array2d::Array2D;

/// Convert full-range YCbCr to RGB using the BT.601 matrix
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Rgb<u8> {
  let y = y as f32;
  let cb = cb as f32 - 128.0;
  let cr = cr as f32 - 128.0;

  let r = (y + 1.402 * cr).round().clamp(0.0, 255.0) as u8;
  let g = (y - 0.344136 * cb - 0.714136 * cr).round().clamp(0.0, 255.0) as u8;
  let b = (y + 1.772 * cb).round().clamp(0.0, 255.0) as u8;

  Rgb([r, g, b])
}

// How many luma samples share one chroma sample along an axis
// 1 for 4:4:4, 2 for the subsampled axes of 4:2:0 and 4:2:2
fn subsampling(luma: usize, chroma: usize) -> usize {
  luma.div_ceil(chroma.max(1)).max(1)
}

/// Build an RGB picture from a luma plane and two chroma planes.
///
/// The chroma planes may be subsampled; each chroma sample is repeated over
/// the luma samples it covers.
pub fn ycbcr_image(y: &Array2D<u8>, cb: &Array2D<u8>, cr: &Array2D<u8>) -> RgbImage {
  debug_assert_eq!(cb.dims(), cr.dims());
  let (rows, cols) = y.dims();
  let row_step = subsampling(rows, cb.rows());
  let col_step = subsampling(cols, cb.cols());

  RgbImage::from_fn(cols as u32, rows as u32, |x, row| {
    let (row, col) = (row as usize, x as usize);
    let (c_row, c_col) = (row / row_step, col / col_step);
    ycbcr_to_rgb(y[row][col], cb[c_row][c_col], cr[c_row][c_col])
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case(128, 128, 128, [128, 128, 128])]
  #[case(0, 128, 128, [0, 0, 0])]
  #[case(255, 128, 128, [255, 255, 255])]
  fn neutral_chroma_is_grey(#[case] y: u8, #[case] cb: u8, #[case] cr: u8, #[case] rgb: [u8; 3]) {
    assert_eq!(ycbcr_to_rgb(y, cb, cr), Rgb(rgb));
  }

  #[test]
  fn high_cr_is_red() {
    let Rgb([r, g, b]) = ycbcr_to_rgb(81, 90, 240);
    assert_eq!([r, g, b], [238, 14, 14]);
  }

  #[test]
  fn subsampled_chroma_covers_every_pixel() {
    // 4:2:0 with odd luma dimensions, so the last chroma row/column covers a single luma sample
    let y = Array2D::filled(5, 7, 81u8);
    let mut cb = Array2D::filled(3, 4, 128u8);
    let mut cr = Array2D::filled(3, 4, 128u8);
    cb[2][3] = 90;
    cr[2][3] = 240;

    let img = ycbcr_image(&y, &cb, &cr);
    assert_eq!(img.dimensions(), (7, 5));
    assert_eq!(*img.get_pixel(0, 0), Rgb([81, 81, 81]));
    assert_eq!(*img.get_pixel(6, 4), Rgb([238, 14, 14]));
    assert_eq!(*img.get_pixel(5, 3), Rgb([81, 81, 81]));
  }
}
