//! Magnitude-based bits-per-pixel estimate.
//!
//! This is a cheap proxy for how much information a plane carries, not the
//! output size of any real entropy coder: each sample `s` is charged
//! `log2(|s| + 1)` bits, so an all-zero plane costs nothing.

use std::fmt;

use crate::array2d::Array2D;

/// Mean of `log2(|s| + 1)` over every sample of the plane.
///
/// An empty plane has no samples to average and reports 0.
pub fn bits_per_pixel<T: Copy + Into<i32>>(plane: &Array2D<T>) -> f64 {
  if plane.is_empty() {
    return 0.0;
  }

  let total: f64 = plane.iter()
    .map(|&s| {
      let s: i32 = s.into();
      ((s.unsigned_abs() + 1) as f64).log2()
    })
    .sum();
  total / plane.len() as f64
}

/// Anchor bits divided by residual bits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompressionRatio {
  Finite(f64),
  /// The residual costs nothing at all, so the ratio is unbounded
  Saturated,
}

impl CompressionRatio {
  pub fn new(anchor_bits: f64, residual_bits: f64) -> Self {
    if residual_bits == 0.0 {
      CompressionRatio::Saturated
    } else {
      CompressionRatio::Finite(anchor_bits / residual_bits)
    }
  }

  pub fn value(&self) -> Option<f64> {
    match self {
      CompressionRatio::Finite(ratio) => Some(*ratio),
      CompressionRatio::Saturated => None,
    }
  }

  pub fn is_saturated(&self) -> bool {
    matches!(self, CompressionRatio::Saturated)
  }
}

impl fmt::Display for CompressionRatio {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CompressionRatio::Finite(ratio) => write!(f, "{:.2}", ratio),
      CompressionRatio::Saturated => write!(f, "inf"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[test]
  fn zero_plane_costs_nothing() {
    let plane: Array2D<i16> = Array2D::zeroed(9, 7);
    assert_eq!(bits_per_pixel(&plane), 0.0);
  }

  #[test]
  fn empty_plane_costs_nothing() {
    let plane: Array2D<u8> = Array2D::zeroed(0, 16);
    assert_eq!(bits_per_pixel(&plane), 0.0);
  }

  #[rstest]
  #[case(1, 1.0)]
  #[case(3, 2.0)]
  #[case(-3, 2.0)]
  #[case(255, 8.0)]
  #[case(-255, 8.0)]
  fn constant_plane_costs_log2_of_magnitude(#[case] value: i16, #[case] expected: f64) {
    let plane = Array2D::filled(4, 5, value);
    assert!((bits_per_pixel(&plane) - expected).abs() < 1e-12);
  }

  #[test]
  fn cost_is_the_mean_over_samples() {
    // Half the samples cost 0 bits, the other half 2 bits
    let plane = Array2D::new_with(2, 2, |i, _| if i == 0 { 0u8 } else { 3u8 });
    assert!((bits_per_pixel(&plane) - 1.0).abs() < 1e-12);
  }

  #[test]
  fn ratio_saturates_on_a_free_residual() {
    let ratio = CompressionRatio::new(12.5, 0.0);
    assert!(ratio.is_saturated());
    assert_eq!(ratio.value(), None);
    assert_eq!(ratio.to_string(), "inf");
  }

  #[test]
  fn ratio_divides_anchor_by_residual() {
    let ratio = CompressionRatio::new(21.0, 7.0);
    assert_eq!(ratio.value(), Some(3.0));
    assert_eq!(ratio.to_string(), "3.00");
  }
}
