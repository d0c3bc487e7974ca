use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 16;
pub const DEFAULT_SEARCH_RADIUS: usize = 7;

// Keeps a block's SAD (at most 255 per pixel) within a u32
pub const MAX_BLOCK_SIZE: usize = 4096;

// Parameters of the motion search
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MotionConfig {
  pub block_size: usize,
  pub search_radius: usize
}

impl Default for MotionConfig {
  fn default() -> Self {
    Self {
      block_size: DEFAULT_BLOCK_SIZE,
      search_radius: DEFAULT_SEARCH_RADIUS
    }
  }
}

impl MotionConfig {
  pub fn new(block_size: usize, search_radius: usize) -> Result<Self> {
    let config = Self {
      block_size: block_size,
      search_radius: search_radius
    };
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.block_size == 0 {
      return Err(Error::InvalidConfig("block size must be at least 1".to_string()));
    }
    if self.block_size > MAX_BLOCK_SIZE {
      return Err(Error::InvalidConfig(format!("block size {} is too large", self.block_size)));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_the_classic_setup() {
    let config = MotionConfig::default();
    assert_eq!(config.block_size, 16);
    assert_eq!(config.search_radius, 7);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn zero_block_size_is_rejected() {
    assert!(matches!(MotionConfig::new(0, 7), Err(Error::InvalidConfig(_))));
    assert!(MotionConfig::new(8, 0).is_ok());
  }
}
