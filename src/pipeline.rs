// Per-channel motion compensation of a frame pair, and the statistics which
// summarise how much it helps

use std::ops::Add;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::array2d::Array2D;
use crate::bitcost::{bits_per_pixel, CompressionRatio};
use crate::config::MotionConfig;
use crate::error::{Error, Result};
use crate::frame::{Frame, Plane};
use crate::recon::{abs_difference, check_same_size, compute_residual, predict_plane, reconstruct, verify_reconstruction};

// Bits-per-pixel estimates for one channel (or the sum over channels)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ChannelBits {
  // The anchor plane on its own
  pub anchor: f64,
  // Plain frame difference, no motion compensation
  pub difference: f64,
  // Motion-compensated residual
  pub residual: f64
}

impl Add for ChannelBits {
  type Output = ChannelBits;
  fn add(self, other: ChannelBits) -> ChannelBits {
    ChannelBits {
      anchor: self.anchor + other.anchor,
      difference: self.difference + other.difference,
      residual: self.residual + other.residual
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MotionStats {
  pub blocks: usize,
  pub mean_mad: f64,
  // Blocks whose best match is not the co-located one
  pub moved_blocks: usize
}

pub struct ChannelAnalysis {
  pub channel: usize,
  pub difference: Plane,
  pub predicted: Plane,
  pub residual: Array2D<i16>,
  pub reconstructed: Array2D<i16>,
  pub bits: ChannelBits,
  pub motion: MotionStats
}

pub struct FrameAnalysis {
  pub channels: Vec<ChannelAnalysis>,
  pub total: ChannelBits,
  pub ratio: CompressionRatio
}

pub fn analyze_channel(channel: usize, anchor: &Plane, target: &Plane, config: &MotionConfig) -> Result<ChannelAnalysis> {
  check_same_size(channel, anchor, target)?;

  let difference = abs_difference(anchor, target);
  let prediction = predict_plane(channel, anchor, target, config)?;
  let residual = compute_residual(target, &prediction.predicted);
  let reconstructed = reconstruct(&residual, &prediction.predicted);
  verify_reconstruction(channel, target, &reconstructed)?;

  let bits = ChannelBits {
    anchor: bits_per_pixel(anchor),
    difference: bits_per_pixel(&difference),
    residual: bits_per_pixel(&residual)
  };

  let blocks = prediction.matches.len();
  let total_mad: f64 = prediction.matches.iter().map(|(_, found)| found.mad).sum();
  let motion = MotionStats {
    blocks: blocks,
    mean_mad: if blocks > 0 { total_mad / blocks as f64 } else { 0.0 },
    moved_blocks: prediction.matches.iter()
      .filter(|(block, found)| found.motion_vector(*block) != (0, 0))
      .count()
  };

  debug!(channel, blocks, moved = motion.moved_blocks, mean_mad = motion.mean_mad, "motion search done");

  Ok(ChannelAnalysis {
    channel: channel,
    difference: difference,
    predicted: prediction.predicted,
    residual: residual,
    reconstructed: reconstructed,
    bits: bits,
    motion: motion
  })
}

// Run the motion search on every channel of a frame pair.
// Channels are independent of each other, so are processed in parallel.
pub fn analyze_frame_pair(anchor: &Frame, target: &Frame, config: &MotionConfig) -> Result<FrameAnalysis> {
  config.validate()?;
  if anchor.num_planes() != target.num_planes() {
    return Err(Error::ChannelCountMismatch { anchor: anchor.num_planes(), target: target.num_planes() });
  }

  let channels = (0..anchor.num_planes())
    .into_par_iter()
    .map(|c| analyze_channel(c, anchor.plane(c), target.plane(c), config))
    .collect::<Result<Vec<_>>>()?;

  let names = anchor.format().channel_names();
  for analysis in channels.iter() {
    let bits = &analysis.bits;
    info!(channel = names[analysis.channel],
          anchor_bpp = bits.anchor,
          difference_bpp = bits.difference,
          residual_bpp = bits.residual,
          "channel analysed");
  }

  let total = channels.iter()
    .map(|analysis| analysis.bits)
    .fold(ChannelBits::default(), |acc, bits| acc + bits);
  let ratio = CompressionRatio::new(total.anchor, total.residual);

  Ok(FrameAnalysis {
    channels: channels,
    total: total,
    ratio: ratio
  })
}
