// Copyright (c) 2024-2025, The blockmotion contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use blockmotion::config::{DEFAULT_BLOCK_SIZE, DEFAULT_SEARCH_RADIUS};
use blockmotion::output::{write_outputs, Report};
use blockmotion::{analyze_frame_pair, y4m, MotionConfig};

#[derive(Parser)]
#[command(override_usage = "blockmotion <INPUT> [--first <N>] [--second <M>] [-o <DIR>]")]
struct CommandlineArgs {
  /// Input video, must end in .y4m
  input: PathBuf,
  /// Index of the anchor frame (0-based) [default: random]
  #[arg(short, long)]
  first: Option<usize>,
  /// Index of the target frame [default: <first> + 1]
  #[arg(short, long, requires = "first")]
  second: Option<usize>,
  /// Width and height of each block, in pixels
  #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
  block_size: usize,
  /// How far from its own position a block is searched for, in pixels
  #[arg(short = 'r', long, default_value_t = DEFAULT_SEARCH_RADIUS)]
  search_radius: usize,
  /// Directory for the diagnostic images and summary
  #[arg(short, long, default_value = "output_frames")]
  output_dir: PathBuf,
  /// Only print the statistics, don't write any files
  #[arg(long)]
  no_save: bool,
  /// Number of worker threads [default: one per core]
  #[arg(long)]
  threads: Option<usize>,
  /// Seed for the random frame choice
  #[arg(long)]
  seed: Option<u64>,
}

// Pick a random pair of consecutive frames
fn random_pair(input: &Path, seed: Option<u64>) -> Result<(usize, usize)> {
  let frame_count = y4m::count_frames(input)
    .with_context(|| format!("failed to scan {}", input.display()))?;
  if frame_count < 2 {
    bail!("{} has {} frame(s), need at least 2", input.display(), frame_count);
  }

  let mut rng = match seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy()
  };
  let first = rng.gen_range(0 .. frame_count - 1);
  Ok((first, first + 1))
}

// The pair given on the command line; the second frame defaults to the one after the first
fn chosen_pair(first: usize, second: Option<usize>) -> Result<(usize, usize)> {
  match second.or(first.checked_add(1)) {
    Some(second) => Ok((first, second)),
    None => bail!("frame {} has no following frame", first)
  }
}

fn main() -> Result<()> {
  let args = CommandlineArgs::parse();

  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .init();

  if args.input.extension().and_then(|ext| ext.to_str()) != Some("y4m") {
    bail!("input file must end in .y4m");
  }

  if let Some(threads) = args.threads {
    rayon::ThreadPoolBuilder::new()
      .num_threads(threads)
      .build_global()
      .map_err(|e| anyhow!("thread pool init failed: {}", e))?;
  }

  let config = MotionConfig::new(args.block_size, args.search_radius)?;

  let (first, second) = match args.first {
    Some(first) => chosen_pair(first, args.second)?,
    None => random_pair(&args.input, args.seed)?
  };

  info!(input = %args.input.display(), first, second, "reading frames");
  let (anchor, target) = y4m::read_frame_pair(&args.input, first, second)
    .with_context(|| format!("failed to read frames {} and {} from {}", first, second, args.input.display()))?;

  let analysis = analyze_frame_pair(&anchor, &target, &config)
    .with_context(|| format!("motion search failed for frames {} and {}", first, second))?;

  let total = &analysis.total;
  info!(anchor_bpp = total.anchor,
        difference_bpp = total.difference,
        residual_bpp = total.residual,
        "totals over all channels");
  println!("Compression ratio = {}", analysis.ratio);

  if !args.no_save {
    let report = Report::new(first, second, config, anchor.format(), &analysis);
    write_outputs(&args.output_dir, &anchor, &target, &analysis, &report)
      .with_context(|| format!("failed to write results to {}", args.output_dir.display()))?;
  }

  Ok(())
}
