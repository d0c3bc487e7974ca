//! Block-based motion estimation between two video frames, and an estimate of
//! how much motion compensation reduces the bits needed for the second frame.
//!
//! The flow for each channel is: split the target plane into blocks
//! ([`grid`]), search a clipped neighbourhood of the anchor plane ([`search`])
//! with a three-step search ([`motion`]), assemble the prediction and its
//! residual ([`recon`]), then score the planes ([`bitcost`]).
//! [`pipeline`] runs this over every channel of a frame pair.

pub mod array2d;
pub mod bitcost;
pub mod chart;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod motion;
pub mod output;
pub mod pipeline;
pub mod recon;
pub mod search;
pub mod y4m;

pub use crate::bitcost::{bits_per_pixel, CompressionRatio};
pub use crate::config::MotionConfig;
pub use crate::error::{Error, Result};
pub use crate::frame::{ChromaFormat, Frame, Plane};
pub use crate::pipeline::{analyze_frame_pair, FrameAnalysis};
