use std::io;
use std::io::prelude::*;

use crate::array2d::Array2D;

// One channel of one frame
pub type Plane = Array2D<u8>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromaFormat {
  Mono,
  Cs420,
  Cs422,
  Cs444,
}

impl ChromaFormat {
  pub fn num_planes(self) -> usize {
    match self {
      ChromaFormat::Mono => 1,
      _ => 3
    }
  }

  // Size of each chroma plane, given the luma size
  // Odd luma sizes round up, matching how Y4M lays out chroma
  pub fn chroma_dims(self, rows: usize, cols: usize) -> (usize, usize) {
    match self {
      ChromaFormat::Mono => (0, 0),
      ChromaFormat::Cs420 => (rows.div_ceil(2), cols.div_ceil(2)),
      ChromaFormat::Cs422 => (rows, cols.div_ceil(2)),
      ChromaFormat::Cs444 => (rows, cols),
    }
  }

  pub fn y4m_tag(self) -> &'static str {
    match self {
      ChromaFormat::Mono => "mono",
      ChromaFormat::Cs420 => "420jpeg",
      ChromaFormat::Cs422 => "422",
      ChromaFormat::Cs444 => "444",
    }
  }

  // Short names for each channel, used when naming output files
  pub fn channel_names(self) -> &'static [&'static str] {
    match self {
      ChromaFormat::Mono => &["Y"],
      _ => &["Y", "U", "V"]
    }
  }
}

#[derive(Clone, Debug)]
pub struct Frame {
  format: ChromaFormat,
  planes: Vec<Plane>
}

impl Frame {
  pub fn new(format: ChromaFormat, rows: usize, cols: usize) -> Self {
    let (chroma_rows, chroma_cols) = format.chroma_dims(rows, cols);
    let mut planes = vec![Plane::zeroed(rows, cols)];
    for _ in 1..format.num_planes() {
      planes.push(Plane::zeroed(chroma_rows, chroma_cols));
    }

    Self {
      format: format,
      planes: planes
    }
  }

  // Build a frame from already-captured planes
  // The planes must have the sizes implied by `format`
  pub fn from_planes(format: ChromaFormat, planes: Vec<Plane>) -> Option<Self> {
    let luma = planes.first()?;
    let (chroma_rows, chroma_cols) = format.chroma_dims(luma.rows(), luma.cols());
    if planes.len() != format.num_planes() {
      return None;
    }
    if planes[1..].iter().any(|p| p.dims() != (chroma_rows, chroma_cols)) {
      return None;
    }

    Some(Self {
      format: format,
      planes: planes
    })
  }

  pub fn format(&self) -> ChromaFormat {
    self.format
  }

  pub fn num_planes(&self) -> usize {
    self.planes.len()
  }

  pub fn planes(&self) -> &[Plane] {
    &self.planes
  }

  pub fn plane(&self, idx: usize) -> &Plane {
    &self.planes[idx]
  }

  pub fn plane_mut(&mut self, idx: usize) -> &mut Plane {
    &mut self.planes[idx]
  }

  pub fn y(&self) -> &Plane {
    &self.planes[0]
  }

  pub fn rows(&self) -> usize {
    self.planes[0].rows()
  }

  pub fn cols(&self) -> usize {
    self.planes[0].cols()
  }

  // Number of bytes each frame occupies in a planar stream
  pub fn byte_len(&self) -> usize {
    self.planes.iter().map(|p| p.len()).sum()
  }

  pub fn read_from<R: Read>(&mut self, r: &mut R) -> Result<(), io::Error> {
    for plane in self.planes.iter_mut() {
      for row in 0 .. plane.rows() {
        r.read_exact(&mut plane[row])?;
      }
    }
    Ok(())
  }

  pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), io::Error> {
    for plane in self.planes.iter() {
      for row in 0 .. plane.rows() {
        w.write_all(&plane[row])?;
      }
    }
    Ok(())
  }
}
