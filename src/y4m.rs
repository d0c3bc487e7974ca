use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use byteorder::{ReadBytesExt, WriteBytesExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::frame::{ChromaFormat, Frame};

const Y4M_FILE_MAGIC: &str = "YUV4MPEG2 ";
const Y4M_FRAME_MAGIC: &str = "FRAME";

pub struct Y4MReader<R> {
  inner: R,
  rows: usize,
  cols: usize,
  format: ChromaFormat,
  frame_bytes: u64
}

pub struct Y4MWriter<W> {
  inner: W,
  rows: usize,
  cols: usize,
  format: ChromaFormat
}

fn is_whitespace(byte: u8) -> bool {
  matches!(byte, b' ' | b'\t' | b'\n')
}

// Read bytes up to the next whitespace character
// Returns the token along with the whitespace byte which ended it
fn read_token<R: Read>(r: &mut R) -> Result<(String, u8)> {
  let mut token = Vec::new();
  loop {
    let byte = r.read_u8()?;
    if is_whitespace(byte) {
      let token = String::from_utf8(token)
        .map_err(|_| Error::InvalidY4M("non-ASCII header parameter".to_string()))?;
      return Ok((token, byte));
    }
    token.push(byte);
  }
}

fn parse_dimension(value: &str, name: char) -> Result<usize> {
  value.parse::<usize>()
    .map_err(|_| Error::InvalidY4M(format!("bad {} parameter '{}'", name, value)))
}

fn parse_colorspace(value: &str) -> Result<ChromaFormat> {
  match value {
    "420" | "420jpeg" | "420paldv" | "420mpeg2" => Ok(ChromaFormat::Cs420),
    "422" => Ok(ChromaFormat::Cs422),
    "444" => Ok(ChromaFormat::Cs444),
    "mono" => Ok(ChromaFormat::Mono),
    _ => Err(Error::InvalidY4M(format!("unsupported colorspace '{}'", value)))
  }
}

impl<R: Read> Y4MReader<R> {
  pub fn new(mut inner: R) -> Result<Self> {
    // Read header line
    let mut file_magic = [0u8; 10];
    inner.read_exact(&mut file_magic)?;
    if file_magic != Y4M_FILE_MAGIC.as_bytes() {
      return Err(Error::InvalidY4M("missing YUV4MPEG2 signature".to_string()));
    }

    let mut cols = 0;
    let mut rows = 0;
    // The Y4M default when no C parameter is present
    let mut format = ChromaFormat::Cs420;

    // Parse parameter line
    // Parameters other than size and colorspace don't affect the frame layout, so are skipped
    loop {
      let (token, terminator) = read_token(&mut inner)?;
      let mut chars = token.chars();
      match chars.next() {
        Some('W') => cols = parse_dimension(chars.as_str(), 'W')?,
        Some('H') => rows = parse_dimension(chars.as_str(), 'H')?,
        Some('C') => format = parse_colorspace(chars.as_str())?,
        _ => {}
      }
      if terminator == b'\n' {
        break;
      }
    }

    if cols == 0 || rows == 0 {
      // Didn't find a width/height parameter, or it was zero
      return Err(Error::InvalidY4M(format!("invalid size {}x{}", cols, rows)));
    }

    let frame_bytes = Frame::new(format, rows, cols).byte_len() as u64;
    debug!(cols, rows, ?format, "opened Y4M stream");

    Ok(Y4MReader {
      inner: inner,
      rows: rows,
      cols: cols,
      format: format,
      frame_bytes: frame_bytes
    })
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn format(&self) -> ChromaFormat {
    self.format
  }

  // Consume a frame header line
  // Returns false if the stream ended cleanly before the header
  fn read_frame_header(&mut self) -> Result<bool> {
    // Technically this can have parameters, but they aren't useful to us.
    // So just check the magic number to ensure we're in the right place
    // and skip the rest of the line
    let mut frame_magic = [0u8; 5];
    match self.inner.read_u8() {
      Ok(byte) => frame_magic[0] = byte,
      Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(false),
      Err(e) => return Err(e.into())
    }
    self.inner.read_exact(&mut frame_magic[1..])?;
    if frame_magic != Y4M_FRAME_MAGIC.as_bytes() {
      return Err(Error::InvalidY4M("invalid frame header".to_string()));
    }

    while self.inner.read_u8()? != b'\n' {}
    Ok(true)
  }

  // Read the next frame, or None at the end of the stream
  pub fn read_frame(&mut self) -> Result<Option<Frame>> {
    if !self.read_frame_header()? {
      return Ok(None);
    }

    let mut frame = Frame::new(self.format, self.rows, self.cols);
    frame.read_from(&mut self.inner)?;
    Ok(Some(frame))
  }

  // Step over the next frame without keeping its samples
  // Returns false at the end of the stream
  pub fn skip_frame(&mut self) -> Result<bool> {
    if !self.read_frame_header()? {
      return Ok(false);
    }

    let skipped = io::copy(&mut (&mut self.inner).take(self.frame_bytes), &mut io::sink())?;
    if skipped != self.frame_bytes {
      return Err(Error::InvalidY4M("truncated frame data".to_string()));
    }
    Ok(true)
  }
}

impl<W: Write> Y4MWriter<W> {
  pub fn new(mut inner: W, format: ChromaFormat, rows: usize, cols: usize) -> Result<Self> {
    inner.write_all(Y4M_FILE_MAGIC.as_bytes())?;
    write!(inner, "W{} H{} F25:1 Ip A1:1 C{}\n", cols, rows, format.y4m_tag())?;

    Ok(Y4MWriter {
      inner: inner,
      rows: rows,
      cols: cols,
      format: format
    })
  }

  pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
    if frame.format() != self.format || frame.rows() != self.rows || frame.cols() != self.cols {
      return Err(Error::InvalidY4M(format!(
        "frame {}x{} does not match stream {}x{}", frame.cols(), frame.rows(), self.cols, self.rows)));
    }

    self.inner.write_all(Y4M_FRAME_MAGIC.as_bytes())?;
    self.inner.write_u8(b'\n')?;
    frame.write_to(&mut self.inner)?;
    Ok(())
  }

  pub fn into_inner(self) -> W {
    self.inner
  }
}

pub fn open(path: &Path) -> Result<Y4MReader<BufReader<File>>> {
  let file = File::open(path).map_err(|e| Error::from(e).in_file(path))?;
  Y4MReader::new(BufReader::new(file)).map_err(|e| e.in_file(path))
}

pub fn count_frames(path: &Path) -> Result<usize> {
  let mut reader = open(path)?;
  let mut count = 0;
  while reader.skip_frame().map_err(|e| e.in_file(path))? {
    count += 1;
  }
  Ok(count)
}

// Fetch two frames by 0-based index
// The indices may come in either order, and may be equal
pub fn read_frame_pair(path: &Path, first: usize, second: usize) -> Result<(Frame, Frame)> {
  let mut reader = open(path)?;
  reader.read_pair(first, second).map_err(|e| e.in_file(path))
}

impl<R: Read> Y4MReader<R> {
  fn read_pair(&mut self, first: usize, second: usize) -> Result<(Frame, Frame)> {
    let last = first.max(second);
    let mut first_frame = None;
    let mut second_frame = None;

    for index in 0..=last {
      if index != first && index != second {
        if !self.skip_frame()? {
          return Err(Error::FrameIndexOutOfRange { index: last, frame_count: index });
        }
        continue;
      }

      let frame = self.read_frame()?
        .ok_or(Error::FrameIndexOutOfRange { index: last, frame_count: index })?;
      if index == first {
        first_frame = Some(frame.clone());
      }
      if index == second {
        second_frame = Some(frame);
      }
    }

    match (first_frame, second_frame) {
      (Some(a), Some(b)) => Ok((a, b)),
      _ => unreachable!("both indices lie in 0..=last")
    }
  }
}

pub fn write_frames(path: &Path, frames: &[&Frame]) -> Result<()> {
  let Some(head) = frames.first() else {
    return Err(Error::InvalidY4M("no frames to write".to_string()));
  };

  let file = File::create(path).map_err(|e| Error::from(e).in_file(path))?;
  let write_stream = move || -> Result<()> {
    let mut writer = Y4MWriter::new(BufWriter::new(file), head.format(), head.rows(), head.cols())?;
    for frame in frames {
      writer.write_frame(frame)?;
    }
    writer.into_inner().flush()?;
    Ok(())
  };
  write_stream().map_err(|e| e.in_file(path))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stream_with(format: ChromaFormat, rows: usize, cols: usize, count: usize) -> Vec<u8> {
    let mut writer = Y4MWriter::new(Vec::new(), format, rows, cols).unwrap();
    for n in 0..count {
      let mut frame = Frame::new(format, rows, cols);
      for p in 0..frame.num_planes() {
        frame.plane_mut(p).fill_with(|i, j| (n * 10 + p + i + j) as u8);
      }
      writer.write_frame(&frame).unwrap();
    }
    writer.into_inner()
  }

  #[test]
  fn reads_back_what_was_written() {
    let bytes = stream_with(ChromaFormat::Cs420, 6, 8, 3);
    let mut reader = Y4MReader::new(&bytes[..]).unwrap();
    assert_eq!((reader.rows(), reader.cols()), (6, 8));
    assert_eq!(reader.format(), ChromaFormat::Cs420);

    assert!(reader.skip_frame().unwrap());
    let frame = reader.read_frame().unwrap().unwrap();
    assert_eq!(frame.y()[0][0], 10);
    assert_eq!(frame.plane(2)[1][1], 14);
    assert!(reader.read_frame().unwrap().is_some());
    assert!(reader.read_frame().unwrap().is_none());
  }

  #[test]
  fn skips_unknown_header_parameters() {
    let mut bytes = b"YUV4MPEG2 W4 H2 F30000:1001 XCOLORRANGE=FULL Cmono\n".to_vec();
    bytes.extend_from_slice(b"FRAME Ixyz\n");
    bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

    let mut reader = Y4MReader::new(&bytes[..]).unwrap();
    assert_eq!(reader.format(), ChromaFormat::Mono);
    let frame = reader.read_frame().unwrap().unwrap();
    assert_eq!(&frame.y()[1][..], &[5, 6, 7, 8]);
  }

  #[test]
  fn rejects_missing_signature() {
    let result = Y4MReader::new(&b"RIFF0000WAVEfmt \n"[..]);
    assert!(matches!(result, Err(Error::InvalidY4M(_))));
  }

  #[test]
  fn rejects_missing_size() {
    let result = Y4MReader::new(&b"YUV4MPEG2 W16 C444\n"[..]);
    assert!(matches!(result, Err(Error::InvalidY4M(_))));
  }

  #[test]
  fn rejects_high_bit_depth() {
    let result = Y4MReader::new(&b"YUV4MPEG2 W16 H16 C420p10\n"[..]);
    assert!(matches!(result, Err(Error::InvalidY4M(_))));
  }

  #[test]
  fn truncated_frame_is_an_error() {
    let mut bytes = stream_with(ChromaFormat::Mono, 4, 4, 1);
    bytes.truncate(bytes.len() - 3);
    let mut reader = Y4MReader::new(&bytes[..]).unwrap();
    assert!(reader.skip_frame().is_err());
  }

  #[test]
  fn missing_input_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.y4m");
    match count_frames(&path) {
      Err(Error::File { path: failed, .. }) => assert_eq!(failed, path),
      other => panic!("unexpected result {:?}", other)
    }
  }

  #[test]
  fn unwritable_output_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("Restore_frame.y4m");
    let frame = Frame::new(ChromaFormat::Mono, 2, 2);
    match write_frames(&path, &[&frame]) {
      Err(Error::File { path: failed, .. }) => assert_eq!(failed, path),
      other => panic!("unexpected result {:?}", other)
    }
  }

  #[test]
  fn pair_past_the_end_of_a_stream() {
    let bytes = stream_with(ChromaFormat::Mono, 2, 2, 2);
    let mut reader = Y4MReader::new(&bytes[..]).unwrap();
    let result = reader.read_pair(0, 5);
    assert!(matches!(result, Err(Error::FrameIndexOutOfRange { index: 5, frame_count: 2 })));
  }
}
