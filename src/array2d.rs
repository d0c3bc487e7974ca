use bytemuck::Zeroable;
use bytemuck::allocation::zeroed_slice_box;

use std::ops::{Index, IndexMut};

// Two-dimensional array type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Array2D<T> {
  rows: usize,
  cols: usize,
  stride: usize,
  data: Box<[T]>,
}

// Borrowed rectangular window into an Array2D
// Indexing works the same way as on the parent array, ie. region[row][col],
// with (0, 0) at the top-left corner of the region
#[derive(Clone, Copy, Debug)]
pub struct Region<'a, T> {
  array: &'a Array2D<T>,
  row0: usize,
  col0: usize,
  rows: usize,
  cols: usize,
}

fn check_bounds(what: &str, start: usize, len: usize, size: usize) -> usize {
  let end = start.checked_add(len).unwrap();
  if end > size {
    panic!("Array2D {} indices out of bounds (index {}..{} vs. size {})", what, start, end, size);
  }
  end
}

impl<T> Array2D<T> {
  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  // (rows, cols)
  pub fn dims(&self) -> (usize, usize) {
    (self.rows, self.cols)
  }

  pub fn len(&self) -> usize {
    self.rows * self.cols
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn fill_with<F: FnMut(usize, usize) -> T>(&mut self, mut f: F) {
    for i in 0..self.rows {
      for j in 0..self.cols {
        self[i][j] = f(i, j);
      }
    }
  }

  // Iterate over every element in raster order
  pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
    (0..self.rows).flat_map(move |row| self[row].iter())
  }

  // Borrow a rows x cols window whose top-left corner is at (row, col)
  // Panics if the window does not lie entirely inside the array
  pub fn region(&self, row: usize, col: usize, rows: usize, cols: usize) -> Region<'_, T> {
    check_bounds("row", row, rows, self.rows);
    check_bounds("column", col, cols, self.cols);

    Region {
      array: self,
      row0: row,
      col0: col,
      rows: rows,
      cols: cols
    }
  }

  pub fn as_region(&self) -> Region<'_, T> {
    self.region(0, 0, self.rows, self.cols)
  }
}

impl<T: Clone> Array2D<T> {
  // Copy the whole of `src` into this array, with its top-left corner at (row, col)
  pub fn copy_region_from(&mut self, row: usize, col: usize, src: &Region<'_, T>) {
    check_bounds("row", row, src.rows(), self.rows);
    let col_end = check_bounds("column", col, src.cols(), self.cols);

    for i in 0..src.rows() {
      self[row + i][col .. col_end].clone_from_slice(&src[i]);
    }
  }
}

impl<T: Zeroable> Array2D<T> {
  pub fn zeroed(rows: usize, cols: usize) -> Self {
    let stride = cols;
    let num_elements = rows.checked_mul(stride).unwrap();
    let data = zeroed_slice_box(num_elements);

    Self {
      rows: rows,
      cols: cols,
      stride: stride,
      data: data
    }
  }

  pub fn new_with<F: FnMut(usize, usize) -> T>(rows: usize, cols: usize, f: F) -> Self {
    let mut result = Array2D::zeroed(rows, cols);
    result.fill_with(f);
    return result;
  }
}

impl<T: Zeroable + Copy> Array2D<T> {
  pub fn filled(rows: usize, cols: usize, value: T) -> Self {
    Self::new_with(rows, cols, |_, _| value)
  }
}

// Allow indexing by array[row][col]
// This is done by having array[row] return a normal slice which
// references the entire row in question. Then a normal slice index
// can pick out the desired element
impl<T> Index<usize> for Array2D<T> {
  type Output = [T];
  fn index(&self, index: usize) -> &[T] {
    if index >= self.rows {
      panic!("Array2D row index out of bounds (index {} vs. size {})", index, self.rows);
    }
    // Due to the above check, these calculations should never overflow
    let start_index = index * self.stride;
    let end_index = start_index + self.cols;
    &self.data[start_index .. end_index]
  }
}

impl<T> IndexMut<usize> for Array2D<T> {
  fn index_mut(&mut self, index: usize) -> &mut [T] {
    if index >= self.rows {
      panic!("Array2D row index out of bounds (index {} vs. size {})", index, self.rows);
    }
    let start_index = index * self.stride;
    let end_index = start_index + self.cols;
    &mut self.data[start_index .. end_index]
  }
}

impl<'a, T> Region<'a, T> {
  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn dims(&self) -> (usize, usize) {
    (self.rows, self.cols)
  }

  // Position of the top-left corner within the parent array
  pub fn origin(&self) -> (usize, usize) {
    (self.row0, self.col0)
  }

  // Narrow this region further. Coordinates are relative to this region
  pub fn region(&self, row: usize, col: usize, rows: usize, cols: usize) -> Region<'a, T> {
    check_bounds("row", row, rows, self.rows);
    check_bounds("column", col, cols, self.cols);

    Region {
      array: self.array,
      row0: self.row0 + row,
      col0: self.col0 + col,
      rows: rows,
      cols: cols
    }
  }
}

impl<'a, T> Index<usize> for Region<'a, T> {
  type Output = [T];
  fn index(&self, index: usize) -> &[T] {
    if index >= self.rows {
      panic!("Region row index out of bounds (index {} vs. size {})", index, self.rows);
    }
    &self.array[self.row0 + index][self.col0 .. self.col0 + self.cols]
  }
}
