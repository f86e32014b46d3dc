//! Flat toroidal cell grid with a two-buffer generation scheme.
//!
//! Storage:
//! - `cells`: current generation, one byte per cell, each `0` or `1`
//! - `next_cells`: write target for the generation being computed
//!
//! Cell `(x, y)` lives at `y * width + x`. The two buffers are allocated once
//! and only exchange roles in [`Grid::advance`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::partition::RowRange;
use super::rules::{self, RULES};
use crate::error::{Error, Result};

/// Read-only view of the current generation.
///
/// `Copy + Sync`, so every worker of a phase can hold one while writing its
/// own disjoint slice of the next buffer.
#[derive(Clone, Copy)]
pub struct Generation<'a> {
    width: usize,
    height: usize,
    cells: &'a [u8],
    /// `west[x] == (x + width - 1) % width`
    west: &'a [usize],
    /// `east[x] == (x + 1) % width`
    east: &'a [usize],
}

impl<'a> Generation<'a> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> &'a [u8] {
        self.cells
    }

    #[inline(always)]
    pub fn state(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    /// Sum of the eight toroidally adjacent cells.
    pub fn count_neighbors(&self, x: usize, y: usize) -> u8 {
        let (w, h) = (self.width, self.height);
        let up = (y + h - 1) % h;
        let down = (y + 1) % h;
        let left = (x + w - 1) % w;
        let right = (x + 1) % w;

        self.state(left, up)
            + self.state(x, up)
            + self.state(right, up)
            + self.state(left, y)
            + self.state(right, y)
            + self.state(left, down)
            + self.state(x, down)
            + self.state(right, down)
    }

    #[inline]
    pub fn next_state(&self, x: usize, y: usize) -> u8 {
        rules::next_state(self.state(x, y), self.count_neighbors(x, y))
    }

    /// Compute the next generation for `range` into `out`.
    ///
    /// `out` holds exactly the rows of `range` (`range.len() * width` bytes);
    /// row `range.start` lands at `out[0..width]`.
    pub fn apply_range(&self, range: RowRange, out: &mut [u8]) {
        let w = self.width;
        let h = self.height;
        assert_eq!(out.len(), range.len() * w, "output slice does not match range {range:?}");

        for (y, out_row) in range.rows().zip(out.chunks_exact_mut(w)) {
            let up = (y + h - 1) % h;
            let down = (y + 1) % h;
            let above = &self.cells[up * w..(up + 1) * w];
            let row = &self.cells[y * w..(y + 1) * w];
            let below = &self.cells[down * w..(down + 1) * w];

            for (x, slot) in out_row.iter_mut().enumerate() {
                let l = self.west[x];
                let r = self.east[x];
                let n = above[l] + above[x] + above[r] + row[l] + row[r] + below[l] + below[x] + below[r];
                *slot = RULES.lookup(row[x], n);
            }
        }
    }
}

pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    next_cells: Vec<u8>,
    west: Vec<usize>,
    east: Vec<usize>,
    rng: StdRng,
    generation: u64,
}

impl Grid {
    /// Allocate a `width x height` grid, each cell alive with probability ½.
    pub fn new(width: usize, height: usize, seed: u64) -> Result<Self> {
        let mut grid = Self::empty(width, height, seed)?;
        grid.randomize();
        Ok(grid)
    }

    /// Allocate a grid with every cell dead.
    pub fn empty(width: usize, height: usize, seed: u64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(Error::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![0; len],
            next_cells: vec![0; len],
            west: (0..width).map(|x| (x + width - 1) % width).collect(),
            east: (0..width).map(|x| (x + 1) % width).collect(),
            rng: StdRng::seed_from_u64(seed),
            generation: 0,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Current generation as a linear byte slice.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub fn current(&self) -> Generation<'_> {
        Generation {
            width: self.width,
            height: self.height,
            cells: &self.cells,
            west: &self.west,
            east: &self.east,
        }
    }

    /// Split borrow: read view of `cells` alongside the writable `next_cells`.
    #[inline]
    pub(crate) fn split_for_update(&mut self) -> (Generation<'_>, &mut [u8]) {
        let view = Generation {
            width: self.width,
            height: self.height,
            cells: &self.cells,
            west: &self.west,
            east: &self.east,
        };
        (view, &mut self.next_cells)
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[self.index(x, y)]
    }

    pub fn count_neighbors(&self, x: usize, y: usize) -> u8 {
        self.current().count_neighbors(x, y)
    }

    pub fn next_state(&self, x: usize, y: usize) -> u8 {
        self.current().next_state(x, y)
    }

    /// Compute rows `[start, end)` of the next generation on the calling thread.
    pub fn apply_range(&mut self, start: usize, end: usize) {
        let width = self.width;
        let (view, next) = self.split_for_update();
        view.apply_range(RowRange::new(start, end), &mut next[start * width..end * width]);
    }

    /// Promote the freshly written buffer to current.
    pub fn advance(&mut self) {
        std::mem::swap(&mut self.cells, &mut self.next_cells);
        self.generation += 1;
    }

    /// Re-seed every cell independently with probability ½ and restart the
    /// generation counter.
    pub fn reset(&mut self) {
        self.randomize();
        self.generation = 0;
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Mark `(x, y)` alive; coordinates outside the grid are rejected.
    pub fn set_alive(&mut self, x: usize, y: usize) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.mark_alive(x, y);
        Ok(())
    }

    /// Unchecked beyond slice indexing; callers clip first.
    #[inline]
    pub(crate) fn mark_alive(&mut self, x: usize, y: usize) {
        let idx = self.index(x, y);
        self.cells[idx] = 1;
    }

    /// Mark `count` uniformly random cells alive.
    pub fn sprinkle(&mut self, count: usize) {
        let len = self.cells.len();
        for _ in 0..count {
            let idx = self.rng.random_range(0..len);
            self.cells[idx] = 1;
        }
    }

    pub fn population(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        for (y, row) in self.cells.chunks_exact(self.width).enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell != 0 {
                    f(x, y);
                }
            }
        }
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        for cell in &mut self.cells {
            *cell = rng.random_bool(0.5) as u8;
        }
    }
}
