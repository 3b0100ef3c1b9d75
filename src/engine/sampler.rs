//! Neighbourhood sampling and channel differencing.
//!
//! A sample is the 3x3 block whose top-left corner sits one pixel up and left
//! of the cursor. Every colour channel of the block is compared against the
//! same channel of the reference cell; small differences are the signal.

use anyhow::Result;

use crate::config::{CHANNELS, DIFF_THRESHOLD, GRID_SIDE};
use crate::haystack::{EdgeMode, Haystack};
use crate::types::Coordinate;

/// Cells in a sampled block.
pub const BLOCK_CELLS: usize = GRID_SIDE * GRID_SIDE;

/// Flattened cell index the other cells are differenced against.
pub const REFERENCE_CELL: usize = 5;

/// A sampled block, cells in row-major order.
pub type Block = [[u8; CHANNELS]; BLOCK_CELLS];

/// Reads blocks and keeps the run-wide valid/invalid channel tallies.
#[derive(Clone, Debug, Default)]
pub struct Sampler {
    valid: u64,
    invalid: u64,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the block around `at`.
    ///
    /// # Errors
    ///
    /// Only under [`EdgeMode::Strict`], when the block leaves the canvas.
    pub fn sample(haystack: &Haystack, at: Coordinate, mode: EdgeMode) -> Result<Block> {
        #[allow(clippy::cast_possible_wrap)]
        let (left, top) = (at.x as i64 - 1, at.y as i64 - 1);
        let mut block = [[0; CHANNELS]; BLOCK_CELLS];
        for (i, cell) in block.iter_mut().enumerate() {
            let (dx, dy) = ((i % GRID_SIDE) as i64, (i / GRID_SIDE) as i64);
            *cell = haystack.pixel(left + dx, top + dy, mode)?;
        }
        Ok(block)
    }

    /// Differences every non-reference cell against the reference cell, RGB
    /// only, calling `emit` with each in-threshold value mapped onto `0..=10`.
    ///
    /// Negative differences map to `5 + |d|`, so `-1..=-5` become `6..=10`.
    pub fn differences(&mut self, block: &Block, mut emit: impl FnMut(u8)) {
        let reference = block[REFERENCE_CELL];
        for (i, cell) in block.iter().enumerate() {
            if i == REFERENCE_CELL {
                continue;
            }
            for channel in 0..CHANNELS - 1 {
                let diff = i16::from(cell[channel]) - i16::from(reference[channel]);
                if diff.abs() <= DIFF_THRESHOLD {
                    self.valid += 1;
                    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                    let value = if diff < 0 { (DIFF_THRESHOLD - diff) as u8 } else { diff as u8 };
                    emit(value);
                } else {
                    self.invalid += 1;
                }
            }
        }
    }

    /// Channel comparisons that fell inside the threshold.
    #[inline]
    pub fn valid(&self) -> u64 {
        self.valid
    }

    /// Channel comparisons that fell outside the threshold.
    #[inline]
    pub fn invalid(&self) -> u64 {
        self.invalid
    }
}
