//! The image a passphrase is hidden in.
//!
//! A [`Haystack`] is an immutable, row-major RGBA buffer. Decoding image files
//! into that buffer is left to the caller; the derivation only reads pixels and
//! never writes them, so one haystack can back any number of concurrent runs
//! behind an `Arc`.

use anyhow::{Result, bail, ensure};
use serde::Deserialize;
use strum::Display;

use crate::config::CHANNELS;
use crate::error::NeedlError;

/// How reads outside the canvas are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EdgeMode {
    /// Out-of-range pixels read as transparent black, like a canvas
    /// `getImageData` rectangle that overhangs the image.
    #[default]
    Transparent,

    /// Any read outside the canvas fails the run.
    Strict,
}

/// Read-only RGBA pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Haystack {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Haystack {
    /// Wraps `data` as a `width` x `height` RGBA image.
    ///
    /// # Errors
    ///
    /// [`NeedlError::InvalidInput`] if either side is zero or `data` is not
    /// exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, NeedlError::invalid(format!("image has no pixels ({width}x{height})")));
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            bail!(NeedlError::invalid(format!("pixel buffer holds {} bytes, expected {expected}", data.len())));
        }
        Ok(Self { width, height, data })
    }

    /// Builds a haystack by evaluating `pixel` at every coordinate.
    pub fn from_fn<F>(width: u32, height: u32, pixel: F) -> Result<Self>
    where
        F: Fn(u32, u32) -> [u8; CHANNELS],
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&pixel(x, y));
            }
        }
        Self::new(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Reads the pixel at `(x, y)`, resolving out-of-range coordinates per `mode`.
    pub fn pixel(&self, x: i64, y: i64, mode: EdgeMode) -> Result<[u8; CHANNELS]> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return match mode {
                EdgeMode::Transparent => Ok([0; CHANNELS]),
                EdgeMode::Strict => bail!(NeedlError::invalid(format!("pixel ({x}, {y}) is outside the {}x{} image", self.width, self.height))),
            };
        }

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut pixel = [0; CHANNELS];
        pixel.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        Ok(pixel)
    }
}
