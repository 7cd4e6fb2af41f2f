//! Least-significant-bit text steganography over decoded pixel buffers.
//!
//! The payload is a 4-byte big-endian byte count followed by the UTF-8
//! message. Bits are written MSB first into the low bit of color samples,
//! walking pixels in row-major order and channels in decoded order. Alpha
//! never carries data.

mod bits;
pub mod lsb;
pub mod payload;
pub mod png;

pub use lsb::{embed, extract};

use serde::Serialize;

use crate::error::{Error, Result};

/// A decoded pixel buffer: `width * height` pixels of `channels` interleaved samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
}

impl CoverImage {
    /// Wraps raw samples, checking the buffer matches the dimensions.
    ///
    /// Supported layouts are gray (1), gray+alpha (2), RGB (3) and RGBA (4).
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(Error::InvalidInput(format!(
                "unsupported channel count {channels}"
            )));
        }
        let expected = width as u64 * height as u64 * channels as u64;
        if samples.len() as u64 != expected {
            return Err(Error::InvalidInput(format!(
                "{width}x{height}x{channels} image needs {expected} samples, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Channels per pixel that carry payload bits.
    pub fn color_channels(&self) -> u8 {
        match self.channels {
            1 | 2 => 1,
            _ => 3,
        }
    }

    /// Total number of payload bits the image can hold.
    pub fn capacity_bits(&self) -> u64 {
        self.pixel_count() as u64 * self.color_channels() as u64
    }

    pub fn capacity(&self) -> Capacity {
        let bits = self.capacity_bits();
        Capacity {
            bits,
            max_message_bytes: payload::max_message_bytes(bits),
        }
    }

    fn with_samples(&self, samples: Vec<u8>) -> Self {
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            samples,
        }
    }
}

/// How much a cover image can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    pub bits: u64,
    pub max_message_bytes: u64,
}
