use super::CoverImage;

/// Walks the sample indices that carry payload bits: pixel by pixel in
/// row-major order, color channels in decoded order, alpha skipped.
pub(super) struct Slots {
    pixel: usize,
    channel: usize,
    pixels: usize,
    stride: usize,
    usable: usize,
}

impl Slots {
    pub fn new(cover: &CoverImage) -> Self {
        Self {
            pixel: 0,
            channel: 0,
            pixels: cover.pixel_count(),
            stride: cover.channels() as usize,
            usable: cover.color_channels() as usize,
        }
    }
}

impl Iterator for Slots {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pixel >= self.pixels {
            return None;
        }

        let index = self.pixel * self.stride + self.channel;

        self.channel += 1;
        if self.channel == self.usable {
            self.channel = 0;
            self.pixel += 1;
        }

        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.pixels - self.pixel.min(self.pixels)) * self.usable - self.channel;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Slots {}

/// Bits of a byte slice, most significant first.
pub(super) struct Bits<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> From<&'a [u8]> for Bits<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl Iterator for Bits<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = *self.bytes.get(self.offset / 8)?;
        let bit = (byte >> (7 - self.offset % 8)) & 1;
        self.offset += 1;
        Some(bit)
    }
}

/// Packs bits MSB first. A trailing partial byte is zero padded.
pub(super) fn pack(bits: impl Iterator<Item = u8>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc = 0u8;
    let mut filled = 0;

    for bit in bits {
        acc = (acc << 1) | (bit & 1);
        filled += 1;
        if filled == 8 {
            out.push(acc);
            acc = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        out.push(acc << (8 - filled));
    }

    out
}
