//! Embedding and extraction over a [`CoverImage`].

use log::debug;

use super::{
    CoverImage,
    bits::{Bits, Slots, pack},
    payload::{self, LEN_PREFIX_BITS, LEN_PREFIX_BYTES},
};
use crate::error::{Error, Result};

/// Hides `message` in the low bits of a copy of `cover`.
///
/// Capacity is checked before any sample is touched, so on error nothing
/// has been produced.
pub fn embed(cover: &CoverImage, message: &str) -> Result<CoverImage> {
    let required_bits = payload::required_bits(message.len() as u64);
    let available_bits = cover.capacity_bits();

    if required_bits > available_bits {
        return Err(Error::MessageTooLarge {
            required_bits,
            available_bits,
        });
    }

    let payload = payload::encode(message)?;
    let mut samples = cover.samples().to_vec();

    for (slot, bit) in Slots::new(cover).zip(Bits::from(payload.as_slice())) {
        samples[slot] = (samples[slot] & 0xFE) | bit;
    }

    debug!(
        "embedded {} message bytes using {required_bits}/{available_bits} bits",
        message.len()
    );

    Ok(cover.with_samples(samples))
}

/// Recovers a message hidden by [`embed`].
///
/// The length prefix is the only source of truth for how much to read.
pub fn extract(stego: &CoverImage) -> Result<String> {
    let available_bits = stego.capacity_bits();
    if available_bits < LEN_PREFIX_BITS {
        return Err(Error::CorruptPayload {
            declared_bytes: 0,
            available_bits,
        });
    }

    let samples = stego.samples();
    let mut slots = Slots::new(stego);
    let mut read = |bytes: usize| pack(slots.by_ref().take(bytes * 8).map(|i| samples[i] & 1));

    let prefix = read(LEN_PREFIX_BYTES);
    let declared_bytes = payload::decode_len(&prefix).ok_or(Error::CorruptPayload {
        declared_bytes: 0,
        available_bits,
    })?;

    if payload::required_bits(declared_bytes as u64) > available_bits {
        return Err(Error::CorruptPayload {
            declared_bytes,
            available_bits,
        });
    }

    let body = read(declared_bytes as usize);
    debug!("extracted {declared_bytes} message bytes");

    String::from_utf8(body).map_err(|_| Error::InvalidEncoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(width: u32, height: u32, channels: u8) -> CoverImage {
        let len = width as usize * height as usize * channels as usize;
        let samples = (0..len).map(|i| (i * 37 % 251) as u8).collect();
        CoverImage::new(width, height, channels, samples).unwrap()
    }

    #[test]
    fn hi_fits_in_48_bits() {
        let cover = cover(4, 4, 3);
        assert_eq!(cover.capacity_bits(), 48);

        let stego = embed(&cover, "hi").unwrap();
        assert_eq!(extract(&stego).unwrap(), "hi");
    }

    #[test]
    fn empty_message_roundtrips() {
        let stego = embed(&cover(8, 8, 4), "").unwrap();
        assert_eq!(extract(&stego).unwrap(), "");
    }

    #[test]
    fn multibyte_utf8_roundtrips() {
        let message = "naïve 秘密 🦀";
        let stego = embed(&cover(32, 32, 4), message).unwrap();
        assert_eq!(extract(&stego).unwrap(), message);
    }

    #[test]
    fn one_bit_short_is_rejected() {
        // 47 single-bit pixels against a 48-bit payload
        let cover = cover(47, 1, 1);
        assert_eq!(
            embed(&cover, "hi").unwrap_err(),
            Error::MessageTooLarge {
                required_bits: 48,
                available_bits: 47
            }
        );
    }

    #[test]
    fn exact_fit_on_gray_image() {
        let stego = embed(&cover(48, 1, 1), "hi").unwrap();
        assert_eq!(extract(&stego).unwrap(), "hi");
    }

    #[test]
    fn only_low_bits_of_color_channels_change() {
        let cover = cover(16, 16, 4);
        let stego = embed(&cover, "steganography").unwrap();

        for (i, (a, b)) in cover.samples().iter().zip(stego.samples()).enumerate() {
            if i % 4 == 3 {
                assert_eq!(a, b, "alpha sample {i} changed");
            } else {
                assert_eq!(a & 0xFE, b & 0xFE, "high bits of sample {i} changed");
            }
        }
        assert_eq!(stego.width(), cover.width());
        assert_eq!(stego.channels(), cover.channels());
    }

    #[test]
    fn samples_past_the_payload_are_untouched() {
        let cover = cover(16, 16, 3);
        let stego = embed(&cover, "x").unwrap();
        // 40 payload bits land in the first 40 samples
        assert_eq!(cover.samples()[40..], stego.samples()[40..]);
    }

    #[test]
    fn zero_sized_image() {
        let empty = CoverImage::new(0, 0, 4, vec![]).unwrap();
        assert!(matches!(
            embed(&empty, ""),
            Err(Error::MessageTooLarge { .. })
        ));
        assert!(matches!(extract(&empty), Err(Error::CorruptPayload { .. })));
    }

    #[test]
    fn oversized_length_prefix_is_corrupt() {
        let mut samples = vec![0u8; 64 * 3];
        // every low bit set: declared length 0xFFFF_FFFF
        samples.iter_mut().for_each(|s| *s |= 1);
        let stego = CoverImage::new(8, 8, 3, samples).unwrap();

        assert_eq!(
            extract(&stego).unwrap_err(),
            Error::CorruptPayload {
                declared_bytes: u32::MAX,
                available_bits: 192
            }
        );
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let cover = cover(8, 8, 3);
        let mut stego = embed(&cover, "ab").unwrap().into_samples();
        // payload byte 4 ('a') lives in samples 32..40; force it to 0xFF
        for s in &mut stego[32..40] {
            *s |= 1;
        }
        let stego = CoverImage::new(8, 8, 3, stego).unwrap();

        assert_eq!(extract(&stego).unwrap_err(), Error::InvalidEncoding);
    }

    #[test]
    fn embed_leaves_input_untouched() {
        let cover = cover(8, 8, 4);
        let before = cover.clone();
        let _ = embed(&cover, "hello").unwrap();
        let _ = embed(&cover, &"x".repeat(1000)).unwrap_err();
        assert_eq!(cover, before);
    }
}
