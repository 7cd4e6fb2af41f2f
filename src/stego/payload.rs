//! Length-prefixed message framing.

use crate::error::{Error, Result};

/// Size of the big-endian byte-count prefix.
pub const LEN_PREFIX_BYTES: usize = 4;
pub const LEN_PREFIX_BITS: u64 = LEN_PREFIX_BYTES as u64 * 8;

/// Bits needed to carry a message of `message_bytes` bytes, prefix included.
pub fn required_bits(message_bytes: u64) -> u64 {
    (LEN_PREFIX_BYTES as u64 + message_bytes) * 8
}

/// Largest message, in bytes, that fits into `capacity_bits`.
pub fn max_message_bytes(capacity_bits: u64) -> u64 {
    (capacity_bits / 8).saturating_sub(LEN_PREFIX_BYTES as u64)
}

/// `len (u32 BE) ++ utf8 bytes`.
pub fn encode(message: &str) -> Result<Vec<u8>> {
    let len = u32::try_from(message.len()).map_err(|_| Error::MessageTooLarge {
        required_bits: required_bits(message.len() as u64),
        available_bits: required_bits(u32::MAX as u64),
    })?;

    let mut payload = Vec::with_capacity(LEN_PREFIX_BYTES + message.len());
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(message.as_bytes());
    Ok(payload)
}

/// Reads the byte count back out of a 4-byte prefix.
pub fn decode_len(prefix: &[u8]) -> Option<u32> {
    let bytes: [u8; LEN_PREFIX_BYTES] = prefix.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_big_endian_byte_count() {
        let payload = encode("hé").unwrap();
        assert_eq!(payload, [0, 0, 0, 3, b'h', 0xC3, 0xA9]);
        assert_eq!(decode_len(&payload[..4]), Some(3));
    }

    #[test]
    fn empty_message_is_just_the_prefix() {
        assert_eq!(encode("").unwrap(), [0, 0, 0, 0]);
        assert_eq!(required_bits(0), 32);
    }

    #[test]
    fn capacity_math() {
        assert_eq!(required_bits(2), 48);
        assert_eq!(max_message_bytes(48), 2);
        assert_eq!(max_message_bytes(55), 2);
        assert_eq!(max_message_bytes(31), 0);
        assert_eq!(max_message_bytes(0), 0);
    }

    #[test]
    fn decode_len_needs_four_bytes() {
        assert_eq!(decode_len(&[0, 1]), None);
        assert_eq!(decode_len(&[0, 0, 1, 0]), Some(256));
    }
}
