//! Container format v1.
//!
//! V1 Container Format:
//! ```text
//! MAGIC (4) | VERSION (1) | SALT_LEN (1) | SALT | NONCE_LEN (1) | NONCE | TAG_LEN (1) | TAG | CIPHERTEXT
//! ```
//!
//! Argon2id (see [`KdfParams::V1`](crate::KdfParams::V1)) and
//! XChaCha20-Poly1305 with a detached tag.

use super::{Cursor, EncryptedContainer, MAGIC, MAGIC_LEN, VER_LEN};
use crate::{
    crypto::{NONCE_LEN, SALT_LEN, TAG_LEN},
    error::{Error, Result},
};

/// Current file format version.
pub const VERSION_V1: u8 = 1;

const HEADER_LEN: usize = MAGIC_LEN + VER_LEN + 3 + SALT_LEN + NONCE_LEN + TAG_LEN;

fn expect_len(field: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::MalformedContainer(format!(
            "v1 {field} must be {expected} bytes, found {actual}"
        )));
    }
    Ok(())
}

/// Parses the body of a v1 container; the cursor sits just after the version byte.
pub(super) fn parse(cursor: &mut Cursor<'_>) -> Result<EncryptedContainer> {
    let salt = cursor.read_prefixed("salt")?;
    expect_len("salt", salt.len(), SALT_LEN)?;

    let nonce = cursor.read_prefixed("nonce")?;
    expect_len("nonce", nonce.len(), NONCE_LEN)?;

    let tag = cursor.read_prefixed("tag")?;
    expect_len("tag", tag.len(), TAG_LEN)?;

    let ciphertext = cursor.rest();

    Ok(EncryptedContainer {
        version: VERSION_V1,
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        tag: tag.to_vec(),
        ciphertext: ciphertext.to_vec(),
    })
}

/// Serializes a container to v1 format bytes.
///
/// # Errors
///
/// Returns an error if the version is not v1 or if salt/nonce/tag have invalid lengths.
pub(super) fn serialize(container: &EncryptedContainer) -> Result<Vec<u8>> {
    if container.version() != VERSION_V1 {
        return Err(Error::InvalidInput("wrong version for v1 serializer".into()));
    }

    for (field, actual, expected) in [
        ("salt", container.salt().len(), SALT_LEN),
        ("nonce", container.nonce().len(), NONCE_LEN),
        ("tag", container.tag().len(), TAG_LEN),
    ] {
        if actual != expected {
            return Err(Error::InvalidInput(format!(
                "invalid {field} length for v1: {actual}"
            )));
        }
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + container.ciphertext().len());

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION_V1);

    buf.push(SALT_LEN as u8);
    buf.extend_from_slice(container.salt());
    buf.push(NONCE_LEN as u8);
    buf.extend_from_slice(container.nonce());
    buf.push(TAG_LEN as u8);
    buf.extend_from_slice(container.tag());

    buf.extend_from_slice(container.ciphertext());

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;

    fn sample() -> EncryptedContainer {
        EncryptedContainer::new(vec![1u8; 16], vec![2u8; 24], vec![3u8; 16], vec![4u8; 10])
    }

    #[test]
    fn container_roundtrip() {
        let container = sample();

        let bytes = format::serialize(&container).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 10);
        let parsed = format::parse(&bytes).unwrap();

        assert_eq!(parsed, container);
        assert_eq!(parsed.version(), VERSION_V1);
    }

    #[test]
    fn layout_matches_documented_offsets() {
        let bytes = format::serialize(&sample()).unwrap();

        assert_eq!(&bytes[..4], b"PXLV");
        assert_eq!(bytes[4], VERSION_V1);
        assert_eq!(bytes[5], SALT_LEN as u8);
        assert_eq!(bytes[6..22], [1u8; 16]);
        assert_eq!(bytes[22], NONCE_LEN as u8);
        assert_eq!(bytes[23..47], [2u8; 24]);
        assert_eq!(bytes[47], TAG_LEN as u8);
        assert_eq!(bytes[48..64], [3u8; 16]);
        assert_eq!(bytes[64..], [4u8; 10]);
    }

    #[test]
    fn empty_ciphertext_is_allowed() {
        let container = EncryptedContainer::new(vec![1; 16], vec![2; 24], vec![3; 16], vec![]);
        let bytes = format::serialize(&container).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN);
        assert!(format::parse(&bytes).unwrap().ciphertext().is_empty());
    }

    #[test]
    fn every_truncation_of_the_header_fails() {
        let bytes = format::serialize(&sample()).unwrap();

        for len in 0..HEADER_LEN {
            assert!(
                matches!(
                    format::parse(&bytes[..len]),
                    Err(Error::MalformedContainer(_))
                ),
                "truncation to {len} bytes parsed"
            );
        }
    }

    #[test]
    fn declared_length_past_end_fails() {
        let mut bytes = format::serialize(&sample()).unwrap();
        bytes.truncate(10);
        bytes[5] = 200;

        assert!(matches!(
            format::parse(&bytes),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn unexpected_field_length_fails() {
        let mut bytes = format::serialize(&sample()).unwrap();
        // shrink the declared salt so every later field shifts
        bytes[5] = 15;

        assert!(matches!(
            format::parse(&bytes),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn serialize_rejects_wrong_lengths() {
        let container = EncryptedContainer::new(vec![1; 8], vec![2; 24], vec![3; 16], vec![]);
        assert!(matches!(
            format::serialize(&container),
            Err(Error::InvalidInput(_))
        ));
    }
}
