//! The `.enc` container format.
//!
//! Provides version-aware parsing and serialization of encrypted image
//! containers, plus a hex preview for diagnostics.

use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};

mod cursor;
pub mod v1;

pub(crate) use cursor::Cursor;

/// Magic bytes identifying a pixelvault container ("PXLV").
pub const MAGIC: &[u8; MAGIC_LEN] = b"PXLV";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 4;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;
/// File extension of serialized containers.
pub const EXTENSION: &str = "enc";
/// Default number of bytes shown by [`hex_preview`].
pub const DEFAULT_PREVIEW_LEN: usize = 512;

/// A parsed or freshly sealed container.
///
/// Only `MAGIC` and `version` are stable across versions; the remaining
/// fields are whatever the version's cipher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedContainer {
    version: u8,
    salt: Vec<u8>,
    nonce: Vec<u8>,
    tag: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl EncryptedContainer {
    /// Creates a container of the current version.
    pub fn new(salt: Vec<u8>, nonce: Vec<u8>, tag: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            version: CURRENT_VERSION,
            salt,
            nonce,
            tag,
            ciphertext,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Size of the serialized form in bytes.
    pub fn encoded_len(&self) -> usize {
        MAGIC_LEN
            + VER_LEN
            + 3
            + self.salt.len()
            + self.nonce.len()
            + self.tag.len()
            + self.ciphertext.len()
    }

    pub fn info(&self) -> ContainerInfo {
        ContainerInfo {
            version: self.version,
            salt_len: self.salt.len(),
            nonce_len: self.nonce.len(),
            tag_len: self.tag.len(),
            ciphertext_len: self.ciphertext.len(),
            total_len: self.encoded_len(),
        }
    }
}

/// Non-secret layout facts about a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub version: u8,
    pub salt_len: usize,
    pub nonce_len: usize,
    pub tag_len: usize,
    pub ciphertext_len: usize,
    pub total_len: usize,
}

impl std::fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Version:    {}", self.version)?;
        writeln!(f, "Salt:       {} bytes", self.salt_len)?;
        writeln!(f, "Nonce:      {} bytes", self.nonce_len)?;
        writeln!(f, "Tag:        {} bytes", self.tag_len)?;
        writeln!(f, "Ciphertext: {} bytes", self.ciphertext_len)?;
        write!(f, "Total:      {} bytes", self.total_len)
    }
}

/// Parses container bytes.
///
/// Automatically dispatches to the appropriate version parser.
///
/// # Errors
///
/// Returns [`Error::MalformedContainer`] if:
/// - The data is too short
/// - The magic bytes are invalid
/// - The version is unsupported
/// - A declared field length runs past the end of the data
pub fn parse(data: &[u8]) -> Result<EncryptedContainer> {
    let mut cursor = Cursor::new(data);

    if cursor.read_exact(MAGIC_LEN, "magic")? != MAGIC {
        return Err(Error::MalformedContainer("invalid magic".into()));
    }

    match cursor.read_u8("version")? {
        v1::VERSION_V1 => v1::parse(&mut cursor),
        other => Err(Error::MalformedContainer(format!(
            "unsupported version: {other}"
        ))),
    }
}

/// Serializes a container to bytes.
///
/// # Errors
///
/// Returns an error if the version is unsupported or a field does not fit
/// its length prefix.
pub fn serialize(container: &EncryptedContainer) -> Result<Vec<u8>> {
    match container.version() {
        v1::VERSION_V1 => v1::serialize(container),
        other => Err(Error::InvalidInput(format!(
            "cannot serialize unsupported version {other}"
        ))),
    }
}

/// Uppercase hex of the first `max_len` bytes.
pub fn hex_preview(data: &[u8], max_len: usize) -> String {
    let shown = &data[..data.len().min(max_len)];
    let mut out = String::with_capacity(shown.len() * 2);
    for b in shown {
        // writing to a String cannot fail
        let _ = write!(out, "{b:02X}");
    }
    out
}

/// [`hex_preview`] split into rows of `row_bytes` bytes each.
pub fn hex_rows(data: &[u8], max_len: usize, row_bytes: usize) -> Vec<String> {
    let preview = hex_preview(data, max_len);
    let row_chars = row_bytes.max(1) * 2;
    preview
        .as_bytes()
        .chunks(row_chars)
        .map(|row| String::from_utf8_lossy(row).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_preview_is_uppercase_and_truncated() {
        let data = [0x00, 0xAB, 0x7F, 0xFF];
        assert_eq!(hex_preview(&data, 3), "00AB7F");
        assert_eq!(hex_preview(&data, 100), "00AB7FFF");
        assert_eq!(hex_preview(&data, 0), "");
        assert_eq!(hex_preview(&[], 16), "");
    }

    #[test]
    fn hex_rows_split_evenly() {
        let data: Vec<u8> = (0u8..40).collect();
        let rows = hex_rows(&data, 512, 16);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 32);
        assert_eq!(rows[2].len(), 16);
        assert!(rows[0].starts_with("000102"));
    }

    #[test]
    fn parse_rejects_bad_magic() {
        let mut data = vec![0u8; 64];
        data[..4].copy_from_slice(b"FAIL");
        data[4] = CURRENT_VERSION;

        assert!(matches!(parse(&data), Err(Error::MalformedContainer(_))));
    }

    #[test]
    fn parse_rejects_unknown_version() {
        let mut data = vec![0u8; 64];
        data[..4].copy_from_slice(MAGIC);
        data[4] = 99;

        let err = parse(&data).unwrap_err();
        assert!(matches!(err, Error::MalformedContainer(ref m) if m.contains("99")));
    }

    #[test]
    fn parse_rejects_truncated_header() {
        assert!(matches!(parse(b"PX"), Err(Error::MalformedContainer(_))));
        assert!(matches!(parse(MAGIC), Err(Error::MalformedContainer(_))));
        assert!(matches!(parse(&[]), Err(Error::MalformedContainer(_))));
    }

    #[test]
    fn info_reports_layout() {
        let container = EncryptedContainer::new(vec![1; 16], vec![2; 24], vec![3; 16], vec![4; 10]);
        let info = container.info();

        assert_eq!(info.version, CURRENT_VERSION);
        assert_eq!(info.ciphertext_len, 10);
        assert_eq!(info.total_len, serialize(&container).unwrap().len());
    }
}
