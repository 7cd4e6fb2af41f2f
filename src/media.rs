//! Helpers around image files at the edge of the engine: type sniffing,
//! data URIs, accepted extensions and output file names.

use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::crypto::aead::secure_random;
use crate::error::Result;
use crate::format;

/// Largest image accepted for encryption.
pub const MAX_IMAGE_SIZE: usize = 50 * 1024 * 1024;
/// Largest message accepted for embedding, in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;
/// Extensions accepted for encryption.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageKind {
    /// Detects the image type from its leading signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub fn subtype(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }
}

/// `data:image/<type>;base64,...`, falling back to png for unknown data.
pub fn data_uri(bytes: &[u8]) -> String {
    let kind = ImageKind::sniff(bytes).unwrap_or(ImageKind::Png);
    format!("data:image/{};base64,{}", kind.subtype(), STANDARD.encode(bytes))
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| wanted.iter().any(|w| e.eq_ignore_ascii_case(w)))
}

pub fn is_allowed_image(path: &Path) -> bool {
    has_extension(path, &ALLOWED_EXTENSIONS)
}

pub fn is_container(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(format::EXTENSION)
}

pub fn is_png(path: &Path) -> bool {
    has_extension(path, &["png"])
}

fn random_suffix() -> Result<String> {
    let mut buf = [0u8; 4];
    secure_random(&mut buf)?;
    Ok(buf.iter().map(|b| format!("{:02x}", b)).collect())
}

fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// `<dir>/<stem>_<8 hex>.enc`
pub fn container_name(input: &Path, dir: &Path) -> Result<PathBuf> {
    let name = format!("{}_{}.{}", stem(input), random_suffix()?, format::EXTENSION);
    Ok(dir.join(name))
}

/// `<dir>/<stem>_stego_<8 hex>.png`
pub fn stego_name(input: &Path, dir: &Path) -> Result<PathBuf> {
    let name = format!("{}_stego_{}.png", stem(input), random_suffix()?);
    Ok(dir.join(name))
}

/// `<dir>/<stem>_<8 hex>.<ext>`, with the extension sniffed from `image`.
pub fn decrypted_name(input: &Path, dir: &Path, image: &[u8]) -> Result<PathBuf> {
    let ext = ImageKind::sniff(image).map_or("bin", |k| k.subtype());
    let name = format!("{}_{}.{}", stem(input), random_suffix()?, ext);
    Ok(dir.join(name))
}
