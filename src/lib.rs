//! Password-based image encryption and PNG LSB steganography.
//!
//! Encryption turns arbitrary image bytes into a self-describing `.enc`
//! container (Argon2id + XChaCha20-Poly1305). Steganography hides a short
//! UTF-8 message in the low bits of a PNG's color samples.
//!
//! Every operation is a pure transform over in-memory buffers and holds no
//! shared state, so calls can run concurrently from any number of threads.

pub mod crypto;
pub mod error;
pub mod format;
pub mod media;
pub mod storage;
pub mod stego;

pub use crate::crypto::KdfParams;
pub use crate::error::{Error, Result};
pub use crate::format::{ContainerInfo, EncryptedContainer, hex_preview, hex_rows};
pub use crate::stego::{Capacity, CoverImage};

use crate::crypto::{MIN_PASSWORD_CHARS, NONCE_LEN, SALT_LEN};
use log::{debug, warn};
use zeroize::Zeroizing;

fn check_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(Error::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

/// Encrypts image bytes under `password` with fresh random salt and nonce.
pub fn encrypt(password: &str, image: &[u8]) -> Result<Vec<u8>> {
    let salt = crypto::generate_salt()?;
    let nonce = crypto::generate_nonce()?;
    encrypt_with(password, image, &salt, &nonce)
}

/// Encrypts with caller-supplied salt and nonce.
///
/// Both must be fresh random values for every call; reusing them with the
/// same password reuses the keystream.
pub fn encrypt_with(
    password: &str,
    image: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    check_new_password(password)?;

    let kdf = KdfParams::for_version(format::CURRENT_VERSION)
        .ok_or_else(|| Error::InvalidInput("no KDF profile for current version".into()))?;
    let key = crypto::derive_key(password.as_bytes(), salt, kdf)?;
    let (ciphertext, tag) = crypto::encrypt(key.as_slice(), nonce, image)?;
    drop(key);

    let container =
        EncryptedContainer::new(salt.to_vec(), nonce.to_vec(), tag.to_vec(), ciphertext);
    let bytes = format::serialize(&container)?;

    debug!(
        "sealed {} image bytes into v{} container of {} bytes",
        image.len(),
        container.version(),
        bytes.len()
    );
    Ok(bytes)
}

/// Recovers the image bytes sealed by [`encrypt`].
///
/// A wrong password and a tampered file both yield
/// [`Error::AuthenticationFailure`].
pub fn decrypt(password: &str, container: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if password.is_empty() {
        return Err(Error::InvalidInput("password must not be empty".into()));
    }

    let parsed = format::parse(container)?;
    let kdf = KdfParams::for_version(parsed.version()).ok_or_else(|| {
        Error::MalformedContainer(format!("unsupported version: {}", parsed.version()))
    })?;

    let key = crypto::derive_key(password.as_bytes(), parsed.salt(), kdf)?;
    let plaintext = crypto::decrypt(
        key.as_slice(),
        parsed.nonce(),
        parsed.ciphertext(),
        parsed.tag(),
    );
    drop(key);

    match plaintext {
        Ok(plaintext) => {
            debug!(
                "opened v{} container, {} bytes",
                parsed.version(),
                plaintext.len()
            );
            Ok(plaintext)
        }
        Err(e) => {
            warn!("container rejected: {e}");
            Err(e)
        }
    }
}

/// Layout of a container without touching any key material.
pub fn inspect(container: &[u8]) -> Result<ContainerInfo> {
    Ok(format::parse(container)?.info())
}

/// Hides `message` in a PNG and returns the new PNG.
pub fn embed(png: &[u8], message: &str) -> Result<Vec<u8>> {
    let cover = stego::png::decode(png)?;
    let stego = stego::embed(&cover, message)?;
    stego::png::encode(&stego)
}

/// Reads the message hidden in a PNG by [`embed`].
pub fn extract(png: &[u8]) -> Result<String> {
    let stego = stego::png::decode(png)?;
    stego::extract(&stego).inspect_err(|e| warn!("extraction failed: {e}"))
}

/// How much text a PNG can carry.
pub fn capacity(png: &[u8]) -> Result<Capacity> {
    Ok(stego::png::decode(png)?.capacity())
}
