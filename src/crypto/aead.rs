use super::{KEY_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{Error, Result};
use chacha20poly1305::{
    Key, Tag, XChaCha20Poly1305, XNonce,
    aead::{AeadInPlace, KeyInit},
};
use getrandom::fill;
use zeroize::Zeroizing;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| Error::Random)
}

/// Generate salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate nonce
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}

fn cipher(key: &[u8], nonce: &[u8]) -> Result<XChaCha20Poly1305> {
    if key.len() != KEY_LEN {
        return Err(Error::InvalidInput(format!(
            "key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    if nonce.len() != NONCE_LEN {
        return Err(Error::InvalidInput(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }
    Ok(XChaCha20Poly1305::new(Key::from_slice(key)))
}

/// Encrypt plaintext, returning ciphertext and the detached tag
pub fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = cipher(key, nonce)?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(XNonce::from_slice(nonce), b"", &mut buffer)
        .map_err(|_| Error::InvalidInput("plaintext too long".into()))?;

    let mut detached = [0u8; TAG_LEN];
    detached.copy_from_slice(&tag);

    Ok((buffer, detached))
}

/// Decrypt ciphertext after verifying its tag
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = cipher(key, nonce)?;
    if tag.len() != TAG_LEN {
        return Err(Error::InvalidInput(format!(
            "tag must be {TAG_LEN} bytes, got {}",
            tag.len()
        )));
    }

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            XNonce::from_slice(nonce),
            b"",
            buffer.as_mut_slice(),
            Tag::from_slice(tag),
        )
        .map_err(|_| Error::AuthenticationFailure)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [9u8; KEY_LEN];
    const NONCE: [u8; NONCE_LEN] = [3u8; NONCE_LEN];

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let (ciphertext, tag) = encrypt(&KEY, &NONCE, b"image bytes").unwrap();
        assert_ne!(ciphertext.as_slice(), b"image bytes");
        assert_eq!(ciphertext.len(), b"image bytes".len());

        let plaintext = decrypt(&KEY, &NONCE, &ciphertext, &tag).unwrap();
        assert_eq!(plaintext.as_slice(), b"image bytes");
    }

    #[test]
    fn empty_plaintext_still_has_tag() {
        let (ciphertext, tag) = encrypt(&KEY, &NONCE, b"").unwrap();
        assert!(ciphertext.is_empty());
        assert!(decrypt(&KEY, &NONCE, &ciphertext, &tag).unwrap().is_empty());
    }

    #[test]
    fn single_bit_flips_are_detected() {
        let (ciphertext, tag) = encrypt(&KEY, &NONCE, b"0123456789").unwrap();

        for i in 0..ciphertext.len() * 8 {
            let mut ct = ciphertext.clone();
            ct[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(&KEY, &NONCE, &ct, &tag).unwrap_err(),
                Error::AuthenticationFailure
            );
        }

        for i in 0..TAG_LEN * 8 {
            let mut t = tag;
            t[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(&KEY, &NONCE, &ciphertext, &t).unwrap_err(),
                Error::AuthenticationFailure
            );
        }

        for i in 0..NONCE_LEN * 8 {
            let mut nonce = NONCE;
            nonce[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(&KEY, &nonce, &ciphertext, &tag).unwrap_err(),
                Error::AuthenticationFailure
            );
        }
    }

    #[test]
    fn wrong_key_fails() {
        let (ciphertext, tag) = encrypt(&KEY, &NONCE, b"secret").unwrap();
        let other = [8u8; KEY_LEN];
        assert_eq!(
            decrypt(&other, &NONCE, &ciphertext, &tag).unwrap_err(),
            Error::AuthenticationFailure
        );
    }

    #[test]
    fn bad_lengths_are_invalid_input() {
        assert!(matches!(
            encrypt(&KEY[..16], &NONCE, b"x"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            encrypt(&KEY, &NONCE[..12], b"x"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            decrypt(&KEY, &NONCE, b"x", &[0u8; 8]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn random_material_differs() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
        assert_ne!(generate_nonce().unwrap(), generate_nonce().unwrap());
    }
}
