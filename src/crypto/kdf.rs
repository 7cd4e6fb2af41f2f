use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::{KEY_LEN, SALT_LEN};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    mem_cost_kib: u32,
    time_cost: u32,
    parallelism: u32,
}

impl KdfParams {
    /// Argon2id profile of container version 1. Never change it in place;
    /// add a new version instead so old files keep opening.
    pub const V1: Self = Self {
        mem_cost_kib: 19 * 1024, // 19 MiB
        time_cost: 2,
        parallelism: 1,
    };

    pub fn new(mem_cost_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self> {
        let params = Self {
            mem_cost_kib,
            time_cost,
            parallelism,
        };
        params.validate()?;
        Ok(params)
    }

    /// Work factor a container of the given format version was sealed with.
    pub fn for_version(version: u8) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mem_cost_kib < 8 {
            return Err(Error::InvalidInput("argon2 memory cost too low".into()));
        }
        if self.time_cost < 1 {
            return Err(Error::InvalidInput("argon2 time cost must be >= 1".into()));
        }
        if self.parallelism < 1 {
            return Err(Error::InvalidInput("argon2 parallelism must be >= 1".into()));
        }
        if self.mem_cost_kib < 8 * self.parallelism {
            return Err(Error::InvalidInput(
                "argon2 memory cost must be at least 8 * parallelism".into(),
            ));
        }
        Ok(())
    }
}

/// Derive the container key from a password and salt with Argon2id.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    kdf: KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if password.is_empty() {
        return Err(Error::InvalidInput("password must not be empty".into()));
    }
    if salt.len() != SALT_LEN {
        return Err(Error::InvalidInput(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    kdf.validate()?;

    let params = Params::new(
        kdf.mem_cost_kib,
        kdf.time_cost,
        kdf.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| Error::InvalidInput(format!("failed to construct Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut key[..])
        .map_err(|e| Error::InvalidInput(format!("argon2 key derivation failed: {e}")))?;

    Ok(key)
}
