//! Reading inputs and writing results to the filesystem.

use anyhow::{Context, Result, bail};
use getrandom::fill;
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Reads a whole input file, refusing anything larger than `max_len` bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is too large.
pub fn read_input(path: &Path, max_len: usize) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut data = Vec::new();
    file.take(max_len as u64 + 1)
        .read_to_end(&mut data)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if data.len() > max_len {
        bail!(
            "file too large: {} exceeds {} MB",
            path.display(),
            max_len / (1024 * 1024)
        );
    }

    debug!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Writes `data` to `path` using atomic write.
///
/// This method ensures crash-safety by:
/// 1. Writing data to a temporary file with random name
/// 2. Syncing the temporary file to disk
/// 3. Atomically replacing any existing file with the new one
/// 4. Syncing the parent directory to ensure the rename is persisted
///
/// Readers therefore see either the previous file or the complete output,
/// never a partial container or image.
///
/// Creates parent directories if they don't exist.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp_path = random_tmp_path(path)?;

    // securely create temp file (fail if exists)
    let mut tmp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .context("failed to create temporary file")?;

    tmp_file.write_all(data)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    if let Err(e) = atomic_replace(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let dir = File::open(parent)?;
        dir.sync_all()?;
    }

    debug!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Sibling of `path` named `<file>.tmp.<randomhex>`.
fn random_tmp_path(path: &Path) -> Result<PathBuf> {
    let mut buf = [0u8; 8]; // 64 bit entropy
    fill(&mut buf).map_err(|_| anyhow::anyhow!("OS random generator unavailable"))?;

    let rand_string = buf.iter().map(|b| format!("{:02x}", b)).collect::<String>();

    let file_name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?
        .to_string_lossy();

    Ok(path.with_file_name(format!("{}.tmp.{}", file_name, rand_string)))
}

/// Uses Windows `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH` when the
/// target exists, `rename` otherwise.
#[cfg(target_os = "windows")]
fn atomic_replace(tmp_path: &Path, target: &Path) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

    if !target.exists() {
        fs::rename(tmp_path, target)?;
        return Ok(());
    }

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let target_w = to_wide(target.as_os_str());
    let tmp_w = to_wide(tmp_path.as_os_str());

    // SAFETY:
    // - Strings are valid UTF-16 and null-terminated
    // - Pointers remain valid during the call
    // - Windows does not retain the pointers after return
    let result = unsafe {
        ReplaceFileW(
            target_w.as_ptr(),
            tmp_w.as_ptr(),
            std::ptr::null(),
            REPLACEFILE_WRITE_THROUGH,
            std::ptr::null(),
            std::ptr::null(),
        )
    };

    if result == 0 {
        let err = std::io::Error::last_os_error();
        return Err(err).context("atomic replace failed");
    }

    Ok(())
}

/// On Unix, `rename()` is atomic when both paths are on the same filesystem.
#[cfg(not(target_os = "windows"))]
fn atomic_replace(tmp_path: &Path, target: &Path) -> Result<()> {
    fs::rename(tmp_path, target)?;
    Ok(())
}
