//! File transfer: copy the captured file into place, then remove it
//!
//! Both file handles live inside [`copy_file`] and are closed on every return
//! path. The source is only removed once the copy has fully succeeded.

use crate::error::{HandoffError, Result};
use std::fs::Metadata;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{self, AsyncWriteExt};
use tracing::{debug, info};

/// Copy the bytes of `src` into `dst`, creating or truncating `dst`
///
/// `src` must be a regular file other than `dst`. The source is opened and
/// checked before the destination is touched, so a bad source leaves `dst` as
/// it was.
pub async fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    let copy_err = |source: std::io::Error| HandoffError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    let mut source = File::open(src).await.map_err(copy_err)?;
    let metadata = source.metadata().await.map_err(copy_err)?;
    if !metadata.is_file() {
        return Err(copy_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "source is not a regular file",
        )));
    }
    // Creating dst would truncate src
    if same_file(src, &metadata, dst).await {
        return Err(copy_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "source and destination are the same file",
        )));
    }

    let mut destination = File::create(dst).await.map_err(copy_err)?;
    let bytes = io::copy(&mut source, &mut destination)
        .await
        .map_err(copy_err)?;
    destination.flush().await.map_err(copy_err)?;

    debug!("Copied {} bytes from {} to {}", bytes, src.display(), dst.display());
    Ok(bytes)
}

/// Whether `dst` already names the file `src` was opened from
#[cfg(unix)]
async fn same_file(_src: &Path, src_meta: &Metadata, dst: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match fs::metadata(dst).await {
        Ok(dst_meta) => src_meta.dev() == dst_meta.dev() && src_meta.ino() == dst_meta.ino(),
        Err(_) => false,
    }
}

#[cfg(not(unix))]
async fn same_file(src: &Path, _src_meta: &Metadata, dst: &Path) -> bool {
    match (fs::canonicalize(src).await, fs::canonicalize(dst).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `src` to `dst`, then delete `src`
///
/// A copy failure returns before any deletion is attempted.
pub async fn hand_off(src: &Path, dst: &Path) -> Result<u64> {
    let bytes = copy_file(src, dst).await?;

    fs::remove_file(src)
        .await
        .map_err(|source| HandoffError::Remove {
            path: src.to_path_buf(),
            source,
        })?;

    info!("Handed off {} ({} bytes) to {}", src.display(), bytes, dst.display());
    Ok(bytes)
}
