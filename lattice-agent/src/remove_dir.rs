//! Data directory removal for cluster cleanup.

use anyhow::{Context, Result};

/// Remove a data directory and everything under it.
///
/// Removal is idempotent: a directory that is already gone is a success.
pub async fn remove_directory(data_directory: &str) -> Result<()> {
    match tokio::fs::remove_dir_all(data_directory).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("error removing {}", data_directory)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_directory_is_idempotent() {
        let tmpdir = tempfile::tempdir().expect("error creating tempdir");
        let target = tmpdir.path().join("gpseg-0");
        std::fs::create_dir_all(target.join("base")).expect("error creating dirs");
        std::fs::write(target.join("PG_VERSION"), "13\n").expect("error writing file");

        let target_str = target.display().to_string();
        remove_directory(&target_str).await.expect("error removing directory");
        assert!(!target.exists());
        remove_directory(&target_str).await.expect("second removal must succeed");
    }
}
