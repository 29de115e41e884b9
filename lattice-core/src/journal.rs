//! The cleanup journal.
//!
//! An append-only list of `<hostname> <data_directory>` lines written under
//! the hub log directory. Every segment whose creation will be attempted is
//! journaled before the RPC goes out; the file is removed only when the
//! whole initialization succeeds. Its presence therefore always means an
//! incomplete run whose disk state can be rolled back.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::constants::CLEANUP_FILE_NAME;

/// One journaled segment location.
#[derive(Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub hostname: String,
    pub data_directory: String,
}

impl JournalEntry {
    pub fn new(hostname: &str, data_directory: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            data_directory: data_directory.to_string(),
        }
    }
}

/// The on-disk cleanup journal of one cluster initialization.
pub struct CleanupJournal {
    path: PathBuf,
}

impl CleanupJournal {
    /// The journal location under the given hub log directory.
    pub fn in_log_dir(log_dir: &str) -> Self {
        Self {
            path: Path::new(log_dir).join(CLEANUP_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append the given entries, creating the journal as needed.
    pub fn append(&self, entries: &[JournalEntry]) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("error opening cleanup journal {}", self.path.display()))?;
        for entry in entries {
            writeln!(file, "{} {}", entry.hostname, entry.data_directory).with_context(|| format!("error appending to cleanup journal {}", self.path.display()))?;
        }
        Ok(())
    }

    /// Read all journaled entries in append order.
    pub fn read(&self) -> Result<Vec<JournalEntry>> {
        let contents = std::fs::read_to_string(&self.path).with_context(|| format!("error reading cleanup journal {}", self.path.display()))?;
        let mut entries = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(' ') {
                Some((hostname, data_directory)) => entries.push(JournalEntry::new(hostname, data_directory.trim())),
                None => anyhow::bail!("malformed cleanup journal line {:?} in {}", line, self.path.display()),
            }
        }
        Ok(entries)
    }

    /// Remove the journal; removing an absent journal is a success.
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("error removing cleanup journal {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_read_remove_round_trip() {
        let tmpdir = tempfile::tempdir().expect("error creating tempdir");
        let journal = CleanupJournal::in_log_dir(&tmpdir.path().display().to_string());
        assert!(!journal.exists());

        journal.append(&[JournalEntry::new("cdw", "/data/coordinator")]).expect("error appending");
        journal
            .append(&[JournalEntry::new("sdw1", "/data/pri0/gpseg-0"), JournalEntry::new("sdw2", "/data/pri0/gpseg-1")])
            .expect("error appending");
        assert!(journal.exists());

        let entries = journal.read().expect("error reading journal");
        assert_eq!(
            entries,
            vec![
                JournalEntry::new("cdw", "/data/coordinator"),
                JournalEntry::new("sdw1", "/data/pri0/gpseg-0"),
                JournalEntry::new("sdw2", "/data/pri0/gpseg-1"),
            ]
        );

        journal.remove().expect("error removing journal");
        assert!(!journal.exists());
        journal.remove().expect("removing an absent journal must succeed");
    }

    #[test]
    fn test_entries_survive_paths_with_spaces_in_hostname_position_only() {
        let tmpdir = tempfile::tempdir().expect("error creating tempdir");
        let journal = CleanupJournal::in_log_dir(&tmpdir.path().display().to_string());
        journal.append(&[JournalEntry::new("sdw1", "/data/with space/gpseg-0")]).expect("error appending");

        let entries = journal.read().expect("error reading journal");
        assert_eq!(entries[0].data_directory, "/data/with space/gpseg-0");
    }
}
