// Common test utilities for WAL integration tests

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that creates a temporary directory with a log path in it
pub struct WalTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub wal_path: PathBuf,
}

impl WalTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let wal_path = temp_dir.path().join(loglite_wal::WAL_FILE);

        Self { temp_dir, wal_path }
    }

    pub fn wal_path(&self) -> &PathBuf {
        &self.wal_path
    }

    #[allow(dead_code)]
    pub fn log_size(&self) -> u64 {
        fs::metadata(&self.wal_path).map(|m| m.len()).unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn frame_count(&self) -> usize {
        fs::read(&self.wal_path)
            .map(|bytes| bytes.iter().filter(|&&b| b == b'\n').count())
            .unwrap_or(0)
    }
}

impl Default for WalTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
