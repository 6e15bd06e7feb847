//! Directory-backed TOC cache for the radio driver.
//!
//! Fetching the log and param TOCs is the slow part of a connection. The
//! Crazyflie identifies each TOC by its CRC32, so TOCs are stored as
//! `<crc32>.json` files in the configured cache directory and reused on the
//! next connection to the same firmware.

use crazyflie_lib::TocCache;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct DirTocCache {
    dir: PathBuf,
}

impl DirTocCache {
    /// Use `dir` as cache directory, creating it if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, crc32: u32) -> PathBuf {
        self.dir.join(format!("{:08X}.json", crc32))
    }
}

impl TocCache for DirTocCache {
    fn get_toc(&self, crc32: u32) -> Option<String> {
        let path = self.entry_path(crc32);
        match fs::read_to_string(&path) {
            Ok(toc) => {
                debug!("TOC cache hit: {}", path.display());
                Some(toc)
            }
            Err(_) => None,
        }
    }

    fn store_toc(&self, crc32: u32, toc: &str) {
        let path = self.entry_path(crc32);
        if let Err(e) = fs::write(&path, toc) {
            warn!("Failed to write TOC cache {}: {}", path.display(), e);
        }
    }
}
