//! Image output directory
//!
//! Every accepted image is stored as `{page_index}_{slot}.png`, with slots
//! numbered from 1 in acceptance order. The file names double as the crawl
//! progress marker: the highest page index present is where a restarted
//! crawl resumes.

use crate::harvest::AcceptedImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Files written for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageWrite {
    pub paths: Vec<PathBuf>,
    pub bytes_written: u64,
}

/// Extracts the page index from an output file name such as `12_3.png`
///
/// Returns None for names that do not start with `{digits}_`.
pub fn parse_page_index(file_name: &str) -> Option<usize> {
    let (prefix, _) = file_name.split_once('_')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// The directory accepted images are written to
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the output directory if needed
    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Path of the image stored in `slot` (1-based) for page `index`
    pub fn image_path(&self, index: usize, slot: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.png", index, slot))
    }

    /// Highest page index with at least one output file
    ///
    /// A missing directory means nothing was persisted yet.
    pub fn resume_marker(&self) -> io::Result<Option<usize>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut highest = None;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(index) = entry.file_name().to_str().and_then(parse_page_index) {
                highest = highest.max(Some(index));
            }
        }
        Ok(highest)
    }

    /// Removes every file of page `index`, returning how many were removed
    pub fn clear_page(&self, index: usize) -> io::Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_str().and_then(parse_page_index) == Some(index) && entry.file_type()?.is_file()
            {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Replaces page `index`'s files with `images`
    ///
    /// Stale files from an earlier run are removed first. If any write
    /// fails, the page's files are removed again so the page is left with
    /// no output.
    pub fn write_page(&self, index: usize, images: &[AcceptedImage]) -> io::Result<PageWrite> {
        self.ensure_dir()?;
        let stale = self.clear_page(index)?;
        if stale > 0 {
            tracing::debug!("Removed {} stale files for page {}", stale, index);
        }

        match self.write_images(index, images) {
            Ok(written) => Ok(written),
            Err(e) => {
                if let Err(cleanup) = self.clear_page(index) {
                    tracing::warn!("Cleanup after failed write of page {} failed: {}", index, cleanup);
                }
                Err(e)
            }
        }
    }

    fn write_images(&self, index: usize, images: &[AcceptedImage]) -> io::Result<PageWrite> {
        let mut written = PageWrite::default();
        for (slot, image) in images.iter().enumerate() {
            let path = self.image_path(index, slot + 1);
            fs::write(&path, &image.bytes)?;
            tracing::info!(
                "  Saved: {} ({}x{}, {:.1}KB)",
                path.display(),
                image.width,
                image.height,
                image.bytes.len() as f64 / 1024.0
            );
            written.bytes_written += image.bytes.len() as u64;
            written.paths.push(path);
        }
        Ok(written)
    }
}
