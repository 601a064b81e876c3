//! Locally addressable copies of fetched overlay bytes.
//!
//! A handle is owned by exactly one holder and must be given back to its
//! store; `release` consumes it.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use bytes::Bytes;
use plotmap_logging::{plot_debug, plot_warn};
use tempfile::TempDir;

use crate::OverlayFormat;

pub type BitmapId = u64;

#[derive(Debug, PartialEq, Eq)]
pub struct BitmapHandle {
    id: BitmapId,
    locator: String,
}

impl BitmapHandle {
    pub fn id(&self) -> BitmapId {
        self.id
    }

    /// Address the map uses to load the image.
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BitmapError {
    #[error("overlay resource is empty")]
    Empty,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait BitmapStore {
    fn allocate(&mut self, bytes: &[u8], format: &OverlayFormat) -> Result<BitmapHandle, BitmapError>;
    fn release(&mut self, handle: BitmapHandle);
    /// Handles allocated and not yet released.
    fn live_count(&self) -> usize;
}

/// Writes each bitmap to a private temp directory and hands out `file://` locators.
#[derive(Debug)]
pub struct TempDirBitmapStore {
    dir: TempDir,
    next_id: BitmapId,
    live: HashMap<BitmapId, PathBuf>,
}

impl TempDirBitmapStore {
    pub fn new() -> Result<Self, BitmapError> {
        let dir = tempfile::Builder::new().prefix("plotmap-overlays").tempdir()?;
        Ok(Self {
            dir,
            next_id: 0,
            live: HashMap::new(),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl BitmapStore for TempDirBitmapStore {
    fn allocate(&mut self, bytes: &[u8], format: &OverlayFormat) -> Result<BitmapHandle, BitmapError> {
        if bytes.is_empty() {
            return Err(BitmapError::Empty);
        }
        self.next_id += 1;
        let id = self.next_id;
        let path = self
            .dir
            .path()
            .join(format!("overlay-{id}.{}", format.extension));
        fs::write(&path, bytes)?;
        let locator = url::Url::from_file_path(&path)
            .map(String::from)
            .unwrap_or_else(|()| path.display().to_string());
        plot_debug!("bitmap {} allocated at {}", id, locator);
        self.live.insert(id, path);
        Ok(BitmapHandle { id, locator })
    }

    fn release(&mut self, handle: BitmapHandle) {
        let Some(path) = self.live.remove(&handle.id) else {
            plot_warn!("bitmap {} released twice or never allocated here", handle.id);
            return;
        };
        if let Err(err) = fs::remove_file(&path) {
            plot_warn!("failed to remove bitmap {:?}: {}", path, err);
        }
        plot_debug!("bitmap {} released", handle.id);
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Keeps bitmaps in memory and counts allocations and releases.
#[derive(Debug, Default)]
pub struct MemoryBitmapStore {
    next_id: BitmapId,
    live: HashMap<BitmapId, Bytes>,
    allocated: usize,
    released: usize,
}

impl MemoryBitmapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn released(&self) -> usize {
        self.released
    }

    pub fn contents(&self, id: BitmapId) -> Option<&Bytes> {
        self.live.get(&id)
    }
}

impl BitmapStore for MemoryBitmapStore {
    fn allocate(&mut self, bytes: &[u8], format: &OverlayFormat) -> Result<BitmapHandle, BitmapError> {
        if bytes.is_empty() {
            return Err(BitmapError::Empty);
        }
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id, Bytes::copy_from_slice(bytes));
        self.allocated += 1;
        Ok(BitmapHandle {
            id,
            locator: format!("memory://bitmap/{id}.{}", format.extension),
        })
    }

    fn release(&mut self, handle: BitmapHandle) {
        if self.live.remove(&handle.id).is_some() {
            self.released += 1;
        }
    }

    fn live_count(&self) -> usize {
        self.live.len()
    }
}
