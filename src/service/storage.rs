//! Snapshot persistence.
//!
//! ## Snapshot
//!
//! A [`Snapshot`] is the full list of menu items and orders. The service
//! layer writes a complete snapshot after every mutation; there is no
//! incremental log.
//!
//! ## On-disk Layout
//!
//! [`JsonFileStorage`] writes pretty-printed JSON:
//!
//! ```text
//! {
//!   "items":    [ MenuItem, ... ],
//!   "orders":   [ Order, ... ],
//!   "checksum": "<hex SHA-256 of the compact JSON of {items, orders}>"
//! }
//! ```
//!
//! A missing file loads as an empty snapshot. A file without a checksum
//! (hand-written seed data) is accepted as is.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{MenuItem, Order};

// ============================================================================
// Snapshot
// ============================================================================

/// Every persisted record, menu items and orders each in ascending key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub items: Vec<MenuItem>,

    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Snapshot {
    pub fn new(items: Vec<MenuItem>, orders: Vec<Order>) -> Self {
        Self { items, orders }
    }

    /// Check if the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.orders.is_empty()
    }

    /// SHA-256 of the compact JSON encoding, hex encoded
    pub fn checksum(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

// ============================================================================
// Storage trait
// ============================================================================

/// Where snapshots are loaded from and saved to
pub trait Storage {
    /// Load the last saved snapshot (empty if nothing was saved yet)
    fn load(&self) -> Result<Snapshot>;

    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}

// ============================================================================
// JSON file storage
// ============================================================================

#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    items: &'a [MenuItem],
    orders: &'a [Order],
    checksum: String,
}

#[derive(Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    items: Vec<MenuItem>,
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    checksum: Option<String>,
}

/// Snapshot stored as a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Snapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot file, starting empty");
                return Ok(Snapshot::default());
            }
            Err(err) => return Err(err.into()),
        };

        let file: SnapshotFile = serde_json::from_slice(&bytes)?;
        let snapshot = Snapshot::new(file.items, file.orders);

        if let Some(expected) = file.checksum {
            let actual = snapshot.checksum()?;
            if expected != actual {
                return Err(Error::ChecksumMismatch { expected, actual });
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            orders = snapshot.orders.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let checksum = snapshot.checksum()?;
        let file = SnapshotFileRef {
            items: &snapshot.items,
            orders: &snapshot.orders,
            checksum,
        };
        let bytes = serde_json::to_vec_pretty(&file)?;
        fs::write(&self.path, &bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            checksum = %file.checksum,
            "snapshot saved"
        );
        Ok(())
    }
}

// ============================================================================
// In-memory storage
// ============================================================================

/// Keeps the last snapshot in memory and counts saves
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    snapshot: Snapshot,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot, saves: 0 }
    }

    /// Last saved snapshot
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Number of `save` calls so far
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshot = snapshot.clone();
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
