//! Immutable reference snapshots with atomic replacement.
//!
//! A [`ReferenceSnapshot`] bundles everything loaded from the reference
//! tables. [`SnapshotStore`] hands out `Arc` clones of the current snapshot so
//! a request keeps one consistent view for its whole lifetime, even if a
//! reload publishes a new snapshot halfway through.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::reference::{load_reference_dataset, load_remedy_table, ReferenceDataset, RemedyTable};

/// Reference data loaded together.
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    /// Rows used for classification.
    pub dataset: ReferenceDataset,
    /// Rows whose `Normal` subset feeds the baseline envelope.
    pub baseline: ReferenceDataset,
    /// Recovery guidance per label.
    pub remedies: RemedyTable,
    /// When this snapshot was built.
    pub loaded_at: DateTime<Utc>,
}

impl ReferenceSnapshot {
    /// Build a snapshot whose baseline is the classification dataset itself.
    #[must_use]
    pub fn new(dataset: ReferenceDataset, remedies: RemedyTable) -> Self {
        Self {
            baseline: dataset.clone(),
            dataset,
            remedies,
            loaded_at: Utc::now(),
        }
    }

    /// Replace the baseline dataset.
    #[must_use]
    pub fn with_baseline(mut self, baseline: ReferenceDataset) -> Self {
        self.baseline = baseline;
        self
    }

    /// Load a snapshot from disk.
    ///
    /// `baseline_path` defaults to `reference_path`. Remedies are read from
    /// `reference_path` and fall back to the built-in table on failure.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either dataset cannot be loaded.
    pub fn load(reference_path: &Path, baseline_path: Option<&Path>) -> Result<Self, StoreError> {
        let dataset = load_reference_dataset(reference_path)?;
        let baseline = match baseline_path {
            Some(path) if path != reference_path => load_reference_dataset(path)?,
            _ => dataset.clone(),
        };
        let remedies = load_remedy_table(reference_path);
        Ok(Self::new(dataset, remedies).with_baseline(baseline))
    }
}

/// Where a [`SnapshotStore`] reloads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSource {
    pub reference_path: PathBuf,
    pub baseline_path: Option<PathBuf>,
}

/// Holder of the current [`ReferenceSnapshot`].
///
/// Readers take the lock only long enough to clone the `Arc`.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<ReferenceSnapshot>>>,
    source: Option<SnapshotSource>,
}

impl SnapshotStore {
    /// An empty store with no reload source.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store holding `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: ReferenceSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
            source: None,
        }
    }

    /// A store that loads from `source` now and on every [`reload`](Self::reload).
    ///
    /// A failed initial load leaves the store empty; the failure is logged
    /// and classification degrades until a reload succeeds.
    #[must_use]
    pub fn from_source(source: SnapshotSource) -> Self {
        let store = Self {
            current: RwLock::new(None),
            source: Some(source),
        };
        if let Err(e) = store.reload() {
            warn!(error = %e, "Initial reference load failed");
        }
        store
    }

    /// The current snapshot, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ReferenceSnapshot>> {
        self.current.read().clone()
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: ReferenceSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(snapshot);
    }

    /// Reload from the configured source and publish the result.
    ///
    /// On failure the previous snapshot stays in place. A store without a
    /// source keeps its snapshot and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the reference tables cannot be loaded.
    pub fn reload(&self) -> Result<bool, StoreError> {
        let Some(source) = &self.source else {
            return Ok(false);
        };
        let snapshot =
            ReferenceSnapshot::load(&source.reference_path, source.baseline_path.as_deref())?;
        info!(
            samples = snapshot.dataset.len(),
            baseline = snapshot.baseline.len(),
            "Published reference snapshot"
        );
        self.publish(snapshot);
        Ok(true)
    }

    /// Whether a snapshot is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GaitDisorder, ReferenceSample};

    fn snapshot(n: usize) -> ReferenceSnapshot {
        let rows = (0..n)
            .map(|i| ReferenceSample::new(i as f64, 0.0, 9.8, GaitDisorder::Normal))
            .collect();
        ReferenceSnapshot::new(ReferenceDataset::from_samples(rows), RemedyTable::fallback())
    }

    #[test]
    fn empty_store_has_no_snapshot() {
        let store = SnapshotStore::empty();
        assert!(!store.is_loaded());
        assert!(store.current().is_none());
        assert!(!store.reload().unwrap());
    }

    #[test]
    fn readers_keep_their_snapshot_across_publish() {
        let store = SnapshotStore::with_snapshot(snapshot(1));
        let held = store.current().unwrap();
        store.publish(snapshot(3));
        assert_eq!(held.dataset.len(), 1);
        assert_eq!(store.current().unwrap().dataset.len(), 3);
    }

    #[test]
    fn failed_initial_load_leaves_store_empty() {
        let store = SnapshotStore::from_source(SnapshotSource {
            reference_path: PathBuf::from("/nonexistent/gait.csv"),
            baseline_path: None,
        });
        assert!(!store.is_loaded());
        assert!(store.reload().is_err());
    }

    #[test]
    fn store_is_shareable_across_threads() {
        let store = Arc::new(SnapshotStore::with_snapshot(snapshot(2)));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        store.publish(snapshot(2));
                    }
                    store.current().map(|s| s.dataset.len())
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Some(2));
        }
    }
}
