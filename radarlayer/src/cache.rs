//! Snapshot caching.
//!
//! The engine memoizes exactly one static composite and one animation base
//! map. Both slots live behind a mutex and follow the same discipline: a
//! writer stores a fully built bitmap or nothing, and readers always get a
//! cloned bitmap, never the cached instance, so caller-side mutation cannot
//! corrupt the slot.
//!
//! Slot lifecycle: Empty -> Valid -> Stale -> (rebuild) -> Valid. Staleness
//! is decided per lookup from the caller-supplied TTL; the cache itself
//! stores only the creation instant.

use std::time::{Duration, Instant};

use image::RgbaImage;
use parking_lot::Mutex;

use crate::coord::{GeoPoint, Viewport};

/// Tolerance for treating two geographic points as the same cache key.
pub const MATCH_EPSILON_DEG: f64 = 1e-6;

/// A cached composite: bitmap plus the parameters it was built for and the
/// wall-clock instant it was produced.
#[derive(Clone)]
pub struct CompositeSnapshot {
    /// The composited bitmap.
    pub image: RgbaImage,
    /// Center point the composite was built for.
    pub point: GeoPoint,
    /// Viewport (dimensions + zoom) the composite was built for.
    pub viewport: Viewport,
    /// Creation time, for TTL checks.
    pub produced_at: Instant,
}

impl CompositeSnapshot {
    /// Creates a snapshot stamped with the current instant.
    pub fn new(image: RgbaImage, point: GeoPoint, viewport: Viewport) -> Self {
        Self {
            image,
            point,
            viewport,
            produced_at: Instant::now(),
        }
    }

    /// Whether this snapshot was built for the given parameters.
    ///
    /// Points match within [`MATCH_EPSILON_DEG`]; viewport dimensions and
    /// zoom must match exactly.
    pub fn matches(&self, point: &GeoPoint, viewport: &Viewport) -> bool {
        self.point.approx_eq(point, MATCH_EPSILON_DEG) && self.viewport == *viewport
    }

    /// Whether the snapshot is younger than `ttl`.
    pub fn fresh(&self, ttl: Duration) -> bool {
        self.produced_at.elapsed() < ttl
    }
}

/// Single-slot cache for the static composite and the animation base map.
///
/// Owned by the service instance; there is no process-wide state.
#[derive(Default)]
pub struct SnapshotCache {
    composite: Mutex<Option<CompositeSnapshot>>,
    basemap: Mutex<Option<CompositeSnapshot>>,
}

impl SnapshotCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached composite when it matches and is
    /// younger than `ttl`.
    pub fn lookup(&self, point: &GeoPoint, viewport: &Viewport, ttl: Duration) -> Option<RgbaImage> {
        let slot = self.composite.lock();
        slot.as_ref()
            .filter(|snap| snap.matches(point, viewport) && snap.fresh(ttl))
            .map(|snap| snap.image.clone())
    }

    /// Replaces the composite slot. Called only after a full successful
    /// rebuild, so readers never observe a half-built bitmap.
    pub fn store(&self, snapshot: CompositeSnapshot) {
        *self.composite.lock() = Some(snapshot);
    }

    /// Returns a copy of the retained base map when it matches the
    /// geography. Base-map tiles are effectively immutable, so no TTL
    /// applies.
    pub fn lookup_basemap(&self, point: &GeoPoint, viewport: &Viewport) -> Option<RgbaImage> {
        let slot = self.basemap.lock();
        slot.as_ref()
            .filter(|snap| snap.matches(point, viewport))
            .map(|snap| snap.image.clone())
    }

    /// Replaces the retained base map.
    pub fn store_basemap(&self, snapshot: CompositeSnapshot) {
        *self.basemap.lock() = Some(snapshot);
    }

    /// Drops both slots.
    pub fn clear(&self) {
        *self.composite.lock() = None;
        *self.basemap.lock() = None;
    }
}
