// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `BandIndex` container and its query results.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::Point;

/// Failures reported by [`BandIndex`] mutations.
///
/// These are contract violations on the caller's side (or index corruption),
/// not expected runtime conditions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The key was not found among the entries sharing the given `y`.
    #[error("entry not found in band index")]
    MissingEntry,
}

/// Result of a nearest-entry query.
///
/// `radius` is the achieved search radius: the distance to `key` when one was
/// found, otherwise the unchanged maximum the caller passed in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Nearest<K> {
    /// The closest eligible key within the radius, if any.
    pub key: Option<K>,
    /// Distance to `key`, or the caller's maximum when `key` is `None`.
    pub radius: f64,
}

#[derive(Copy, Clone, Debug)]
struct Entry<K> {
    pos: Point,
    key: K,
}

/// An ordered collection of keyed points, sorted non-decreasing by `y`.
///
/// Duplicate `y` values are allowed and resolved by key identity during
/// removal. One `BandIndex` typically exists per connection kind, so queries
/// against it never have to filter by kind.
#[derive(Clone)]
pub struct BandIndex<K> {
    entries: Vec<Entry<K>>,
}

impl<K> Debug for BandIndex<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let span = match (self.entries.first(), self.entries.last()) {
            (Some(a), Some(b)) => Some((a.pos.y, b.pos.y)),
            _ => None,
        };
        f.debug_struct("BandIndex")
            .field("len", &self.entries.len())
            .field("y_span", &span)
            .finish_non_exhaustive()
    }
}

impl<K> Default for BandIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> BandIndex<K> {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// First index whose `y` is not less than the given value.
    fn lower_bound(&self, y: f64) -> usize {
        self.entries.partition_point(|e| e.pos.y < y)
    }

    /// First index whose `y` is greater than the given value.
    fn upper_bound(&self, y: f64) -> usize {
        self.entries.partition_point(|e| e.pos.y <= y)
    }
}

impl<K: Copy + PartialEq> BandIndex<K> {
    /// Insert a keyed point, keeping the sequence sorted by `y`.
    ///
    /// Entries sharing a `y` keep insertion order: the new entry lands after
    /// the existing equal-`y` run.
    pub fn insert(&mut self, key: K, pos: Point) {
        let at = self.upper_bound(pos.y);
        self.entries.insert(at, Entry { pos, key });
    }

    /// Remove the entry for `key` at `pos`, by identity.
    ///
    /// Binary-searches to the run of entries sharing `pos.y`, then scans that
    /// run for the exact key. A miss means the caller's bookkeeping and the
    /// index disagree.
    pub fn remove(&mut self, key: K, pos: Point) -> Result<(), IndexError> {
        let lo = self.lower_bound(pos.y);
        let hi = self.upper_bound(pos.y);
        for i in lo..hi {
            if self.entries[i].key == key {
                self.entries.remove(i);
                return Ok(());
            }
        }
        Err(IndexError::MissingEntry)
    }

    /// Iterate all entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Point)> + '_ {
        self.entries.iter().map(|e| (e.key, e.pos))
    }

    /// Iterate entries whose `y` lies in `[y0, y1]`, in sorted order.
    pub fn band(&self, y0: f64, y1: f64) -> impl Iterator<Item = (K, Point)> + '_ {
        let lo = self.lower_bound(y0);
        let hi = self.upper_bound(y1);
        self.entries[lo..hi.max(lo)].iter().map(|e| (e.key, e.pos))
    }

    /// Find the nearest entry to `origin` within `max_radius`.
    pub fn nearest(&self, origin: Point, max_radius: f64) -> Nearest<K> {
        self.nearest_where(origin, max_radius, |_| true)
    }

    /// Find the nearest entry to `origin` within `max_radius`, restricted to
    /// entries accepted by `eligible`.
    ///
    /// The walk starts at the binary-searched `y` position and expands outward
    /// in both directions. A direction stops once the vertical distance alone
    /// reaches the best radius so far; `eligible` is only consulted for
    /// entries that beat the current best.
    pub fn nearest_where<F>(&self, origin: Point, max_radius: f64, mut eligible: F) -> Nearest<K>
    where
        F: FnMut(K) -> bool,
    {
        let mut best = None;
        let mut best_r = max_radius;
        let start = self.lower_bound(origin.y);

        // Downward: y grows away from the origin.
        for e in &self.entries[start..] {
            if e.pos.y - origin.y >= best_r {
                break;
            }
            let r = origin.distance(e.pos);
            if r <= best_r && eligible(e.key) {
                best = Some(e.key);
                best_r = r;
            }
        }
        // Upward: y shrinks away from the origin.
        for e in self.entries[..start].iter().rev() {
            if origin.y - e.pos.y >= best_r {
                break;
            }
            let r = origin.distance(e.pos);
            if r <= best_r && eligible(e.key) {
                best = Some(e.key);
                best_r = r;
            }
        }
        Nearest {
            key: best,
            radius: best_r,
        }
    }

    /// Collect every entry within `radius` of `origin`, unfiltered.
    ///
    /// Same band expansion as [`Self::nearest_where`], but the radius does not
    /// shrink and all hits are returned.
    pub fn in_radius(&self, origin: Point, radius: f64) -> Vec<K> {
        let mut out = Vec::new();
        let start = self.lower_bound(origin.y);
        for e in &self.entries[start..] {
            if e.pos.y - origin.y >= radius {
                break;
            }
            if origin.distance(e.pos) <= radius {
                out.push(e.key);
            }
        }
        for e in self.entries[..start].iter().rev() {
            if origin.y - e.pos.y >= radius {
                break;
            }
            if origin.distance(e.pos) <= radius {
                out.push(e.key);
            }
        }
        out
    }
}
