// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cleat Index: a y-sorted band index for connection points.
//!
//! Cleat Index is the spatial building block of the connection graph: an owned
//! ordered container of `(position, key)` entries kept sorted by the vertical
//! coordinate, so that "the nearest point within a radius" can be answered by
//! a binary search plus a short outward walk instead of a linear scan.
//!
//! - Insert keeps the sequence sorted by `y`; equal `y` values keep insertion
//!   order.
//! - Removal is by key identity within the equal-`y` run, so duplicate
//!   positions are handled exactly.
//! - [`BandIndex::nearest_where`] expands outward from the binary-searched `y`
//!   position in both directions and stops a direction as soon as the vertical
//!   distance alone reaches the best radius found so far. Vertical distance
//!   lower-bounds Euclidean distance, so this pruning never skips a better
//!   candidate.
//!
//! The index stores only positions and opaque keys. Domain rules (occupancy,
//! type compatibility, ancestry) are supplied by the caller as a predicate to
//! [`BandIndex::nearest_where`]; [`BandIndex::in_radius`] applies no filtering
//! at all.
//!
//! # Example
//!
//! ```rust
//! use cleat_index::BandIndex;
//! use kurbo::Point;
//!
//! let mut idx: BandIndex<u32> = BandIndex::new();
//! idx.insert(1, Point::new(0.0, 10.0));
//! idx.insert(2, Point::new(3.0, 12.0));
//! idx.insert(3, Point::new(50.0, 11.0));
//!
//! let near = idx.nearest(Point::new(1.0, 11.0), 20.0);
//! assert_eq!(near.key, Some(1));
//!
//! // Remove by identity; the same position may be shared by other keys.
//! idx.remove(1, Point::new(0.0, 10.0)).unwrap();
//! assert_eq!(idx.len(), 2);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod index;

pub use index::{BandIndex, IndexError, Nearest};
