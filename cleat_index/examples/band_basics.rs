// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Cleat Index: insert, nearest query, remove by identity.

use cleat_index::BandIndex;
use kurbo::Point;

fn main() {
    let mut idx: BandIndex<u32> = BandIndex::new();
    for k in 0..20 {
        idx.insert(k, Point::new(f64::from(k % 5) * 40.0, f64::from(k) * 25.0));
    }

    let origin = Point::new(10.0, 240.0);
    let near = idx.nearest(origin, 60.0);
    println!("nearest to {origin:?}: {:?} at radius {:.1}", near.key, near.radius);

    let hits = idx.in_radius(origin, 60.0);
    println!("within 60px: {hits:?}");

    idx.remove(9, Point::new(160.0, 225.0)).unwrap();
    println!("len after remove: {}", idx.len());
}
