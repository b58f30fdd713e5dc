// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snap-and-connect basics.
//!
//! A parent block offers a value input; a dragged block's output searches for
//! it within the snap radius, highlights it, connects on drop, and seats
//! itself with `tighten`.
//!
//! Run:
//! - `cargo run -p cleat_demos --example snap_basics`

use cleat_drag::{DragState, HighlightState, SnapConfig, snap_candidate};
use cleat_graph::{BlockFlags, BlockSpec, Graph, PortKind, ValueShape};
use kurbo::{Point, Vec2};

fn main() {
    let mut g = Graph::new();
    let cfg = SnapConfig::default();

    let rendered = BlockSpec {
        flags: BlockFlags::MOVABLE | BlockFlags::RENDERED,
        ..BlockSpec::default()
    };
    let parent = g.add_block(rendered.clone());
    let input = g
        .add_port(parent, PortKind::ValueInput(ValueShape::Plain))
        .unwrap();
    g.move_to(input, Point::new(120.0, 80.0)).unwrap();

    let dragged = g.add_block(rendered);
    let output = g
        .add_port(dragged, PortKind::ValueOutput(ValueShape::Plain))
        .unwrap();
    g.move_to(output, Point::new(40.0, 40.0)).unwrap();

    let mut drag = DragState::default();
    let mut hl = HighlightState::default();
    drag.begin(dragged);

    println!("== Dragging toward the input ==");
    for step in [Vec2::new(30.0, 15.0), Vec2::new(60.0, 30.0), Vec2::new(75.0, 36.0)] {
        let near = snap_candidate(&g, &cfg, output, step);
        match near.key {
            Some(port) => {
                if let Some(prev) = hl.highlight(port) {
                    println!("  unhighlight {prev:?}");
                }
                println!("  offset {step:?}: snap to {port:?} at r={:.1}", near.radius);
            }
            None => println!("  offset {step:?}: nothing within {:.0}", cfg.snap_radius),
        }
    }

    // Drop: commit the move, then connect to the highlighted port.
    let target = hl.clear().expect("last step was within the snap radius");
    g.move_block_by(dragged, Vec2::new(75.0, 36.0)).unwrap();
    drag.end();
    let outcome = g.connect(output, target).unwrap();
    assert!(outcome.displaced.is_none());
    g.tighten(target).unwrap();

    println!("== After drop ==");
    println!("  parent of dragged: {:?}", g.parent(dragged));
    println!("  output seated at {:?}", g.position(output));

    let damage = g.take_damage();
    println!("== Damage ==");
    println!("  render: {:?}", damage.render);
    println!("  refresh_disabled: {:?}", damage.refresh_disabled);
}
