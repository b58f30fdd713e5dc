// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mid-stack insertion and the deferred bump.
//!
//! Builds a statement stack X → Y → Z, splices W in between the root and X,
//! then shows a value splice that cannot reattach its orphan: the displaced
//! block is nudged clear once the bump comes due on the demo's fake clock.
//!
//! Run:
//! - `cargo run -p cleat_demos --example splice_stack`

use cleat_drag::{BumpQueue, DragState, SnapConfig};
use cleat_graph::{BlockFlags, BlockId, BlockSpec, Graph, PortId, PortKind, ValueShape};
use kurbo::Point;

fn rendered() -> BlockSpec {
    BlockSpec {
        flags: BlockFlags::MOVABLE | BlockFlags::RENDERED,
        ..BlockSpec::default()
    }
}

fn stmt_block(g: &mut Graph, y: f64) -> (BlockId, PortId, PortId) {
    let b = g.add_block(rendered());
    let prev = g.add_port(b, PortKind::PreviousStatement).unwrap();
    let next = g.add_port(b, PortKind::NextStatement).unwrap();
    g.move_to(prev, Point::new(0.0, y)).unwrap();
    g.move_to(next, Point::new(0.0, y + 30.0)).unwrap();
    (b, prev, next)
}

fn print_stack(g: &Graph, label: &str, mut block: BlockId) {
    print!("{label}: {block:?}");
    while let Some(next) = g.next(block) {
        match g.target_block(next) {
            Some(below) => {
                print!(" -> {below:?}");
                block = below;
            }
            None => break,
        }
    }
    println!();
}

fn main() {
    let mut g = Graph::new();
    let cfg = SnapConfig::default();
    let drag = DragState::default();
    let mut queue = BumpQueue::new();

    // Root -> X -> Y -> Z.
    let root = g.add_block(rendered());
    let root_next = g.add_port(root, PortKind::NextStatement).unwrap();
    g.move_to(root_next, Point::new(0.0, 30.0)).unwrap();
    let (_x, x_prev, x_next) = stmt_block(&mut g, 60.0);
    let (_y, y_prev, y_next) = stmt_block(&mut g, 120.0);
    let (_z, z_prev, _) = stmt_block(&mut g, 180.0);
    g.connect(x_prev, root_next).unwrap();
    g.connect(y_prev, x_next).unwrap();
    g.connect(z_prev, y_next).unwrap();
    print_stack(&g, "before", root);

    // W takes X's previous connection; X is spliced back under W's free tail.
    let (_w, w_prev, _) = stmt_block(&mut g, 45.0);
    let outcome = g.connect(w_prev, root_next).unwrap();
    assert!(outcome.displaced.is_none(), "X reattaches at W's tail");
    print_stack(&g, "after splice", root);

    // A value splice with no slot for the orphan: the old child is displaced
    // and nudged clear after the bump delay.
    let host = g.add_block(rendered());
    let input = g
        .add_port(host, PortKind::ValueInput(ValueShape::Plain))
        .unwrap();
    g.move_to(input, Point::new(200.0, 60.0)).unwrap();
    let old = g.add_block(rendered());
    let old_out = g.add_port(old, PortKind::ValueOutput(ValueShape::Plain)).unwrap();
    g.move_to(old_out, Point::new(200.0, 60.0)).unwrap();
    g.connect(old_out, input).unwrap();

    let new = g.add_block(rendered());
    let new_out = g.add_port(new, PortKind::ValueOutput(ValueShape::Plain)).unwrap();
    g.move_to(new_out, Point::new(200.0, 60.0)).unwrap();

    let mut now = 10_000_u64;
    let outcome = g.connect(new_out, input).unwrap();
    if let Some(displaced) = outcome.displaced {
        println!("displaced {:?}, bump in {}ms", displaced.port, cfg.bump_delay);
        queue.schedule(displaced, now, &cfg);
    }

    now += cfg.bump_delay;
    let fired = queue.run_due(&mut g, &drag, &cfg, now).unwrap();
    println!("bumps fired: {fired}");
    println!("old child now at {:?}", g.origin(old));
}
