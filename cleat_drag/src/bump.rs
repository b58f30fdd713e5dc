// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision avoidance: immediate bumps and the deferred bump queue.

use alloc::vec::Vec;
use kurbo::Vec2;
use log::debug;

use cleat_graph::{BlockFlags, BlockId, Displaced, Graph, GraphError, PortId};

use crate::state::{DragState, SnapConfig};

/// Nudge the root block containing `moving` clear of `anchor`.
///
/// No-op while a drag is in progress or while the moving root sits in a
/// preview tray. The root is raised to the top of the stacking order and
/// displaced so `moving` clears `anchor` by the snap radius. If that root is
/// immovable, the anchor side's root is displaced instead, with the vertical
/// component inverted; if both roots are immovable nothing happens, which is
/// the one tolerated soft failure of the bump policy.
pub fn bump_away_from(
    graph: &mut Graph,
    drag: &DragState,
    cfg: &SnapConfig,
    moving: PortId,
    anchor: PortId,
) -> Result<(), GraphError> {
    if drag.is_dragging() {
        return Ok(());
    }
    let mut root = graph.root_of(graph.owner(moving));
    if graph.block_flags(root).contains(BlockFlags::IN_TRAY) {
        return Ok(());
    }
    let mut static_port = anchor;
    let mut reverse = false;
    if !graph.block_flags(root).contains(BlockFlags::MOVABLE) {
        root = graph.root_of(graph.owner(anchor));
        if !graph.block_flags(root).contains(BlockFlags::MOVABLE) {
            return Ok(());
        }
        static_port = moving;
        reverse = true;
    }
    graph.raise(root);
    let margin = Vec2::new(cfg.snap_radius, cfg.snap_radius);
    let mut delta = (graph.position(static_port) + margin) - graph.position(moving);
    if reverse {
        delta.y = -delta.y;
    }
    graph.move_block_by(root, delta)
}

#[derive(Copy, Clone, Debug)]
struct PendingBump {
    displaced: Displaced,
    due: u64,
}

/// Deferred bumps, driven by a host-supplied millisecond clock.
///
/// A displacing connect schedules here rather than moving anything at once,
/// so the re-render it triggered settles before another block jumps. There is
/// no cancellation; a task whose ports have since been disposed or relinked
/// is dropped when it comes due.
#[derive(Clone, Debug, Default)]
pub struct BumpQueue {
    pending: Vec<PendingBump>,
}

impl BumpQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a displacement to fire after the configured delay.
    pub fn schedule(&mut self, displaced: Displaced, now: u64, cfg: &SnapConfig) {
        debug!("bump: scheduled after {}ms", cfg.bump_delay);
        self.pending.push(PendingBump {
            displaced,
            due: now + cfg.bump_delay,
        });
    }

    /// Fire every due bump; returns how many actually ran.
    ///
    /// A due task is dropped without effect when either port has died or the
    /// displaced port has found a new partner in the meantime.
    pub fn run_due(
        &mut self,
        graph: &mut Graph,
        drag: &DragState,
        cfg: &SnapConfig,
        now: u64,
    ) -> Result<usize, GraphError> {
        let mut fired = 0;
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due > now {
                i += 1;
                continue;
            }
            let Displaced { port, anchor } = self.pending.remove(i).displaced;
            if !graph.is_alive_port(port)
                || !graph.is_alive_port(anchor)
                || graph.partner(port).is_some()
            {
                debug!("bump: dropping stale task");
                continue;
            }
            bump_away_from(graph, drag, cfg, port, anchor)?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop all pending tasks.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Schedule bumps pushing other stacks clear of `block`'s free ports.
///
/// Walks the block and, through connected superior ports, everything beneath
/// it. For each port, every opposite-kind port within the snap radius on a
/// different root gets a bump between the two free ends; pairs where both
/// sides are connected are left alone. The inferior side is always the one
/// displaced. Used after a constraint change detaches a child.
pub fn bump_neighbours(
    graph: &Graph,
    queue: &mut BumpQueue,
    cfg: &SnapConfig,
    now: u64,
    block: BlockId,
) {
    let root = graph.root_of(block);
    if graph.block_flags(root).contains(BlockFlags::IN_TRAY) {
        return;
    }
    for port in graph.all_ports(block) {
        if graph.kind(port).is_superior() {
            if let Some(child) = graph.target_block(port) {
                bump_neighbours(graph, queue, cfg, now, child);
            }
        }
        for other in graph.neighbours(port, cfg.snap_radius) {
            if graph.partner(port).is_some() && graph.partner(other).is_some() {
                continue;
            }
            if graph.root_of(graph.owner(other)) == root {
                continue;
            }
            let (moving, anchor) = if graph.kind(port).is_superior() {
                (other, port)
            } else {
                (port, other)
            };
            if graph.partner(moving).is_none() {
                queue.schedule(Displaced { port: moving, anchor }, now, cfg);
            }
        }
    }
}
