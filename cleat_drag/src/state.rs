// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture-scoped state and the snap configuration.
//!
//! A drag in progress and a highlighted port used to be process-wide mutable
//! globals in this design's ancestors. Here they are plain values owned by
//! the gesture handler and passed to whoever needs them.

use kurbo::Vec2;

use cleat_graph::{BlockId, Graph, Nearest, PortId};

/// Externally supplied connection-policy constants.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapConfig {
    /// Maximum distance at which a dragged port snaps to a partner, also used
    /// as the clearance margin when bumping blocks apart.
    pub snap_radius: f64,
    /// Milliseconds to wait after a displacing connect before nudging the
    /// orphan, so the triggered re-render settles first.
    pub bump_delay: u64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_radius: 15.0,
            bump_delay: 250,
        }
    }
}

/// Whether a drag gesture is in progress, and on which block.
///
/// Bumps are suppressed while a drag is live; the dragged stack is under the
/// pointer's authority, not the graph's.
#[derive(Copy, Clone, Debug, Default)]
pub struct DragState {
    dragging: Option<BlockId>,
}

impl DragState {
    /// Start a drag on `block`.
    pub fn begin(&mut self, block: BlockId) {
        self.dragging = Some(block);
    }

    /// End the drag, returning the block that was dragged.
    pub fn end(&mut self) -> Option<BlockId> {
        self.dragging.take()
    }

    /// True while a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// The block being dragged, if any.
    pub fn current(&self) -> Option<BlockId> {
        self.dragging
    }
}

/// At most one port is highlighted for snap feedback at a time.
#[derive(Copy, Clone, Debug, Default)]
pub struct HighlightState {
    current: Option<PortId>,
}

impl HighlightState {
    /// Highlight `port`, returning the previously highlighted port (if it was
    /// a different one) so the renderer can unhighlight it.
    pub fn highlight(&mut self, port: PortId) -> Option<PortId> {
        let previous = self.current.filter(|p| *p != port);
        self.current = Some(port);
        previous
    }

    /// Clear the highlight, returning the port that was highlighted.
    pub fn clear(&mut self) -> Option<PortId> {
        self.current.take()
    }

    /// The currently highlighted port, if any.
    pub fn current(&self) -> Option<PortId> {
        self.current
    }
}

/// The nearest eligible snap partner for `port` under the configured radius,
/// were its block displaced by `offset`.
pub fn snap_candidate(
    graph: &Graph,
    cfg: &SnapConfig,
    port: PortId,
    offset: Vec2,
) -> Nearest<PortId> {
    graph.closest(port, cfg.snap_radius, offset)
}
