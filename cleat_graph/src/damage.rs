// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched render damage drained by [`Graph::take_damage`](crate::Graph::take_damage).
//!
//! The graph never calls into a renderer. Mutations record which blocks need
//! attention here, and the rendering collaborator drains the lists after each
//! gesture step. Only blocks flagged rendered are recorded.

use alloc::vec::Vec;

use crate::types::BlockId;

/// Blocks the rendering layer must revisit.
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Blocks to re-render. Rendering a block re-renders its ancestors, so
    /// entries are the deepest block that changed shape or position.
    pub render: Vec<BlockId>,
    /// Blocks whose enabled/disabled presentation must be refreshed.
    pub refresh_disabled: Vec<BlockId>,
    /// Blocks whose auxiliary decorations (bubbles, icons) were hidden.
    pub decor_hidden: Vec<BlockId>,
    /// Blocks raised to the top of the stacking order.
    pub raised: Vec<BlockId>,
}

impl Damage {
    /// True if no damage was recorded.
    pub fn is_empty(&self) -> bool {
        self.render.is_empty()
            && self.refresh_disabled.is_empty()
            && self.decor_hidden.is_empty()
            && self.raised.is_empty()
    }
}
