// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cleat Graph: the connection graph of a block editor.
//!
//! Blocks snap together into trees through typed ports. A [`Graph`] owns the
//! blocks and ports of one workspace, keeps one [`cleat_index::BandIndex`] per
//! port kind for radius-bounded snap queries, and enforces the linking rules:
//! kinds pair only with their exact opposite, type constraints must intersect,
//! links stay symmetric, and a port is in its kind's index exactly when its
//! `indexed` flag says so.
//!
//! Connecting into an occupied superior port splices: the displaced child is
//! reattached behind the incoming block when a unique compatible slot exists,
//! and otherwise reported in the [`LinkOutcome`] so the drag layer can nudge
//! it clear. Collapsing a block hides the attached subtree's ports via
//! [`Graph::hide_all`]; expanding restores them and yields the minimal set of
//! blocks to re-render.
//!
//! The graph never calls into a renderer. Mutations accumulate [`Damage`]
//! that the rendering collaborator drains with [`Graph::take_damage`].
//!
//! # Example
//!
//! ```rust
//! use cleat_graph::{BlockSpec, Graph, PortKind, ValueShape};
//! use kurbo::{Point, Vec2};
//!
//! let mut g = Graph::new();
//! let parent = g.add_block(BlockSpec::default());
//! let child = g.add_block(BlockSpec::default());
//! let input = g.add_port(parent, PortKind::ValueInput(ValueShape::Plain))?;
//! let output = g.add_port(child, PortKind::ValueOutput(ValueShape::Plain))?;
//! g.move_to(input, Point::new(40.0, 25.0))?;
//! g.move_to(output, Point::new(43.0, 21.0))?;
//!
//! // A drag near the input finds it within the snap radius.
//! let near = g.closest(output, 15.0, Vec2::ZERO);
//! assert_eq!(near.key, Some(input));
//!
//! g.connect(output, input)?;
//! assert_eq!(g.parent(child), Some(parent));
//! # Ok::<_, cleat_graph::GraphError>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod damage;
mod error;
mod graph;
mod link;
mod types;

pub use cleat_index::Nearest;
pub use damage::Damage;
pub use error::GraphError;
pub use graph::Graph;
pub use link::{Displaced, LinkOutcome};
pub use types::{
    BlockFlags, BlockId, BlockSpec, NotchStyle, PartOfSpeech, PortId, PortKind, ValueShape,
};
