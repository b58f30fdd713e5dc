// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cleat Drag: gesture policy on top of the connection graph.
//!
//! [`cleat_graph`] decides what may link; this crate decides what a drag does
//! about it. It holds the gesture-scoped state ([`DragState`],
//! [`HighlightState`]), the externally supplied [`SnapConfig`] constants, and
//! the collision-avoidance policy: [`bump_away_from`] for immediate nudges
//! and [`BumpQueue`] for the deferred nudge that follows a displacing
//! connect.
//!
//! The queue runs off a host-supplied millisecond clock rather than its own
//! timer; the host calls [`BumpQueue::run_due`] from its event loop. A due
//! task re-validates that both ports are still alive and the displaced port
//! is still free, so a reconnect or disposal in the intervening delay simply
//! drops the task.
//!
//! # Example
//!
//! ```rust
//! use cleat_drag::{snap_candidate, BumpQueue, DragState, SnapConfig};
//! use cleat_graph::{BlockSpec, Graph, PortKind, ValueShape};
//! use kurbo::{Point, Vec2};
//!
//! let mut g = Graph::new();
//! let parent = g.add_block(BlockSpec::default());
//! let input = g.add_port(parent, PortKind::ValueInput(ValueShape::Plain))?;
//! g.move_to(input, Point::new(8.0, 6.0))?;
//! let child = g.add_block(BlockSpec::default());
//! let output = g.add_port(child, PortKind::ValueOutput(ValueShape::Plain))?;
//! g.move_to(output, Point::new(0.0, 0.0))?;
//!
//! let cfg = SnapConfig::default();
//! let mut drag = DragState::default();
//! drag.begin(child);
//! let near = snap_candidate(&g, &cfg, output, Vec2::ZERO);
//! assert_eq!(near.key, Some(input));
//! drag.end();
//!
//! let outcome = g.connect(output, input)?;
//! let mut queue = BumpQueue::new();
//! if let Some(displaced) = outcome.displaced {
//!     queue.schedule(displaced, 0, &cfg);
//! }
//! # Ok::<_, cleat_graph::GraphError>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bump;
mod state;

pub use bump::{BumpQueue, bump_away_from, bump_neighbours};
pub use state::{DragState, HighlightState, SnapConfig, snap_candidate};
