// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linking: connect/disconnect, splicing, type constraints, snap queries.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::Vec2;
use log::debug;

use cleat_index::Nearest;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::types::{BlockFlags, BlockId, PortId, PortKind};

/// A child displaced by a splice that could not be reattached.
///
/// The graph records the displacement; nudging the block clear is the drag
/// layer's job, after the render settles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Displaced {
    /// The orphan's inferior port (its output or previous-statement port).
    pub port: PortId,
    /// The port the orphan was displaced from; the nudge moves away from it.
    pub anchor: PortId,
}

/// What `connect` did beyond making the link.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Set when a splice displaced a child that could not be reattached.
    pub displaced: Option<Displaced>,
}

impl Graph {
    /// Link two free ports, or splice into an occupied superior port.
    ///
    /// `a` is the initiating side, normally a port of the dragged block. The
    /// kinds must be exact opposites and the type constraints must intersect.
    ///
    /// When the superior side `b` is already occupied, its child is detached
    /// first and the graph tries to reattach it behind the incoming block: for
    /// value links by walking the incoming block's uniquely-compatible input
    /// chain, for statement links by walking to the incoming stack's tail. A
    /// child that cannot be reattached is reported in the outcome so the drag
    /// layer can schedule a bump.
    ///
    /// Splicing is only legal from the top: initiating with a next-statement
    /// port against an occupied previous port is refused.
    pub fn connect(&mut self, a: PortId, b: PortId) -> Result<LinkOutcome, GraphError> {
        let (a_owner, a_kind) = (self.port(a).owner, self.port(a).kind);
        let (b_owner, b_kind) = (self.port(b).owner, self.port(b).kind);
        if a_owner == b_owner {
            return Err(GraphError::SameBlock);
        }
        if a_kind.opposite() != b_kind {
            return Err(GraphError::KindMismatch);
        }
        if !self.check_type(a, b) {
            return Err(GraphError::CheckMismatch);
        }
        if self.port(a).partner.is_some() {
            return Err(GraphError::AlreadyLinked);
        }

        let (sup, inf) = if a_kind.is_superior() { (a, b) } else { (b, a) };
        // Linking makes the inferior owner a child of the superior owner;
        // refuse if the superior side already sits beneath it.
        let inf_owner = self.port(inf).owner;
        let mut cur = self.parent(self.port(sup).owner);
        while let Some(blk) = cur {
            if blk == inf_owner {
                return Err(GraphError::WouldCycle);
            }
            cur = self.parent(blk);
        }

        let mut displaced = None;
        if self.port(b).partner.is_some() {
            if b == inf {
                // Occupied single-use end. For statements this is the
                // mid-stack-from-below shape: a free next port pushed against
                // an occupied previous port.
                return Err(if a_kind == PortKind::NextStatement {
                    GraphError::MidStackFromBelow
                } else {
                    GraphError::AlreadyLinked
                });
            }
            displaced = self.splice(sup, inf)?;
        }

        self.link(sup, inf);
        Ok(LinkOutcome { displaced })
    }

    /// Detach the occupied superior port's child and try to reattach it
    /// behind the incoming block. Returns the displacement when reattachment
    /// fails.
    fn splice(&mut self, sup: PortId, inf: PortId) -> Result<Option<Displaced>, GraphError> {
        let orphan = self
            .target_block(sup)
            .ok_or(GraphError::BrokenBackLink)?;
        let old_link = self.port(sup).partner.ok_or(GraphError::NotLinked)?;
        self.disconnect(old_link)?;
        let incoming = self.port(inf).owner;

        let is_value = self.port(sup).kind.is_value_input();
        let orphan_port = if is_value {
            self.block(orphan).output
        } else {
            self.block(orphan).previous
        }
        .ok_or(GraphError::OrphanWithoutPort)?;

        if is_value {
            // Descend through blocks that expose exactly one compatible value
            // input; stop at the first free one.
            let mut host = incoming;
            while let Some(input) = self.single_value_input(host, orphan_port) {
                match self.target_block(input) {
                    Some(next_host) => host = next_host,
                    None => {
                        debug!("splice: reattaching orphan into input chain");
                        self.connect(orphan_port, input)?;
                        return Ok(None);
                    }
                }
            }
        } else {
            // Walk the incoming stack to its tail and splice the orphan back
            // in if the tail accepts it.
            let mut tail = incoming;
            loop {
                let Some(next) = self.block(tail).next else {
                    break;
                };
                match self.target_block(next) {
                    Some(below) => tail = below,
                    None => {
                        if self.check_type(next, orphan_port) {
                            debug!("splice: reattaching orphan at stack tail");
                            self.connect(orphan_port, next)?;
                            return Ok(None);
                        }
                        break;
                    }
                }
            }
        }

        debug!("splice: orphan displaced, bump pending");
        Ok(Some(Displaced {
            port: orphan_port,
            anchor: sup,
        }))
    }

    /// The block's sole value input whose shape and constraints accept
    /// `orphan_out`, or `None` when there are zero or several.
    fn single_value_input(&self, block: BlockId, orphan_out: PortId) -> Option<PortId> {
        let want = self.port(orphan_out).kind.opposite();
        let mut found = None;
        for input in self.inputs(block) {
            if self.port(*input).kind == want && self.check_type(*input, orphan_out) {
                if found.is_some() {
                    return None;
                }
                found = Some(*input);
            }
        }
        found
    }

    fn link(&mut self, sup: PortId, inf: PortId) {
        self.port_mut(sup).partner = Some(inf);
        self.port_mut(inf).partner = Some(sup);
        let parent = self.port(sup).owner;
        let child = self.port(inf).owner;
        self.set_parent(child, Some(parent));

        self.damage_refresh(parent);
        self.damage_refresh(child);
        let both_rendered = self.block_flags(parent).contains(BlockFlags::RENDERED)
            && self.block_flags(child).contains(BlockFlags::RENDERED);
        if both_rendered {
            // A new stack edge changes the child's corner shape, so the child
            // re-renders (which re-renders its ancestors); a value edge
            // re-flows the parent instead.
            if self.port(sup).kind.is_statement() {
                self.damage_render(child);
            } else {
                self.damage_render(parent);
            }
        }
    }

    /// Sever a link from either end.
    ///
    /// Clears both sides, detaches the child from its parent, and records
    /// re-layout damage for both former owners.
    pub fn disconnect(&mut self, a: PortId) -> Result<(), GraphError> {
        let Some(b) = self.port(a).partner else {
            return Err(GraphError::NotLinked);
        };
        if self.port(b).partner != Some(a) {
            return Err(GraphError::BrokenBackLink);
        }
        self.port_mut(a).partner = None;
        self.port_mut(b).partner = None;

        let (sup, inf) = if self.port(a).kind.is_superior() {
            (a, b)
        } else {
            (b, a)
        };
        let parent = self.port(sup).owner;
        let child = self.port(inf).owner;
        self.set_parent(child, None);

        self.damage_render(parent);
        self.damage_refresh(child);
        self.damage_render(child);
        Ok(())
    }

    /// Whether two ports' type constraints allow a link.
    ///
    /// True unless both sides carry non-empty, disjoint tag sets.
    pub fn check_type(&self, a: PortId, b: PortId) -> bool {
        match (&self.port(a).check, &self.port(b).check) {
            (Some(x), Some(y)) => x.iter().any(|t| y.contains(t)),
            _ => true,
        }
    }

    /// Replace (or clear) a port's type constraint.
    ///
    /// If a live partner becomes incompatible under the new constraint, the
    /// child side is detached; its block is returned so the caller can nudge
    /// it clear of its former neighbours.
    pub fn set_check(
        &mut self,
        a: PortId,
        tags: Option<Vec<String>>,
    ) -> Result<Option<BlockId>, GraphError> {
        self.port_mut(a).check = tags;
        let Some(b) = self.port(a).partner else {
            return Ok(None);
        };
        if self.check_type(a, b) {
            return Ok(None);
        }
        let child = if self.port(a).kind.is_superior() {
            self.port(b).owner
        } else {
            self.port(a).owner
        };
        self.disconnect(a)?;
        Ok(Some(child))
    }

    /// The nearest eligible snap partner for `a` within `max_radius`, were
    /// `a` displaced by the drag offset `drag`.
    ///
    /// An already-linked initiator gets no candidate. Otherwise the
    /// opposite-kind index is searched outward from the displaced position,
    /// filtered by snap eligibility: occupied single-use ends and occupied
    /// splice-receiving ends with an immovable child are never offered, type
    /// constraints must intersect, and the candidate must not sit on `a`'s
    /// own block or an ancestor of it. The achieved radius is the distance to
    /// the hit, or `max_radius` unchanged on a miss.
    pub fn closest(&self, a: PortId, max_radius: f64, drag: Vec2) -> Nearest<PortId> {
        if self.port(a).partner.is_some() {
            return Nearest {
                key: None,
                radius: max_radius,
            };
        }
        let origin = self.port(a).pos + drag;
        let opposite = self.port(a).kind.opposite();
        self.indices[opposite.slot()].nearest_where(origin, max_radius, |c| {
            self.snap_eligible(a, c)
        })
    }

    /// All opposite-kind ports within `max_radius` of `a`, with no
    /// eligibility filtering. Used for collision avoidance only.
    pub fn neighbours(&self, a: PortId, max_radius: f64) -> Vec<PortId> {
        let opposite = self.port(a).kind.opposite();
        self.indices[opposite.slot()].in_radius(self.port(a).pos, max_radius)
    }

    /// Could dropping `a` here legally link it to `c`?
    ///
    /// Occupied single-use ends (outputs, previous-statement) are never
    /// offered. Occupied splice-receiving ends are offered only when the
    /// child they would displace is movable. Constraints must intersect, and
    /// the candidate must not sit on `a`'s own block, on a descendant of it,
    /// or on an ancestor of it.
    fn snap_eligible(&self, a: PortId, c: PortId) -> bool {
        if self.port(c).partner.is_some() {
            if self.port(c).kind.is_single_use() {
                return false;
            }
            let child = self
                .target_block(c)
                .expect("linked port has a target block");
            if !self.block_flags(child).contains(BlockFlags::MOVABLE) {
                return false;
            }
        }
        if !self.check_type(a, c) {
            return false;
        }
        let a_owner = self.port(a).owner;
        let c_owner = self.port(c).owner;
        // Candidate inside `a`'s subtree: linking would cycle the parent
        // chain.
        let mut cur = Some(c_owner);
        while let Some(blk) = cur {
            if blk == a_owner {
                return false;
            }
            cur = self.parent(blk);
        }
        // Candidate on `a`'s own ancestor chain.
        let mut cur = self.parent(a_owner);
        while let Some(blk) = cur {
            if blk == c_owner {
                return false;
            }
            cur = self.parent(blk);
        }
        true
    }

    /// Pull the partner's block so the two port positions coincide.
    ///
    /// Normally called on the superior side right after a snap, to seat the
    /// child exactly. The moved block must have a realized surface.
    pub fn tighten(&mut self, a: PortId) -> Result<(), GraphError> {
        let Some(b) = self.port(a).partner else {
            return Err(GraphError::NotLinked);
        };
        let target = self.port(b).owner;
        if !self.block_flags(target).contains(BlockFlags::RENDERED) {
            return Err(GraphError::NotRendered);
        }
        let delta = self.port(a).pos - self.port(b).pos;
        if delta != Vec2::ZERO {
            self.move_block_by(target, delta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockSpec, ValueShape};
    use alloc::string::ToString;
    use alloc::vec;
    use kurbo::Point;

    fn value_input() -> PortKind {
        PortKind::ValueInput(ValueShape::Plain)
    }

    fn value_output() -> PortKind {
        PortKind::ValueOutput(ValueShape::Plain)
    }

    // A statement block with previous and next ports, both indexed at `y`.
    fn stmt_block(g: &mut Graph, y: f64) -> (BlockId, PortId, PortId) {
        let b = g.add_block(BlockSpec::default());
        let prev = g.add_port(b, PortKind::PreviousStatement).unwrap();
        let next = g.add_port(b, PortKind::NextStatement).unwrap();
        g.move_to(prev, Point::new(0.0, y)).unwrap();
        g.move_to(next, Point::new(0.0, y + 10.0)).unwrap();
        (b, prev, next)
    }

    #[test]
    fn connect_rejects_same_block_and_kind_mismatch() {
        let mut g = Graph::new();
        let b = g.add_block(BlockSpec::default());
        let input = g.add_port(b, value_input()).unwrap();
        let output = g.add_port(b, value_output()).unwrap();
        assert_eq!(g.connect(output, input), Err(GraphError::SameBlock));

        let other = g.add_block(BlockSpec::default());
        let other_in = g.add_port(other, value_input()).unwrap();
        assert_eq!(g.connect(input, other_in), Err(GraphError::KindMismatch));
        // Grammatical shapes only pair with their own counterpart.
        let dative = g
            .add_port(other, PortKind::ValueOutput(ValueShape::Dative))
            .unwrap();
        assert_eq!(g.connect(dative, input), Err(GraphError::KindMismatch));
    }

    #[test]
    fn link_is_symmetric_and_sets_parent() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        let out = g.connect(output, input).unwrap();
        assert_eq!(out.displaced, None);
        assert_eq!(g.partner(input), Some(output));
        assert_eq!(g.partner(output), Some(input));
        assert_eq!(g.parent(child), Some(parent));
        assert_eq!(g.children(parent), &[child]);
    }

    #[test]
    fn connect_then_disconnect_round_trips() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.move_to(input, Point::new(0.0, 5.0)).unwrap();
        g.move_to(output, Point::new(0.0, 5.0)).unwrap();
        let before = (g.is_indexed(input), g.is_indexed(output));

        g.connect(output, input).unwrap();
        g.disconnect(output).unwrap();
        assert_eq!(g.partner(input), None);
        assert_eq!(g.partner(output), None);
        assert_eq!(g.parent(child), None);
        assert_eq!((g.is_indexed(input), g.is_indexed(output)), before);
    }

    #[test]
    fn disconnect_guards() {
        let mut g = Graph::new();
        let b = g.add_block(BlockSpec::default());
        let p = g.add_port(b, value_output()).unwrap();
        assert_eq!(g.disconnect(p), Err(GraphError::NotLinked));
    }

    #[test]
    fn type_gate_blocks_disjoint_constraints() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.set_check(input, Some(vec!["Number".to_string()])).unwrap();
        g.set_check(output, Some(vec!["String".to_string()])).unwrap();
        assert!(!g.check_type(input, output));
        assert_eq!(g.connect(output, input), Err(GraphError::CheckMismatch));

        // One intersecting tag is enough; an empty side accepts everything.
        g.set_check(output, Some(vec!["String".to_string(), "Number".to_string()]))
            .unwrap();
        assert!(g.check_type(input, output));
        g.set_check(input, None).unwrap();
        assert!(g.check_type(input, output));
    }

    #[test]
    fn value_splice_reattaches_orphan_through_input_chain() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let old_child = g.add_block(BlockSpec::default());
        let incoming = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let old_out = g.add_port(old_child, value_output()).unwrap();
        let new_out = g.add_port(incoming, value_output()).unwrap();
        let new_in = g.add_port(incoming, value_input()).unwrap();
        g.connect(old_out, input).unwrap();

        let out = g.connect(new_out, input).unwrap();
        assert_eq!(out.displaced, None, "orphan fits the incoming block's input");
        assert_eq!(g.partner(input), Some(new_out));
        assert_eq!(g.partner(new_in), Some(old_out));
        assert_eq!(g.parent(old_child), Some(incoming));
    }

    #[test]
    fn value_splice_displaces_orphan_when_no_slot_fits() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let old_child = g.add_block(BlockSpec::default());
        let incoming = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let old_out = g.add_port(old_child, value_output()).unwrap();
        let new_out = g.add_port(incoming, value_output()).unwrap();
        // Two compatible inputs: ambiguous, so no reattachment.
        g.add_port(incoming, value_input()).unwrap();
        g.add_port(incoming, value_input()).unwrap();
        g.connect(old_out, input).unwrap();

        let out = g.connect(new_out, input).unwrap();
        assert_eq!(
            out.displaced,
            Some(Displaced {
                port: old_out,
                anchor: input
            })
        );
        assert_eq!(g.partner(old_out), None);
        assert_eq!(g.parent(old_child), None);
    }

    #[test]
    fn mid_stack_insertion_keeps_downstream_chain() {
        // Root -> X -> Y -> Z, then W takes X's previous connection.
        let mut g = Graph::new();
        let root = g.add_block(BlockSpec::default());
        let root_next = g.add_port(root, PortKind::NextStatement).unwrap();
        let (x, x_prev, x_next) = stmt_block(&mut g, 20.0);
        let (y, y_prev, y_next) = stmt_block(&mut g, 40.0);
        let (z, z_prev, _) = stmt_block(&mut g, 60.0);
        g.move_to(root_next, Point::new(0.0, 10.0)).unwrap();
        g.connect(x_prev, root_next).unwrap();
        g.connect(y_prev, x_next).unwrap();
        g.connect(z_prev, y_next).unwrap();

        let (w, w_prev, w_next) = stmt_block(&mut g, 15.0);
        let out = g.connect(w_prev, root_next).unwrap();
        // W has a free tail, so X was spliced back in beneath it.
        assert_eq!(out.displaced, None);
        assert_eq!(g.partner(root_next), Some(w_prev));
        assert_eq!(g.partner(w_next), Some(x_prev));
        assert_eq!(g.parent(x), Some(w));
        assert_eq!(g.parent(w), Some(root));
        // Downstream untouched.
        assert_eq!(g.partner(x_next), Some(y_prev));
        assert_eq!(g.partner(y_next), Some(z_prev));
        assert_eq!(g.parent(y), Some(x));
        assert_eq!(g.parent(z), Some(y));
    }

    #[test]
    fn statement_splice_displaces_on_tail_type_mismatch() {
        let mut g = Graph::new();
        let root = g.add_block(BlockSpec::default());
        let root_next = g.add_port(root, PortKind::NextStatement).unwrap();
        let (x, x_prev, _) = stmt_block(&mut g, 20.0);
        g.move_to(root_next, Point::new(0.0, 10.0)).unwrap();
        g.connect(x_prev, root_next).unwrap();

        let (_, w_prev, w_next) = stmt_block(&mut g, 15.0);
        g.set_check(w_next, Some(vec!["loop".to_string()])).unwrap();
        g.set_check(x_prev, Some(vec!["plain".to_string()])).unwrap();

        let out = g.connect(w_prev, root_next).unwrap();
        assert_eq!(
            out.displaced,
            Some(Displaced {
                port: x_prev,
                anchor: root_next
            })
        );
        assert_eq!(g.parent(x), None);
    }

    #[test]
    fn mid_stack_insertion_refused_from_below() {
        let mut g = Graph::new();
        let root = g.add_block(BlockSpec::default());
        let root_next = g.add_port(root, PortKind::NextStatement).unwrap();
        let (_, x_prev, _) = stmt_block(&mut g, 20.0);
        g.move_to(root_next, Point::new(0.0, 10.0)).unwrap();
        g.connect(x_prev, root_next).unwrap();

        // Initiating with a next port against the occupied previous above.
        let (_, _, w_next) = stmt_block(&mut g, 5.0);
        assert_eq!(g.connect(w_next, x_prev), Err(GraphError::MidStackFromBelow));
    }

    #[test]
    fn occupied_single_use_end_is_never_offered() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.move_to(input, Point::new(0.0, 10.0)).unwrap();
        g.move_to(output, Point::new(0.0, 10.0)).unwrap();
        g.connect(output, input).unwrap();

        let probe_block = g.add_block(BlockSpec::default());
        let probe = g.add_port(probe_block, value_input()).unwrap();
        g.move_to(probe, Point::new(0.0, 12.0)).unwrap();
        // The only output in range is occupied.
        let got = g.closest(probe, 20.0, Vec2::ZERO);
        assert_eq!(got.key, None);
        assert_eq!(got.radius, 20.0);
    }

    #[test]
    fn occupied_input_with_immovable_child_is_ineligible() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec {
            flags: BlockFlags::empty(),
            ..BlockSpec::default()
        });
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.move_to(input, Point::new(0.0, 10.0)).unwrap();
        g.move_to(output, Point::new(0.0, 10.0)).unwrap();
        g.connect(output, input).unwrap();

        let drag_block = g.add_block(BlockSpec::default());
        let drag_out = g.add_port(drag_block, value_output()).unwrap();
        g.move_to(drag_out, Point::new(0.0, 12.0)).unwrap();
        let got = g.closest(drag_out, 20.0, Vec2::ZERO);
        assert_eq!(got.key, None, "immovable child blocks the splice");
        assert_eq!(got.radius, 20.0, "radius unchanged on a miss");
    }

    #[test]
    fn occupied_input_with_movable_child_is_offered() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.move_to(input, Point::new(0.0, 10.0)).unwrap();
        g.move_to(output, Point::new(0.0, 10.0)).unwrap();
        g.connect(output, input).unwrap();

        let drag_block = g.add_block(BlockSpec::default());
        let drag_out = g.add_port(drag_block, value_output()).unwrap();
        g.move_to(drag_out, Point::new(3.0, 14.0)).unwrap();
        let got = g.closest(drag_out, 20.0, Vec2::ZERO);
        assert_eq!(got.key, Some(input), "splicing in is legal");
        assert_eq!(got.radius, 5.0);
    }

    #[test]
    fn closest_applies_drag_offset() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        g.move_to(input, Point::new(100.0, 100.0)).unwrap();

        let drag_block = g.add_block(BlockSpec::default());
        let drag_out = g.add_port(drag_block, value_output()).unwrap();
        g.move_to(drag_out, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(g.closest(drag_out, 15.0, Vec2::ZERO).key, None);
        let got = g.closest(drag_out, 15.0, Vec2::new(97.0, 96.0));
        assert_eq!(got.key, Some(input));
        assert_eq!(got.radius, 5.0);
    }

    #[test]
    fn closest_skips_type_incompatible_candidates() {
        let mut g = Graph::new();
        let near_parent = g.add_block(BlockSpec::default());
        let near_in = g.add_port(near_parent, value_input()).unwrap();
        g.set_check(near_in, Some(vec!["String".to_string()])).unwrap();
        g.move_to(near_in, Point::new(0.0, 2.0)).unwrap();

        let far_parent = g.add_block(BlockSpec::default());
        let far_in = g.add_port(far_parent, value_input()).unwrap();
        g.set_check(far_in, Some(vec!["Number".to_string()])).unwrap();
        g.move_to(far_in, Point::new(0.0, 8.0)).unwrap();

        let drag_block = g.add_block(BlockSpec::default());
        let drag_out = g.add_port(drag_block, value_output()).unwrap();
        g.set_check(drag_out, Some(vec!["Number".to_string()])).unwrap();
        g.move_to(drag_out, Point::new(0.0, 0.0)).unwrap();

        let got = g.closest(drag_out, 20.0, Vec2::ZERO);
        assert_eq!(got.key, Some(far_in), "nearer but incompatible is passed over");
        assert_eq!(got.radius, 8.0);
    }

    #[test]
    fn closest_never_offers_self_or_ancestors() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let p_input = g.add_port(parent, value_input()).unwrap();
        let c_out = g.add_port(child, value_output()).unwrap();
        let c_input = g.add_port(child, value_input()).unwrap();
        g.move_to(p_input, Point::new(0.0, 10.0)).unwrap();
        g.move_to(c_out, Point::new(0.0, 10.0)).unwrap();
        g.connect(c_out, p_input).unwrap();

        // A probe input on a grandchild: every output in range sits on the
        // grandchild's own ancestor chain.
        let grand = g.add_block(BlockSpec::default());
        let g_out = g.add_port(grand, value_output()).unwrap();
        g.move_to(c_input, Point::new(0.0, 12.0)).unwrap();
        g.move_to(g_out, Point::new(0.0, 12.0)).unwrap();
        g.connect(g_out, c_input).unwrap();

        // A free output on the top ancestor, well inside the radius.
        let p_out = g.add_port(parent, value_output()).unwrap();
        g.move_to(p_out, Point::new(0.0, 11.0)).unwrap();

        let probe_in = g.add_port(grand, value_input()).unwrap();
        g.move_to(probe_in, Point::new(0.0, 11.0)).unwrap();
        let got = g.closest(probe_in, 50.0, Vec2::ZERO);
        assert_eq!(got.key, None, "all outputs in range are on ancestors");
    }

    #[test]
    fn closest_never_offers_own_descendants() {
        // B carries child C; B's free output must not be offered C's free
        // input, which would fold the tree back on itself.
        let mut g = Graph::new();
        let b = g.add_block(BlockSpec::default());
        let c = g.add_block(BlockSpec::default());
        let b_in = g.add_port(b, value_input()).unwrap();
        let c_out = g.add_port(c, value_output()).unwrap();
        g.connect(c_out, b_in).unwrap();

        let c_in = g.add_port(c, value_input()).unwrap();
        g.move_to(c_in, Point::new(0.0, 5.0)).unwrap();
        let b_out = g.add_port(b, value_output()).unwrap();
        g.move_to(b_out, Point::new(0.0, 5.0)).unwrap();

        let got = g.closest(b_out, 20.0, Vec2::ZERO);
        assert_eq!(got.key, None, "the only input in range is on B's child");
        assert_eq!(got.radius, 20.0);
    }

    #[test]
    fn connect_refuses_link_into_own_subtree() {
        let mut g = Graph::new();
        let b = g.add_block(BlockSpec::default());
        let c = g.add_block(BlockSpec::default());
        let d = g.add_block(BlockSpec::default());
        let b_in = g.add_port(b, value_input()).unwrap();
        let c_out = g.add_port(c, value_output()).unwrap();
        let c_in = g.add_port(c, value_input()).unwrap();
        let d_out = g.add_port(d, value_output()).unwrap();
        g.connect(c_out, b_in).unwrap();
        g.connect(d_out, c_in).unwrap();

        // Direct calls get the same refusal at any depth.
        let b_out = g.add_port(b, value_output()).unwrap();
        let d_in = g.add_port(d, value_input()).unwrap();
        assert_eq!(g.connect(b_out, d_in), Err(GraphError::WouldCycle));

        // The forest is untouched.
        assert_eq!(g.partner(b_out), None);
        assert_eq!(g.parent(b), None);
        assert_eq!(g.parent(c), Some(b));
        assert_eq!(g.parent(d), Some(c));
        assert_eq!(g.root_of(d), b);
    }

    #[test]
    fn linked_initiator_gets_no_candidate() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.move_to(input, Point::new(0.0, 0.0)).unwrap();
        g.move_to(output, Point::new(0.0, 0.0)).unwrap();
        g.connect(output, input).unwrap();
        let got = g.closest(output, 20.0, Vec2::ZERO);
        assert_eq!(got.key, None);
        assert_eq!(got.radius, 20.0);
    }

    #[test]
    fn neighbours_ignores_eligibility() {
        let mut g = Graph::new();
        let drag_block = g.add_block(BlockSpec::default());
        let drag_out = g.add_port(drag_block, value_output()).unwrap();
        g.move_to(drag_out, Point::new(0.0, 0.0)).unwrap();

        // An occupied input and a type-incompatible input, both in range.
        let p1 = g.add_block(BlockSpec::default());
        let in1 = g.add_port(p1, value_input()).unwrap();
        g.move_to(in1, Point::new(0.0, 5.0)).unwrap();
        let c1 = g.add_block(BlockSpec::default());
        let out1 = g.add_port(c1, value_output()).unwrap();
        g.move_to(out1, Point::new(0.0, 5.0)).unwrap();
        g.connect(out1, in1).unwrap();

        let p2 = g.add_block(BlockSpec::default());
        let in2 = g.add_port(p2, value_input()).unwrap();
        g.set_check(in2, Some(vec!["Array".to_string()])).unwrap();
        g.move_to(in2, Point::new(3.0, 4.0)).unwrap();
        g.set_check(drag_out, Some(vec!["Number".to_string()])).unwrap();

        let mut hits = g.neighbours(drag_out, 10.0);
        hits.sort_by_key(|p| p.0);
        let mut want = vec![in1, in2];
        want.sort_by_key(|p| p.0);
        assert_eq!(hits, want);
    }

    #[test]
    fn set_check_detaches_incompatible_child() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.set_check(output, Some(vec!["String".to_string()])).unwrap();
        g.connect(output, input).unwrap();

        let detached = g.set_check(input, Some(vec!["Number".to_string()])).unwrap();
        assert_eq!(detached, Some(child));
        assert_eq!(g.partner(input), None);
        assert_eq!(g.parent(child), None);

        // Compatible retightening detaches nothing.
        let kept = g.set_check(input, None).unwrap();
        assert_eq!(kept, None);
    }

    #[test]
    fn tighten_pulls_child_onto_superior_port() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec {
            flags: BlockFlags::MOVABLE | BlockFlags::RENDERED,
            ..BlockSpec::default()
        });
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.move_to(input, Point::new(10.0, 10.0)).unwrap();
        g.move_to(output, Point::new(13.0, 6.0)).unwrap();
        g.connect(output, input).unwrap();

        g.tighten(input).unwrap();
        assert_eq!(g.position(output), Point::new(10.0, 10.0));
    }

    #[test]
    fn tighten_requires_rendered_child() {
        let mut g = Graph::new();
        let parent = g.add_block(BlockSpec::default());
        let child = g.add_block(BlockSpec::default());
        let input = g.add_port(parent, value_input()).unwrap();
        let output = g.add_port(child, value_output()).unwrap();
        g.connect(output, input).unwrap();
        assert_eq!(g.tighten(input), Err(GraphError::NotRendered));
    }
}
