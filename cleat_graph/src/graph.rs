// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graph structure: block/port arenas, wiring, indexing, visibility.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Vec2};

use cleat_index::BandIndex;

use crate::damage::Damage;
use crate::error::GraphError;
use crate::types::{BlockFlags, BlockId, BlockSpec, NotchStyle, PartOfSpeech, PortId, PortKind};

#[derive(Clone, Debug)]
pub(crate) struct Block {
    generation: u32,
    pub(crate) parent: Option<BlockId>,
    pub(crate) children: Vec<BlockId>,
    pub(crate) origin: Point,
    pub(crate) flags: BlockFlags,
    pub(crate) part_of_speech: PartOfSpeech,
    pub(crate) inputs: Vec<PortId>,
    pub(crate) output: Option<PortId>,
    pub(crate) previous: Option<PortId>,
    pub(crate) next: Option<PortId>,
}

#[derive(Clone, Debug)]
pub(crate) struct Port {
    generation: u32,
    pub(crate) owner: BlockId,
    pub(crate) kind: PortKind,
    pub(crate) pos: Point,
    pub(crate) check: Option<Vec<String>>,
    pub(crate) partner: Option<PortId>,
    pub(crate) indexed: bool,
}

/// One workspace: blocks, their ports, and one spatial index per port kind.
///
/// Ids are arena-local, so two ports can only ever be linked when they belong
/// to the same workspace; the cross-workspace precondition of `connect` is
/// carried by the type system rather than checked at runtime.
pub struct Graph {
    blocks: Vec<Option<Block>>,
    block_generations: Vec<u32>,
    block_free: Vec<usize>,
    ports: Vec<Option<Port>>,
    port_generations: Vec<u32>,
    port_free: Vec<usize>,
    pub(crate) indices: [BandIndex<PortId>; PortKind::COUNT],
    pub(crate) damage: Damage,
}

impl core::fmt::Debug for Graph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let blocks_alive = self.blocks.iter().filter(|b| b.is_some()).count();
        let ports_alive = self.ports.iter().filter(|p| p.is_some()).count();
        let indexed: usize = self.indices.iter().map(BandIndex::len).sum();
        f.debug_struct("Graph")
            .field("blocks_alive", &blocks_alive)
            .field("ports_alive", &ports_alive)
            .field("indexed", &indexed)
            .finish_non_exhaustive()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            block_generations: Vec::new(),
            block_free: Vec::new(),
            ports: Vec::new(),
            port_generations: Vec::new(),
            port_free: Vec::new(),
            indices: core::array::from_fn(|_| BandIndex::new()),
            damage: Damage::default(),
        }
    }

    // --- construction and teardown ---

    /// Insert a new, unconnected block.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ids use 32-bit slot indices by design"
    )]
    pub fn add_block(&mut self, spec: BlockSpec) -> BlockId {
        let block = |generation| Block {
            generation,
            parent: None,
            children: Vec::new(),
            origin: spec.origin,
            flags: spec.flags,
            part_of_speech: spec.part_of_speech,
            inputs: Vec::new(),
            output: None,
            previous: None,
            next: None,
        };
        if let Some(idx) = self.block_free.pop() {
            let generation = self.block_generations[idx].saturating_add(1);
            self.block_generations[idx] = generation;
            self.blocks[idx] = Some(block(generation));
            BlockId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.blocks.push(Some(block(generation)));
            self.block_generations.push(generation);
            BlockId::new((self.blocks.len() - 1) as u32, generation)
        }
    }

    /// Give `block` a new port of the given kind.
    ///
    /// A block holds any number of value inputs (in order) but at most one
    /// output, previous, and next port.
    pub fn add_port(&mut self, block: BlockId, kind: PortKind) -> Result<PortId, GraphError> {
        let id = self.alloc_port(block, kind);
        let b = self.block_mut(block);
        match kind {
            PortKind::ValueInput(_) => b.inputs.push(id),
            PortKind::ValueOutput(_) => {
                if b.output.is_some() {
                    return self.dealloc_port(id, GraphError::RoleOccupied);
                }
                b.output = Some(id);
            }
            PortKind::PreviousStatement => {
                if b.previous.is_some() {
                    return self.dealloc_port(id, GraphError::RoleOccupied);
                }
                b.previous = Some(id);
            }
            PortKind::NextStatement => {
                if b.next.is_some() {
                    return self.dealloc_port(id, GraphError::RoleOccupied);
                }
                b.next = Some(id);
            }
        }
        Ok(id)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "ids use 32-bit slot indices by design"
    )]
    fn alloc_port(&mut self, owner: BlockId, kind: PortKind) -> PortId {
        let port = |generation| Port {
            generation,
            owner,
            kind,
            pos: Point::ZERO,
            check: None,
            partner: None,
            indexed: false,
        };
        if let Some(idx) = self.port_free.pop() {
            let generation = self.port_generations[idx].saturating_add(1);
            self.port_generations[idx] = generation;
            self.ports[idx] = Some(port(generation));
            PortId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.ports.push(Some(port(generation)));
            self.port_generations.push(generation);
            PortId::new((self.ports.len() - 1) as u32, generation)
        }
    }

    fn dealloc_port<T>(&mut self, id: PortId, err: GraphError) -> Result<T, GraphError> {
        self.ports[id.idx()] = None;
        self.port_free.push(id.idx());
        Err(err)
    }

    /// Permanently destroy an unconnected port.
    ///
    /// Destroying a port that still has a partner is a contract violation;
    /// disconnect first.
    pub fn dispose_port(&mut self, id: PortId) -> Result<(), GraphError> {
        if self.port(id).partner.is_some() {
            return Err(GraphError::StillLinked);
        }
        if self.port(id).indexed {
            self.unindex_port(id)?;
        }
        let owner = self.port(id).owner;
        let b = self.block_mut(owner);
        b.inputs.retain(|p| *p != id);
        if b.output == Some(id) {
            b.output = None;
        }
        if b.previous == Some(id) {
            b.previous = None;
        }
        if b.next == Some(id) {
            b.next = None;
        }
        self.ports[id.idx()] = None;
        self.port_free.push(id.idx());
        Ok(())
    }

    /// Remove a block and all of its ports. All ports must be unlinked.
    pub fn remove_block(&mut self, id: BlockId) -> Result<(), GraphError> {
        let ports = self.all_ports(id);
        if ports.iter().any(|p| self.port(*p).partner.is_some()) {
            return Err(GraphError::StillLinked);
        }
        for p in ports {
            self.dispose_port(p)?;
        }
        self.blocks[id.idx()] = None;
        self.block_free.push(id.idx());
        Ok(())
    }

    // --- internal arena access ---

    pub(crate) fn block(&self, id: BlockId) -> &Block {
        self.blocks[id.idx()].as_ref().expect("dangling BlockId")
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks[id.idx()].as_mut().expect("dangling BlockId")
    }

    pub(crate) fn port(&self, id: PortId) -> &Port {
        self.ports[id.idx()].as_ref().expect("dangling PortId")
    }

    pub(crate) fn port_mut(&mut self, id: PortId) -> &mut Port {
        self.ports[id.idx()].as_mut().expect("dangling PortId")
    }

    // --- liveness ---

    /// Returns true if `id` refers to a live block.
    pub fn is_alive_block(&self, id: BlockId) -> bool {
        self.blocks
            .get(id.idx())
            .and_then(|b| b.as_ref())
            .is_some_and(|b| b.generation == id.1)
    }

    /// Returns true if `id` refers to a live port.
    pub fn is_alive_port(&self, id: PortId) -> bool {
        self.ports
            .get(id.idx())
            .and_then(|p| p.as_ref())
            .is_some_and(|p| p.generation == id.1)
    }

    // --- tree structure ---

    /// The block's current parent edge, if any.
    pub fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.block(id).parent
    }

    /// Direct children, in attachment order.
    pub fn children(&self, id: BlockId) -> &[BlockId] {
        &self.block(id).children
    }

    /// Walk parent pointers to the root of the stack containing `id`.
    pub fn root_of(&self, id: BlockId) -> BlockId {
        let mut cur = id;
        while let Some(p) = self.block(cur).parent {
            cur = p;
        }
        cur
    }

    /// The block and every block beneath it, pre-order.
    pub fn descendants(&self, id: BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        stack.push(id);
        while let Some(b) = stack.pop() {
            out.push(b);
            for c in self.block(b).children.iter().rev() {
                stack.push(*c);
            }
        }
        out
    }

    pub(crate) fn set_parent(&mut self, child: BlockId, parent: Option<BlockId>) {
        if let Some(old) = self.block(child).parent {
            self.block_mut(old).children.retain(|c| *c != child);
            self.block_mut(child).parent = None;
        }
        if let Some(p) = parent {
            self.block_mut(p).children.push(child);
            self.block_mut(child).parent = Some(p);
        }
    }

    // --- port accessors ---

    /// The block that owns this port.
    pub fn owner(&self, id: PortId) -> BlockId {
        self.port(id).owner
    }

    /// The port's kind.
    pub fn kind(&self, id: PortId) -> PortKind {
        self.port(id).kind
    }

    /// Workspace position, authoritative only while indexed.
    pub fn position(&self, id: PortId) -> Point {
        self.port(id).pos
    }

    /// The linked partner, if any.
    pub fn partner(&self, id: PortId) -> Option<PortId> {
        self.port(id).partner
    }

    /// The block on the other side of this port's link, if any.
    pub fn target_block(&self, id: PortId) -> Option<BlockId> {
        self.port(id).partner.map(|p| self.port(p).owner)
    }

    /// Whether the port currently resides in its kind's index.
    pub fn is_indexed(&self, id: PortId) -> bool {
        self.port(id).indexed
    }

    /// The port's type-constraint tags. `None` accepts anything.
    pub fn check(&self, id: PortId) -> Option<&[String]> {
        self.port(id).check.as_deref()
    }

    /// The block's ordered value inputs.
    pub fn inputs(&self, id: BlockId) -> &[PortId] {
        &self.block(id).inputs
    }

    /// The block's output port, if any.
    pub fn output(&self, id: BlockId) -> Option<PortId> {
        self.block(id).output
    }

    /// The block's previous-statement port, if any.
    pub fn previous(&self, id: BlockId) -> Option<PortId> {
        self.block(id).previous
    }

    /// The block's next-statement port, if any.
    pub fn next(&self, id: BlockId) -> Option<PortId> {
        self.block(id).next
    }

    /// Every port of the block: inputs in order, then output, previous, next.
    pub fn all_ports(&self, id: BlockId) -> Vec<PortId> {
        let b = self.block(id);
        let mut out = b.inputs.clone();
        out.extend(b.output);
        out.extend(b.previous);
        out.extend(b.next);
        out
    }

    // --- block state ---

    /// The block's flags.
    pub fn block_flags(&self, id: BlockId) -> BlockFlags {
        self.block(id).flags
    }

    /// Replace the block's flags.
    pub fn set_block_flags(&mut self, id: BlockId, flags: BlockFlags) {
        self.block_mut(id).flags = flags;
    }

    /// The block's workspace anchor.
    pub fn origin(&self, id: BlockId) -> Point {
        self.block(id).origin
    }

    /// The block's part of speech.
    pub fn part_of_speech(&self, id: BlockId) -> PartOfSpeech {
        self.block(id).part_of_speech
    }

    /// The highlight geometry class for a port, resolved against its owner.
    pub fn notch_style(&self, id: PortId) -> NotchStyle {
        let p = self.port(id);
        p.kind.notch(self.block(p.owner).part_of_speech)
    }

    // --- index discipline ---

    pub(crate) fn index_port(&mut self, id: PortId) -> Result<(), GraphError> {
        let p = self.port(id);
        if p.indexed {
            return Err(GraphError::AlreadyIndexed);
        }
        let (kind, pos) = (p.kind, p.pos);
        self.indices[kind.slot()].insert(id, pos);
        self.port_mut(id).indexed = true;
        Ok(())
    }

    pub(crate) fn unindex_port(&mut self, id: PortId) -> Result<(), GraphError> {
        let p = self.port(id);
        if !p.indexed {
            return Err(GraphError::NotIndexed);
        }
        let (kind, pos) = (p.kind, p.pos);
        self.indices[kind.slot()]
            .remove(id, pos)
            .map_err(|_| GraphError::IndexDesync)?;
        self.port_mut(id).indexed = false;
        Ok(())
    }

    /// Move a port to an absolute position and (re)insert it into its index.
    ///
    /// This is how a port first becomes indexed: layout establishes its
    /// absolute position and calls here.
    pub fn move_to(&mut self, id: PortId, pos: Point) -> Result<(), GraphError> {
        if self.port(id).indexed {
            self.unindex_port(id)?;
        }
        self.port_mut(id).pos = pos;
        self.index_port(id)
    }

    /// Move a port by a delta. See [`Self::move_to`].
    pub fn move_by(&mut self, id: PortId, delta: Vec2) -> Result<(), GraphError> {
        let pos = self.port(id).pos + delta;
        self.move_to(id, pos)
    }

    /// Displace a block and its whole subtree, shifting every port with it.
    ///
    /// Hidden ports move without regaining index membership.
    pub fn move_block_by(&mut self, id: BlockId, delta: Vec2) -> Result<(), GraphError> {
        for b in self.descendants(id) {
            self.block_mut(b).origin += delta;
            for c in self.all_ports(b) {
                let was_indexed = self.port(c).indexed;
                if was_indexed {
                    self.unindex_port(c)?;
                }
                self.port_mut(c).pos += delta;
                if was_indexed {
                    self.index_port(c)?;
                }
            }
        }
        self.damage_render(id);
        Ok(())
    }

    // --- visibility ---

    /// Hide this port and every port of the attached subtree.
    ///
    /// Called when a block collapses. Removes index membership without
    /// destroying anything; already-hidden ports are left alone, so hiding an
    /// already-hidden subtree is a no-op. Decoration-hide damage is recorded
    /// for every block in the subtree.
    pub fn hide_all(&mut self, id: PortId) -> Result<(), GraphError> {
        if self.port(id).indexed {
            self.unindex_port(id)?;
        }
        if let Some(p) = self.port(id).partner {
            let child = self.port(p).owner;
            for b in self.descendants(child) {
                for c in self.all_ports(b) {
                    if self.port(c).indexed {
                        self.unindex_port(c)?;
                    }
                }
                self.damage.decor_hidden.push(b);
            }
        }
        Ok(())
    }

    /// Unhide this port and the attached subtree; returns the blocks to
    /// re-render.
    ///
    /// Only descends through container roles (value inputs and
    /// next-statement), since only their children can hide subtrees of their
    /// own. A collapsed descendant is only partially revealed: its output,
    /// next, and previous ports resurface, its inner ports stay hidden.
    ///
    /// The returned list holds only leaf blocks. Rendering a leaf re-renders
    /// its ancestors, so rendering every revealed block would be redundant.
    pub fn unhide_all(&mut self, id: PortId) -> Result<Vec<BlockId>, GraphError> {
        if !self.port(id).indexed {
            self.index_port(id)?;
        }
        let mut render = Vec::new();
        if !self.port(id).kind.is_container() {
            return Ok(render);
        }
        let Some(p) = self.port(id).partner else {
            return Ok(render);
        };
        let block = self.port(p).owner;
        let ports: Vec<PortId> = if self.block(block).flags.contains(BlockFlags::COLLAPSED) {
            let b = self.block(block);
            b.output.into_iter().chain(b.next).chain(b.previous).collect()
        } else {
            self.all_ports(block)
        };
        for c in ports {
            render.extend(self.unhide_all(c)?);
        }
        if render.is_empty() {
            render.push(block);
        }
        Ok(render)
    }

    // --- index inspection ---

    /// Number of indexed ports of the given kind.
    pub fn indexed_count(&self, kind: PortKind) -> usize {
        self.indices[kind.slot()].len()
    }

    /// Sorted entries of the given kind's index, for invariant checks.
    pub fn index_entries(&self, kind: PortKind) -> impl Iterator<Item = (PortId, Point)> + '_ {
        self.indices[kind.slot()].iter()
    }

    // --- damage ---

    /// Record that a block was raised to the top of the stacking order.
    pub fn raise(&mut self, id: BlockId) {
        if self.block(id).flags.contains(BlockFlags::RENDERED) {
            self.damage.raised.push(id);
        }
    }

    pub(crate) fn damage_render(&mut self, id: BlockId) {
        if self.block(id).flags.contains(BlockFlags::RENDERED) {
            self.damage.render.push(id);
        }
    }

    pub(crate) fn damage_refresh(&mut self, id: BlockId) {
        if self.block(id).flags.contains(BlockFlags::RENDERED) {
            self.damage.refresh_disabled.push(id);
        }
    }

    /// Drain the pending damage lists.
    pub fn take_damage(&mut self) -> Damage {
        core::mem::take(&mut self.damage)
    }
}
