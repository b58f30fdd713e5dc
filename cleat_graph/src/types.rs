// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: block and port identifiers, port kinds, flags.

use kurbo::Point;

/// Identifier for a block in the graph.
///
/// This is a small, copyable handle that stays stable across updates but
/// becomes invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `BlockId` that pointed to that
///   slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new,
///   distinct `BlockId`.
///
/// Use [`Graph::is_alive_block`](crate::Graph::is_alive_block) to check
/// whether a `BlockId` still refers to a live block. Stale ids never alias a
/// different live block because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlockId(pub(crate) u32, pub(crate) u32);

impl BlockId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a port (connection point) in the graph.
///
/// Same generational semantics as [`BlockId`]; see
/// [`Graph::is_alive_port`](crate::Graph::is_alive_port).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PortId(pub(crate) u32, pub(crate) u32);

impl PortId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Visual notch family of a value port, determining which output it pairs
/// with.
///
/// `Plain` is the classic puzzle tab. The grammatical shapes behave exactly
/// like `Plain` for connection mechanics but each pairs only with its own
/// counterpart, so e.g. a genitive output never snaps into a dative input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueShape {
    /// The default puzzle-tab shape.
    Plain,
    /// Nominative case.
    Nominative,
    /// Genitive case.
    Genitive,
    /// Dative case.
    Dative,
    /// Accusative case.
    Accusative,
    /// Ablative case.
    Ablative,
    /// Vocative case.
    Vocative,
}

impl ValueShape {
    /// All shapes, in table order.
    pub const ALL: [Self; 7] = [
        Self::Plain,
        Self::Nominative,
        Self::Genitive,
        Self::Dative,
        Self::Accusative,
        Self::Ablative,
        Self::Vocative,
    ];

    const fn idx(self) -> usize {
        match self {
            Self::Plain => 0,
            Self::Nominative => 1,
            Self::Genitive => 2,
            Self::Dative => 3,
            Self::Accusative => 4,
            Self::Ablative => 5,
            Self::Vocative => 6,
        }
    }
}

/// The role of a port.
///
/// Sixteen kinds in total: seven value shapes on each of the input and output
/// sides, plus the two statement roles. Each kind links only to its exact
/// [`opposite`](Self::opposite); the per-kind spatial indices are keyed by
/// [`slot`](Self::slot).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PortKind {
    /// A value socket on a parent block (superior side).
    ValueInput(ValueShape),
    /// A value plug on a child block (inferior side).
    ValueOutput(ValueShape),
    /// The top of a statement block (inferior side).
    PreviousStatement,
    /// The bottom of a statement block (superior side).
    NextStatement,
}

impl PortKind {
    /// Number of distinct kinds (and of per-workspace indices).
    pub const COUNT: usize = 16;

    /// All kinds, in [`slot`](Self::slot) order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::PreviousStatement,
        Self::NextStatement,
        Self::ValueInput(ValueShape::Plain),
        Self::ValueOutput(ValueShape::Plain),
        Self::ValueInput(ValueShape::Nominative),
        Self::ValueOutput(ValueShape::Nominative),
        Self::ValueInput(ValueShape::Genitive),
        Self::ValueOutput(ValueShape::Genitive),
        Self::ValueInput(ValueShape::Dative),
        Self::ValueOutput(ValueShape::Dative),
        Self::ValueInput(ValueShape::Accusative),
        Self::ValueOutput(ValueShape::Accusative),
        Self::ValueInput(ValueShape::Ablative),
        Self::ValueOutput(ValueShape::Ablative),
        Self::ValueInput(ValueShape::Vocative),
        Self::ValueOutput(ValueShape::Vocative),
    ];

    /// The only kind this kind may link to.
    ///
    /// Value shapes pair with their own counterpart and never across shapes;
    /// the statement roles pair with each other.
    pub const fn opposite(self) -> Self {
        match self {
            Self::ValueInput(s) => Self::ValueOutput(s),
            Self::ValueOutput(s) => Self::ValueInput(s),
            Self::PreviousStatement => Self::NextStatement,
            Self::NextStatement => Self::PreviousStatement,
        }
    }

    /// Does this kind belong to the superior (parent) side of a link?
    pub const fn is_superior(self) -> bool {
        matches!(self, Self::ValueInput(_) | Self::NextStatement)
    }

    /// True for both sides of the value family, any shape.
    pub const fn is_value(self) -> bool {
        matches!(self, Self::ValueInput(_) | Self::ValueOutput(_))
    }

    /// True for the statement roles.
    pub const fn is_statement(self) -> bool {
        matches!(self, Self::PreviousStatement | Self::NextStatement)
    }

    /// True for the value-input family, any shape.
    pub const fn is_value_input(self) -> bool {
        matches!(self, Self::ValueInput(_))
    }

    /// Single-use end: a plug that is never offered once occupied.
    pub(crate) const fn is_single_use(self) -> bool {
        matches!(self, Self::ValueOutput(_) | Self::PreviousStatement)
    }

    /// Container role: a kind whose attached child may itself hide a subtree.
    pub(crate) const fn is_container(self) -> bool {
        matches!(self, Self::ValueInput(_) | Self::NextStatement)
    }

    /// Dense table index, used to select the per-kind spatial index.
    pub const fn slot(self) -> usize {
        match self {
            Self::PreviousStatement => 0,
            Self::NextStatement => 1,
            Self::ValueInput(s) => 2 + 2 * s.idx(),
            Self::ValueOutput(s) => 3 + 2 * s.idx(),
        }
    }

    /// The highlight geometry class for this kind.
    ///
    /// Statement clamps vary by the owning block's part of speech; value
    /// notches depend only on the shape.
    pub const fn notch(self, pos: PartOfSpeech) -> NotchStyle {
        match self {
            Self::ValueInput(s) | Self::ValueOutput(s) => match s {
                ValueShape::Plain => NotchStyle::Tab,
                ValueShape::Nominative => NotchStyle::StemlessTab,
                ValueShape::Genitive => NotchStyle::Cross,
                ValueShape::Dative => NotchStyle::Rect,
                ValueShape::Accusative => NotchStyle::Circle,
                ValueShape::Ablative => NotchStyle::Triangle,
                ValueShape::Vocative => NotchStyle::Funnel,
            },
            Self::PreviousStatement | Self::NextStatement => match pos {
                PartOfSpeech::Noun => NotchStyle::CircularClamp,
                PartOfSpeech::Verb => NotchStyle::RectangularClamp,
            },
        }
    }
}

/// Geometry class the rendering layer uses when drawing a hover highlight.
///
/// This crate exposes the class only; path generation stays with the renderer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NotchStyle {
    /// Puzzle tab with a stem.
    Tab,
    /// Puzzle tab without a stem (nominative inline pieces).
    StemlessTab,
    /// Cross-shaped notch.
    Cross,
    /// Rectangular notch.
    Rect,
    /// Circular notch.
    Circle,
    /// Triangular notch.
    Triangle,
    /// Funnel-shaped notch.
    Funnel,
    /// Stack clamp drawn with circular jaws (nouns).
    CircularClamp,
    /// Stack clamp drawn with rectangular jaws (verbs).
    RectangularClamp,
}

/// Part of speech of a block, which selects its statement clamp style.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PartOfSpeech {
    /// Noun blocks clamp with circular jaws.
    Noun,
    /// Verb blocks clamp with rectangular jaws.
    #[default]
    Verb,
}

bitflags::bitflags! {
    /// Block state consulted by connection policy.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        /// The block may be displaced (bumps, drags).
        const MOVABLE   = 0b0000_0001;
        /// The block has a realized visual surface; damage is only recorded
        /// for rendered blocks.
        const RENDERED  = 0b0000_0010;
        /// The block is collapsed; its subtree's ports are hidden.
        const COLLAPSED = 0b0000_0100;
        /// The block lives in a non-interactive preview tray and is never
        /// bumped.
        const IN_TRAY   = 0b0000_1000;
    }
}

impl Default for BlockFlags {
    fn default() -> Self {
        Self::MOVABLE
    }
}

/// Initial state for a new block.
#[derive(Clone, Debug)]
pub struct BlockSpec {
    /// Workspace position of the block's anchor.
    pub origin: Point,
    /// Initial flags.
    pub flags: BlockFlags,
    /// Part of speech, for clamp-style selection.
    pub part_of_speech: PartOfSpeech,
}

impl Default for BlockSpec {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            flags: BlockFlags::default(),
            part_of_speech: PartOfSpeech::default(),
        }
    }
}
