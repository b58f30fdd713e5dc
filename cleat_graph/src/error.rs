// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract-violation errors.
//!
//! Every variant is a programming error on the caller's side or evidence of
//! index corruption, never an expected runtime condition. Callers abort the
//! in-progress gesture; nothing here is retried.

/// Failure modes of graph operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Disposing a port that still has a partner.
    #[error("port is still linked; disconnect it first")]
    StillLinked,
    /// Disconnecting a port that has no partner.
    #[error("port is not linked")]
    NotLinked,
    /// Connecting a port that already has a partner.
    #[error("port is already linked")]
    AlreadyLinked,
    /// The partner's back-link does not point at this port.
    #[error("link is asymmetric; partner does not point back")]
    BrokenBackLink,
    /// Inserting a port that is already in its kind's index.
    #[error("port is already indexed")]
    AlreadyIndexed,
    /// Removing a port that is not in its kind's index.
    #[error("port is not indexed")]
    NotIndexed,
    /// The index and the port's bookkeeping disagree.
    #[error("spatial index is out of sync")]
    IndexDesync,
    /// Both ports belong to the same block.
    #[error("cannot link two ports of the same block")]
    SameBlock,
    /// The two kinds are not exact opposites.
    #[error("port kinds are not opposites")]
    KindMismatch,
    /// Both sides carry non-empty, disjoint type constraints.
    #[error("type constraints do not intersect")]
    CheckMismatch,
    /// Mid-stack insertion attempted from a port other than the incoming
    /// block's previous-statement port.
    #[error("mid-stack insertion requires the top of the incoming block")]
    MidStackFromBelow,
    /// A displaced child lacks the port needed to reattach it.
    #[error("orphan block is missing its superior-facing port")]
    OrphanWithoutPort,
    /// Linking would make a block an ancestor of itself.
    #[error("link would create a cycle of parent links")]
    WouldCycle,
    /// The block already has a port in that role.
    #[error("block already has a port in that role")]
    RoleOccupied,
    /// The operation needs a realized visual surface the block does not have.
    #[error("block has not been rendered")]
    NotRendered,
}
