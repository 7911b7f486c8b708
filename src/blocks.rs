//! Block chaining: fuse runs of stops that must stay adjacent.
//!
//! A block remembers the positions of its first and last member in the
//! chained sequence, which is what inter-block cost lookups use.

use crate::traits::{StopKind, TravelMode};

/// An ordered run of one or more ids that moves as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<I> {
    members: Vec<I>,
    first: usize,
    last: usize,
}

impl<I> Block<I> {
    fn single(id: I, position: usize) -> Self {
        Self {
            members: vec![id],
            first: position,
            last: position,
        }
    }

    pub fn members(&self) -> &[I] {
        &self.members
    }

    /// Position of the first member in the chained sequence.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Position of the last member in the chained sequence.
    pub fn last(&self) -> usize {
        self.last
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Group `ids` into blocks.
///
/// `locked(prev, id, mode)` is asked for every element after the first,
/// with `mode` being the travel mode into `id` (`modes[i]`, defaulting to
/// driving when `modes` is short). Returning true attaches `id` to the
/// block currently ending in `prev`.
pub fn chain<I, F>(ids: &[I], modes: &[TravelMode], mut locked: F) -> Vec<Block<I>>
where
    I: Clone,
    F: FnMut(&I, &I, TravelMode) -> bool,
{
    let mut blocks: Vec<Block<I>> = Vec::new();

    for (position, id) in ids.iter().enumerate() {
        let mode = modes.get(position).copied().unwrap_or_default();
        match blocks.last_mut() {
            Some(tail) if position > 0 && locked(&ids[position - 1], id, mode) => {
                tail.members.push(id.clone());
                tail.last = position;
            }
            _ => blocks.push(Block::single(id.clone(), position)),
        }
    }

    blocks
}

/// Flatten blocks back into a sequence, preserving in-block order.
pub fn expand<I: Clone>(blocks: &[Block<I>]) -> Vec<I> {
    blocks.iter().flat_map(|block| block.members.iter().cloned()).collect()
}

/// An airport-to-airport leg explicitly flown must never be split.
pub fn is_flight_hop(prev: StopKind, current: StopKind, mode_into_current: TravelMode) -> bool {
    prev == StopKind::Airport && current == StopKind::Airport && mode_into_current == TravelMode::Flight
}
