use std::fmt;

use crate::binary_tree::{NodeId, Tree};
use crate::error::TreeError;

pub trait TreeOps<T> {
    fn insert(&mut self, value: T) -> bool;
    fn contains(&self, value: &T) -> bool;
    fn remove(&mut self, value: &T) -> bool;
    fn len(&self) -> usize;
    fn validate(&self) -> Result<(), TreeError>;
}

/// A balancing strategy plugged into [`Tree`].
///
/// The engine owns the arena, the root and the size counter. A strategy only
/// decides where a new node goes and how the tree is restructured around an
/// insertion or a removal, using the primitives of [`Tree`].
pub trait Balance<T: Ord>: Sized {
    /// Per-node bookkeeping, e.g. the node color of a red-black tree.
    type Tag: Copy + PartialEq + fmt::Debug;

    /// Links a new node holding `value` into the tree and returns it.
    ///
    /// Returns [`TreeError::DuplicateKey`] without touching the tree if the
    /// value is already present.
    fn insert(tree: &mut Tree<T, Self>, value: T) -> Result<NodeId, TreeError>;

    /// Unlinks `node` from the tree. The engine releases the node afterwards.
    fn remove(tree: &mut Tree<T, Self>, node: NodeId) -> Result<(), TreeError>;

    /// Checks strategy specific invariants.
    fn validate(_tree: &Tree<T, Self>) -> Result<(), TreeError> {
        Ok(())
    }
}
