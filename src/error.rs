//! # Tree errors
//!
//! `TreeError` is returned by the tree primitives and by the set operations
//! that can fail.

use thiserror::Error;

/// Tree error
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TreeError {
    /// A node was required but an absent link was given.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A structural precondition of the operation does not hold.
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// The key is already present in the tree.
    #[error("The key is already present in the tree.")]
    DuplicateKey,
    /// The key is not present in the tree.
    #[error("The key is not present in the tree.")]
    KeyNotFound,
    /// Validation found a broken link, ordering or balancing invariant.
    #[error("The tree is corrupted: {0}")]
    Corrupted(&'static str),
}
