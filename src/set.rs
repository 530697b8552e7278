use std::fmt;

use crate::binary_tree::{IntoIter, Iter, Tree};
use crate::error::TreeError;
use crate::red_black::RedBlack;
use crate::tree::{Balance, TreeOps};
use crate::unbalanced::Unbalanced;

/// An ordered set of unique values.
///
/// Iteration yields the values in ascending order. The set is backed by a
/// [`Tree`] balanced with `B`.
///
/// ```
/// use ordered_tree_set::RedBlackSet;
///
/// let mut set: RedBlackSet<i32> = [3, 1, 2, 3].into_iter().collect();
/// assert_eq!(set.len(), 3);
/// assert!(set.add(4));
/// assert!(!set.add(1));
/// set.discard(&2);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 4]);
/// ```
pub struct OrderedSet<T: Ord, B: Balance<T> = RedBlack> {
    tree: Tree<T, B>,
}

pub type RedBlackSet<T> = OrderedSet<T, RedBlack>;

pub type UnbalancedSet<T> = OrderedSet<T, Unbalanced>;

impl<T: Ord, B: Balance<T>> OrderedSet<T, B> {
    pub fn new() -> Self {
        OrderedSet { tree: Tree::new() }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    /// Adds `value` and returns `true`, or returns `false` if it was already
    /// present.
    pub fn add(&mut self, value: T) -> bool {
        match self.tree.insert(value) {
            Ok(()) => true,
            Err(TreeError::DuplicateKey) => false,
            Err(err) => unreachable!("insertion failed: {err}"),
        }
    }

    /// Removes `value`, failing with [`TreeError::KeyNotFound`] if it is not
    /// present.
    pub fn remove(&mut self, value: &T) -> Result<(), TreeError> {
        self.tree.remove(value).map(drop)
    }

    /// Removes `value` if present. Returns whether anything was removed.
    pub fn discard(&mut self, value: &T) -> bool {
        match self.tree.remove(value) {
            Ok(_) => true,
            Err(TreeError::KeyNotFound) => false,
            Err(err) => unreachable!("removal failed: {err}"),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T, B> {
        self.tree.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        self.tree.validate()
    }
}

impl<T: Ord, B: Balance<T>> TreeOps<T> for OrderedSet<T, B> {
    fn insert(&mut self, value: T) -> bool {
        self.add(value)
    }

    fn contains(&self, value: &T) -> bool {
        OrderedSet::contains(self, value)
    }

    fn remove(&mut self, value: &T) -> bool {
        self.discard(value)
    }

    fn len(&self) -> usize {
        OrderedSet::len(self)
    }

    fn validate(&self) -> Result<(), TreeError> {
        OrderedSet::validate(self)
    }
}

impl<T: Ord, B: Balance<T>> Default for OrderedSet<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord, B: Balance<T>> FromIterator<T> for OrderedSet<T, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord, B: Balance<T>> Extend<T> for OrderedSet<T, B> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord, B: Balance<T>> IntoIterator for OrderedSet<T, B> {
    type Item = T;
    type IntoIter = IntoIter<T, B>;

    fn into_iter(self) -> IntoIter<T, B> {
        self.tree.into_iter()
    }
}

impl<'a, T: Ord, B: Balance<T>> IntoIterator for &'a OrderedSet<T, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B>;

    fn into_iter(self) -> Iter<'a, T, B> {
        self.iter()
    }
}

impl<T: fmt::Debug + Ord, B: Balance<T>> fmt::Debug for OrderedSet<T, B> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}
