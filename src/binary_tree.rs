use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::error::TreeError;
use crate::red_black::RedBlack;
use crate::tree::Balance;

/// Index of a node in the arena of a [`Tree`].
///
/// An id stays valid until the node is released, even when rotations or
/// replacements move the node around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

pub(crate) type Link = Option<NodeId>;

/// Generic ordered tree. Balancing is delegated to `B`.
pub struct Tree<T: Ord, B: Balance<T> = RedBlack> {
    nodes: Vec<Option<Node<T, B::Tag>>>,
    free: Vec<usize>,
    root: Link,
    len: usize,
    _marker: PhantomData<B>,
}

struct Node<T, C> {
    value: T,
    tag: C,
    parent: Link,
    left: Link,
    right: Link,
}

/// Position a new value would be attached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Root,
    Left(NodeId),
    Right(NodeId),
}

pub struct IntoIter<T: Ord, B: Balance<T>> {
    tree: Tree<T, B>,
}

pub struct Iter<'a, T: Ord, B: Balance<T>> {
    tree: &'a Tree<T, B>,
    next: Link,
    remaining: usize,
}

impl<T: Ord, B: Balance<T>> Tree<T, B> {
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_some()
    }

    /// Inserts `value`, failing with [`TreeError::DuplicateKey`] if it is
    /// already present.
    pub fn insert(&mut self, value: T) -> Result<(), TreeError> {
        B::insert(self, value)?;
        self.len += 1;
        Ok(())
    }

    /// Removes `value` and returns the stored value, failing with
    /// [`TreeError::KeyNotFound`] if it is not present.
    pub fn remove(&mut self, value: &T) -> Result<T, TreeError> {
        let node = self.find_node(value).ok_or(TreeError::KeyNotFound)?;
        self.remove_node(node)
    }

    pub fn first(&self) -> Option<&T> {
        self.root.map(|root| self.value(self.min_of(root)))
    }

    pub fn last(&self) -> Option<&T> {
        self.root.map(|root| self.value(self.max_of(root)))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            for child in [self.left(id), self.right(id)].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    pub fn iter(&self) -> Iter<'_, T, B> {
        Iter {
            tree: self,
            next: self.root.map(|root| self.min_of(root)),
            remaining: self.len,
        }
    }

    /// Checks that parent and child links agree, that the values are in
    /// strictly increasing order and that the size counter matches, then runs
    /// the checks of the balancing strategy.
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut count = 0;
        if let Some(root) = self.root {
            if self.parent(root).is_some() {
                return Err(TreeError::Corrupted("root has a parent"));
            }
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                count += 1;
                if count > self.nodes.len() {
                    return Err(TreeError::Corrupted("cycle in child links"));
                }
                for child in [self.left(id), self.right(id)].into_iter().flatten() {
                    if self.parent(child) != Some(id) {
                        return Err(TreeError::Corrupted("child does not link back to its parent"));
                    }
                    stack.push(child);
                }
            }
        }
        if count != self.len {
            return Err(TreeError::Corrupted("size counter does not match the node count"));
        }

        let mut prev: Option<&T> = None;
        for value in self.iter() {
            if prev.is_some_and(|prev| prev >= value) {
                return Err(TreeError::Corrupted("values are not in increasing order"));
            }
            prev = Some(value);
        }

        B::validate(self)
    }

    fn remove_node(&mut self, node: NodeId) -> Result<T, TreeError> {
        B::remove(self, node)?;
        self.len -= 1;
        Ok(self.release_node(node))
    }

    pub(crate) fn node_for_value(&mut self, value: T, tag: B::Tag) -> NodeId {
        let node = Node {
            value,
            tag,
            parent: None,
            left: None,
            right: None,
        };
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release_node(&mut self, id: NodeId) -> T {
        match self.nodes[id.0].take() {
            Some(node) => {
                self.free.push(id.0);
                node.value
            }
            None => unreachable!("node {id:?} released twice"),
        }
    }

    fn node(&self, id: NodeId) -> &Node<T, B::Tag> {
        match &self.nodes[id.0] {
            Some(node) => node,
            None => unreachable!("stale node id {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T, B::Tag> {
        match &mut self.nodes[id.0] {
            Some(node) => node,
            None => unreachable!("stale node id {id:?}"),
        }
    }

    pub(crate) fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    pub(crate) fn tag(&self, id: NodeId) -> B::Tag {
        self.node(id).tag
    }

    pub(crate) fn set_tag(&mut self, id: NodeId, tag: B::Tag) {
        self.node_mut(id).tag = tag;
    }

    pub(crate) fn parent(&self, id: NodeId) -> Link {
        self.node(id).parent
    }

    pub(crate) fn left(&self, id: NodeId) -> Link {
        self.node(id).left
    }

    pub(crate) fn right(&self, id: NodeId) -> Link {
        self.node(id).right
    }

    pub(crate) fn is_left_child(&self, id: NodeId) -> bool {
        self.parent(id).is_some_and(|parent| self.left(parent) == Some(id))
    }

    pub(crate) fn find_node(&self, value: &T) -> Link {
        let mut cur = self.root;
        while let Some(id) = cur {
            match value.cmp(self.value(id)) {
                Ordering::Less => cur = self.left(id),
                Ordering::Greater => cur = self.right(id),
                Ordering::Equal => return cur,
            }
        }
        None
    }

    pub(crate) fn find_new_parent_node(&self, value: &T) -> Result<Slot, TreeError> {
        let mut slot = Slot::Root;
        let mut cur = self.root;
        while let Some(id) = cur {
            match value.cmp(self.value(id)) {
                Ordering::Less => {
                    slot = Slot::Left(id);
                    cur = self.left(id);
                }
                Ordering::Greater => {
                    slot = Slot::Right(id);
                    cur = self.right(id);
                }
                Ordering::Equal => return Err(TreeError::DuplicateKey),
            }
        }
        Ok(slot)
    }

    /// Links a fresh node at a slot returned by `find_new_parent_node`.
    pub(crate) fn attach(&mut self, slot: Slot, node: NodeId) -> Result<(), TreeError> {
        match slot {
            Slot::Root if self.root.is_none() => {
                self.root = Some(node);
                Ok(())
            }
            Slot::Root => Err(TreeError::InvalidOperation("the tree already has a root")),
            Slot::Left(parent) => self.replace_left_subtree(Some(parent), Some(node)),
            Slot::Right(parent) => self.replace_right_subtree(Some(parent), Some(node)),
        }
    }

    pub(crate) fn in_order_successor(&self, node: Link) -> Result<Link, TreeError> {
        let node = node.ok_or(TreeError::InvalidArgument("node must not be absent"))?;
        Ok(self.after(node))
    }

    /// Whether `lower` is `upper` or one of its descendants. An absent
    /// `upper` contains nothing; an absent `lower` is contained by any node.
    pub(crate) fn node_within_subtree(&self, lower: Link, upper: Link) -> bool {
        let Some(upper) = upper else {
            return false;
        };
        let Some(lower) = lower else {
            return true;
        };

        let mut cur = Some(lower);
        while let Some(id) = cur {
            if id == upper {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Puts `new` in the exact position of `old`, taking over its parent and
    /// both children. The previous children of `new` are cut loose and `old`
    /// is left fully unlinked.
    pub(crate) fn replace_node(&mut self, old: Link, new: Link) -> Result<(), TreeError> {
        let old = old.ok_or(TreeError::InvalidArgument("old node must not be absent"))?;
        let new = new.ok_or(TreeError::InvalidArgument("new node must not be absent"))?;
        if old == new {
            return Ok(());
        }
        if self.node_within_subtree(Some(old), Some(new)) {
            return Err(TreeError::InvalidOperation("new node is an ancestor of old node"));
        }

        for child in [self.left(new), self.right(new)].into_iter().flatten() {
            self.node_mut(child).parent = None;
        }
        let new_node = self.node_mut(new);
        new_node.left = None;
        new_node.right = None;
        self.detach(new);

        let old_is_left = self.is_left_child(old);
        let old_node = self.node_mut(old);
        let (parent, left, right) = (old_node.parent, old_node.left, old_node.right);
        old_node.parent = None;
        old_node.left = None;
        old_node.right = None;

        match parent {
            None if self.root == Some(old) => self.root = Some(new),
            None => {}
            Some(parent) if old_is_left => self.node_mut(parent).left = Some(new),
            Some(parent) => self.node_mut(parent).right = Some(new),
        }
        let new_node = self.node_mut(new);
        new_node.parent = parent;
        new_node.left = left;
        new_node.right = right;
        for child in [left, right].into_iter().flatten() {
            self.node_mut(child).parent = Some(new);
        }
        Ok(())
    }

    /// Hangs `new` where `old` was. `new` is first unlinked from wherever it
    /// was; `old` keeps its own children but loses its parent.
    pub(crate) fn replace_subtree(&mut self, old: Link, new: Link) -> Result<(), TreeError> {
        let old = old.ok_or(TreeError::InvalidArgument("old subtree must not be absent"))?;
        if new == Some(old) {
            return Ok(());
        }
        if self.node_within_subtree(Some(old), new) {
            return Err(TreeError::InvalidOperation("new subtree contains old subtree"));
        }

        let parent = self.parent(old);
        let old_is_left = self.is_left_child(old);
        if let Some(new) = new {
            self.detach(new);
        }

        match parent {
            None if self.root == Some(old) => self.root = new,
            None => {}
            Some(parent) if old_is_left => self.node_mut(parent).left = new,
            Some(parent) => self.node_mut(parent).right = new,
        }
        if let Some(new) = new {
            self.node_mut(new).parent = parent;
        }
        self.node_mut(old).parent = None;
        Ok(())
    }

    pub(crate) fn replace_left_subtree(&mut self, parent: Link, new: Link) -> Result<(), TreeError> {
        let parent = parent.ok_or(TreeError::InvalidArgument("parent must not be absent"))?;
        if self.node_within_subtree(Some(parent), new) {
            return Err(TreeError::InvalidOperation("new subtree contains the parent"));
        }

        if let Some(new) = new {
            self.detach(new);
        }
        if let Some(old) = self.left(parent) {
            self.node_mut(old).parent = None;
        }
        self.node_mut(parent).left = new;
        if let Some(new) = new {
            self.node_mut(new).parent = Some(parent);
        }
        Ok(())
    }

    pub(crate) fn replace_right_subtree(&mut self, parent: Link, new: Link) -> Result<(), TreeError> {
        let parent = parent.ok_or(TreeError::InvalidArgument("parent must not be absent"))?;
        if self.node_within_subtree(Some(parent), new) {
            return Err(TreeError::InvalidOperation("new subtree contains the parent"));
        }

        if let Some(new) = new {
            self.detach(new);
        }
        if let Some(old) = self.right(parent) {
            self.node_mut(old).parent = None;
        }
        self.node_mut(parent).right = new;
        if let Some(new) = new {
            self.node_mut(new).parent = Some(parent);
        }
        Ok(())
    }

    /// Rotates `node` down to the left and returns its former right child,
    /// which now holds the position `node` had.
    pub(crate) fn rotate_left(&mut self, node: Link) -> Result<NodeId, TreeError> {
        //    p                       p
        //    |                       |
        // +-node-+               +-right-+
        // |      |      -->      |       |
        // a  +-right-+       +-node-+    c
        //    |       |       |      |
        //    b       c       a      b
        let node = node.ok_or(TreeError::InvalidArgument("node to rotate must not be absent"))?;
        let right = self
            .right(node)
            .ok_or(TreeError::InvalidOperation("rotate_left requires a right child"))?;

        self.replace_subtree(Some(node), Some(right))?;
        let b = self.left(right);
        self.replace_right_subtree(Some(node), b)?;
        self.replace_left_subtree(Some(right), Some(node))?;
        Ok(right)
    }

    /// Mirror image of [`Tree::rotate_left`].
    pub(crate) fn rotate_right(&mut self, node: Link) -> Result<NodeId, TreeError> {
        let node = node.ok_or(TreeError::InvalidArgument("node to rotate must not be absent"))?;
        let left = self
            .left(node)
            .ok_or(TreeError::InvalidOperation("rotate_right requires a left child"))?;

        self.replace_subtree(Some(node), Some(left))?;
        let b = self.right(left);
        self.replace_left_subtree(Some(node), b)?;
        self.replace_right_subtree(Some(left), Some(node))?;
        Ok(left)
    }

    // unlinks `id` from its parent, or from the root slot
    fn detach(&mut self, id: NodeId) {
        match self.parent(id) {
            Some(parent) => {
                let parent_node = self.node_mut(parent);
                if parent_node.left == Some(id) {
                    parent_node.left = None;
                } else {
                    parent_node.right = None;
                }
                self.node_mut(id).parent = None;
            }
            None if self.root == Some(id) => self.root = None,
            None => {}
        }
    }

    fn min_of(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    fn max_of(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right(id) {
            id = right;
        }
        id
    }

    fn after(&self, id: NodeId) -> Link {
        self.after_sub(id).or_else(|| self.after_above(id))
    }

    fn after_sub(&self, id: NodeId) -> Link {
        self.right(id).map(|right| self.min_of(right))
    }

    fn after_above(&self, mut id: NodeId) -> Link {
        while let Some(parent) = self.parent(id) {
            if self.right(parent) == Some(id) {
                id = parent;
            } else {
                return Some(parent);
            }
        }
        None
    }
}

impl<T: Ord, B: Balance<T>> Default for Tree<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord, B: Balance<T>> IntoIterator for Tree<T, B> {
    type Item = T;
    type IntoIter = IntoIter<T, B>;

    fn into_iter(self) -> IntoIter<T, B> {
        IntoIter { tree: self }
    }
}

impl<'a, T: Ord, B: Balance<T>> IntoIterator for &'a Tree<T, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B>;

    fn into_iter(self) -> Iter<'a, T, B> {
        self.iter()
    }
}

impl<T: Ord, B: Balance<T>> Iterator for IntoIter<T, B> {
    type Item = T;
    fn next(&mut self) -> Option<Self::Item> {
        let first = self.tree.root.map(|root| self.tree.min_of(root))?;
        self.tree.remove_node(first).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len, Some(self.tree.len))
    }
}

impl<'a, T: Ord, B: Balance<T>> Iterator for Iter<'a, T, B> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.after(id);
        self.remaining -= 1;
        Some(self.tree.value(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Ord, B: Balance<T>> ExactSizeIterator for Iter<'_, T, B> {}

impl<T: Ord, B: Balance<T>> FusedIterator for Iter<'_, T, B> {}

struct NodeDebug<'a, T: Ord, B: Balance<T>> {
    tree: &'a Tree<T, B>,
    id: NodeId,
}

impl<T: fmt::Debug + Ord, B: Balance<T>> fmt::Debug for Tree<T, B> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Tree")
            .field("len", &self.len)
            .field("root", &self.root.map(|id| NodeDebug { tree: self, id }))
            .finish()
    }
}

impl<T: fmt::Debug + Ord, B: Balance<T>> fmt::Debug for NodeDebug<'_, T, B> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        let child = |link: Link| link.map(|id| NodeDebug { tree, id });
        fmt.debug_struct("Node")
            .field("value", tree.value(self.id))
            .field("tag", &tree.tag(self.id))
            .field("parent", &tree.parent(self.id).map(|id| tree.value(id)))
            .field("left", &child(tree.left(self.id)))
            .field("right", &child(tree.right(self.id)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unbalanced::Unbalanced;

    //                  100
    //               /      \
    //             50        150
    //           /    \     /
    //         25      75  125
    //        /  \           \
    //      12    37          130
    //           /  \           \
    //         30    40          140
    //        /        \         /
    //      28          45     135
    //        \        /  \      \
    //         29     42   47     137
    const SAMPLE_PRE_ORDER: [i32; 19] = [
        100, 50, 25, 12, 37, 30, 28, 29, 40, 45, 42, 47, 75, 150, 125, 130, 140, 135, 137,
    ];
    const SAMPLE_IN_ORDER: [i32; 19] = [
        12, 25, 28, 29, 30, 37, 40, 42, 45, 47, 50, 75, 100, 125, 130, 135, 137, 140, 150,
    ];

    fn sample_tree() -> Tree<i32, Unbalanced> {
        let mut tree = Tree::new();
        for value in SAMPLE_PRE_ORDER {
            tree.insert(value).unwrap();
        }
        tree
    }

    fn node(tree: &Tree<i32, Unbalanced>, value: i32) -> NodeId {
        tree.find_node(&value).unwrap()
    }

    fn values(tree: &Tree<i32, Unbalanced>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    // (value, parent, left, right) for every node reachable from the root
    fn shape(tree: &Tree<i32, Unbalanced>) -> Vec<(i32, Option<i32>, Option<i32>, Option<i32>)> {
        let value_of = |link: Link| link.map(|id| *tree.value(id));
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = tree.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push((
                *tree.value(id),
                value_of(tree.parent(id)),
                value_of(tree.left(id)),
                value_of(tree.right(id)),
            ));
            stack.extend([tree.left(id), tree.right(id)].into_iter().flatten());
        }
        out.sort();
        out
    }

    #[test]
    fn empty_after_creation() {
        let tree = Tree::<i32, Unbalanced>::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.iter().next(), None);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn sample_iter_in_order() {
        let tree = sample_tree();
        assert_eq!(tree.len(), SAMPLE_IN_ORDER.len());
        assert_eq!(values(&tree), SAMPLE_IN_ORDER);
        assert_eq!(tree.iter().len(), SAMPLE_IN_ORDER.len());
        assert_eq!(tree.height(), 7);
        assert_eq!(tree.first(), Some(&12));
        assert_eq!(tree.last(), Some(&150));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn iter_restarts() {
        let mut tree = sample_tree();
        let mut iter = tree.iter();
        iter.next();
        iter.next();
        tree.remove(&12).unwrap();
        assert_eq!(tree.iter().next(), Some(&25));
    }

    #[test]
    fn find_node() {
        let tree = sample_tree();
        for value in SAMPLE_IN_ORDER {
            let id = tree.find_node(&value).unwrap();
            assert_eq!(*tree.value(id), value);
        }
        assert_eq!(tree.find_node(&0), None);
        assert_eq!(tree.find_node(&41), None);
        assert_eq!(tree.find_node(&1000), None);
    }

    #[test]
    fn find_new_parent_node() {
        let tree = sample_tree();
        assert_eq!(tree.find_new_parent_node(&41), Ok(Slot::Left(node(&tree, 42))));
        assert_eq!(tree.find_new_parent_node(&46), Ok(Slot::Left(node(&tree, 47))));
        assert_eq!(tree.find_new_parent_node(&200), Ok(Slot::Right(node(&tree, 150))));
        assert_eq!(tree.find_new_parent_node(&1), Ok(Slot::Left(node(&tree, 12))));
        assert_eq!(tree.find_new_parent_node(&45), Err(TreeError::DuplicateKey));

        let empty = Tree::<i32, Unbalanced>::new();
        assert_eq!(empty.find_new_parent_node(&45), Ok(Slot::Root));
    }

    #[test]
    fn in_order_successor() {
        let tree = sample_tree();
        for pair in SAMPLE_IN_ORDER.windows(2) {
            let successor = tree.in_order_successor(Some(node(&tree, pair[0]))).unwrap();
            assert_eq!(successor, Some(node(&tree, pair[1])));
        }
        assert_eq!(tree.in_order_successor(Some(node(&tree, 150))), Ok(None));
        assert!(matches!(
            tree.in_order_successor(None),
            Err(TreeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn node_within_subtree() {
        let tree = sample_tree();
        for value in SAMPLE_IN_ORDER {
            let id = Some(node(&tree, value));
            assert!(tree.node_within_subtree(id, id));
            assert!(tree.node_within_subtree(None, id));
            assert!(!tree.node_within_subtree(id, None));
            assert!(tree.node_within_subtree(id, tree.root()));
        }
        assert!(!tree.node_within_subtree(None, None));
        assert!(tree.node_within_subtree(Some(node(&tree, 29)), Some(node(&tree, 37))));
        assert!(!tree.node_within_subtree(Some(node(&tree, 29)), Some(node(&tree, 40))));
        assert!(!tree.node_within_subtree(Some(node(&tree, 37)), Some(node(&tree, 29))));
    }

    #[test]
    fn replace_subtree_moves_new_subtree() {
        let mut tree = sample_tree();
        let old = node(&tree, 37);
        let new = node(&tree, 40);
        tree.replace_subtree(Some(old), Some(new)).unwrap();

        assert_eq!(
            values(&tree),
            [12, 25, 40, 42, 45, 47, 50, 75, 100, 125, 130, 135, 137, 140, 150]
        );
        assert_eq!(tree.parent(new), Some(node(&tree, 25)));
        assert_eq!(tree.right(node(&tree, 25)), Some(new));
        assert_eq!(tree.parent(old), None);
        assert_eq!(tree.right(old), None);
        assert_eq!(tree.find_node(&37), None);
    }

    #[test]
    fn replace_subtree_with_nothing() {
        let mut tree = sample_tree();
        let old = node(&tree, 125);
        tree.replace_subtree(Some(old), None).unwrap();
        assert_eq!(tree.left(node(&tree, 150)), None);
        assert_eq!(tree.parent(old), None);
        assert_eq!(tree.find_node(&137), None);
    }

    #[test]
    fn replace_subtree_of_root() {
        let mut tree = sample_tree();
        let new = node(&tree, 150);
        tree.replace_subtree(tree.root(), Some(new)).unwrap();
        assert_eq!(tree.root(), Some(new));
        assert_eq!(tree.parent(new), None);
        assert_eq!(values(&tree), [125, 130, 135, 137, 140, 150]);
    }

    #[test]
    fn replace_subtree_errors_leave_tree_untouched() {
        let mut tree = sample_tree();
        let before = shape(&tree);

        assert!(matches!(
            tree.replace_subtree(None, Some(node(&tree, 40))),
            Err(TreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.replace_subtree(Some(node(&tree, 29)), Some(node(&tree, 37))),
            Err(TreeError::InvalidOperation(_))
        ));
        assert!(matches!(
            tree.replace_subtree(Some(node(&tree, 29)), tree.root()),
            Err(TreeError::InvalidOperation(_))
        ));

        assert_eq!(shape(&tree), before);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn replace_subtree_with_itself_is_noop() {
        let mut tree = sample_tree();
        let before = shape(&tree);
        let id = Some(node(&tree, 37));
        tree.replace_subtree(id, id).unwrap();
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn replace_node_takes_over_links() {
        let mut tree = sample_tree();
        let old = node(&tree, 25);
        let new = node(&tree, 28);
        let orphan = node(&tree, 29);
        tree.replace_node(Some(old), Some(new)).unwrap();

        assert_eq!(tree.parent(new), Some(node(&tree, 50)));
        assert_eq!(tree.left(new), Some(node(&tree, 12)));
        assert_eq!(tree.right(new), Some(node(&tree, 37)));
        assert_eq!(tree.parent(node(&tree, 12)), Some(new));
        assert_eq!(tree.left(node(&tree, 30)), None);
        assert_eq!(tree.parent(orphan), None);
        assert_eq!(
            (tree.parent(old), tree.left(old), tree.right(old)),
            (None, None, None)
        );
        assert_eq!(values(&tree)[..4], [12, 28, 30, 37]);
    }

    #[test]
    fn replace_node_errors() {
        let mut tree = sample_tree();
        let before = shape(&tree);
        assert!(matches!(
            tree.replace_node(None, Some(node(&tree, 28))),
            Err(TreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.replace_node(Some(node(&tree, 28)), None),
            Err(TreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.replace_node(Some(node(&tree, 28)), Some(node(&tree, 25))),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn replace_left_and_right_subtree() {
        let mut tree = sample_tree();
        let parent = node(&tree, 45);
        let discarded = node(&tree, 42);
        tree.replace_left_subtree(Some(parent), None).unwrap();
        assert_eq!(tree.left(parent), None);
        assert_eq!(tree.parent(discarded), None);

        let moved = node(&tree, 47);
        tree.replace_left_subtree(Some(parent), Some(moved)).unwrap();
        assert_eq!(tree.left(parent), Some(moved));
        assert_eq!(tree.right(parent), None);
        assert_eq!(tree.parent(moved), Some(parent));

        tree.replace_right_subtree(Some(parent), Some(discarded)).unwrap();
        assert_eq!(tree.right(parent), Some(discarded));
        assert_eq!(tree.parent(discarded), Some(parent));

        assert!(matches!(
            tree.replace_left_subtree(None, Some(moved)),
            Err(TreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.replace_right_subtree(None, None),
            Err(TreeError::InvalidArgument(_))
        ));
        assert!(matches!(
            tree.replace_right_subtree(Some(parent), tree.root()),
            Err(TreeError::InvalidOperation(_))
        ));
    }

    #[test]
    fn rotate_roundtrip() {
        let mut tree = sample_tree();
        let before = shape(&tree);
        for value in [37, 100, 25, 130] {
            let id = node(&tree, value);
            let right = tree.right(id);
            let parent = tree.parent(id);

            let new_top = tree.rotate_left(Some(id)).unwrap();
            assert_eq!(Some(new_top), right);
            assert_eq!(tree.parent(new_top), parent);
            assert_eq!(tree.left(new_top), Some(id));
            assert_eq!(values(&tree), SAMPLE_IN_ORDER);
            assert!(tree.validate().is_ok());

            assert_eq!(tree.rotate_right(Some(new_top)).unwrap(), id);
            assert_eq!(shape(&tree), before);
        }
    }

    #[test]
    fn rotate_right_at_root() {
        let mut tree = sample_tree();
        let fifty = node(&tree, 50);
        let seventy_five = node(&tree, 75);
        let hundred = node(&tree, 100);
        tree.rotate_right(tree.root()).unwrap();
        assert_eq!(tree.root(), Some(fifty));
        assert_eq!(tree.right(fifty), Some(hundred));
        assert_eq!(tree.left(hundred), Some(seventy_five));
        assert_eq!(tree.parent(seventy_five), Some(hundred));
        assert_eq!(values(&tree), SAMPLE_IN_ORDER);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn rotate_errors() {
        let mut tree = sample_tree();
        let before = shape(&tree);
        assert!(matches!(tree.rotate_left(None), Err(TreeError::InvalidArgument(_))));
        assert!(matches!(tree.rotate_right(None), Err(TreeError::InvalidArgument(_))));
        assert!(matches!(
            tree.rotate_left(Some(node(&tree, 12))),
            Err(TreeError::InvalidOperation(_))
        ));
        assert!(matches!(
            tree.rotate_right(Some(node(&tree, 125))),
            Err(TreeError::InvalidOperation(_))
        ));
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn validate_catches_bad_len() {
        let mut tree = sample_tree();
        tree.len += 1;
        assert!(matches!(tree.validate(), Err(TreeError::Corrupted(_))));
    }

    #[test]
    fn released_slots_are_reused() {
        let mut tree = sample_tree();
        let slots = tree.nodes.len();
        tree.remove(&29).unwrap();
        tree.insert(31).unwrap();
        assert_eq!(tree.nodes.len(), slots);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn clear() {
        let mut tree = sample_tree();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        tree.insert(1).unwrap();
        assert_eq!(values(&tree), [1]);
    }

    #[test]
    fn into_iter_asc() {
        let tree = sample_tree();
        let mut iter = tree.into_iter();
        for value in SAMPLE_IN_ORDER {
            assert_eq!(iter.next(), Some(value));
        }
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn debug_shows_nested_nodes() {
        let mut tree = Tree::<i32, Unbalanced>::new();
        tree.insert(2).unwrap();
        tree.insert(1).unwrap();
        let out = format!("{tree:?}");
        assert!(out.starts_with("Tree { len: 2, root: Some(Node { value: 2"));
        assert!(out.contains("left: Some(Node { value: 1, tag: (), parent: Some(2)"));
    }
}
