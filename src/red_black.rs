use log::{debug, trace};

use crate::binary_tree::{Link, NodeId, Tree};
use crate::error::TreeError;
use crate::tree::Balance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Red-black balancing.
///
/// After every insertion and removal:
/// * the root is black,
/// * no red node has a red child,
/// * every path from a node down to an absent child passes through the same
///   number of black nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedBlack;

// absent children count as black
fn is_red<T: Ord>(tree: &Tree<T, RedBlack>, link: Link) -> bool {
    link.is_some_and(|id| tree.tag(id).is_red())
}

fn is_black<T: Ord>(tree: &Tree<T, RedBlack>, link: Link) -> bool {
    !is_red(tree, link)
}

fn paint<T: Ord>(tree: &mut Tree<T, RedBlack>, link: Link, color: Color) {
    if let Some(id) = link {
        tree.set_tag(id, color);
    }
}

impl<T: Ord> Balance<T> for RedBlack {
    type Tag = Color;

    fn insert(tree: &mut Tree<T, Self>, value: T) -> Result<NodeId, TreeError> {
        let slot = tree.find_new_parent_node(&value)?;
        let node = tree.node_for_value(value, Color::Red);
        tree.attach(slot, node)?;
        insert_fixup(tree, node)?;
        Ok(node)
    }

    fn remove(tree: &mut Tree<T, Self>, node: NodeId) -> Result<(), TreeError> {
        let removed_color;
        // the slot that lost a node, and its parent, in case it is now empty
        let (x, x_parent);

        match (tree.left(node), tree.right(node)) {
            (Some(_), Some(_)) => {
                let successor = tree
                    .in_order_successor(Some(node))?
                    .ok_or(TreeError::Corrupted("node with a right child has no successor"))?;
                debug!("removing a node with two children");
                removed_color = tree.tag(successor);
                x = tree.right(successor);
                x_parent = if tree.parent(successor) == Some(node) {
                    Some(successor)
                } else {
                    tree.parent(successor)
                };

                tree.replace_subtree(Some(successor), x)?;
                tree.replace_node(Some(node), Some(successor))?;
                tree.set_tag(successor, tree.tag(node));
            }
            (left, right) => {
                removed_color = tree.tag(node);
                x = left.or(right);
                x_parent = tree.parent(node);
                tree.replace_subtree(Some(node), x)?;
            }
        }

        if removed_color.is_black() {
            remove_fixup(tree, x, x_parent)?;
        }
        Ok(())
    }

    fn validate(tree: &Tree<T, Self>) -> Result<(), TreeError> {
        black_height(tree).map(|_| ())
    }
}

fn insert_fixup<T: Ord>(tree: &mut Tree<T, RedBlack>, mut node: NodeId) -> Result<(), TreeError> {
    while let Some(mut parent) = tree.parent(node) {
        if tree.tag(parent).is_black() {
            break;
        }
        // a red parent is never the root
        let grand_parent = tree
            .parent(parent)
            .ok_or(TreeError::Corrupted("red root"))?;
        let parent_is_left = tree.left(grand_parent) == Some(parent);
        let uncle = if parent_is_left {
            tree.right(grand_parent)
        } else {
            tree.left(grand_parent)
        };

        if is_red(tree, uncle) {
            //     +--- gp:b ---+               +--- gp:r ---+
            //     |            |               |            |
            //  + p:r +      + u:r +   -->   + p:b +      + u:b +
            //  |
            // n:r
            trace!("insert fixup: red uncle");
            tree.set_tag(parent, Color::Black);
            paint(tree, uncle, Color::Black);
            tree.set_tag(grand_parent, Color::Red);
            node = grand_parent;
            continue;
        }

        let node_is_left = tree.left(parent) == Some(node);
        if parent_is_left != node_is_left {
            //       +-- gp:b --+                 +-- gp:b --+
            //       |          |                 |          |
            //  +-- p:r --+    u:b  -->       +- n:r        u:b
            //            |                   |
            //           n:r                 p:r
            trace!("insert fixup: black uncle, inner grandchild");
            if parent_is_left {
                tree.rotate_left(Some(parent))?;
            } else {
                tree.rotate_right(Some(parent))?;
            }
            std::mem::swap(&mut parent, &mut node);
        }

        //           +-- gp:b --+            +----- p:b -----+
        //           |          |            |               |
        //      +-- p:r --+    u:b  -->    n:r          +- gp:r -+
        //      |                                       |        |
        //     n:r                                     ...      u:b
        trace!("insert fixup: black uncle, outer grandchild");
        tree.set_tag(parent, Color::Black);
        tree.set_tag(grand_parent, Color::Red);
        if parent_is_left {
            tree.rotate_right(Some(grand_parent))?;
        } else {
            tree.rotate_left(Some(grand_parent))?;
        }
        break;
    }

    let root = tree.root();
    paint(tree, root, Color::Black);
    Ok(())
}

// `x` carries an extra black. It may be absent, so its parent is tracked
// separately.
fn remove_fixup<T: Ord>(
    tree: &mut Tree<T, RedBlack>,
    mut x: Link,
    mut parent: Link,
) -> Result<(), TreeError> {
    while x != tree.root() && is_black(tree, x) {
        let Some(p) = parent else {
            break;
        };
        let x_is_left = tree.left(p) == x;
        let sibling_of = |tree: &Tree<T, RedBlack>| {
            if x_is_left { tree.right(p) } else { tree.left(p) }
        };
        let mut sibling = sibling_of(tree)
            .ok_or(TreeError::Corrupted("doubly black node without a sibling"))?;

        if tree.tag(sibling).is_red() {
            trace!("remove fixup: red sibling");
            tree.set_tag(sibling, Color::Black);
            tree.set_tag(p, Color::Red);
            if x_is_left {
                tree.rotate_left(Some(p))?;
            } else {
                tree.rotate_right(Some(p))?;
            }
            sibling = sibling_of(tree)
                .ok_or(TreeError::Corrupted("doubly black node without a sibling"))?;
        }

        let (near, far) = if x_is_left {
            (tree.left(sibling), tree.right(sibling))
        } else {
            (tree.right(sibling), tree.left(sibling))
        };

        if is_black(tree, near) && is_black(tree, far) {
            trace!("remove fixup: black sibling, black nephews");
            tree.set_tag(sibling, Color::Red);
            x = Some(p);
            parent = tree.parent(p);
            continue;
        }

        if is_black(tree, far) {
            trace!("remove fixup: black sibling, red near nephew");
            paint(tree, near, Color::Black);
            tree.set_tag(sibling, Color::Red);
            sibling = if x_is_left {
                tree.rotate_right(Some(sibling))?
            } else {
                tree.rotate_left(Some(sibling))?
            };
        }

        trace!("remove fixup: black sibling, red far nephew");
        let far = if x_is_left {
            tree.right(sibling)
        } else {
            tree.left(sibling)
        };
        tree.set_tag(sibling, tree.tag(p));
        tree.set_tag(p, Color::Black);
        paint(tree, far, Color::Black);
        if x_is_left {
            tree.rotate_left(Some(p))?;
        } else {
            tree.rotate_right(Some(p))?;
        }
        x = tree.root();
        break;
    }

    paint(tree, x, Color::Black);
    Ok(())
}

/// Checks the red-black invariants and returns the black height of the root,
/// counting the absent children below the leaves.
pub(crate) fn black_height<T: Ord>(tree: &Tree<T, RedBlack>) -> Result<usize, TreeError> {
    if is_red(tree, tree.root()) {
        return Err(TreeError::Corrupted("red root"));
    }

    // post-order walk, so both children are measured before their parent
    let mut heights: Vec<usize> = Vec::new();
    let mut stack: Vec<(Link, bool)> = vec![(tree.root(), false)];
    while let Some((link, children_done)) = stack.pop() {
        let Some(id) = link else {
            heights.push(1);
            continue;
        };
        if !children_done {
            let (left, right) = (tree.left(id), tree.right(id));
            if tree.tag(id).is_red() && (is_red(tree, left) || is_red(tree, right)) {
                return Err(TreeError::Corrupted("red node with a red child"));
            }
            stack.push((link, true));
            stack.push((right, false));
            stack.push((left, false));
            continue;
        }

        let (right, left) = match (heights.pop(), heights.pop()) {
            (Some(right), Some(left)) => (right, left),
            _ => return Err(TreeError::Corrupted("unbalanced height stack")),
        };
        if left != right {
            return Err(TreeError::Corrupted("black height differs between subtrees"));
        }
        heights.push(left + usize::from(tree.tag(id).is_black()));
    }

    heights
        .pop()
        .ok_or(TreeError::Corrupted("unbalanced height stack"))
}
