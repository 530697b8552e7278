use crate::binary_tree::{NodeId, Tree};
use crate::error::TreeError;
use crate::tree::Balance;

/// Plain binary search tree without any balancing. New values always become
/// leaves, so sorted input degenerates into a list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbalanced;

impl<T: Ord> Balance<T> for Unbalanced {
    type Tag = ();

    fn insert(tree: &mut Tree<T, Self>, value: T) -> Result<NodeId, TreeError> {
        let slot = tree.find_new_parent_node(&value)?;
        let node = tree.node_for_value(value, ());
        tree.attach(slot, node)?;
        Ok(node)
    }

    fn remove(tree: &mut Tree<T, Self>, node: NodeId) -> Result<(), TreeError> {
        match (tree.left(node), tree.right(node)) {
            (Some(_), Some(_)) => {
                let successor = tree.in_order_successor(Some(node))?;
                let successor_right = successor.and_then(|successor| tree.right(successor));
                tree.replace_subtree(successor, successor_right)?;
                tree.replace_node(Some(node), successor)
            }
            (left, right) => tree.replace_subtree(Some(node), left.or(right)),
        }
    }
}
