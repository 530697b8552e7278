pub mod binary_tree;
pub mod error;
pub mod red_black;
pub mod set;
pub mod tree;
pub mod unbalanced;

pub use binary_tree::{IntoIter, Iter, NodeId, Tree};
pub use error::TreeError;
pub use red_black::{Color, RedBlack};
pub use set::{OrderedSet, RedBlackSet, UnbalancedSet};
pub use tree::{Balance, TreeOps};
pub use unbalanced::Unbalanced;
