//! Spatial partitioning data structures
//!
//! Provides the rect search tree used for broad-phase overlap and touch
//! queries over moving axis-aligned bodies.

pub mod rect_search_tree;

pub use rect_search_tree::{EntryKey, Near, NodeId, RectSearchTree, SpatialVisitor};
