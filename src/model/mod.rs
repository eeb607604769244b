//! # Graph Element Model
//!
//! Records stored by the engine. These types cross every boundary:
//! stores ↔ views ↔ listeners ↔ user.
//!
//! Design rule: the records are plain data. Adjacency links and degree
//! counters live on them for O(1) access, but only the edge store writes them.

pub mod element;
pub mod node;
pub mod edge;

pub use element::{AttributeSlot, Element, ElementId, ElementKind, IdType, StoreId};
pub use node::Node;
pub use edge::{Edge, EdgeTypeId};
