//! Identifiers and the element contract shared by nodes and edges.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Dense store identifier. Valid only while the element is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(pub u32);

impl StoreId {
    /// Sentinel used in adjacency links and for elements not in a store.
    pub const NULL: StoreId = StoreId(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Which id variant a store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IdType {
    #[default]
    Integer,
    String,
}

/// User-facing element identifier, unique per element kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementId {
    Int(i64),
    Str(String),
}

impl ElementId {
    pub fn id_type(&self) -> IdType {
        match self {
            ElementId::Int(_) => IdType::Integer,
            ElementId::Str(_) => IdType::String,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Int(i) => write!(f, "{i}"),
            ElementId::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for ElementId { fn from(v: i64) -> Self { ElementId::Int(v) } }
impl From<i32> for ElementId { fn from(v: i32) -> Self { ElementId::Int(v as i64) } }
impl From<u32> for ElementId { fn from(v: u32) -> Self { ElementId::Int(v as i64) } }
impl From<String> for ElementId { fn from(v: String) -> Self { ElementId::Str(v) } }
impl From<&str> for ElementId { fn from(v: &str) -> Self { ElementId::Str(v.to_owned()) } }

/// Node or edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Node,
    Edge,
}

/// Opaque attribute payload attached to every element.
///
/// The store never looks inside. It only moves the slot along with the
/// record and clears it when the element is removed.
#[derive(Clone, Default)]
pub struct AttributeSlot(Option<Arc<dyn Any + Send + Sync>>);

impl AttributeSlot {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.0 = Some(Arc::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|v| v.downcast_ref::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl fmt::Debug for AttributeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "AttributeSlot(..)"),
            None => write!(f, "AttributeSlot(empty)"),
        }
    }
}

/// What the pool and allocator need to know about a record.
pub trait Element {
    const KIND: ElementKind;

    fn id(&self) -> &ElementId;

    /// `StoreId::NULL` when the record is not in a store.
    fn store_id(&self) -> StoreId;

    fn set_store_id(&mut self, id: StoreId);

    fn attributes(&self) -> &AttributeSlot;

    fn attributes_mut(&mut self) -> &mut AttributeSlot;

    fn is_stored(&self) -> bool {
        !self.store_id().is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_types() {
        assert_eq!(ElementId::from(7).id_type(), IdType::Integer);
        assert_eq!(ElementId::from("a").id_type(), IdType::String);
        assert_eq!(format!("{}", ElementId::from("a")), "\"a\"");
    }

    #[test]
    fn test_store_id_sentinel() {
        assert!(StoreId::NULL.is_null());
        assert!(!StoreId::new(0).is_null());
        assert_eq!(format!("{}", StoreId::NULL), "null");
    }

    #[test]
    fn test_attribute_slot_downcast() {
        let mut slot = AttributeSlot::new(42u64);
        assert_eq!(slot.get::<u64>(), Some(&42));
        assert_eq!(slot.get::<String>(), None);
        slot.clear();
        assert!(slot.is_empty());
    }
}
