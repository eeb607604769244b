//! Edge type registry: label ↔ code with the allocator's reuse discipline.

use hashbrown::HashMap;

use super::allocator::IdAllocator;
use crate::config::MAX_EDGE_TYPES;
use crate::model::{EdgeTypeId, StoreId};
use crate::{Error, Result};

/// Label of the type every registry starts with.
pub const DEFAULT_EDGE_TYPE_LABEL: &str = "";

#[derive(Debug, Clone)]
pub struct EdgeTypeRegistry {
    by_label: HashMap<String, EdgeTypeId>,
    labels: Vec<Option<String>>,
    alloc: IdAllocator,
    max: usize,
    exhausted: bool,
}

impl EdgeTypeRegistry {
    /// Registry holding only the default type. `max` is clamped to
    /// `1..=MAX_EDGE_TYPES`.
    pub fn new(max: usize) -> Self {
        let mut registry = Self {
            by_label: HashMap::new(),
            labels: Vec::new(),
            alloc: IdAllocator::starting_at(1),
            max: max.clamp(1, MAX_EDGE_TYPES),
            exhausted: false,
        };
        registry.bind(DEFAULT_EDGE_TYPE_LABEL, EdgeTypeId::DEFAULT);
        registry
    }

    /// Returns the code of `label`, assigning one if needed.
    pub fn register(&mut self, label: &str) -> Result<EdgeTypeId> {
        if let Some(code) = self.by_label.get(label) {
            return Ok(*code);
        }
        self.ensure_capacity()?;
        let code = self.alloc.allocate()?;
        let code = EdgeTypeId(code.0 as u16);
        self.bind(label, code);
        Ok(code)
    }

    /// Binds `label` to a caller-chosen code. `Ok(false)` when that exact
    /// binding already exists.
    pub fn register_with_code(&mut self, label: &str, code: EdgeTypeId) -> Result<bool> {
        match (self.by_label.get(label), self.label(code)) {
            (Some(existing), _) if *existing == code => return Ok(false),
            (Some(existing), _) => {
                return Err(Error::TypeConflict(format!(
                    "label {label:?} is bound to {existing}, not {code}"
                )));
            }
            (None, Some(other)) => {
                return Err(Error::TypeConflict(format!(
                    "{code} is bound to label {other:?}, not {label:?}"
                )));
            }
            (None, None) => {}
        }
        if code.index() >= self.max {
            return Err(Error::CapacityExhausted(format!(
                "edge type code {code} exceeds the bound of {}",
                self.max
            )));
        }
        self.ensure_capacity()?;
        self.alloc.claim(StoreId(code.0 as u32))?;
        self.bind(label, code);
        Ok(true)
    }

    /// Releases `label` so its code can be reused.
    pub fn remove(&mut self, label: &str) -> Option<EdgeTypeId> {
        let code = self.by_label.remove(label)?;
        self.labels[code.index()] = None;
        self.alloc.release(StoreId(code.0 as u32));
        Some(code)
    }

    pub fn code(&self, label: &str) -> Option<EdgeTypeId> {
        self.by_label.get(label).copied()
    }

    pub fn label(&self, code: EdgeTypeId) -> Option<&str> {
        self.labels.get(code.index()).and_then(|l| l.as_deref())
    }

    pub fn contains(&self, code: EdgeTypeId) -> bool {
        self.label(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// One past the highest code ever bound.
    pub fn code_bound(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeTypeId, &str)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.as_deref().map(|l| (EdgeTypeId(i as u16), l)))
    }

    fn ensure_capacity(&mut self) -> Result<()> {
        if self.exhausted || self.by_label.len() >= self.max {
            if !self.exhausted {
                tracing::warn!(max = self.max, "edge type registry exhausted");
            }
            self.exhausted = true;
            return Err(Error::CapacityExhausted(format!(
                "edge type registry is limited to {} types",
                self.max
            )));
        }
        Ok(())
    }

    fn bind(&mut self, label: &str, code: EdgeTypeId) {
        if self.labels.len() <= code.index() {
            self.labels.resize(code.index() + 1, None);
        }
        self.labels[code.index()] = Some(label.to_owned());
        self.by_label.insert(label.to_owned(), code);
    }
}
