//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::model::IdType;
use crate::{Error, Result};

/// Largest number of edge types a registry can ever hold.
pub const MAX_EDGE_TYPES: usize = 65534;

/// Default number of slots per pool block.
pub const DEFAULT_BLOCK_SIZE: usize = 32768;

/// Configuration for a [`GraphStore`](crate::GraphStore).
///
/// The defaults suit most graphs. Enable `parallel_edges` for multigraphs
/// that need several same-type edges between the same endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Slots per pool block. Must be a power of two.
    pub block_size: usize,
    /// Allow more than one edge per (source, target, type, direction class).
    pub parallel_edges: bool,
    /// Id variant accepted for nodes.
    pub node_id_type: IdType,
    /// Id variant accepted for edges.
    pub edge_id_type: IdType,
    /// Registry bound, at most [`MAX_EDGE_TYPES`].
    pub max_edge_types: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            parallel_edges: false,
            node_id_type: IdType::Integer,
            edge_id_type: IdType::Integer,
            max_edge_types: MAX_EDGE_TYPES,
        }
    }
}

impl StoreConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_parallel_edges(mut self, enabled: bool) -> Self {
        self.parallel_edges = enabled;
        self
    }

    pub fn with_id_types(mut self, node: IdType, edge: IdType) -> Self {
        self.node_id_type = node;
        self.edge_id_type = edge;
        self
    }

    pub fn with_max_edge_types(mut self, max: usize) -> Self {
        self.max_edge_types = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || !self.block_size.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "block_size must be a power of two, got {}",
                self.block_size
            )));
        }
        if self.max_edge_types == 0 || self.max_edge_types > MAX_EDGE_TYPES {
            return Err(Error::InvalidConfig(format!(
                "max_edge_types must be in 1..={MAX_EDGE_TYPES}, got {}",
                self.max_edge_types
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_block_size() {
        let cfg = StoreConfig::default().with_block_size(1000);
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_type_bound() {
        let cfg = StoreConfig::default().with_max_edge_types(MAX_EDGE_TYPES + 1);
        assert!(cfg.validate().is_err());
        let cfg = StoreConfig::default().with_max_edge_types(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let cfg: StoreConfig = serde_json::from_str(r#"{"parallel_edges": true}"#).unwrap();
        assert!(cfg.parallel_edges);
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
    }
}
