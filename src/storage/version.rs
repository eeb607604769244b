//! Structural version counters.

use serde::{Deserialize, Serialize};

/// 32-bit change counter. Wraps from `i32::MAX` to `i32::MIN`, never to zero,
/// so "differs from what I saw" stays a valid change test across the wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(i32);

impl Version {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn bump(&mut self) -> Version {
        self.0 = if self.0 == i32::MAX { i32::MIN } else { self.0 + 1 };
        *self
    }
}

/// Node and edge versions of a store or view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphVersion {
    pub node: Version,
    pub edge: Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_to_min() {
        let mut v = Version::new(i32::MAX - 1);
        assert_eq!(v.bump().get(), i32::MAX);
        assert_eq!(v.bump().get(), i32::MIN);
        assert_eq!(v.bump().get(), i32::MIN + 1);
    }

    #[test]
    fn test_seen_version_differs_after_wrap() {
        let seen = Version::new(i32::MAX);
        let mut current = seen;
        current.bump();
        assert_ne!(seen, current);
    }
}
