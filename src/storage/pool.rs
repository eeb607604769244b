//! Block-allocated element pool.
//!
//! Records live in fixed-capacity blocks so a store id maps to
//! `(id >> shift, id & mask)` in O(1) and growth never moves existing
//! records. Only empty trailing blocks are retired; the first block is kept
//! and reset instead.

use crate::model::StoreId;

#[derive(Debug, Clone)]
struct Block<T> {
    slots: Vec<Option<T>>,
    live: usize,
}

impl<T> Block<T> {
    fn new() -> Self {
        Self { slots: Vec::new(), live: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct BlockPool<T> {
    blocks: Vec<Block<T>>,
    block_size: usize,
    shift: u32,
    mask: usize,
}

impl<T> BlockPool<T> {
    /// `block_size` must be a power of two (checked by `StoreConfig::validate`).
    pub fn new(block_size: usize) -> Self {
        debug_assert!(block_size.is_power_of_two());
        Self {
            blocks: vec![Block::new()],
            block_size,
            shift: block_size.trailing_zeros(),
            mask: block_size - 1,
        }
    }

    #[inline]
    fn locate(&self, id: StoreId) -> (usize, usize) {
        (id.index() >> self.shift, id.index() & self.mask)
    }

    #[inline]
    pub fn get(&self, id: StoreId) -> Option<&T> {
        let (b, o) = self.locate(id);
        self.blocks.get(b)?.slots.get(o)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: StoreId) -> Option<&mut T> {
        let (b, o) = self.locate(id);
        self.blocks.get_mut(b)?.slots.get_mut(o)?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: StoreId) -> bool {
        self.get(id).is_some()
    }

    /// Places `value` at `id`. The slot must be free.
    pub fn insert(&mut self, id: StoreId, value: T) {
        let (b, o) = self.locate(id);
        while self.blocks.len() <= b {
            self.blocks.push(Block::new());
        }
        let block = &mut self.blocks[b];
        if block.slots.len() <= o {
            block.slots.resize_with(o + 1, || None);
        }
        debug_assert!(block.slots[o].is_none(), "slot {id} already occupied");
        block.slots[o] = Some(value);
        block.live += 1;
    }

    pub fn take(&mut self, id: StoreId) -> Option<T> {
        let (b, o) = self.locate(id);
        let block = self.blocks.get_mut(b)?;
        let value = block.slots.get_mut(o)?.take()?;
        block.live -= 1;
        Some(value)
    }

    /// Retires empty trailing blocks and returns the new high-water mark when
    /// anything was released.
    pub fn retire_trailing(&mut self) -> Option<u32> {
        let mut changed = false;
        loop {
            let last = self.blocks.len() - 1;
            if self.blocks[last].live != 0 {
                break;
            }
            if last == 0 {
                if !self.blocks[0].slots.is_empty() {
                    self.blocks[0].slots = Vec::new();
                    changed = true;
                }
                break;
            }
            self.blocks.pop();
            changed = true;
        }
        changed.then(|| self.high_water())
    }

    /// One past the highest slot ever materialised in the current blocks.
    pub fn high_water(&self) -> u32 {
        let last = self.blocks.len() - 1;
        (last * self.block_size + self.blocks[last].slots.len()) as u32
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.blocks.push(Block::new());
    }

    /// Live records in ascending store-id order.
    pub fn iter(&self) -> impl Iterator<Item = (StoreId, &T)> + '_ {
        let shift = self.shift;
        self.blocks.iter().enumerate().flat_map(move |(b, block)| {
            block.slots.iter().enumerate().filter_map(move |(o, slot)| {
                slot.as_ref().map(|v| (StoreId(((b << shift) + o) as u32), v))
            })
        })
    }

    /// First live id at or after `from`.
    pub fn next_live(&self, from: u32) -> Option<StoreId> {
        let hw = self.high_water();
        (from..hw).map(StoreId).find(|id| self.contains(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_into_new_blocks() {
        let mut pool = BlockPool::new(4);
        for i in 0..9 {
            pool.insert(StoreId(i), i);
        }
        assert_eq!(pool.block_count(), 3);
        assert_eq!(pool.get(StoreId(8)), Some(&8));
        assert_eq!(pool.high_water(), 9);
    }

    #[test]
    fn test_retires_only_trailing_empty_blocks() {
        let mut pool = BlockPool::new(4);
        for i in 0..12 {
            pool.insert(StoreId(i), i);
        }
        for i in 4..8 {
            pool.take(StoreId(i));
        }
        // middle block empty but not trailing
        assert_eq!(pool.retire_trailing(), None);
        assert_eq!(pool.block_count(), 3);
        for i in 8..12 {
            pool.take(StoreId(i));
        }
        assert_eq!(pool.retire_trailing(), Some(4));
        assert_eq!(pool.block_count(), 1);
    }

    #[test]
    fn test_sole_block_is_reset_not_retired() {
        let mut pool = BlockPool::new(4);
        pool.insert(StoreId(0), 'a');
        pool.insert(StoreId(1), 'b');
        pool.take(StoreId(0));
        assert_eq!(pool.retire_trailing(), None);
        pool.take(StoreId(1));
        assert_eq!(pool.retire_trailing(), Some(0));
        assert_eq!(pool.block_count(), 1);
        assert_eq!(pool.high_water(), 0);
    }

    #[test]
    fn test_iter_skips_holes() {
        let mut pool = BlockPool::new(4);
        for i in 0..6 {
            pool.insert(StoreId(i), i * 10);
        }
        pool.take(StoreId(2));
        let ids: Vec<u32> = pool.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![0, 1, 3, 4, 5]);
        assert_eq!(pool.next_live(2), Some(StoreId(3)));
    }
}
