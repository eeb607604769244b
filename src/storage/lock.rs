//! Non-upgradeable readers-writer lock with writer read-through and downgrade.
//!
//! Protocol, per thread:
//! - any number of nested reads; the first takes one shared hold on the raw
//!   lock, later ones only count
//! - a write while holding a read fails with [`Error::LockUpgrade`]
//! - a second write by the writer fails with [`Error::LockReentry`]
//! - the writer may read; releasing the write while such reads are still held
//!   downgrades the raw lock to shared
//!
//! Guards are `!Send`: they must be released on the thread that acquired them.

use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use hashbrown::HashMap;
use parking_lot::lock_api::{RawRwLock as _, RawRwLockDowngrade as _};
use parking_lot::{Mutex, RawRwLock};

use crate::{Error, Result};

#[derive(Debug, Default)]
struct LockState {
    writer: Option<ThreadId>,
    /// Reads taken by the writer while it holds the write lock.
    writer_reads: usize,
    /// Reentrancy count per reading thread. Each entry owns one shared hold.
    readers: HashMap<ThreadId, usize>,
}

pub struct GraphLock {
    raw: RawRwLock,
    state: Mutex<LockState>,
}

impl Default for GraphLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("GraphLock")
            .field("writer", &state.writer)
            .field("readers", &state.readers.len())
            .finish()
    }
}

impl GraphLock {
    pub fn new() -> Self {
        Self { raw: RawRwLock::INIT, state: Mutex::new(LockState::default()) }
    }

    /// Blocks until shared access is available.
    pub fn read(&self) -> Result<ReadLock<'_>> {
        let me = thread::current().id();
        {
            let mut state = self.state.lock();
            if state.writer == Some(me) {
                state.writer_reads += 1;
                return Ok(ReadLock::new(self));
            }
            if let Some(count) = state.readers.get_mut(&me) {
                *count += 1;
                return Ok(ReadLock::new(self));
            }
        }
        self.raw.lock_shared();
        self.state.lock().readers.insert(me, 1);
        Ok(ReadLock::new(self))
    }

    /// Blocks until exclusive access is available.
    pub fn write(&self) -> Result<WriteLock<'_>> {
        let me = thread::current().id();
        {
            let state = self.state.lock();
            if state.writer == Some(me) {
                return Err(Error::LockReentry);
            }
            if state.readers.contains_key(&me) {
                return Err(Error::LockUpgrade);
            }
        }
        self.raw.lock_exclusive();
        let mut state = self.state.lock();
        state.writer = Some(me);
        state.writer_reads = 0;
        tracing::trace!(thread = ?me, "write lock acquired");
        Ok(WriteLock::new(self))
    }

    /// Whether the calling thread holds the write lock.
    pub fn is_write_held_by_current(&self) -> bool {
        self.state.lock().writer == Some(thread::current().id())
    }

    /// Whether the calling thread holds a read, including reads by the writer.
    pub fn is_read_held_by_current(&self) -> bool {
        let me = thread::current().id();
        let state = self.state.lock();
        state.readers.contains_key(&me) || (state.writer == Some(me) && state.writer_reads > 0)
    }

    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    fn release_read(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.writer == Some(me) && state.writer_reads > 0 {
            state.writer_reads -= 1;
            return;
        }
        let Some(count) = state.readers.get_mut(&me) else {
            debug_assert!(false, "read released by a thread that holds none");
            return;
        };
        *count -= 1;
        if *count == 0 {
            state.readers.remove(&me);
            drop(state);
            // SAFETY: this thread's entry owned exactly one shared hold.
            unsafe { self.raw.unlock_shared() };
        }
    }

    fn release_write(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        debug_assert_eq!(state.writer, Some(me));
        state.writer = None;
        let reads = std::mem::take(&mut state.writer_reads);
        if reads > 0 {
            state.readers.insert(me, reads);
            drop(state);
            tracing::trace!(thread = ?me, reads, "write lock downgraded");
            // SAFETY: this thread holds the exclusive lock.
            unsafe { self.raw.downgrade() };
        } else {
            drop(state);
            // SAFETY: this thread holds the exclusive lock.
            unsafe { self.raw.unlock_exclusive() };
        }
    }
}

/// One read acquisition. Released on drop.
#[must_use = "the read lock is released as soon as the guard is dropped"]
pub struct ReadLock<'a> {
    lock: &'a GraphLock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ReadLock<'a> {
    fn new(lock: &'a GraphLock) -> Self {
        Self { lock, _not_send: PhantomData }
    }
}

impl Drop for ReadLock<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// The write acquisition. Released (or downgraded) on drop.
#[must_use = "the write lock is released as soon as the guard is dropped"]
pub struct WriteLock<'a> {
    lock: &'a GraphLock,
    _not_send: PhantomData<*const ()>,
}

impl<'a> WriteLock<'a> {
    fn new(lock: &'a GraphLock) -> Self {
        Self { lock, _not_send: PhantomData }
    }

    pub fn lock(&self) -> &'a GraphLock {
        self.lock
    }
}

impl Drop for WriteLock<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
