//! Reentrant multi-reader / single-writer lock.
//!
//! Any number of threads may hold the read lock at once. The write lock
//! excludes every other reader and writer, but the thread holding it may
//! take the write lock again or take the read lock without deadlocking.
//! Each `lock` must be paired with an `unlock` on the same thread; the
//! scoped [`ReadGuard`] / [`WriteGuard`] do this on every exit path.
//!
//! A reader that tries to upgrade to the write lock deadlocks.

use std::marker::PhantomData;
use std::thread::{self, ThreadId};
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writers: usize,              // Reentrant depth of the active writer
    writer: Option<ThreadId>,
}

impl LockState {
    fn held_by(&self, thread: ThreadId) -> bool {
        self.writers > 0 && self.writer == Some(thread)
    }
}

#[derive(Debug, Default)]
pub struct ReadWriteLock {
    state: Mutex<LockState>,
    changed: Condvar,
}

impl ReadWriteLock {
    pub fn new() -> Self {
        ReadWriteLock {
            state: Mutex::new(LockState::default()),
            changed: Condvar::new(),
        }
    }

    pub fn read_lock(&self) -> ReadLock<'_> {
        ReadLock { lock: self }
    }

    pub fn write_lock(&self) -> WriteLock<'_> {
        WriteLock { lock: self }
    }

    /// Holds the read lock until the guard drops
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard { lock: self, _not_send: PhantomData }
    }

    /// Holds the write lock until the guard drops
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { lock: self, _not_send: PhantomData }
    }

    /// Current number of read holds
    pub fn readers(&self) -> usize {
        self.state.lock().readers
    }

    pub fn is_write_locked(&self) -> bool {
        self.state.lock().writers > 0
    }

    pub fn is_write_locked_by_current_thread(&self) -> bool {
        self.state.lock().held_by(thread::current().id())
    }

    fn acquire_read(&self) {
        let current = thread::current().id();
        let mut state = self.state.lock();

        while state.writers > 0 && state.writer != Some(current) {
            self.changed.wait(&mut state);
        }

        state.readers += 1;
    }

    fn release_read(&self) {
        let mut state = self.state.lock();

        if state.readers == 0 {
            drop(state);
            panic!("read lock released without a matching lock");
        }

        state.readers -= 1;
        if state.readers == 0 {
            self.changed.notify_all();
        }
    }

    fn acquire_write(&self) {
        let current = thread::current().id();
        let mut state = self.state.lock();

        while !(state.held_by(current) || (state.readers == 0 && state.writers == 0)) {
            self.changed.wait(&mut state);
        }

        state.writers += 1;
        state.writer = Some(current);
    }

    fn release_write(&self) {
        let current = thread::current().id();
        let mut state = self.state.lock();

        if !state.held_by(current) {
            drop(state);
            panic!("write lock released by a thread that does not hold it");
        }

        state.writers -= 1;
        if state.writers == 0 {
            state.writer = None;
            self.changed.notify_all();
        }
    }
}

/// Read half of a [`ReadWriteLock`]
pub struct ReadLock<'a> {
    lock: &'a ReadWriteLock,
}

impl ReadLock<'_> {
    /// Blocks until no other thread holds the write lock.
    pub fn lock(&self) {
        self.lock.acquire_read();
    }

    /// # Panics
    /// Panics if no read lock is held.
    pub fn unlock(&self) {
        self.lock.release_read();
    }
}

/// Write half of a [`ReadWriteLock`]
pub struct WriteLock<'a> {
    lock: &'a ReadWriteLock,
}

impl WriteLock<'_> {
    /// Blocks until there are no readers and no other writer.
    pub fn lock(&self) {
        self.lock.acquire_write();
    }

    /// # Panics
    /// Panics if the calling thread does not hold the write lock.
    pub fn unlock(&self) {
        self.lock.release_write();
    }
}

pub struct ReadGuard<'a> {
    lock: &'a ReadWriteLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

pub struct WriteGuard<'a> {
    lock: &'a ReadWriteLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
