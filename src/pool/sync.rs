//! Lock used for pool bookkeeping
//!
//! `parking_lot` in normal builds. Under `--cfg slabpool_loom` the lock comes from
//! loom so model tests can explore every interleaving of take/put/expand.

#[cfg(not(slabpool_loom))]
pub(crate) use std::sync::Arc;

#[cfg(slabpool_loom)]
pub(crate) use loom::sync::Arc;

#[cfg(not(slabpool_loom))]
pub(crate) type MutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;

#[cfg(slabpool_loom)]
pub(crate) type MutexGuard<'a, T> = loom::sync::MutexGuard<'a, T>;

pub(crate) struct Mutex<T> {
    #[cfg(not(slabpool_loom))]
    inner: parking_lot::Mutex<T>,
    #[cfg(slabpool_loom)]
    inner: loom::sync::Mutex<T>,
}

impl<T> Mutex<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            #[cfg(not(slabpool_loom))]
            inner: parking_lot::Mutex::new(value),
            #[cfg(slabpool_loom)]
            inner: loom::sync::Mutex::new(value),
        }
    }

    #[cfg(not(slabpool_loom))]
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    // Pool critical sections never panic while holding the guard
    #[cfg(slabpool_loom)]
    pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
