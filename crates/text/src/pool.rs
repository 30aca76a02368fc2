//! Buffer pools for the reader's byte and char buffers.
//!
//! A reader acquires its buffers once at construction and hands them back exactly once when
//! it is disposed. [`HeapPool`] simply allocates and frees; [`SharedPool`] keeps released
//! buffers around so the next reader can reuse them.

use std::fmt;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::TextError;
use crate::utils::ensure;

/// Source of reusable fixed-size buffers.
pub trait BufferPool<T>: fmt::Debug + Send + Sync {
    /// Hands out a buffer holding at least `len` elements.
    ///
    /// # Errors
    /// A pool may refuse requests it cannot serve, for example with
    /// [`TextError::BufferTooLarge`].
    fn acquire(&self, len: usize) -> Result<Vec<T>, TextError>;

    /// Takes back a buffer previously returned by [`acquire`](BufferPool::acquire).
    fn release(&self, buffer: Vec<T>);
}

/// A pool that allocates on every acquire and frees on every release.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapPool;

impl<T: Copy + Default> BufferPool<T> for HeapPool {
    fn acquire(&self, len: usize) -> Result<Vec<T>, TextError> {
        Ok(vec![T::default(); len])
    }

    fn release(&self, _buffer: Vec<T>) {}
}

/// A pool that keeps released buffers for reuse.
///
/// Requests larger than `max_buffer_len` are rejected, and at most `max_retained` buffers are
/// kept; anything released beyond that is dropped.
#[derive(Debug)]
pub struct SharedPool<T> {
    free: Mutex<Vec<Vec<T>>>,
    max_buffer_len: usize,
    max_retained: usize,
}

impl<T> SharedPool<T> {
    pub const DEFAULT_MAX_BUFFER_LEN: usize = 1024 * 1024;
    pub const DEFAULT_MAX_RETAINED: usize = 32;

    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_MAX_BUFFER_LEN, Self::DEFAULT_MAX_RETAINED)
    }

    pub fn with_limits(max_buffer_len: usize, max_retained: usize) -> Self {
        Self { free: Mutex::new(Vec::new()), max_buffer_len, max_retained }
    }

    /// Number of buffers currently waiting to be reused.
    pub fn retained(&self) -> usize {
        self.free.lock().len()
    }
}

impl<T> Default for SharedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BufferPool<T> for SharedPool<T>
where
    T: Copy + Default + Send + fmt::Debug,
{
    fn acquire(&self, len: usize) -> Result<Vec<T>, TextError> {
        ensure!(len <= self.max_buffer_len, TextError::buffer_too_large(len, self.max_buffer_len));

        let reused = {
            let mut free = self.free.lock();
            free.iter().position(|buffer| buffer.len() >= len).map(|index| free.swap_remove(index))
        };

        match reused {
            Some(buffer) => {
                trace!(len = buffer.len(), "reuse pooled buffer");
                Ok(buffer)
            }
            None => Ok(vec![T::default(); len]),
        }
    }

    fn release(&self, buffer: Vec<T>) {
        if buffer.len() > self.max_buffer_len {
            return;
        }

        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_pool_allocates_requested_len() {
        let buffer: Vec<u8> = HeapPool.acquire(16).unwrap();
        assert_eq!(buffer.len(), 16);
        HeapPool.release(buffer);
    }

    #[test]
    fn test_shared_pool_reuses_released_buffers() {
        let pool = SharedPool::<char>::new();

        let mut buffer = pool.acquire(8).unwrap();
        buffer[0] = 'x';
        pool.release(buffer);
        assert_eq!(pool.retained(), 1);

        // a smaller request is served by the larger retained buffer
        let buffer = pool.acquire(4).unwrap();
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer[0], 'x');
        assert_eq!(pool.retained(), 0);
    }

    #[test]
    fn test_shared_pool_rejects_oversized_requests() {
        let pool = SharedPool::<u8>::with_limits(64, 4);
        assert!(matches!(pool.acquire(65), Err(TextError::BufferTooLarge { requested: 65, max: 64 })));
        pool.acquire(64).unwrap();
    }

    #[test]
    fn test_shared_pool_caps_retained_buffers() {
        let pool = SharedPool::<u8>::with_limits(64, 2);
        for _ in 0..3 {
            pool.release(vec![0; 8]);
        }
        assert_eq!(pool.retained(), 2);
    }
}
