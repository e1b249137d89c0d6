//! Compute-once cache for derived indexes.
//!
//! The loader runs under the lock, so concurrent first accesses wait for a single
//! build and never see a partially constructed value. Once published, the value is
//! shared as `Arc<T>` and never mutated. A failing loader publishes nothing.

use std::sync::Arc;

use parking_lot::Mutex;

pub struct LazyCache<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for LazyCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazyCache<T> {
    pub fn new() -> Self {
        LazyCache { slot: Mutex::new(None) }
    }

    pub fn get_or_init<F>(&self, loader: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let mut slot = self.slot.lock();
        if let Some(value) = slot.as_ref() {
            return Arc::clone(value);
        }
        let value = Arc::new(loader());
        *slot = Some(Arc::clone(&value));
        value
    }

    /// Like [`LazyCache::get_or_init`], but an `Err` from the loader is returned to
    /// the caller and the cache stays empty, so the next call retries.
    pub fn get_or_try_init<F, E>(&self, loader: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut slot = self.slot.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(loader()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Drop the published value. Holders of an earlier `Arc` keep their copy.
    pub fn reset(&self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_loader_runs_once() {
        let cache: LazyCache<Vec<u32>> = LazyCache::new();
        let calls = AtomicUsize::new(0);

        let a = cache.get_or_init(|| { calls.fetch_add(1, Ordering::SeqCst); vec![1, 2, 3] });
        let b = cache.get_or_init(|| { calls.fetch_add(1, Ordering::SeqCst); vec![9] });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, vec![1, 2, 3]);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: LazyCache<u32> = LazyCache::new();

        let r: Result<Arc<u32>, String> = cache.get_or_try_init(|| Err("corrupt".to_string()));
        assert!(r.is_err());
        assert!(!cache.is_initialized());

        let r: Result<Arc<u32>, String> = cache.get_or_try_init(|| Ok(7));
        assert_eq!(*r.unwrap(), 7);
        assert!(cache.is_initialized());
    }

    #[test]
    fn test_reset() {
        let cache: LazyCache<u32> = LazyCache::new();
        let first = cache.get_or_init(|| 1);
        cache.reset();
        assert!(cache.get().is_none());
        let second = cache.get_or_init(|| 2);
        assert_eq!((*first, *second), (1, 2));
    }

    #[test]
    fn test_concurrent_first_access() {
        let cache: Arc<LazyCache<usize>> = Arc::new(LazyCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    *cache.get_or_init(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(10));
                        42
                    })
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
