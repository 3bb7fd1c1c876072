//! One-shot bridge from a background operation to caller callbacks.
//!
//! A [`Notifier`] holds a success callback and an error callback. The first
//! call to [`notify`](Notifier::notify) consumes both and invokes exactly
//! one of them; later calls, or calls after [`teardown`](Notifier::teardown),
//! are no-ops.

use std::sync::{Mutex, PoisonError};

use crate::error::PocketError;

type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

struct Slot<T, E> {
    on_success: Callback<T>,
    on_error: Callback<E>,
}

/// Single-slot result channel with exactly-once delivery.
pub struct Notifier<T, E = PocketError> {
    slot: Mutex<Option<Slot<T, E>>>,
}

impl<T, E> Notifier<T, E> {
    pub fn new(
        on_success: impl FnOnce(T) + Send + 'static,
        on_error: impl FnOnce(E) + Send + 'static,
    ) -> Self {
        Self {
            slot: Mutex::new(Some(Slot {
                on_success: Box::new(on_success),
                on_error: Box::new(on_error),
            })),
        }
    }

    /// Deliver `result` to the matching callback.
    ///
    /// Returns `false` if the notifier already fired or was torn down.
    pub fn notify(&self, result: Result<T, E>) -> bool {
        // The lock is released before any callback runs.
        let Some(slot) = self.take() else {
            return false;
        };
        match result {
            Ok(value) => (slot.on_success)(value),
            Err(err) => (slot.on_error)(err),
        }
        true
    }

    pub fn success(&self, value: T) -> bool {
        self.notify(Ok(value))
    }

    pub fn error(&self, err: E) -> bool {
        self.notify(Err(err))
    }

    /// Drop both callbacks without invoking them.
    pub fn teardown(&self) {
        drop(self.take());
    }

    /// Returns `true` until the notifier fires or is torn down.
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn take(&self) -> Option<Slot<T, E>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl<T, E> std::fmt::Debug for Notifier<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Notifier<u32, String>) {
        let ok = Arc::new(AtomicUsize::new(0));
        let err = Arc::new(AtomicUsize::new(0));
        let (ok_c, err_c) = (ok.clone(), err.clone());
        let notifier = Notifier::new(
            move |_| {
                ok_c.fetch_add(1, Ordering::SeqCst);
            },
            move |_| {
                err_c.fetch_add(1, Ordering::SeqCst);
            },
        );
        (ok, err, notifier)
    }

    #[test]
    fn delivers_success_once() {
        let (ok, err, notifier) = counting();
        assert!(notifier.success(1));
        assert!(!notifier.success(2));
        assert!(!notifier.error("late".into()));
        assert_eq!(ok.load(Ordering::SeqCst), 1);
        assert_eq!(err.load(Ordering::SeqCst), 0);
        assert!(!notifier.is_pending());
    }

    #[test]
    fn delivers_error_once() {
        let (ok, err, notifier) = counting();
        assert!(notifier.notify(Err("boom".into())));
        assert!(!notifier.notify(Ok(3)));
        assert_eq!(ok.load(Ordering::SeqCst), 0);
        assert_eq!(err.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn teardown_releases_callbacks() {
        let guard = Arc::new(());
        let held = guard.clone();
        let notifier: Notifier<(), ()> = Notifier::new(move |_| drop(held), |_| {});
        assert_eq!(Arc::strong_count(&guard), 2);
        notifier.teardown();
        assert_eq!(Arc::strong_count(&guard), 1);
        assert!(!notifier.is_pending());
        assert!(!notifier.success(()));
    }

    #[test]
    fn concurrent_notify_fires_once() {
        let (ok, err, notifier) = counting();
        let notifier = Arc::new(notifier);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let n = notifier.clone();
                std::thread::spawn(move || n.success(i))
            })
            .collect();
        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|f| *f)
            .count();
        assert_eq!(fired, 1);
        assert_eq!(ok.load(Ordering::SeqCst) + err.load(Ordering::SeqCst), 1);
    }
}
