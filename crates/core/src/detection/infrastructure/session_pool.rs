use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Interchangeable inference sessions shared by the extraction workers.
///
/// A caller takes the first free slot, starting from a rotating offset.
/// When every slot is busy it waits on the slot at that offset.
pub struct SessionPool<T> {
    slots: Vec<Mutex<T>>,
    next: AtomicUsize,
}

impl<T> SessionPool<T> {
    /// Builds `size` slots (at least one) with `load`, stopping at the first
    /// error.
    pub fn build<E>(size: usize, mut load: impl FnMut() -> Result<T, E>) -> Result<Self, E> {
        let slots = (0..size.max(1))
            .map(|_| load().map(Mutex::new))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self {
            slots,
            next: AtomicUsize::new(0),
        })
    }

    /// Runs `f` with exclusive access to one session.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut guard)
    }

    fn acquire(&self) -> MutexGuard<'_, T> {
        let count = self.slots.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed) % count;
        for offset in 0..count {
            let slot = &self.slots[(start + offset) % count];
            match slot.try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return recover(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {}
            }
        }
        self.slots[start]
            .lock()
            .unwrap_or_else(|poisoned| recover(poisoned.into_inner()))
    }
}

// A panic while a session was held leaves the session itself usable.
fn recover<T>(guard: MutexGuard<'_, T>) -> MutexGuard<'_, T> {
    log::warn!("Reusing an inference session released by a panicking worker");
    guard
}
