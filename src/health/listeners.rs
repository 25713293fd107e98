//! Observer registry for state-change notifications.
//!
//! # Responsibilities
//! - Register and remove callbacks
//! - Deliver a value to every registered callback
//! - Isolate callbacks from each other's panics
//!
//! # Design Decisions
//! - Delivery is synchronous, on the notifying thread
//! - Callbacks run against a snapshot taken in subscription order; the
//!   registry lock is released first, so a callback may subscribe or
//!   unsubscribe without deadlocking
//! - A callback removed by an earlier callback in the same round is not
//!   called; one added during the round waits for the next notification
//! - `Subscription` unsubscribes on drop

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A registered callback.
pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Table<T> {
    next_id: u64,
    callbacks: HashMap<u64, Callback<T>>,
}

/// Registry of callbacks receiving values of type `T`.
pub struct Listeners<T> {
    table: Arc<Mutex<Table<T>>>,
}

impl<T: Clone + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: 0,
                callbacks: HashMap::new(),
            })),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// subscription is unsubscribed or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let id = {
            let mut table = lock(&self.table);
            let id = table.next_id;
            table.next_id += 1;
            table.callbacks.insert(id, Arc::new(callback));
            id
        };

        let table: Weak<Mutex<Table<T>>> = Arc::downgrade(&self.table);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(table) = table.upgrade() {
                    lock(&table).callbacks.remove(&id);
                }
            })),
        }
    }

    /// Deliver `value` to every callback registered at the time of the call
    /// and still registered when its turn comes.
    ///
    /// Returns how many callbacks completed without panicking.
    pub fn notify(&self, value: T) -> usize {
        let mut snapshot: Vec<(u64, Callback<T>)> = lock(&self.table)
            .callbacks
            .iter()
            .map(|(id, cb)| (*id, cb.clone()))
            .collect();
        snapshot.sort_unstable_by_key(|(id, _)| *id);

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !lock(&self.table).callbacks.contains_key(&id) {
                continue;
            }
            let value = value.clone();
            match catch_unwind(AssertUnwindSafe(|| callback(value))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::warn!(listener = id, "Listener panicked during notification");
                }
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        lock(&self.table).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &lock(&self.table).callbacks.len())
            .finish()
    }
}

fn lock<T>(table: &Mutex<Table<T>>) -> MutexGuard<'_, Table<T>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a registered callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the callback. Calling this more than once is harmless.
    pub fn unsubscribe(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    /// Keep the callback registered for as long as the registry lives.
    pub fn detach(mut self) {
        self.remove = None;
    }

    pub fn is_active(&self) -> bool {
        self.remove.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
