//! Re-entrancy guard for the publish cascade.
//!
//! Publishing a sibling is itself a status transition, so the store calls
//! back into the cascade while the cascade is still running. The guard marks
//! a scope as busy on the current thread for the lifetime of a
//! [`GuardToken`]; nested calls on that thread see the mark and back off.
//!
//! Marks live in thread-local state, so other threads are never affected.
//! The cascade scopes its guard to the store it publishes through, which
//! makes every cascade subscribed to that store back off together.

use std::cell::RefCell;
use std::collections::HashSet;
use std::marker::PhantomData;
use syncpub_store::ContentStore;

thread_local! {
    static ACTIVE_SCOPES: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Busy mark for one scope on the current thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReentrancyGuard {
    scope: usize,
}

impl ReentrancyGuard {
    pub const fn new(scope: usize) -> Self {
        Self { scope }
    }

    /// Guard scoped to `store`, identified by its address.
    pub fn for_store(store: &dyn ContentStore) -> Self {
        Self::new(std::ptr::from_ref(store).cast::<()>().addr())
    }

    /// Marks the scope busy on the current thread.
    ///
    /// Returns `None` if this thread already holds a token for the scope.
    pub fn enter(&self) -> Option<GuardToken> {
        let inserted = ACTIVE_SCOPES.with_borrow_mut(|active| active.insert(self.scope));
        inserted.then_some(GuardToken {
            scope: self.scope,
            _thread: PhantomData,
        })
    }

    /// Whether the current thread holds a token for the scope.
    pub fn is_active(&self) -> bool {
        ACTIVE_SCOPES.with_borrow(|active| active.contains(&self.scope))
    }
}

/// Clears the mark when dropped, including during unwinding.
///
/// Not `Send`: the mark belongs to the thread that entered.
#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken {
    scope: usize,
    _thread: PhantomData<*const ()>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        // Thread-local storage may already be gone during thread teardown.
        let _ = ACTIVE_SCOPES.try_with(|active| active.borrow_mut().remove(&self.scope));
    }
}
