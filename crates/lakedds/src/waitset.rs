// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WaitSet - blocking wait for Condition triggers
//!
//! Conditions register a wake signal when attached so they can rouse blocked
//! waiters immediately when their trigger value flips to `true`. The signal
//! is a coalesced condvar: many conditions share one wake path per wait-set,
//! and the waiter re-scans trigger values after every wake.

use crate::condition::Condition;
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Coalesced wake primitive shared between a WaitSet and its attached
/// conditions. Conditions call [`WaitSignal::signal`] when their trigger
/// value flips true; the wait-set consumes the signal and re-evaluates.
pub struct WaitSignal {
    id: u64,
    fired: Mutex<bool>,
    cv: Condvar,
}

impl WaitSignal {
    fn new() -> Arc<Self> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Arc::new(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            fired: Mutex::new(false),
            cv: Condvar::new(),
        })
    }

    /// Unique identifier, used by conditions to deregister the hook.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wake any waiter blocked on this signal.
    pub fn signal(&self) {
        let mut fired = match self.fired.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *fired = true;
        self.cv.notify_all();
    }

    /// Block until signalled or the deadline passes. Returns `false` on
    /// timeout. Consumes the pending signal, if any.
    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let mut fired = match self.fired.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        loop {
            if *fired {
                *fired = false;
                return true;
            }

            match deadline {
                Some(when) => {
                    let now = Instant::now();
                    if now >= when {
                        return false;
                    }
                    let (guard, _timeout) = match self.cv.wait_timeout(fired, when - now) {
                        Ok(pair) => pair,
                        Err(poisoned) => {
                            let pair = poisoned.into_inner();
                            (pair.0, pair.1)
                        }
                    };
                    fired = guard;
                }
                None => {
                    fired = match self.cv.wait(fired) {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                }
            }
        }
    }
}

/// WaitSet - wait for multiple conditions
///
/// A WaitSet allows blocking until at least one attached Condition has
/// `trigger_value == true`. A single [`WaitSignal`] is registered with every
/// attached condition; wakes are coalesced and the triggered subset is
/// recomputed from the trigger values themselves.
pub struct WaitSet {
    signal: Arc<WaitSignal>,
    entries: Mutex<Vec<Arc<dyn Condition>>>,
}

impl WaitSet {
    /// Create a new WaitSet
    #[must_use]
    pub fn new() -> Self {
        Self {
            signal: WaitSignal::new(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Attach a Condition to this WaitSet
    ///
    /// Attaching a condition that is already triggered wakes the next `wait`
    /// immediately. Duplicate attachment is rejected.
    pub fn attach_condition(&self, condition: Arc<dyn Condition>) -> Result<()> {
        let condition_id = condition.condition_id();

        let mut entries = self.entries.lock().map_err(|_| Error::WouldBlock)?;
        if entries
            .iter()
            .any(|entry| entry.condition_id() == condition_id)
        {
            return Err(Error::Config);
        }

        condition.add_waitset_signal(Arc::clone(&self.signal));
        entries.push(condition);

        Ok(())
    }

    /// Detach a Condition from this WaitSet
    pub fn detach_condition(&self, condition: Arc<dyn Condition>) -> Result<()> {
        let condition_id = condition.condition_id();

        let mut entries = self.entries.lock().map_err(|_| Error::WouldBlock)?;
        let Some(index) = entries
            .iter()
            .position(|entry| entry.condition_id() == condition_id)
        else {
            return Err(Error::Config);
        };

        let removed = entries.remove(index);
        removed.remove_waitset_signal(self.signal.id());

        Ok(())
    }

    /// Get all attached Conditions
    #[must_use]
    pub fn get_conditions(&self) -> Vec<Arc<dyn Condition>> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Wait until at least one Condition is triggered
    ///
    /// Returns the triggered subset, or `Error::WouldBlock` when the timeout
    /// elapses first. `None` timeout blocks indefinitely.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Vec<Arc<dyn Condition>>> {
        log::debug!("[waitset] wait called timeout={:?}", timeout);
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let triggered = self.collect_triggered();
            if !triggered.is_empty() {
                log::debug!("[waitset] wait returning triggered_len={}", triggered.len());
                return Ok(triggered);
            }

            if !self.signal.wait_until(deadline) {
                return Err(Error::WouldBlock);
            }
        }
    }

    fn collect_triggered(&self) -> Vec<Arc<dyn Condition>> {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::debug!("[waitset] entries mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };

        entries
            .iter()
            .filter(|entry| entry.get_trigger_value())
            .cloned()
            .collect()
    }
}

impl Default for WaitSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WaitSet {
    fn drop(&mut self) {
        if let Ok(entries) = self.entries.lock() {
            for entry in entries.iter() {
                entry.remove_waitset_signal(self.signal.id());
            }
        }
    }
}
