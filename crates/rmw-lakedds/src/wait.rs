// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The wait-set coordinator: multiplex heterogeneous entity readiness onto
//! one native [`WaitSet`] and demultiplex the triggered subset back into the
//! caller's collections.
//!
//! The central resource invariant: between calls the native wait-set holds
//! zero attached conditions, and every exit path of [`wait`] (success,
//! timeout or error) restores it. The explicit detach steps of the
//! demultiplex pass handle the normal flow; a drop-guard re-enumerates and
//! sweeps whatever an aborted pass left behind.

use crate::entities::{ClientInfo, Readiness, ServiceInfo, SubscriberInfo};
use crate::event::Event;
use crate::event_converter::{ret_code_from_dds, status_mask_for_event};
use crate::{env_config, Error, Result, IMPLEMENTATION_IDENTIFIER};
use lakedds::{Condition, GuardCondition, StatusCondition, StatusMask, WaitSet};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Entity collections supplied to one [`wait`] call.
///
/// A `None` field means "no entities of this kind" and is skipped entirely.
/// Inside a supplied slice, every slot must be populated on input; on return
/// a slot is `None` iff its entity did not fire. Positional identity with
/// the input is preserved.
#[derive(Default)]
pub struct WaitArgs<'a> {
    /// Subscriptions to monitor for data readiness.
    pub subscriptions: Option<&'a mut [Option<Arc<SubscriberInfo>>]>,
    /// Guard conditions, attached directly.
    pub guard_conditions: Option<&'a mut [Option<Arc<GuardCondition>>]>,
    /// Services to monitor for request readiness.
    pub services: Option<&'a mut [Option<Arc<ServiceInfo>>]>,
    /// Clients to monitor for response readiness.
    pub clients: Option<&'a mut [Option<Arc<ClientInfo>>]>,
    /// Status events; their conditions are derived from the owning entities.
    pub events: Option<&'a mut [Option<Arc<Event>>]>,
}

/// Outcome of a completed [`wait`] call. Timeout is a valid outcome, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitVerdict {
    /// At least one attached condition triggered.
    Ready,
    /// The timeout elapsed before any condition triggered.
    TimedOut,
}

impl WaitVerdict {
    /// True iff the blocking step timed out.
    #[must_use]
    pub fn timed_out(self) -> bool {
        matches!(self, WaitVerdict::TimedOut)
    }
}

/// Per-wait-set state: the owned native wait-set plus two reusable scratch
/// condition sequences. One receives the triggered subset, the other is used
/// to re-enumerate attachments during cleanup.
///
/// Created once and reused across many wait calls. Concurrent `wait` calls
/// on one state serialize on the triggered-subset scratch lock; independent
/// states do not interact.
pub struct WaitSetState {
    pub(crate) implementation_identifier: &'static str,
    wait_set: WaitSet,
    active: Mutex<Vec<Arc<dyn Condition>>>,
    attached: Mutex<Vec<Arc<dyn Condition>>>,
}

impl WaitSetState {
    /// Create wait-set state with the configured scratch capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(env_config::waitset_capacity())
    }

    /// Create wait-set state with an explicit scratch capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            implementation_identifier: IMPLEMENTATION_IDENTIFIER,
            wait_set: WaitSet::new(),
            active: Mutex::new(Vec::with_capacity(capacity)),
            attached: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Number of conditions currently attached to the native wait-set.
    /// Zero between calls.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.wait_set.get_conditions().len()
    }
}

impl Default for WaitSetState {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_scratch<'a>(
    cell: &'a Mutex<Vec<Arc<dyn Condition>>>,
) -> MutexGuard<'a, Vec<Arc<dyn Condition>>> {
    match cell.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::debug!("[rmw-wait] scratch sequence poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Sweeps the native wait-set clean when the call exits.
///
/// Runs after the explicit detach steps, so on the normal path it finds
/// nothing; on an early error return it detaches whatever the aborted pass
/// left attached. Failures are logged and swallowed: they occur during
/// unwind and must not mask the primary result.
struct DetachGuard<'a> {
    state: &'a WaitSetState,
}

impl Drop for DetachGuard<'_> {
    fn drop(&mut self) {
        let mut attached = lock_scratch(&self.state.attached);
        attached.clear();
        attached.extend(self.state.wait_set.get_conditions());
        for condition in attached.drain(..) {
            if let Err(err) = self.state.wait_set.detach_condition(condition) {
                log::warn!(
                    "[rmw-wait] failed to detach condition during cleanup: {}",
                    err
                );
            }
        }
    }
}

/// Block until at least one supplied entity is ready or the timeout elapses.
///
/// `timeout` of `None` blocks indefinitely. On return every collection slot
/// is either unchanged (the entity fired) or `None` (it did not); guard
/// conditions found triggered have their trigger reset to false. The native
/// wait-set is left with zero attachments whatever the outcome.
pub fn wait(
    args: WaitArgs<'_>,
    wait_set: &WaitSetState,
    timeout: Option<Duration>,
) -> Result<WaitVerdict> {
    // Identity first, before any other logic.
    if wait_set.implementation_identifier != IMPLEMENTATION_IDENTIFIER {
        return Err(Error::IncorrectImplementation {
            expected: IMPLEMENTATION_IDENTIFIER,
            actual: wait_set.implementation_identifier,
        });
    }

    let WaitArgs {
        mut subscriptions,
        mut guard_conditions,
        mut services,
        mut clients,
        mut events,
    } = args;

    // One wait per state at a time: the triggered-subset scratch doubles as
    // the call lock.
    let mut active = lock_scratch(&wait_set.active);
    active.clear();

    let _cleanup = DetachGuard { state: wait_set };

    // --- attach pass ---

    if let Some(slots) = subscriptions.as_deref() {
        attach_readiness(&wait_set.wait_set, slots, "subscriber info")?;
    }

    // Gather status conditions for all supported events, accumulating masks
    // per owning entity and deduplicating by condition id.
    let mut status_conditions: HashMap<u64, Arc<StatusCondition>> = HashMap::new();
    if let Some(slots) = events.as_deref() {
        gather_event_conditions(slots, &mut status_conditions)?;
    }
    for condition in status_conditions.values() {
        let condition: Arc<dyn Condition> = condition.clone();
        wait_set
            .wait_set
            .attach_condition(condition)
            .map_err(ret_code_from_dds)?;
    }

    if let Some(slots) = guard_conditions.as_deref() {
        for slot in slots.iter() {
            let guard = slot.as_ref().ok_or(Error::NullHandle("guard condition"))?;
            let condition: Arc<dyn Condition> = guard.clone();
            wait_set
                .wait_set
                .attach_condition(condition)
                .map_err(ret_code_from_dds)?;
        }
    }

    if let Some(slots) = services.as_deref() {
        attach_readiness(&wait_set.wait_set, slots, "service info")?;
    }

    if let Some(slots) = clients.as_deref() {
        attach_readiness(&wait_set.wait_set, slots, "client info")?;
    }

    // --- block ---

    let verdict = match wait_set.wait_set.wait(timeout) {
        Ok(triggered) => {
            active.extend(triggered);
            WaitVerdict::Ready
        }
        Err(lakedds::Error::WouldBlock) => WaitVerdict::TimedOut,
        Err(err) => return Err(ret_code_from_dds(err)),
    };

    // --- demultiplex pass ---
    // Runs even after a timeout, so the zero-attachment invariant is
    // restored by the same explicit path.

    if let Some(slots) = subscriptions.as_deref_mut() {
        demux_readiness(&wait_set.wait_set, &active, slots, "subscriber info")?;
    }

    if let Some(slots) = guard_conditions.as_deref_mut() {
        for slot in slots.iter_mut() {
            let guard =
                Arc::clone(slot.as_ref().ok_or(Error::NullHandle("guard condition"))?);
            let fired = active
                .iter()
                .any(|cond| cond.condition_id() == guard.condition_id());
            if fired {
                // One-shot firing semantics.
                guard.set_trigger_value(false);
            } else {
                *slot = None;
            }
            let condition: Arc<dyn Condition> = guard;
            wait_set
                .wait_set
                .detach_condition(condition)
                .map_err(ret_code_from_dds)?;
        }
    }

    if let Some(slots) = services.as_deref_mut() {
        demux_readiness(&wait_set.wait_set, &active, slots, "service info")?;
    }

    if let Some(slots) = clients.as_deref_mut() {
        demux_readiness(&wait_set.wait_set, &active, slots, "client info")?;
    }

    if let Some(slots) = events.as_deref_mut() {
        handle_active_event_conditions(slots)?;
    }
    for condition in status_conditions.values() {
        // The enabled mask set during the attach pass is call-scoped.
        condition.set_enabled_statuses(StatusMask::NONE);
        let condition: Arc<dyn Condition> = condition.clone();
        if let Err(err) = wait_set.wait_set.detach_condition(condition) {
            log::debug!("[rmw-wait] status condition detach failed: {}", err);
        }
    }

    Ok(verdict)
}

/// Attach each entity's read-condition; a null slot is a hard error.
fn attach_readiness<T: Readiness>(
    wait_set: &WaitSet,
    slots: &[Option<Arc<T>>],
    what: &'static str,
) -> Result<()> {
    for slot in slots {
        let info = slot.as_ref().ok_or(Error::NullHandle(what))?;
        wait_set
            .attach_condition(info.read_condition())
            .map_err(ret_code_from_dds)?;
    }
    Ok(())
}

/// Null every slot whose read-condition is absent from the triggered set,
/// then detach the condition regardless.
fn demux_readiness<T: Readiness>(
    wait_set: &WaitSet,
    active: &[Arc<dyn Condition>],
    slots: &mut [Option<Arc<T>>],
    what: &'static str,
) -> Result<()> {
    for slot in slots.iter_mut() {
        let condition = slot.as_ref().ok_or(Error::NullHandle(what))?.read_condition();
        let fired = active
            .iter()
            .any(|cond| cond.condition_id() == condition.condition_id());
        if !fired {
            *slot = None;
        }
        wait_set
            .detach_condition(condition)
            .map_err(ret_code_from_dds)?;
    }
    Ok(())
}

/// Resolve every supported event to its owner's status condition, OR the
/// translated mask into the condition's enabled set and record the condition
/// once per id. Unsupported kinds are skipped; co-requested supported events
/// must not be blocked by them.
fn gather_event_conditions(
    slots: &[Option<Arc<Event>>],
    status_conditions: &mut HashMap<u64, Arc<StatusCondition>>,
) -> Result<()> {
    for slot in slots {
        let event = slot.as_ref().ok_or(Error::NullHandle("event"))?;
        let (source, kind) = match (event.source(), event.kind()) {
            (Some(source), Some(kind)) => (source, kind),
            _ => return Err(Error::NullHandle("event source")),
        };

        let Some(mask) = status_mask_for_event(kind) else {
            log::debug!("[rmw-wait] skipping unsupported event kind {:?}", kind);
            continue;
        };

        let condition = source.status_condition();
        condition.set_enabled_statuses(condition.get_enabled_statuses() | mask);
        let key = condition.condition_id();
        status_conditions.entry(key).or_insert(condition);
    }
    Ok(())
}

/// Null every event slot whose translated mask bit is not active in the
/// owner's current status-changes mask. Each descriptor is evaluated
/// independently, even when several share one status condition.
fn handle_active_event_conditions(slots: &mut [Option<Arc<Event>>]) -> Result<()> {
    for slot in slots.iter_mut() {
        let Some(event) = slot.as_ref() else {
            return Err(Error::NullHandle("event"));
        };
        let (source, kind) = match (event.source(), event.kind()) {
            (Some(source), Some(kind)) => (source, kind),
            _ => return Err(Error::NullHandle("event source")),
        };

        let is_active = status_mask_for_event(kind)
            .map_or(false, |mask| source.status_changes().and(mask).bits() != 0);
        if !is_active {
            *slot = None;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
