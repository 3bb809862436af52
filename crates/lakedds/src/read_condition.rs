// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ReadCondition - data-availability condition for DataReader endpoints
//!

use crate::condition::Condition;
use crate::waitset::WaitSignal;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Sample state mask, per DDS v1.4 spec section 2.2.2.5.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleStateMask(u32);

impl SampleStateMask {
    /// Sample has been read
    pub const READ: SampleStateMask = SampleStateMask(1 << 0);

    /// Sample has not been read
    pub const NOT_READ: SampleStateMask = SampleStateMask(1 << 1);

    /// Any sample state
    pub const ANY: SampleStateMask = SampleStateMask(Self::READ.0 | Self::NOT_READ.0);

    /// Create from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        SampleStateMask(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check if contains state
    pub const fn contains(&self, other: SampleStateMask) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for SampleStateMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        SampleStateMask(self.0 | rhs.0)
    }
}

/// View state mask, per DDS v1.4 spec section 2.2.2.5.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStateMask(u32);

impl ViewStateMask {
    /// Instance is new (first sample)
    pub const NEW: ViewStateMask = ViewStateMask(1 << 0);

    /// Instance is not new (subsequent samples)
    pub const NOT_NEW: ViewStateMask = ViewStateMask(1 << 1);

    /// Any view state
    pub const ANY: ViewStateMask = ViewStateMask(Self::NEW.0 | Self::NOT_NEW.0);

    /// Create from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        ViewStateMask(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check if contains state
    pub const fn contains(&self, other: ViewStateMask) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for ViewStateMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        ViewStateMask(self.0 | rhs.0)
    }
}

/// Instance state mask, per DDS v1.4 spec section 2.2.2.5.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceStateMask(u32);

impl InstanceStateMask {
    /// Instance is alive (writer exists)
    pub const ALIVE: InstanceStateMask = InstanceStateMask(1 << 0);

    /// Instance writer has disposed
    pub const NOT_ALIVE_DISPOSED: InstanceStateMask = InstanceStateMask(1 << 1);

    /// Instance writer has lost liveliness
    pub const NOT_ALIVE_NO_WRITERS: InstanceStateMask = InstanceStateMask(1 << 2);

    /// Any instance state
    pub const ANY: InstanceStateMask = InstanceStateMask(
        Self::ALIVE.0 | Self::NOT_ALIVE_DISPOSED.0 | Self::NOT_ALIVE_NO_WRITERS.0,
    );

    /// Create from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        InstanceStateMask(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Check if contains state
    pub const fn contains(&self, other: InstanceStateMask) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for InstanceStateMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        InstanceStateMask(self.0 | rhs.0)
    }
}

/// ReadCondition - condition based on DataReader sample states
///
/// Per DDS v1.4 spec section 2.2.4.1.6: the trigger value depends on the
/// presence of samples in the reader that match the specified states. The
/// reader runtime raises the trigger when matching samples arrive and lowers
/// it once they have been consumed.
pub struct ReadCondition {
    id: u64,

    sample_state_mask: SampleStateMask,
    view_state_mask: ViewStateMask,
    instance_state_mask: InstanceStateMask,

    /// Trigger value (updated by the owning reader's runtime path).
    trigger_value: AtomicBool,

    /// Wait-set hooks to notify on trigger change.
    waitset_signals: Mutex<Vec<ReadConditionHook>>,
}

struct ReadConditionHook {
    id: u64,
    signal: Weak<WaitSignal>,
}

impl ReadCondition {
    /// Create a new ReadCondition matching the given sample, view and
    /// instance states.
    pub fn new(
        sample_state_mask: SampleStateMask,
        view_state_mask: ViewStateMask,
        instance_state_mask: InstanceStateMask,
    ) -> Self {
        use std::sync::atomic::AtomicU64;
        static NEXT_ID: AtomicU64 = AtomicU64::new(2_000_000);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        Self {
            id,
            sample_state_mask,
            view_state_mask,
            instance_state_mask,
            trigger_value: AtomicBool::new(false),
            waitset_signals: Mutex::new(Vec::new()),
        }
    }

    /// Get the sample state mask
    pub fn get_sample_state_mask(&self) -> SampleStateMask {
        self.sample_state_mask
    }

    /// Get the view state mask
    pub fn get_view_state_mask(&self) -> ViewStateMask {
        self.view_state_mask
    }

    /// Get the instance state mask
    pub fn get_instance_state_mask(&self) -> InstanceStateMask {
        self.instance_state_mask
    }

    /// Set the trigger value (called by the owning reader when matching
    /// samples become available or have been consumed).
    pub fn set_trigger_value(&self, value: bool) {
        self.trigger_value.store(value, Ordering::Release);
        if value {
            self.notify_waitsets();
        }
    }

    fn notify_waitsets(&self) {
        let mut hooks = match self.waitset_signals.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::debug!("[condition] ReadCondition waitset_signals poisoned, recovering");
                poisoned.into_inner()
            }
        };

        hooks.retain(|hook| {
            if let Some(signal) = hook.signal.upgrade() {
                signal.signal();
                true
            } else {
                false
            }
        });
    }
}

impl Condition for ReadCondition {
    fn get_trigger_value(&self) -> bool {
        self.trigger_value.load(Ordering::Acquire)
    }

    fn condition_id(&self) -> u64 {
        self.id
    }

    fn add_waitset_signal(&self, signal: Arc<WaitSignal>) {
        let mut hooks = match self.waitset_signals.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::debug!("[condition] ReadCondition waitset_signals poisoned, recovering");
                poisoned.into_inner()
            }
        };

        hooks.retain(|hook| hook.signal.upgrade().is_some());
        hooks.push(ReadConditionHook {
            id: signal.id(),
            signal: Arc::downgrade(&signal),
        });

        if self.get_trigger_value() {
            signal.signal();
        }
    }

    fn remove_waitset_signal(&self, signal_id: u64) {
        if let Ok(mut hooks) = self.waitset_signals.lock() {
            hooks.retain(|hook| hook.id != signal_id);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
