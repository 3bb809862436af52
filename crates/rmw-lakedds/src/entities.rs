// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-entity-kind info records for the wait and event paths.
//!
//! Each record owns exactly one native condition per concern: a
//! [`ReadCondition`] for data/request/response readiness, and (for the
//! event-capable kinds) a [`StatusCondition`] for status events. Conditions
//! live as long as the entity; wait calls only ever borrow them.
//!
//! The `on_*` methods are the runtime notification path: they are called
//! from router/discovery threads outside any wait call, so the state they
//! touch is either atomic (matched counts) or mutex-guarded whole records.

use crate::event::{EventSource, StatusSnapshot};
use crate::{Error, Result, IMPLEMENTATION_IDENTIFIER};
use lakedds::{
    InstanceStateMask, LivelinessChangedStatus, LivelinessLostStatus, OfferedDeadlineMissedStatus,
    PublicationMatchedStatus, ReadCondition, RequestedDeadlineMissedStatus, SampleStateMask,
    StatusCondition, StatusMask, SubscriptionMatchedStatus, ViewStateMask,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Readiness capability: the native condition a wait call attaches for this
/// entity. Uniform across subscriptions, services and clients, which all
/// reduce to a read-condition.
pub trait Readiness {
    /// The entity's owned read-condition, its sole trigger source.
    fn read_condition(&self) -> Arc<ReadCondition>;
}

fn unread_samples_condition() -> Arc<ReadCondition> {
    Arc::new(ReadCondition::new(
        SampleStateMask::NOT_READ,
        ViewStateMask::ANY,
        InstanceStateMask::ANY,
    ))
}

fn lock_recover<'a, T>(cell: &'a Mutex<T>, what: &'static str) -> MutexGuard<'a, T> {
    match cell.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::debug!("[entities] {} status cell poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

/// Raise `bit` in the condition's active set without disturbing other bits.
fn raise_status(condition: &StatusCondition, bit: StatusMask) {
    condition.set_active_statuses(condition.get_active_statuses() | bit);
}

/// Clear `bit` from the condition's active set (status has been taken).
fn acknowledge_status(condition: &StatusCondition, bit: StatusMask) {
    let remaining = condition.get_active_statuses().bits() & !bit.bits();
    condition.set_active_statuses(StatusMask::from_bits(remaining));
}

/// Subscription endpoint record.
pub struct SubscriberInfo {
    implementation_identifier: &'static str,
    read_condition: Arc<ReadCondition>,
    status_condition: Arc<StatusCondition>,
    liveliness_changed: Mutex<LivelinessChangedStatus>,
    requested_deadline_missed: Mutex<RequestedDeadlineMissedStatus>,
    /// Matched publications, written by the discovery path and read lock-free
    /// from the query side.
    matched_count: AtomicU32,
}

impl SubscriberInfo {
    /// Create a subscription record with fresh conditions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            implementation_identifier: IMPLEMENTATION_IDENTIFIER,
            read_condition: unread_samples_condition(),
            status_condition: Arc::new(StatusCondition::new()),
            liveliness_changed: Mutex::new(LivelinessChangedStatus::default()),
            requested_deadline_missed: Mutex::new(RequestedDeadlineMissedStatus::default()),
            matched_count: AtomicU32::new(0),
        }
    }

    /// Runtime path: unread samples arrived for this subscription.
    pub fn on_data_available(&self) {
        self.read_condition.set_trigger_value(true);
    }

    /// Runtime path: all pending samples were consumed.
    pub fn on_samples_taken(&self) {
        self.read_condition.set_trigger_value(false);
    }

    /// Runtime path: a matched publisher changed liveliness.
    pub fn on_liveliness_changed(&self, status: LivelinessChangedStatus) {
        *lock_recover(&self.liveliness_changed, "liveliness_changed") = status;
        raise_status(&self.status_condition, StatusMask::LIVELINESS_CHANGED);
    }

    /// Runtime path: a requested deadline was missed.
    pub fn on_requested_deadline_missed(&self, status: RequestedDeadlineMissedStatus) {
        *lock_recover(&self.requested_deadline_missed, "requested_deadline_missed") = status;
        raise_status(&self.status_condition, StatusMask::REQUESTED_DEADLINE_MISSED);
    }

    /// Runtime path: the set of matched publications changed.
    pub fn on_subscription_matched(&self, status: SubscriptionMatchedStatus) {
        self.matched_count.store(status.current_count, Ordering::Release);
        raise_status(&self.status_condition, StatusMask::SUBSCRIPTION_MATCHED);
    }

    /// Current number of matched publications.
    #[must_use]
    pub fn matched_count(&self) -> u32 {
        self.matched_count.load(Ordering::Acquire)
    }
}

impl Default for SubscriberInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness for SubscriberInfo {
    fn read_condition(&self) -> Arc<ReadCondition> {
        Arc::clone(&self.read_condition)
    }
}

impl EventSource for SubscriberInfo {
    fn implementation_identifier(&self) -> &'static str {
        self.implementation_identifier
    }

    fn status_condition(&self) -> Arc<StatusCondition> {
        Arc::clone(&self.status_condition)
    }

    fn status_changes(&self) -> StatusMask {
        self.status_condition.get_active_statuses()
    }

    fn take_status(&self, mask: StatusMask) -> Result<StatusSnapshot> {
        match mask {
            m if m == StatusMask::LIVELINESS_CHANGED => {
                let mut cell = lock_recover(&self.liveliness_changed, "liveliness_changed");
                let snapshot = cell.clone();
                cell.alive_count_change = 0;
                cell.not_alive_count_change = 0;
                drop(cell);
                acknowledge_status(&self.status_condition, StatusMask::LIVELINESS_CHANGED);
                Ok(StatusSnapshot::LivelinessChanged(snapshot))
            }
            m if m == StatusMask::REQUESTED_DEADLINE_MISSED => {
                let mut cell =
                    lock_recover(&self.requested_deadline_missed, "requested_deadline_missed");
                let snapshot = cell.clone();
                cell.total_count_change = 0;
                drop(cell);
                acknowledge_status(&self.status_condition, StatusMask::REQUESTED_DEADLINE_MISSED);
                Ok(StatusSnapshot::RequestedDeadlineMissed(snapshot))
            }
            _ => Err(Error::Unsupported),
        }
    }
}

/// Publication endpoint record.
pub struct PublisherInfo {
    implementation_identifier: &'static str,
    status_condition: Arc<StatusCondition>,
    liveliness_lost: Mutex<LivelinessLostStatus>,
    offered_deadline_missed: Mutex<OfferedDeadlineMissedStatus>,
    /// Matched subscriptions, written by the discovery path and read
    /// lock-free from the query side.
    matched_count: AtomicU32,
}

impl PublisherInfo {
    /// Create a publication record with a fresh status condition.
    #[must_use]
    pub fn new() -> Self {
        Self {
            implementation_identifier: IMPLEMENTATION_IDENTIFIER,
            status_condition: Arc::new(StatusCondition::new()),
            liveliness_lost: Mutex::new(LivelinessLostStatus::default()),
            offered_deadline_missed: Mutex::new(OfferedDeadlineMissedStatus::default()),
            matched_count: AtomicU32::new(0),
        }
    }

    /// Runtime path: this publisher failed to assert liveliness in time.
    pub fn on_liveliness_lost(&self, status: LivelinessLostStatus) {
        *lock_recover(&self.liveliness_lost, "liveliness_lost") = status;
        raise_status(&self.status_condition, StatusMask::LIVELINESS_LOST);
    }

    /// Runtime path: an offered deadline was missed.
    pub fn on_offered_deadline_missed(&self, status: OfferedDeadlineMissedStatus) {
        *lock_recover(&self.offered_deadline_missed, "offered_deadline_missed") = status;
        raise_status(&self.status_condition, StatusMask::OFFERED_DEADLINE_MISSED);
    }

    /// Runtime path: the set of matched subscriptions changed.
    pub fn on_publication_matched(&self, status: PublicationMatchedStatus) {
        self.matched_count.store(status.current_count, Ordering::Release);
        raise_status(&self.status_condition, StatusMask::PUBLICATION_MATCHED);
    }

    /// Current number of matched subscriptions.
    #[must_use]
    pub fn matched_count(&self) -> u32 {
        self.matched_count.load(Ordering::Acquire)
    }
}

impl Default for PublisherInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for PublisherInfo {
    fn implementation_identifier(&self) -> &'static str {
        self.implementation_identifier
    }

    fn status_condition(&self) -> Arc<StatusCondition> {
        Arc::clone(&self.status_condition)
    }

    fn status_changes(&self) -> StatusMask {
        self.status_condition.get_active_statuses()
    }

    fn take_status(&self, mask: StatusMask) -> Result<StatusSnapshot> {
        match mask {
            m if m == StatusMask::LIVELINESS_LOST => {
                let mut cell = lock_recover(&self.liveliness_lost, "liveliness_lost");
                let snapshot = cell.clone();
                cell.total_count_change = 0;
                drop(cell);
                acknowledge_status(&self.status_condition, StatusMask::LIVELINESS_LOST);
                Ok(StatusSnapshot::LivelinessLost(snapshot))
            }
            m if m == StatusMask::OFFERED_DEADLINE_MISSED => {
                let mut cell =
                    lock_recover(&self.offered_deadline_missed, "offered_deadline_missed");
                let snapshot = cell.clone();
                cell.total_count_change = 0;
                drop(cell);
                acknowledge_status(&self.status_condition, StatusMask::OFFERED_DEADLINE_MISSED);
                Ok(StatusSnapshot::OfferedDeadlineMissed(snapshot))
            }
            _ => Err(Error::Unsupported),
        }
    }
}

/// Service (request-reader) endpoint record.
pub struct ServiceInfo {
    read_condition: Arc<ReadCondition>,
}

impl ServiceInfo {
    /// Create a service record with a fresh request read-condition.
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_condition: unread_samples_condition(),
        }
    }

    /// Runtime path: a request arrived for this service.
    pub fn on_request_available(&self) {
        self.read_condition.set_trigger_value(true);
    }

    /// Runtime path: all pending requests were consumed.
    pub fn on_requests_taken(&self) {
        self.read_condition.set_trigger_value(false);
    }
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness for ServiceInfo {
    fn read_condition(&self) -> Arc<ReadCondition> {
        Arc::clone(&self.read_condition)
    }
}

/// Client (response-reader) endpoint record.
///
/// The attachable condition and the response-arrival trigger are the same
/// object by construction; there is no separate response-reader condition to
/// drift out of sync with the one a wait call attaches.
pub struct ClientInfo {
    read_condition: Arc<ReadCondition>,
}

impl ClientInfo {
    /// Create a client record with a fresh response read-condition.
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_condition: unread_samples_condition(),
        }
    }

    /// Runtime path: a response arrived for this client.
    pub fn on_response_available(&self) {
        self.read_condition.set_trigger_value(true);
    }

    /// Runtime path: all pending responses were consumed.
    pub fn on_responses_taken(&self) {
        self.read_condition.set_trigger_value(false);
    }
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness for ClientInfo {
    fn read_condition(&self) -> Arc<ReadCondition> {
        Arc::clone(&self.read_condition)
    }
}

#[cfg(test)]
mod tests;
