// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RMW status events: the generic event vocabulary, the event descriptor
//! lifecycle (zero-initialized, bound, finalized) and on-demand status
//! taking.
//!
//! An [`Event`] carries no condition of its own; it pairs a generic
//! [`EventKind`] with a back-reference to the owning entity's
//! [`EventSource`] capability. The wait path derives the status condition
//! from the source, and [`take_event`] queries the source for a snapshot.

use crate::entities::{PublisherInfo, SubscriberInfo};
use crate::event_converter::status_mask_for_event;
use crate::{Error, Result, IMPLEMENTATION_IDENTIFIER};
use lakedds::{
    LivelinessChangedStatus, LivelinessLostStatus, OfferedDeadlineMissedStatus,
    RequestedDeadlineMissedStatus, StatusCondition, StatusMask,
};
use std::sync::Arc;

/// Generic RMW event kinds.
///
/// Only the liveliness and deadline kinds have a native status mapping; the
/// incompatible-QoS kinds are part of the vocabulary but unsupported by this
/// binding (see [`crate::is_event_supported`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A publisher matched to the subscription changed liveliness.
    LivelinessChanged,
    /// The subscription missed a requested deadline.
    RequestedDeadlineMissed,
    /// Requested QoS is incompatible with an offered QoS.
    RequestedQosIncompatible,
    /// The publisher lost liveliness.
    LivelinessLost,
    /// The publisher missed an offered deadline.
    OfferedDeadlineMissed,
    /// Offered QoS is incompatible with a requested QoS.
    OfferedQosIncompatible,
}

/// Status snapshot returned by [`take_event`], one variant per supported
/// event kind. Produced only on success; the counts/deltas are taken from
/// the owning entity's native status accessor at call time.
#[derive(Debug, Clone)]
pub enum StatusSnapshot {
    /// Reader-side liveliness change counts.
    LivelinessChanged(LivelinessChangedStatus),
    /// Reader-side missed-deadline counts.
    RequestedDeadlineMissed(RequestedDeadlineMissedStatus),
    /// Writer-side liveliness loss counts.
    LivelinessLost(LivelinessLostStatus),
    /// Writer-side missed-deadline counts.
    OfferedDeadlineMissed(OfferedDeadlineMissedStatus),
}

/// Capability exposed by entities that can back status events.
///
/// Implemented by [`SubscriberInfo`] and [`PublisherInfo`]; the wait and
/// take paths only ever see this interface, never a concrete entity kind.
pub trait EventSource: Send + Sync {
    /// Identifier of the implementation that created this entity.
    fn implementation_identifier(&self) -> &'static str;

    /// The entity's status condition. Events derive their attachable
    /// condition from here; they own none themselves.
    fn status_condition(&self) -> Arc<StatusCondition>;

    /// Statuses that have changed since they were last taken.
    fn status_changes(&self) -> StatusMask;

    /// Status snapshot for exactly one supported mask bit.
    ///
    /// Dispatch is switch-like over the mask; any mask outside the supported
    /// set returns `Unsupported`, never a snapshot of another kind.
    fn take_status(&self, mask: StatusMask) -> Result<StatusSnapshot>;
}

struct EventBinding {
    source: Arc<dyn EventSource>,
    kind: EventKind,
}

/// RMW event descriptor.
///
/// Created zero-initialized, bound to an owning entity by one of the
/// `*_event_init` operations, and reset by [`event_fini`]. Transient with
/// respect to wait calls: the coordinator mutates the owning entity's
/// enabled-status mask for the duration of one call only.
#[derive(Default)]
pub struct Event {
    binding: Option<EventBinding>,
}

impl Event {
    /// An unbound event, as handed to the `*_event_init` operations.
    #[must_use]
    pub fn zero_initialized() -> Self {
        Self::default()
    }

    /// The bound event kind, `None` while zero-initialized.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        self.binding.as_ref().map(|binding| binding.kind)
    }

    /// Whether the event has been bound to an owning entity.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Take the current status snapshot for this event; `taken` is `Ok`-ness.
    pub fn take(&self) -> Result<StatusSnapshot> {
        take_event(self)
    }

    pub(crate) fn source(&self) -> Option<&Arc<dyn EventSource>> {
        self.binding.as_ref().map(|binding| &binding.source)
    }

    fn bind(&mut self, source: Arc<dyn EventSource>, kind: EventKind) -> Result<()> {
        if self.binding.is_some() {
            return Err(Error::InvalidArgument("expected zero-initialized event"));
        }
        let actual = source.implementation_identifier();
        if actual != IMPLEMENTATION_IDENTIFIER {
            return Err(Error::IncorrectImplementation {
                expected: IMPLEMENTATION_IDENTIFIER,
                actual,
            });
        }
        self.binding = Some(EventBinding { source, kind });
        Ok(())
    }
}

/// Bind a zero-initialized event to a publisher.
pub fn publisher_event_init(
    event: &mut Event,
    publisher: &Arc<PublisherInfo>,
    kind: EventKind,
) -> Result<()> {
    let source: Arc<dyn EventSource> = publisher.clone();
    event.bind(source, kind)
}

/// Bind a zero-initialized event to a subscription.
pub fn subscription_event_init(
    event: &mut Event,
    subscription: &Arc<SubscriberInfo>,
    kind: EventKind,
) -> Result<()> {
    let source: Arc<dyn EventSource> = subscription.clone();
    event.bind(source, kind)
}

/// Reset a bound event back to the zero-initialized state.
pub fn event_fini(event: &mut Event) -> Result<()> {
    let Some(binding) = event.binding.as_ref() else {
        return Err(Error::InvalidArgument("event handle is not initialized"));
    };
    let actual = binding.source.implementation_identifier();
    if actual != IMPLEMENTATION_IDENTIFIER {
        return Err(Error::IncorrectImplementation {
            expected: IMPLEMENTATION_IDENTIFIER,
            actual,
        });
    }
    event.binding = None;
    Ok(())
}

/// Take the current status snapshot for a bound event.
///
/// The identity check runs before any other logic. Unsupported kinds return
/// `Unsupported` without touching the owning entity. The original
/// out-parameter pair (status buffer, `taken` flag) maps to the returned
/// `Result`: the snapshot exists iff `taken` would have been true.
pub fn take_event(event: &Event) -> Result<StatusSnapshot> {
    let binding = event
        .binding
        .as_ref()
        .ok_or(Error::NullHandle("event source"))?;

    let actual = binding.source.implementation_identifier();
    if actual != IMPLEMENTATION_IDENTIFIER {
        return Err(Error::IncorrectImplementation {
            expected: IMPLEMENTATION_IDENTIFIER,
            actual,
        });
    }

    let mask = status_mask_for_event(binding.kind).ok_or(Error::Unsupported)?;
    binding.source.take_status(mask)
}
