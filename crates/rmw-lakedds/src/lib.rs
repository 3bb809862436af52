// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ROS 2 RMW wait-set and status-event layer for LakeDDS.
//!
//! This crate multiplexes an arbitrary mix of RMW entities (subscriptions,
//! guard conditions, services, clients and status events) onto one LakeDDS
//! [`lakedds::WaitSet`] and translates between the generic RMW event
//! vocabulary and the native status-mask bits. The two halves:
//!
//! - [`wait`]: gather every entity's attachable condition, block until one
//!   triggers or the timeout elapses, null the slots of entities that did not
//!   fire, and leave the wait-set with zero attachments no matter how the
//!   call exits.
//! - [`take_event`] / [`EventSource`]: on-demand status snapshots for the
//!   supported event kinds, backed by each entity's native status accessors.
//!
//! Entity construction, type support, QoS and transport are out of scope;
//! the `*Info` records here hold only what the wait/event paths need.

pub mod env_config;
mod entities;
mod event;
mod event_converter;
mod wait;

pub use entities::{ClientInfo, PublisherInfo, Readiness, ServiceInfo, SubscriberInfo};
pub use event::{
    event_fini, publisher_event_init, subscription_event_init, take_event, Event, EventKind,
    EventSource, StatusSnapshot,
};
pub use event_converter::{is_event_supported, ret_code_from_dds, status_mask_for_event};
pub use wait::{wait, WaitArgs, WaitSetState, WaitVerdict};

use thiserror::Error as ThisError;

/// Identity tag carried by every handle this implementation creates.
///
/// Checked before any other logic whenever a handle crosses the API
/// boundary; a mismatch means the handle was produced by a different RMW
/// implementation living in the same process.
pub const IMPLEMENTATION_IDENTIFIER: &str = "rmw_lakedds";

/// Errors emitted by the RMW binding layer.
///
/// Timeout of the blocking wait itself is not an error; it is reported as
/// [`WaitVerdict::TimedOut`]. The [`Error::Timeout`] variant only surfaces
/// when a native call outside the block step reports a would-block outcome.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A required handle inside a supplied collection was absent.
    #[error("{0} handle is null")]
    NullHandle(&'static str),
    /// Caller-contract violation, detected before any work was performed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Handle belongs to a different RMW implementation.
    #[error("implementation identifier mismatch: expected `{expected}`, got `{actual}`")]
    IncorrectImplementation {
        /// Identifier this binding stamps on its handles.
        expected: &'static str,
        /// Identifier found on the offending handle.
        actual: &'static str,
    },
    /// Native layer ran out of resources.
    #[error("allocation failed in the native layer")]
    BadAlloc,
    /// Native call reported a timeout outside the blocking wait.
    #[error("native operation timed out")]
    Timeout,
    /// Event kind has no native status mapping.
    #[error("unsupported event type")]
    Unsupported,
    /// Native condition or wait-set operation failed.
    #[error("native wait-set operation failed: {0}")]
    Dds(#[source] lakedds::Error),
}

/// Convenient alias for binding results using the public `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
