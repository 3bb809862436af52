// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # LakeDDS condition core
//!
//! Condition and wait-set primitives for the LakeDDS middleware binding.
//! Key concepts:
//!
//! - **Condition**: boolean-valued predicate that can be attached to a
//!   [`WaitSet`] and wakes blocked waiters when its trigger value flips
//! - **StatusCondition**: condition driven by an entity's communication
//!   statuses, filtered through an application-controlled enabled mask
//! - **GuardCondition**: condition triggered directly by the application
//! - **ReadCondition**: condition driven by sample availability on a reader
//! - **WaitSet**: blocks until at least one attached condition triggers or a
//!   timeout elapses
//!
//! The binding layer (`rmw-lakedds`) multiplexes entity readiness onto these
//! primitives; entity construction, transport and discovery live elsewhere.
//!
//! ## See Also
//!
//! - [DDS Specification](https://www.omg.org/spec/DDS/1.4/) section 2.2.4 -
//!   Conditions and Wait-sets

mod condition;
mod read_condition;
mod status;
mod waitset;

pub use condition::{Condition, GuardCondition, StatusCondition, StatusMask};
pub use read_condition::{InstanceStateMask, ReadCondition, SampleStateMask, ViewStateMask};
pub use status::{
    LivelinessChangedStatus, LivelinessLostStatus, OfferedDeadlineMissedStatus,
    PublicationMatchedStatus, RequestedDeadlineMissedStatus, SubscriptionMatchedStatus,
};
pub use waitset::{WaitSet, WaitSignal};

/// Errors returned by LakeDDS condition and wait-set operations.
#[derive(Debug)]
pub enum Error {
    /// Generic configuration error (duplicate attach, detach of an unknown
    /// condition, and similar misuse).
    Config,
    /// Invalid state for the requested operation.
    InvalidState(String),
    /// Operation timed out or a required lock was unavailable.
    WouldBlock,
    /// Out of memory during allocation.
    OutOfMemory,
    /// Requested feature or operation is not supported.
    Unsupported,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config => write!(f, "Configuration error"),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::WouldBlock => write!(f, "Operation would block"),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::Unsupported => write!(f, "Unsupported operation"),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
