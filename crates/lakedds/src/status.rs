// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Communication status records
//!
//! Fixed-shape snapshots of entity communication statuses, per DDS v1.4
//! section 2.2.4.1. The runtime notification path fills these in; the
//! binding layer reads them back through status queries. The `*_change`
//! fields are deltas since the status was last taken and reset to zero on
//! every take.

/// Status information for subscription matching events.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionMatchedStatus {
    /// Total cumulative count of matched publications.
    pub total_count: u32,
    /// Change in total_count since the status was last taken.
    pub total_count_change: i32,
    /// Current number of matched publications.
    pub current_count: u32,
    /// Change in current_count since the status was last taken.
    pub current_count_change: i32,
    /// Handle of the last matched/unmatched publication.
    pub last_publication_handle: Option<u64>,
}

/// Status information for publication matching events.
#[derive(Debug, Clone, Default)]
pub struct PublicationMatchedStatus {
    /// Total cumulative count of matched subscriptions.
    pub total_count: u32,
    /// Change in total_count since the status was last taken.
    pub total_count_change: i32,
    /// Current number of matched subscriptions.
    pub current_count: u32,
    /// Change in current_count since the status was last taken.
    pub current_count_change: i32,
    /// Handle of the last matched/unmatched subscription.
    pub last_subscription_handle: Option<u64>,
}

/// Status information for reader-side liveliness changes.
#[derive(Debug, Clone, Default)]
pub struct LivelinessChangedStatus {
    /// Number of publications currently asserting liveliness.
    pub alive_count: u32,
    /// Change in alive_count since the status was last taken.
    pub alive_count_change: i32,
    /// Number of publications that have lost liveliness.
    pub not_alive_count: u32,
    /// Change in not_alive_count since the status was last taken.
    pub not_alive_count_change: i32,
    /// Handle of the last publication to change liveliness.
    pub last_publication_handle: Option<u64>,
}

/// Status information for reader-side deadline misses.
#[derive(Debug, Clone, Default)]
pub struct RequestedDeadlineMissedStatus {
    /// Total cumulative count of missed deadlines.
    pub total_count: u32,
    /// Change in total_count since the status was last taken.
    pub total_count_change: i32,
    /// Handle of the instance that missed the deadline.
    pub last_instance_handle: Option<u64>,
}

/// Status information for writer-side liveliness loss.
#[derive(Debug, Clone, Default)]
pub struct LivelinessLostStatus {
    /// Total cumulative count of liveliness losses.
    pub total_count: u32,
    /// Change in total_count since the status was last taken.
    pub total_count_change: i32,
}

/// Status information for writer-side deadline misses.
#[derive(Debug, Clone, Default)]
pub struct OfferedDeadlineMissedStatus {
    /// Total cumulative count of missed deadlines.
    pub total_count: u32,
    /// Change in total_count since the status was last taken.
    pub total_count_change: i32,
    /// Handle of the instance that missed the deadline.
    pub last_instance_handle: Option<u64>,
}
