// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use lakedds::Condition;
use std::thread;

#[test]
fn subscriber_take_status_resets_deltas_and_acknowledges() {
    let info = SubscriberInfo::new();
    info.on_requested_deadline_missed(RequestedDeadlineMissedStatus {
        total_count: 5,
        total_count_change: 2,
        last_instance_handle: Some(11),
    });
    assert!(info
        .status_changes()
        .contains(StatusMask::REQUESTED_DEADLINE_MISSED));

    let snapshot = info
        .take_status(StatusMask::REQUESTED_DEADLINE_MISSED)
        .expect("take status");
    let StatusSnapshot::RequestedDeadlineMissed(status) = snapshot else {
        panic!("expected a requested-deadline-missed snapshot");
    };
    assert_eq!(status.total_count, 5);
    assert_eq!(status.total_count_change, 2);

    // Taking the status clears its change bit and zeroes the delta
    assert!(!info
        .status_changes()
        .contains(StatusMask::REQUESTED_DEADLINE_MISSED));
    let StatusSnapshot::RequestedDeadlineMissed(again) = info
        .take_status(StatusMask::REQUESTED_DEADLINE_MISSED)
        .expect("second take")
    else {
        panic!("expected a requested-deadline-missed snapshot");
    };
    assert_eq!(again.total_count, 5);
    assert_eq!(again.total_count_change, 0);
}

#[test]
fn take_status_refuses_masks_outside_the_supported_set() {
    let subscriber = SubscriberInfo::new();
    assert!(matches!(
        subscriber.take_status(StatusMask::SAMPLE_LOST),
        Err(crate::Error::Unsupported)
    ));
    assert!(matches!(
        subscriber.take_status(StatusMask::DATA_AVAILABLE),
        Err(crate::Error::Unsupported)
    ));

    // Writer-side masks are not served by the reader side and vice versa
    assert!(matches!(
        subscriber.take_status(StatusMask::LIVELINESS_LOST),
        Err(crate::Error::Unsupported)
    ));
    let publisher = PublisherInfo::new();
    assert!(matches!(
        publisher.take_status(StatusMask::LIVELINESS_CHANGED),
        Err(crate::Error::Unsupported)
    ));
}

#[test]
fn publisher_take_status_covers_writer_side_kinds() {
    let info = PublisherInfo::new();
    info.on_liveliness_lost(LivelinessLostStatus {
        total_count: 1,
        total_count_change: 1,
    });
    info.on_offered_deadline_missed(OfferedDeadlineMissedStatus {
        total_count: 3,
        total_count_change: 3,
        last_instance_handle: None,
    });

    let StatusSnapshot::LivelinessLost(lost) = info
        .take_status(StatusMask::LIVELINESS_LOST)
        .expect("liveliness lost")
    else {
        panic!("expected a liveliness-lost snapshot");
    };
    assert_eq!(lost.total_count, 1);

    let StatusSnapshot::OfferedDeadlineMissed(missed) = info
        .take_status(StatusMask::OFFERED_DEADLINE_MISSED)
        .expect("offered deadline missed")
    else {
        panic!("expected an offered-deadline-missed snapshot");
    };
    assert_eq!(missed.total_count, 3);
    assert_eq!(info.status_changes().bits(), 0);
}

#[test]
fn matched_count_updates_are_visible_across_threads() {
    let info = Arc::new(SubscriberInfo::new());
    let updater = Arc::clone(&info);

    let handle = thread::spawn(move || {
        updater.on_subscription_matched(SubscriptionMatchedStatus {
            total_count: 4,
            total_count_change: 1,
            current_count: 3,
            current_count_change: 1,
            last_publication_handle: Some(99),
        });
    });
    handle.join().expect("updater thread");

    assert_eq!(info.matched_count(), 3);
    assert!(info
        .status_changes()
        .contains(StatusMask::SUBSCRIPTION_MATCHED));
}

#[test]
fn publication_matched_count_tracks_discovery() {
    let info = PublisherInfo::new();
    assert_eq!(info.matched_count(), 0);
    info.on_publication_matched(PublicationMatchedStatus {
        total_count: 1,
        total_count_change: 1,
        current_count: 1,
        current_count_change: 1,
        last_subscription_handle: Some(1),
    });
    assert_eq!(info.matched_count(), 1);
}

#[test]
fn readiness_conditions_are_stable_and_distinct() {
    let subscriber = SubscriberInfo::new();
    let service = ServiceInfo::new();
    let client = ClientInfo::new();

    // Each entity owns exactly one condition, handed out by reference
    assert!(Arc::ptr_eq(
        &subscriber.read_condition(),
        &subscriber.read_condition()
    ));
    assert_ne!(
        service.read_condition().condition_id(),
        client.read_condition().condition_id()
    );
    assert_ne!(
        subscriber.read_condition().condition_id(),
        service.read_condition().condition_id()
    );
}

#[test]
fn readiness_trigger_follows_runtime_notifications() {
    let subscriber = SubscriberInfo::new();
    assert!(!subscriber.read_condition().get_trigger_value());
    subscriber.on_data_available();
    assert!(subscriber.read_condition().get_trigger_value());
    subscriber.on_samples_taken();
    assert!(!subscriber.read_condition().get_trigger_value());

    let service = ServiceInfo::new();
    service.on_request_available();
    assert!(service.read_condition().get_trigger_value());
    service.on_requests_taken();
    assert!(!service.read_condition().get_trigger_value());

    let client = ClientInfo::new();
    client.on_response_available();
    assert!(client.read_condition().get_trigger_value());
    client.on_responses_taken();
    assert!(!client.read_condition().get_trigger_value());
}
