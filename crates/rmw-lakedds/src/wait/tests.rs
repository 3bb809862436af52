// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::entities::PublisherInfo;
use crate::event::{publisher_event_init, subscription_event_init, EventKind, EventSource};
use lakedds::LivelinessChangedStatus;
use std::thread;

fn short() -> Option<Duration> {
    Some(Duration::from_millis(20))
}

fn generous() -> Option<Duration> {
    Some(Duration::from_millis(500))
}

fn subscription_event(subscription: &Arc<SubscriberInfo>, kind: EventKind) -> Arc<Event> {
    let mut event = Event::zero_initialized();
    subscription_event_init(&mut event, subscription, kind).expect("event init");
    Arc::new(event)
}

fn some_slots<T>(entities: &[Arc<T>]) -> Vec<Option<Arc<T>>> {
    entities.iter().cloned().map(Some).collect()
}

#[test]
fn empty_wait_times_out() {
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(WaitArgs::default(), &state, short()).expect("wait");
    assert!(verdict.timed_out());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn positional_fidelity_for_subscriptions() {
    let subs: Vec<Arc<SubscriberInfo>> =
        (0..3).map(|_| Arc::new(SubscriberInfo::new())).collect();
    subs[1].on_data_available();

    let mut slots = some_slots(&subs);
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            subscriptions: Some(&mut slots),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("wait");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert_eq!(slots.len(), 3);
    assert!(slots[0].is_none());
    assert!(slots[1]
        .as_ref()
        .is_some_and(|info| Arc::ptr_eq(info, &subs[1])));
    assert!(slots[2].is_none());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn timeout_nulls_every_slot() {
    let sub = Arc::new(SubscriberInfo::new());
    let service = Arc::new(ServiceInfo::new());
    let client = Arc::new(ClientInfo::new());
    let guard = Arc::new(GuardCondition::new());
    let event = subscription_event(&sub, EventKind::LivelinessChanged);

    let mut subs = vec![Some(Arc::clone(&sub))];
    let mut guards = vec![Some(Arc::clone(&guard))];
    let mut services = vec![Some(Arc::clone(&service))];
    let mut clients = vec![Some(Arc::clone(&client))];
    let mut events = vec![Some(Arc::clone(&event))];

    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            subscriptions: Some(&mut subs),
            guard_conditions: Some(&mut guards),
            services: Some(&mut services),
            clients: Some(&mut clients),
            events: Some(&mut events),
        },
        &state,
        short(),
    )
    .expect("wait");

    assert!(verdict.timed_out());
    assert!(subs[0].is_none());
    assert!(guards[0].is_none());
    assert!(services[0].is_none());
    assert!(clients[0].is_none());
    assert!(events[0].is_none());

    // Zero attachments and no leftover enabled mask after the call
    assert_eq!(state.attached_count(), 0);
    assert_eq!(sub.status_condition().get_enabled_statuses().bits(), 0);
}

#[test]
fn guard_condition_one_shot() {
    let guard = Arc::new(GuardCondition::new());
    guard.set_trigger_value(true);
    let sub = Arc::new(SubscriberInfo::new());

    let mut guards = vec![Some(Arc::clone(&guard))];
    let mut subs = vec![Some(Arc::clone(&sub))];

    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            subscriptions: Some(&mut subs),
            guard_conditions: Some(&mut guards),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("wait");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert!(guards[0].is_some(), "triggered guard must stay in its slot");
    assert!(!guard.get_trigger_value(), "trigger resets after the call");
    assert!(subs[0].is_none());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn null_entity_slot_is_rejected_before_attach() {
    let mut slots: Vec<Option<Arc<SubscriberInfo>>> = vec![None];
    let state = WaitSetState::with_capacity(8);

    let result = wait(
        WaitArgs {
            subscriptions: Some(&mut slots),
            ..WaitArgs::default()
        },
        &state,
        short(),
    );

    assert!(matches!(result, Err(Error::NullHandle("subscriber info"))));
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn failed_attach_pass_still_sweeps_attachments() {
    // First slot attaches fine, second slot aborts the call; the cleanup
    // sweep must leave the native wait-set empty.
    let sub = Arc::new(SubscriberInfo::new());
    let mut slots = vec![Some(Arc::clone(&sub)), None];
    let state = WaitSetState::with_capacity(8);

    let result = wait(
        WaitArgs {
            subscriptions: Some(&mut slots),
            ..WaitArgs::default()
        },
        &state,
        short(),
    );

    assert!(matches!(result, Err(Error::NullHandle("subscriber info"))));
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn null_event_slot_is_rejected() {
    let mut events: Vec<Option<Arc<Event>>> = vec![None];
    let state = WaitSetState::with_capacity(8);

    let result = wait(
        WaitArgs {
            events: Some(&mut events),
            ..WaitArgs::default()
        },
        &state,
        short(),
    );

    assert!(matches!(result, Err(Error::NullHandle("event"))));
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn event_masks_accumulate_per_entity_and_reset_after_the_call() {
    let sub = Arc::new(SubscriberInfo::new());
    let liveliness = subscription_event(&sub, EventKind::LivelinessChanged);
    let deadline = subscription_event(&sub, EventKind::RequestedDeadlineMissed);

    // Two descriptors on one entity collapse to a single status condition
    // with the OR of both translated masks.
    let slots = vec![Some(Arc::clone(&liveliness)), Some(Arc::clone(&deadline))];
    let mut conditions = HashMap::new();
    gather_event_conditions(&slots, &mut conditions).expect("gather");
    assert_eq!(conditions.len(), 1);

    let enabled = sub.status_condition().get_enabled_statuses();
    assert!(enabled.contains(StatusMask::LIVELINESS_CHANGED));
    assert!(enabled.contains(StatusMask::REQUESTED_DEADLINE_MISSED));

    // A full call (which re-ORs the same masks) resets the mask to none.
    let mut events = vec![Some(liveliness), Some(deadline)];
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            events: Some(&mut events),
            ..WaitArgs::default()
        },
        &state,
        short(),
    )
    .expect("wait");

    assert!(verdict.timed_out());
    assert_eq!(sub.status_condition().get_enabled_statuses().bits(), 0);
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn shared_status_condition_descriptors_evaluate_independently() {
    let sub = Arc::new(SubscriberInfo::new());
    let liveliness = subscription_event(&sub, EventKind::LivelinessChanged);
    let deadline = subscription_event(&sub, EventKind::RequestedDeadlineMissed);

    sub.on_liveliness_changed(LivelinessChangedStatus {
        alive_count: 1,
        alive_count_change: 1,
        ..LivelinessChangedStatus::default()
    });

    let mut events = vec![Some(Arc::clone(&liveliness)), Some(Arc::clone(&deadline))];
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            events: Some(&mut events),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("wait");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert!(events[0].is_some(), "active liveliness event must survive");
    assert!(events[1].is_none(), "inactive deadline event must be nulled");
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn unsupported_event_does_not_block_supported_sibling() {
    let sub_a = Arc::new(SubscriberInfo::new());
    let sub_b = Arc::new(SubscriberInfo::new());
    let unsupported = subscription_event(&sub_a, EventKind::RequestedQosIncompatible);
    let supported = subscription_event(&sub_b, EventKind::LivelinessChanged);

    sub_b.on_liveliness_changed(LivelinessChangedStatus {
        alive_count: 1,
        alive_count_change: 1,
        ..LivelinessChangedStatus::default()
    });

    let mut events = vec![Some(unsupported), Some(supported)];
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            events: Some(&mut events),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("wait must not error on the unsupported descriptor");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert!(events[0].is_none(), "unsupported event reports not-fired");
    assert!(events[1].is_some(), "supported event reports fired");
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn publisher_events_ride_the_same_path() {
    let publisher = Arc::new(PublisherInfo::new());
    let mut event = Event::zero_initialized();
    publisher_event_init(&mut event, &publisher, EventKind::LivelinessLost).expect("init");

    publisher.on_liveliness_lost(lakedds::LivelinessLostStatus {
        total_count: 1,
        total_count_change: 1,
    });

    let mut events = vec![Some(Arc::new(event))];
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            events: Some(&mut events),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("wait");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert!(events[0].is_some());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn incorrect_implementation_is_rejected_before_any_attach() {
    let mut state = WaitSetState::with_capacity(4);
    state.implementation_identifier = "rmw_elsewhere";

    let sub = Arc::new(SubscriberInfo::new());
    let mut slots = vec![Some(Arc::clone(&sub))];

    let result = wait(
        WaitArgs {
            subscriptions: Some(&mut slots),
            ..WaitArgs::default()
        },
        &state,
        short(),
    );

    assert!(matches!(
        result,
        Err(Error::IncorrectImplementation {
            actual: "rmw_elsewhere",
            ..
        })
    ));
    // Rejected before any work: the slot is untouched
    assert!(slots[0].is_some());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn client_readiness_shares_the_response_condition() {
    // The attachable client condition and the response-arrival trigger must
    // be the same source; a response from another thread wakes the wait.
    let client = Arc::new(ClientInfo::new());
    let responder = Arc::clone(&client);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(40));
        responder.on_response_available();
    });

    let mut clients = vec![Some(Arc::clone(&client))];
    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            clients: Some(&mut clients),
            ..WaitArgs::default()
        },
        &state,
        Some(Duration::from_secs(2)),
    )
    .expect("wait");
    handle.join().expect("responder thread");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert!(clients[0].is_some());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn mixed_kinds_report_only_the_ready_entity() {
    let sub = Arc::new(SubscriberInfo::new());
    let service = Arc::new(ServiceInfo::new());
    let guard = Arc::new(GuardCondition::new());
    service.on_request_available();

    let mut subs = vec![Some(Arc::clone(&sub))];
    let mut services = vec![Some(Arc::clone(&service))];
    let mut guards = vec![Some(Arc::clone(&guard))];

    let state = WaitSetState::with_capacity(8);
    let verdict = wait(
        WaitArgs {
            subscriptions: Some(&mut subs),
            guard_conditions: Some(&mut guards),
            services: Some(&mut services),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("wait");

    assert_eq!(verdict, WaitVerdict::Ready);
    assert!(subs[0].is_none());
    assert!(guards[0].is_none());
    assert!(services[0].is_some());
    assert_eq!(state.attached_count(), 0);
}

#[test]
fn wait_set_state_is_reusable_across_calls() {
    let state = WaitSetState::with_capacity(8);
    let guard = Arc::new(GuardCondition::new());

    guard.set_trigger_value(true);
    let mut guards = vec![Some(Arc::clone(&guard))];
    let verdict = wait(
        WaitArgs {
            guard_conditions: Some(&mut guards),
            ..WaitArgs::default()
        },
        &state,
        generous(),
    )
    .expect("first wait");
    assert_eq!(verdict, WaitVerdict::Ready);
    assert_eq!(state.attached_count(), 0);

    // Same state, next call: trigger was consumed, so this times out.
    let mut guards = vec![Some(Arc::clone(&guard))];
    let verdict = wait(
        WaitArgs {
            guard_conditions: Some(&mut guards),
            ..WaitArgs::default()
        },
        &state,
        short(),
    )
    .expect("second wait");
    assert!(verdict.timed_out());
    assert!(guards[0].is_none());
    assert_eq!(state.attached_count(), 0);
}
