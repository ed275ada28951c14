// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::atomic::Ordering;

use super::*;
use crate::test_helpers::{request, FailingStore, StubClient};
use ks_core::{ManualClock, MemoryStore};

struct Fixture {
    store: Arc<MemoryStore>,
    client: Arc<StubClient>,
    clock: Arc<ManualClock>,
    coordinator: Coordinator,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let client = Arc::new(StubClient::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let coordinator = Coordinator::with_clock(store.clone(), client.clone(), clock.clone());
    Fixture { store, client, clock, coordinator }
}

async fn queue_offline(f: &Fixture, codes: &[&str]) -> Vec<u64> {
    let mut ids = Vec::new();
    for code in codes {
        let outcome = f.coordinator.submit(request(code), false).await.unwrap();
        ids.push(outcome.queued_id().unwrap());
    }
    ids
}

// submit

#[tokio::test]
async fn online_success_is_delivered_and_not_queued() {
    let f = fixture();
    let outcome = f.coordinator.submit(request("A"), true).await.unwrap();

    assert!(outcome.is_delivered());
    assert_eq!(f.coordinator.pending_count().unwrap(), 0);
    assert_eq!(f.client.calls(), 1);
}

#[tokio::test]
async fn offline_submit_queues_without_calling_server() {
    let f = fixture();
    let outcome = f.coordinator.submit(request("A"), false).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Queued { id: 1, reason: None });
    assert_eq!(f.client.calls(), 0);

    let items = f.store.list_all().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].attendee_code, "A");
    assert_eq!(items[0].zone_id, "zone1");
    assert_eq!(items[0].event_day, "2024-05-01");
    assert_eq!(items[0].queued_at_ms, 1_000);
    assert_eq!(items[0].attempt_count, 0);
}

#[tokio::test]
async fn every_offline_submit_is_counted() {
    let f = fixture();
    for i in 0..25 {
        f.coordinator.submit(request(&format!("ATT-{}", i)), false).await.unwrap();
    }
    assert_eq!(f.coordinator.pending_count().unwrap(), 25);
}

#[tokio::test]
async fn online_transport_failure_queues_with_reason() {
    let f = fixture();
    f.client.set_offline(true);

    let outcome = f.coordinator.submit(request("A"), true).await.unwrap();
    match outcome {
        SubmitOutcome::Queued { id, reason: Some(reason) } => {
            assert_eq!(id, 1);
            assert!(reason.starts_with(SAVED_OFFLINE_PREFIX), "reason: {reason}");
            assert!(reason.contains("connection refused"));
        }
        other => panic!("expected queued with reason, got {other:?}"),
    }
    assert_eq!(f.coordinator.pending_count().unwrap(), 1);
}

#[tokio::test]
async fn online_rejection_is_also_queued() {
    let f = fixture();
    f.client.reject_for("A");

    let outcome = f.coordinator.submit(request("A"), true).await.unwrap();
    let SubmitOutcome::Queued { reason: Some(reason), .. } = outcome else {
        panic!("expected queued");
    };
    assert_eq!(reason, "saved offline: rejected: attendee not found");
    assert_eq!(f.coordinator.pending_count().unwrap(), 1);
}

#[tokio::test]
async fn store_failure_on_submit_is_hard_error() {
    let store = Arc::new(FailingStore::new());
    store.fail_enqueue.store(true, Ordering::SeqCst);
    let coordinator = Coordinator::new(store.clone(), Arc::new(StubClient::new()));

    assert!(coordinator.submit(request("A"), false).await.is_err());

    let client = Arc::new(StubClient::new());
    client.set_offline(true);
    let coordinator = Coordinator::new(store, client);
    assert!(coordinator.submit(request("A"), true).await.is_err());
}

// sync_one

#[tokio::test]
async fn sync_one_removes_on_success() {
    let f = fixture();
    queue_offline(&f, &["A"]).await;
    let item = f.store.list_all().unwrap().remove(0);

    let response = f.coordinator.sync_one(&item).await.unwrap();
    assert!(response.success);
    assert_eq!(f.coordinator.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn sync_one_leaves_item_untouched_on_failure() {
    let f = fixture();
    queue_offline(&f, &["A"]).await;
    f.client.fail_for("A");
    let item = f.store.list_all().unwrap().remove(0);

    let err = f.coordinator.sync_one(&item).await.unwrap_err();
    assert!(matches!(err, SyncItemError::Remote(RemoteError::Unreachable(_))));
    assert_eq!(err.kind(), FailureKind::Transport);
    assert_eq!(f.store.list_all().unwrap(), vec![item]);
}

#[tokio::test]
async fn sync_one_requires_queue_id() {
    let f = fixture();
    let item = PendingCheckIn::from_request(&request("A"), 0);

    let err = f.coordinator.sync_one(&item).await.unwrap_err();
    assert!(matches!(err, SyncItemError::Unpersisted));
    assert_eq!(f.client.calls(), 0);
}

#[tokio::test]
async fn sync_one_reports_remove_failure_as_storage() {
    let store = Arc::new(FailingStore::new());
    let coordinator = Coordinator::new(store.clone(), Arc::new(StubClient::new()));
    coordinator.submit(request("A"), false).await.unwrap();
    store.fail_remove.store(true, Ordering::SeqCst);
    let item = store.list_all().unwrap().remove(0);

    let err = coordinator.sync_one(&item).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Storage);
    assert_eq!(store.count().unwrap(), 1);
}

// sync_all

#[tokio::test]
async fn sync_all_on_empty_queue_is_noop() {
    let f = fixture();
    let outcome = f.coordinator.sync_all().await.unwrap();

    assert_eq!(outcome, SyncOutcome::default());
    assert!(outcome.is_noop_or_complete());
    assert!(!outcome.is_full_success());
    assert_eq!(f.client.calls(), 0);
}

#[tokio::test]
async fn sync_all_drains_in_queue_order() {
    let f = fixture();
    queue_offline(&f, &["A", "B", "C"]).await;

    let outcome = f.coordinator.sync_all().await.unwrap();
    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.succeeded, 3);
    assert!(outcome.is_full_success());
    assert_eq!(f.client.sent_codes(), vec!["A", "B", "C"]);
    assert_eq!(f.coordinator.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn partial_failure_retains_only_failed_item() {
    let f = fixture();
    let ids = queue_offline(&f, &["A", "B", "C"]).await;
    f.client.fail_for("B");

    let outcome = f.coordinator.sync_all().await.unwrap();
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
    assert!(outcome.is_partial_success());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with(&format!("check-in {}: ", ids[1])));

    let remaining = f.store.list_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, Some(ids[1]));
    assert_eq!(remaining[0].attendee_code, "B");
}

#[tokio::test]
async fn sync_all_keeps_going_after_failures() {
    let f = fixture();
    queue_offline(&f, &["A", "B"]).await;
    f.client.set_offline(true);

    let outcome = f.coordinator.sync_all().await.unwrap();
    assert_eq!(outcome.failed, 2);
    assert_eq!(f.client.calls(), 2);
    assert_eq!(outcome.failures.iter().map(|fa| fa.kind).collect::<Vec<_>>(), vec![
        FailureKind::Transport,
        FailureKind::Transport
    ]);
}

#[tokio::test]
async fn second_drain_after_full_success_is_noop() {
    let f = fixture();
    queue_offline(&f, &["A", "B"]).await;

    let first = f.coordinator.sync_all().await.unwrap();
    assert!(first.is_full_success());
    let calls = f.client.calls();

    let second = f.coordinator.sync_all().await.unwrap();
    assert_eq!(second, SyncOutcome::default());
    assert_eq!(f.client.calls(), calls);
    assert_eq!(f.store.count().unwrap(), 0);
}

#[tokio::test]
async fn sync_all_reports_progress() {
    let f = fixture();
    queue_offline(&f, &["A", "B", "C"]).await;

    let mut seen = Vec::new();
    f.coordinator.sync_all_with_progress(|current, total| seen.push((current, total))).await.unwrap();
    assert_eq!(seen, vec![(0, 3), (1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn list_failure_is_hard_error() {
    let store = Arc::new(FailingStore::new());
    store.fail_list.store(true, Ordering::SeqCst);
    let coordinator = Coordinator::new(store, Arc::new(StubClient::new()));

    assert!(coordinator.sync_all().await.is_err());
}

// bookkeeping

#[tokio::test]
async fn record_failures_updates_attempts() {
    let f = fixture();
    let ids = queue_offline(&f, &["A", "B"]).await;
    f.client.fail_for("A");
    f.client.reject_for("B");

    f.clock.set(5_000);
    let outcome = f.coordinator.sync_all().await.unwrap();
    f.coordinator.record_failures(&outcome).unwrap();

    let items = f.store.list_all().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, Some(ids[0]));
    assert_eq!(items[0].attempt_count, 1);
    assert_eq!(items[0].last_attempt_at_ms, Some(5_000));
    assert_eq!(items[0].last_error.as_deref(), Some("server unreachable: connection refused"));
    assert_eq!(items[1].last_error.as_deref(), Some("rejected: attendee not found"));
    assert_eq!(items[0].queued_at_ms, 1_000);

    let outcome = f.coordinator.sync_all().await.unwrap();
    f.coordinator.record_failures(&outcome).unwrap();
    assert_eq!(f.store.list_all().unwrap()[0].attempt_count, 2);
}

#[tokio::test]
async fn rejected_status_gets_prefix_once() {
    let f = fixture();
    let ids = queue_offline(&f, &["A"]).await;
    let mut outcome = SyncOutcome { total: 1, ..SyncOutcome::default() };
    outcome.record_failure(ids[0], FailureKind::Rejected, "server returned HTTP 404".into());

    f.coordinator.record_failures(&outcome).unwrap();
    let item = f.store.list_all().unwrap().remove(0);
    assert_eq!(item.last_error.as_deref(), Some("rejected: server returned HTTP 404"));
}

#[tokio::test]
async fn healed_item_syncs_on_retry() {
    let f = fixture();
    queue_offline(&f, &["A"]).await;
    f.client.fail_for("A");
    assert_eq!(f.coordinator.sync_all().await.unwrap().failed, 1);

    f.client.heal("A");
    let outcome = f.coordinator.sync_all().await.unwrap();
    assert!(outcome.is_full_success());
    assert_eq!(f.coordinator.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn clear_empties_queue_regardless_of_attempts() {
    let f = fixture();
    queue_offline(&f, &["A", "B"]).await;
    f.client.set_offline(true);
    let outcome = f.coordinator.sync_all().await.unwrap();
    f.coordinator.record_failures(&outcome).unwrap();

    f.coordinator.clear().unwrap();
    assert_eq!(f.coordinator.pending_count().unwrap(), 0);
    assert!(f.coordinator.list_pending().unwrap().is_empty());
}
