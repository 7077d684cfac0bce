//! Daily usage accounting rules, exercised through the public service API
//! against the in-process store.

use std::sync::Arc;

use voicebridge::models::Identity;
use voicebridge::services::{MemoryUsageStore, UsageService, UsageStore};

fn service_with_limit(limit: i64) -> UsageService {
    UsageService::new(Arc::new(MemoryUsageStore::new()), limit)
}

#[tokio::test]
async fn remaining_tracks_recorded_usage() {
    let svc = service_with_limit(3);
    let identity = Identity::Ip("9.9.9.9".to_string());
    let date = "2025-06-01";

    for recorded in 0..5 {
        let limit = svc
            .check_limit_on(&identity, date)
            .await
            .expect("check failed");
        let expected = (3i64 - recorded).max(0);
        assert_eq!(limit.remaining_translations, expected);
        assert_eq!(limit.can_translate, recorded < 3);
        svc.record_usage_on(&identity, date)
            .await
            .expect("record failed");
    }
}

#[tokio::test]
async fn authenticated_identity_never_throttled() {
    let svc = service_with_limit(3);
    let identity = Identity::User("u1".to_string());

    for _ in 0..10 {
        svc.record_usage(&identity).await.expect("record failed");
        let limit = svc.check_limit(&identity).await.expect("check failed");
        assert!(limit.can_translate);
        assert_eq!(limit.remaining_translations, -1);
        assert!(limit.is_authenticated);
        assert!(limit.limit_message.is_none());
    }
}

#[tokio::test]
async fn unpersisted_session_counts_against_ip() {
    let identity = UsageService::resolve_identity(None, Some("fresh"), false, Some("1.2.3.4"));
    assert_eq!(identity, Identity::Ip("1.2.3.4".to_string()));

    let identity = UsageService::resolve_identity(None, Some("fresh"), true, Some("1.2.3.4"));
    assert_eq!(identity, Identity::Session("fresh".to_string()));

    // User wins over everything else
    let identity = UsageService::resolve_identity(Some("u1"), Some("s1"), true, Some("1.2.3.4"));
    assert_eq!(identity, Identity::User("u1".to_string()));

    // Nothing at all lands in the shared bucket
    let identity = UsageService::resolve_identity(None, None, false, None);
    assert_eq!(identity, Identity::Anonymous);
}

#[tokio::test]
async fn concurrent_recordings_all_counted() {
    let svc = Arc::new(service_with_limit(3));
    let identity = Identity::Session("busy".to_string());
    let date = "2025-06-01";

    let mut handles = Vec::new();
    for _ in 0..16 {
        let svc = svc.clone();
        let identity = identity.clone();
        handles.push(tokio::spawn(async move {
            svc.record_usage_on(&identity, date).await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("record failed");
    }

    let limit = svc
        .check_limit_on(&identity, date)
        .await
        .expect("check failed");
    assert!(!limit.can_translate);
    assert_eq!(limit.remaining_translations, 0);
}

#[tokio::test]
async fn counters_are_scoped_per_day_and_identity() {
    let svc = service_with_limit(3);
    let session = Identity::Session("s1".to_string());
    let ip = Identity::Ip("9.9.9.9".to_string());

    for _ in 0..3 {
        svc.record_usage_on(&session, "2025-05-31")
            .await
            .expect("record failed");
    }

    // Same identity, next day: counter starts over
    let limit = svc
        .check_limit_on(&session, "2025-06-01")
        .await
        .expect("check failed");
    assert!(limit.can_translate);
    assert_eq!(limit.remaining_translations, 3);

    // Different identity, same exhausted day: unaffected
    let limit = svc
        .check_limit_on(&ip, "2025-05-31")
        .await
        .expect("check failed");
    assert!(limit.can_translate);
    assert_eq!(limit.remaining_translations, 3);
}

#[tokio::test]
async fn denial_payload_carries_signup_nudge() {
    let svc = service_with_limit(3);
    let identity = Identity::Ip("9.9.9.9".to_string());
    let date = "2025-06-01";

    for _ in 0..3 {
        svc.record_usage_on(&identity, date)
            .await
            .expect("record failed");
    }

    let limit = svc
        .check_limit_on(&identity, date)
        .await
        .expect("check failed");
    assert!(!limit.can_translate);
    assert!(!limit.is_authenticated);
    assert_eq!(
        limit.limit_message.as_deref(),
        Some("You've reached your daily limit of 3 translations. Create an account for more translations!")
    );
}

#[tokio::test]
async fn store_increment_returns_running_total() {
    let store = MemoryUsageStore::new();
    assert_eq!(
        store.current_count("ip:1.1.1.1", "2025-06-01").await.unwrap(),
        0
    );
    assert_eq!(store.increment("ip:1.1.1.1", "2025-06-01").await.unwrap(), 1);
    assert_eq!(store.increment("ip:1.1.1.1", "2025-06-01").await.unwrap(), 2);
    assert_eq!(
        store.current_count("ip:1.1.1.1", "2025-06-01").await.unwrap(),
        2
    );
}
